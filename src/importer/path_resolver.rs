// ==========================================
// 组合分析数据导入系统 - 路径解析
// ==========================================
// 职责: 扫描目录拼接 + 路径上下文派生
// ==========================================

use std::path::{Path, PathBuf};

/// 解析扫描目录：基础目录 + 有序子目录段
///
/// 基础目录缺省时取进程当前工作目录。
pub fn resolve(base: Option<&Path>, sub_segments: &[String]) -> PathBuf {
    let mut dir = match base {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    for seg in sub_segments {
        dir.push(seg);
    }
    dir
}

/// 从路径派生记录 ID：取文件的祖父目录名
///
/// 路径层级不足时返回 None，不报错（层级约定见调用方）。
pub fn derive_record_id(path: &Path) -> Option<String> {
    let name = path.parent()?.parent()?.file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
