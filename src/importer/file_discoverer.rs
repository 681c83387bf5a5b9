// ==========================================
// 组合分析数据导入系统 - 文件发现
// ==========================================
// 职责: 递归枚举匹配通配模式的文件
// 语义: 多模式取并集（集合语义），升序排序保证确定性
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// 递归发现匹配任一模式的文件
///
/// - 目录不存在 → ImportError::DirectoryNotFound（致命）
/// - 模式仅作用于文件名，支持 `*` 通配（如 `*_contribution.csv`）
/// - 同一文件命中多个模式只出现一次
/// - 结果按路径升序排序；空结果不是错误（表示"无可导入文件"）
pub fn discover(directory: &Path, patterns: &[String]) -> ImportResult<Vec<PathBuf>> {
    if !directory.exists() {
        return Err(ImportError::DirectoryNotFound(
            directory.display().to_string(),
        ));
    }

    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    walk(directory, &mut |path| {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if patterns.iter().any(|p| wildcard_match(p, name)) {
                found.insert(path.to_path_buf());
            }
        }
    })?;

    Ok(found.into_iter().collect())
}

/// 递归遍历目录树，对每个文件调用回调
fn walk(dir: &Path, visit: &mut dyn FnMut(&Path)) -> ImportResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, visit)?;
        } else if path.is_file() {
            visit(&path);
        }
    }
    Ok(())
}

/// `*` 通配匹配（大小写敏感，仅针对文件名）
///
/// `*` 匹配任意长度（含空）字符序列，其余字符逐字比较。
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();

    // 无通配符：全等
    if segments.len() == 1 {
        return pattern == name;
    }

    let mut rest = name;

    // 首段必须是前缀
    let first = segments[0];
    if !rest.starts_with(first) {
        return false;
    }
    rest = &rest[first.len()..];

    // 中间段依次贪婪查找
    for seg in &segments[1..segments.len() - 1] {
        if seg.is_empty() {
            continue;
        }
        match rest.find(seg) {
            Some(pos) => rest = &rest[pos + seg.len()..],
            None => return false,
        }
    }

    // 末段必须是后缀
    let last = segments[segments.len() - 1];
    last.is_empty() || rest.ends_with(last)
}
