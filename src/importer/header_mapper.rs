// ==========================================
// 组合分析数据导入系统 - 表头映射器
// ==========================================
// 职责: 源表头 → 规范字段名
// 设计: 数据驱动的关键字规则表（非继承、非逐导入器分支），
//       中英文/繁简体表头映射到同一规范字段
// ==========================================

use std::collections::HashMap;

/// 关键字匹配模式（对小写化后的表头生效）
#[derive(Debug, Clone, Copy)]
pub enum HeaderPattern {
    /// 所有子串都出现才命中（如 ["annual", "return"]）
    ContainsAll(&'static [&'static str]),
    /// 以指定子串结尾才命中（如 "id"）
    EndsWith(&'static str),
}

/// 单条映射规则：命中任一模式的表头映射到 field
///
/// 规则表整体有序，前面的规则优先（如 "session" 先于 "id" 结尾规则）。
#[derive(Debug, Clone, Copy)]
pub struct HeaderRule {
    pub field: &'static str,
    pub patterns: &'static [HeaderPattern],
}

impl HeaderPattern {
    fn matches(&self, header_lower: &str) -> bool {
        match self {
            HeaderPattern::ContainsAll(keywords) => {
                keywords.iter().all(|k| header_lower.contains(k))
            }
            HeaderPattern::EndsWith(suffix) => header_lower.ends_with(suffix),
        }
    }
}

/// 单个表头解析为规范字段名
///
/// 优先级：(a) 精确匹配规范名 → (b) 大小写不敏感匹配 → (c) 关键字规则表。
/// 首个命中即生效；未命中返回 None（该表头被丢弃）。
pub fn match_header<'a>(
    header: &str,
    canonical_fields: &[&'a str],
    rules: &[HeaderRule],
) -> Option<&'a str> {
    // (a) 精确匹配
    if let Some(f) = canonical_fields.iter().copied().find(|f| *f == header) {
        return Some(f);
    }

    // (b) 大小写不敏感匹配
    let header_lower = header.to_lowercase();
    if let Some(f) = canonical_fields
        .iter()
        .copied()
        .find(|f| f.to_lowercase() == header_lower)
    {
        return Some(f);
    }

    // (c) 关键字规则表（有序，先命中先得）
    for rule in rules {
        if rule.patterns.iter().any(|p| p.matches(&header_lower)) {
            return Some(rule.field);
        }
    }

    None
}

/// 整张表头列表 → 规范字段映射
///
/// 返回 规范字段 → 源表头下标。两个表头映射到同一规范字段时，
/// 按表头顺序先到先得，后者丢弃。
pub fn map_headers(
    headers: &[String],
    canonical_fields: &[&str],
    rules: &[HeaderRule],
) -> HashMap<String, usize> {
    let mut mapping: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(field) = match_header(header, canonical_fields, rules) {
            mapping.entry(field.to_string()).or_insert(idx);
        }
    }
    mapping
}
