// ==========================================
// 组合分析数据导入系统 - 数据清洗
// ==========================================
// 职责: TRIM / NULL 标准化 / best-effort 数值与日期解析
// 约定: 单元格级解析失败落为 None，由调用方置 Null，绝不抛错
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// 标准化 NULL 值（空字符串/空白 → None）
pub fn normalize_null(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// best-effort 整数解析
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// best-effort 浮点解析
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// best-effort 日期解析
///
/// 依次尝试 YYYY-MM-DD / YYYYMMDD / YYYY/MM/DD，
/// 以及带时间部分的写法（取日期部分）。
pub fn parse_date_flexible(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    for fmt in ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(v, fmt) {
            return Some(d);
        }
    }
    parse_datetime_naive(v).map(|dt| dt.date())
}

/// best-effort 日期时间解析（UTC）
pub fn parse_datetime_flexible(value: &str) -> Option<DateTime<Utc>> {
    let v = value.trim();
    if let Some(dt) = parse_datetime_naive(v) {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
    }
    // 仅日期的写法按当日零点处理
    for fmt in ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(v, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }
    None
}

fn parse_datetime_naive(value: &str) -> Option<NaiveDateTime> {
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y%m%d%H%M%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    None
}
