// ==========================================
// 组合分析数据导入系统 - 基础类型
// ==========================================
// 职责: 单元格值与 SQL 列类型
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// 单元格值
///
/// 规范化后的每个单元格都是以下类型之一。
/// 类型转换失败的单元格统一落为 Null，不会使所在行或文件失败。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl Value {
    /// 从原始字符串构造（TRIM，空白 → Null）
    pub fn from_raw(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Null
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 值的展示长度（字符数），用于字符串列宽推断
    pub fn display_len(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Text(s) => s.chars().count(),
            Value::Integer(i) => i.to_string().len(),
            Value::Number(f) => f.to_string().len(),
            // YYYY-MM-DD
            Value::Date(_) => 10,
            // YYYY-MM-DD HH:MM:SS
            Value::DateTime(_) => 19,
        }
    }
}

/// SQL 列类型
///
/// Display 输出即建表语句中的类型文本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SqlType {
    BigInt,
    /// DECIMAL(精度, 小数位)
    Decimal(u8, u8),
    Float,
    Date,
    DateTime,
    Varchar(u16),
    Text,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Decimal(p, s) => write!(f, "DECIMAL({},{})", p, s),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::DateTime => write!(f, "DATETIME"),
            SqlType::Varchar(n) => write!(f, "VARCHAR({})", n),
            SqlType::Text => write!(f, "TEXT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_blank_is_null() {
        assert_eq!(Value::from_raw("   "), Value::Null);
        assert_eq!(Value::from_raw(""), Value::Null);
        assert_eq!(Value::from_raw("  abc "), Value::Text("abc".to_string()));
    }

    #[test]
    fn test_sql_type_display() {
        assert_eq!(SqlType::BigInt.to_string(), "BIGINT");
        assert_eq!(SqlType::Decimal(18, 8).to_string(), "DECIMAL(18,8)");
        assert_eq!(SqlType::Varchar(150).to_string(), "VARCHAR(150)");
        assert_eq!(SqlType::DateTime.to_string(), "DATETIME");
        assert_eq!(SqlType::Text.to_string(), "TEXT");
    }

    #[test]
    fn test_display_len() {
        assert_eq!(Value::Text("组合A".to_string()).display_len(), 3);
        assert_eq!(Value::Null.display_len(), 0);
        assert_eq!(
            Value::Date(chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()).display_len(),
            10
        );
    }
}
