// ==========================================
// 组合分析数据导入系统 - 导入变体配置
// ==========================================
// 职责: 每类导出文件一份数据驱动的导入配置
// 设计: 变体之间只差数据（模式/Schema/规则/过滤），不差代码路径
// ==========================================

use crate::domain::schema::{CanonicalSchema, ColumnSpec, SchemaSource};
use crate::domain::types::SqlType;
use crate::importer::header_mapper::{HeaderPattern, HeaderRule};

/// 导入变体配置
#[derive(Debug, Clone)]
pub struct ImportProfile {
    /// 变体名（日志用）
    pub name: &'static str,
    /// 文件发现通配模式
    pub patterns: Vec<String>,
    /// Schema 来源（固定 / 按数据推断）
    pub schema_source: SchemaSource,
    /// 必要字段：缺失且无法补齐时整个文件跳过
    pub required_fields: &'static [&'static str],
    /// 表头关键字规则表（有序）
    pub header_rules: &'static [HeaderRule],
    /// 文件名必须包含的标记（如回测净值文件的 "回测"）
    pub name_filter: Option<&'static str>,
    /// 默认主键（配置未给 pk 时生效；逗号分隔，可为空）
    pub default_pk: &'static str,
}

fn col(field: &str, sql_type: SqlType) -> ColumnSpec {
    ColumnSpec::new(field, sql_type)
}

// ==========================================
// 净值导入（回测净值曲线）
// ==========================================

const NETVALUE_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: "valuation_date",
        patterns: &[
            HeaderPattern::ContainsAll(&["valuation"]),
            HeaderPattern::ContainsAll(&["日期"]),
        ],
    },
    HeaderRule {
        field: "benchmark_net_value",
        patterns: &[
            HeaderPattern::ContainsAll(&["基准"]),
            HeaderPattern::ContainsAll(&["基準"]),
            HeaderPattern::ContainsAll(&["benchmark"]),
        ],
    },
    HeaderRule {
        field: "portfolio_net_value",
        patterns: &[
            HeaderPattern::ContainsAll(&["组合"]),
            HeaderPattern::ContainsAll(&["組合"]),
            HeaderPattern::ContainsAll(&["portfolio"]),
        ],
    },
    HeaderRule {
        field: "excess_net_value",
        patterns: &[
            HeaderPattern::ContainsAll(&["超额"]),
            HeaderPattern::ContainsAll(&["超額"]),
            HeaderPattern::ContainsAll(&["excess"]),
        ],
    },
];

/// 净值表固定 Schema
pub fn netvalue_schema() -> CanonicalSchema {
    CanonicalSchema::new(vec![
        col("valuation_date", SqlType::Date),
        col("portfolio_name", SqlType::Varchar(150)),
        col("benchmark_net_value", SqlType::Decimal(18, 8)),
        col("portfolio_net_value", SqlType::Decimal(18, 8)),
        col("excess_net_value", SqlType::Decimal(18, 8)),
        col("session_id", SqlType::Varchar(50)),
        col("id", SqlType::Varchar(50)),
        col("update_time", SqlType::DateTime),
    ])
}

pub fn netvalue_profile() -> ImportProfile {
    ImportProfile {
        name: "netvalue",
        patterns: vec!["*.csv".to_string()],
        schema_source: SchemaSource::Fixed(netvalue_schema()),
        required_fields: &[
            "valuation_date",
            "benchmark_net_value",
            "portfolio_net_value",
            "excess_net_value",
        ],
        header_rules: NETVALUE_RULES,
        name_filter: Some("回测"),
        default_pk: "valuation_date,session_id,id",
    }
}

// ==========================================
// 绩效摘要导入（单行指标汇总）
// ==========================================

const PERFORMANCE_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: "annual_return_pct",
        patterns: &[HeaderPattern::ContainsAll(&["annual", "return"])],
    },
    HeaderRule {
        field: "sharpe_ratio",
        patterns: &[HeaderPattern::ContainsAll(&["sharpe"])],
    },
    HeaderRule {
        field: "info_ratio",
        patterns: &[HeaderPattern::ContainsAll(&["info", "ratio"])],
    },
    HeaderRule {
        field: "max_drawdown_pct",
        patterns: &[
            HeaderPattern::ContainsAll(&["max", "dd"]),
            HeaderPattern::ContainsAll(&["max", "draw"]),
            HeaderPattern::ContainsAll(&["max_drawdown"]),
        ],
    },
    HeaderRule {
        field: "annual_vol_pct",
        patterns: &[
            HeaderPattern::ContainsAll(&["vol"]),
            HeaderPattern::ContainsAll(&["std", "annual"]),
        ],
    },
    HeaderRule {
        field: "portfolio_name",
        patterns: &[HeaderPattern::ContainsAll(&["portfolio"])],
    },
    HeaderRule {
        field: "session_id",
        patterns: &[HeaderPattern::ContainsAll(&["session"])],
    },
    HeaderRule {
        field: "id",
        patterns: &[HeaderPattern::EndsWith("id")],
    },
    HeaderRule {
        field: "update_time",
        patterns: &[HeaderPattern::ContainsAll(&["update", "time"])],
    },
];

/// 绩效摘要表固定 Schema
pub fn performance_schema() -> CanonicalSchema {
    CanonicalSchema::new(vec![
        col("annual_return_pct", SqlType::Decimal(18, 8)),
        col("sharpe_ratio", SqlType::Decimal(18, 8)),
        col("info_ratio", SqlType::Decimal(18, 8)),
        col("max_drawdown_pct", SqlType::Decimal(18, 8)),
        col("annual_vol_pct", SqlType::Decimal(18, 8)),
        col("portfolio_name", SqlType::Varchar(150)),
        col("session_id", SqlType::Varchar(50)),
        col("id", SqlType::Varchar(50)),
        col("update_time", SqlType::DateTime),
    ])
}

pub fn performance_profile() -> ImportProfile {
    ImportProfile {
        name: "performance",
        patterns: vec!["*_performance_summary.csv".to_string()],
        schema_source: SchemaSource::Fixed(performance_schema()),
        required_fields: &[],
        header_rules: PERFORMANCE_RULES,
        name_filter: None,
        default_pk: "session_id,id,portfolio_name",
    }
}

// ==========================================
// 持仓权重导入
// ==========================================

/// 权重表固定 Schema
pub fn weights_schema() -> CanonicalSchema {
    CanonicalSchema::new(vec![
        col("valuation_date", SqlType::Varchar(50)),
        col("code", SqlType::Varchar(50)),
        col("portfolio_name", SqlType::Varchar(50)),
        col("weight", SqlType::Float),
        col("id", SqlType::Varchar(50)),
        col("session_id", SqlType::Varchar(50)),
        col("update_time", SqlType::DateTime),
    ])
}

pub fn weights_profile() -> ImportProfile {
    ImportProfile {
        name: "weights",
        patterns: vec!["*.csv".to_string()],
        schema_source: SchemaSource::Fixed(weights_schema()),
        required_fields: &[
            "valuation_date",
            "code",
            "portfolio_name",
            "weight",
            "id",
            "session_id",
        ],
        header_rules: &[],
        name_filter: None,
        default_pk: "valuation_date,code,portfolio_name,session_id,id",
    }
}

// ==========================================
// 贡献度导入（自由格式，Schema 按数据推断）
// ==========================================

pub fn contributions_profile() -> ImportProfile {
    ImportProfile {
        name: "contributions",
        patterns: vec![
            "*_contribution.csv".to_string(),
            "*_contribution.csvz".to_string(),
            "*_contribution.*".to_string(),
        ],
        schema_source: SchemaSource::Inferred,
        required_fields: &[],
        header_rules: &[],
        name_filter: None,
        default_pk: "",
    }
}

pub fn contribution_weights_profile() -> ImportProfile {
    ImportProfile {
        name: "contribution_weights",
        patterns: vec![
            "*_contribution_weight.csv".to_string(),
            "*_contribution_weight.csvz".to_string(),
            "*_contribution_weight.*".to_string(),
        ],
        schema_source: SchemaSource::Inferred,
        required_fields: &[],
        header_rules: &[],
        name_filter: None,
        default_pk: "",
    }
}
