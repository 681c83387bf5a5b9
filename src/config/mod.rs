// ==========================================
// 组合分析数据导入系统 - 配置层
// ==========================================
// 职责: 运行配置（目标库/主键/扫描根目录），每次运行只读一次
// 存储: JSON key-value 文件
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置类型
pub use config_manager::{ImportConfig, CONFIG_ENV_VAR};
pub use import_config_trait::ImportConfigReader;
