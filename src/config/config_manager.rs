// ==========================================
// 组合分析数据导入系统 - 配置管理
// ==========================================
// 职责: 配置加载与查询
// 存储: JSON key-value 文件（每次运行读一次，只读）
// 说明: 配置需要在任何数据库连接建立之前给出目标库名，
//       因此存放于文件而非库内表
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "PORTFOLIO_IMPORT_CONFIG";

/// 运行配置
///
/// 所有键都可缺省；缺了必需键（如库名）由入口在启动时报错退出。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportConfig {
    /// 目标库名
    pub database: Option<String>,
    /// 备选库名（存在时优先于 database）
    pub database_alt: Option<String>,
    /// 主键字段（逗号分隔，空项丢弃）
    pub pk: Option<String>,
    /// 默认扫描根目录
    pub base_folder: Option<String>,
    /// 库文件目录（SQLite 落库位置）
    pub data_dir: Option<String>,
}

impl ImportConfig {
    /// 从指定路径加载配置
    pub fn load(path: &Path) -> ImportResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 加载默认配置
    ///
    /// 路径优先级：PORTFOLIO_IMPORT_CONFIG 环境变量 → 用户配置目录。
    /// 文件不存在按空配置处理（缺必需键由入口报错）；
    /// 文件存在但格式错误是错误。
    pub fn load_default() -> ImportResult<Self> {
        let path = match std::env::var(CONFIG_ENV_VAR) {
            Ok(p) => PathBuf::from(p),
            Err(_) => Self::default_config_path(),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// 默认配置文件路径: <用户配置目录>/portfolio_import/import.json
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("portfolio_import")
            .join("import.json")
    }

    /// 解析目标库名（备选键优先）
    pub fn target_database(&self) -> Option<&str> {
        self.database_alt.as_deref().or(self.database.as_deref())
    }

    /// 库文件目录（缺省: <用户数据目录>/portfolio_import）
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("portfolio_import"),
        }
    }
}

impl ImportConfigReader for ImportConfig {
    fn pk(&self) -> Option<&str> {
        self.pk.as_deref()
    }

    fn base_folder(&self) -> Option<&str> {
        self.base_folder.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(
            br#"{"database": "analytics", "pk": "valuation_date,id", "base_folder": "/data"}"#,
        )
        .unwrap();

        let config = ImportConfig::load(&path).unwrap();
        assert_eq!(config.target_database(), Some("analytics"));
        assert_eq!(config.pk(), Some("valuation_date,id"));
        assert_eq!(config.base_folder(), Some("/data"));
    }

    #[test]
    fn test_database_alt_preferred() {
        let config = ImportConfig {
            database: Some("primary".to_string()),
            database_alt: Some("backtest".to_string()),
            ..Default::default()
        };
        assert_eq!(config.target_database(), Some("backtest"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ImportConfig::load(&path),
            Err(ImportError::ConfigReadError { .. })
        ));
    }

    #[test]
    fn test_empty_config_has_no_database() {
        let config = ImportConfig::default();
        assert_eq!(config.target_database(), None);
        assert_eq!(config.pk(), None);
    }
}
