// ==========================================
// 组合分析数据导入系统 - 贡献度导入入口
// ==========================================
// 用法: import_contributions <contrib_table> [weight_table] [session_id] [base_folder]
// 贡献度文件无固定契约，Schema 按观测数据推断；
// 给出 weight_table 时追加一次贡献度权重导入
// ==========================================

use clap::Parser;
use portfolio_import::config::ImportConfig;
use portfolio_import::importer::{
    contribution_weights_profile, contributions_profile, ImportOrchestrator, ImportProfile,
    ImportRequest,
};
use portfolio_import::logging;
use portfolio_import::repository::SqliteTableSinkRepository;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(
    name = "import_contributions",
    version,
    about = "导入贡献度 CSV 到数据库（Schema 按数据推断）"
)]
struct Cli {
    /// 贡献度目标表名
    contrib_table: String,
    /// 贡献度权重目标表名（可选）
    weight_table: Option<String>,
    /// 会话 ID（可选）
    session_id: Option<String>,
    /// 扫描根目录（可选，默认当前目录）
    base_folder: Option<PathBuf>,
}

async fn run_import(
    config: &ImportConfig,
    database: &str,
    table: &str,
    profile: ImportProfile,
    session_id: Option<String>,
    base_folder: Option<PathBuf>,
) -> bool {
    let sink = match SqliteTableSinkRepository::new(config.resolve_data_dir()) {
        Ok(sink) => sink,
        Err(e) => {
            error!(error = %e, "初始化落库连接失败");
            return false;
        }
    };

    let request = ImportRequest {
        database: database.to_string(),
        table: table.to_string(),
        base_folder,
        sub_segments: vec![],
        session_id,
        record_id: None,
    };

    let orchestrator = ImportOrchestrator::new(sink, config.clone(), profile);
    match orchestrator.run(&request).await {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, table = %table, "导入失败");
            false
        }
    }
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let config = ImportConfig::load_default().unwrap_or_else(|e| {
        error!(error = %e, "读取默认配置文件失败");
        ImportConfig::default()
    });

    let Some(database) = config.target_database().map(str::to_string) else {
        error!("数据库名未在默认配置文件中找到");
        std::process::exit(2);
    };

    let mut ok = run_import(
        &config,
        &database,
        &cli.contrib_table,
        contributions_profile(),
        cli.session_id.clone(),
        cli.base_folder.clone(),
    )
    .await;

    if let Some(weight_table) = &cli.weight_table {
        ok &= run_import(
            &config,
            &database,
            weight_table,
            contribution_weights_profile(),
            cli.session_id.clone(),
            cli.base_folder.clone(),
        )
        .await;
    }

    if !ok {
        std::process::exit(1);
    }
}
