// ==========================================
// 组合分析数据导入系统 - 净值导入入口
// ==========================================
// 用法: import_netvalue <table> [session_id] [base_folder]
// 只接受文件名含"回测"标记的净值 CSV
// ==========================================

use clap::Parser;
use portfolio_import::config::ImportConfig;
use portfolio_import::importer::{netvalue_profile, ImportOrchestrator, ImportRequest};
use portfolio_import::logging;
use portfolio_import::repository::SqliteTableSinkRepository;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "import_netvalue", version, about = "导入回测净值 CSV 到数据库")]
struct Cli {
    /// 目标表名
    table: String,
    /// 会话 ID（可选；同时作为根目录下的子目录名）
    session_id: Option<String>,
    /// 回测结果根目录（可选，默认当前目录）
    base_folder: Option<PathBuf>,
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

    let sink = match SqliteTableSinkRepository::new(config.resolve_data_dir()) {
        Ok(sink) => sink,
        Err(e) => {
            error!(error = %e, "初始化落库连接失败");
            std::process::exit(1);
        }
    };

    let request = ImportRequest {
        database,
        table: cli.table,
        base_folder: cli.base_folder,
        sub_segments: cli.session_id.iter().cloned().collect(),
        session_id: cli.session_id,
        record_id: None,
    };

    let orchestrator = ImportOrchestrator::new(sink, config, netvalue_profile());
    if let Err(e) = orchestrator.run(&request).await {
        error!(error = %e, "导入失败");
        std::process::exit(1);
    }
}
