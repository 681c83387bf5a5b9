// ==========================================
// 组合分析数据导入系统 - 持仓权重导入入口
// ==========================================
// 用法: import_weights <table> [sub1] [sub2]
// sub1/sub2 既是扫描根目录下的子目录段，又分别作为
// 会话 ID / 记录 ID 补入缺失列
// ==========================================

use clap::Parser;
use portfolio_import::config::ImportConfig;
use portfolio_import::importer::{weights_profile, ImportOrchestrator, ImportRequest};
use portfolio_import::logging;
use portfolio_import::repository::SqliteTableSinkRepository;
use tracing::error;

#[derive(Parser)]
#[command(name = "import_weights", version, about = "导入持仓权重 CSV 到数据库")]
struct Cli {
    /// 目标表名
    table: String,
    /// 根目录下第一级子目录（可选；同时作为会话 ID）
    sub1: Option<String>,
    /// 根目录下第二级子目录（可选；同时作为记录 ID）
    sub2: Option<String>,
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

    let sub_segments: Vec<String> = [cli.sub1.clone(), cli.sub2.clone()]
        .into_iter()
        .flatten()
        .collect();

    let request = ImportRequest {
        database,
        table: cli.table,
        // 扫描根目录取配置 base_folder（缺省当前目录）
        base_folder: None,
        sub_segments,
        session_id: cli.sub1,
        record_id: cli.sub2,
    };

    let orchestrator = ImportOrchestrator::new(sink, config, weights_profile());
    if let Err(e) = orchestrator.run(&request).await {
        error!(error = %e, "导入失败");
        std::process::exit(1);
    }
}
