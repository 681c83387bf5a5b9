// ==========================================
// 绩效摘要导入集成测试
// ==========================================
// 测试目标: 关键字表头映射 + 默认主键幂等 + 无可识别列跳过
// ==========================================


use portfolio_import::importer::{
    performance_profile, FileStatus, ImportOrchestrator, ImportRequest, RunStatus, SkipReason,
};
use portfolio_import::logging;
use portfolio_import::repository::SqliteTableSinkRepository;
use rusqlite::Connection;
use std::path::Path;
use test_helpers::{write_csv, StubConfig};

const SUMMARY_CSV: &str =
    "Annual Return(%),Sharpe,Info Ratio,Max DD(%),Annual Vol(%)\n12.5,1.8,0.9,-8.3,15.2\n";

fn open_db(data_dir: &Path) -> Connection {
    let path = data_dir.join("analytics.db");
    portfolio_import::db::open_sqlite_connection(path.to_str().unwrap()).unwrap()
}

fn request(base: &Path, session: Option<&str>) -> ImportRequest {
    ImportRequest {
        database: "analytics".to_string(),
        table: "performance".to_string(),
        base_folder: Some(base.to_path_buf()),
        sub_segments: vec![],
        session_id: session.map(str::to_string),
        record_id: None,
    }
}

#[tokio::test]
async fn test_performance_end_to_end() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(
        &scan.path().join("b1/r1/alpha_performance_summary.csv"),
        SUMMARY_CSV,
    );

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), performance_profile());
    let outcome = orchestrator
        .run(&request(scan.path(), Some("s7")))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 1 });

    let conn = open_db(data.path());
    let (ret, pname, session, id): (f64, String, String, String) = conn
        .query_row(
            "SELECT annual_return_pct, portfolio_name, session_id, id FROM performance",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert!((ret - 12.5).abs() < 1e-9);
    assert_eq!(pname, "alpha");
    assert_eq!(session, "s7");
    assert_eq!(id, "b1");

    // update_time 记录落库时间，非空
    let update_time: Option<String> = conn
        .query_row("SELECT update_time FROM performance", [], |row| row.get(0))
        .unwrap();
    assert!(update_time.is_some());
}

#[tokio::test]
async fn test_performance_rerun_is_idempotent() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(
        &scan.path().join("b1/r1/alpha_performance_summary.csv"),
        SUMMARY_CSV,
    );

    for _ in 0..2 {
        let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
        let orchestrator =
            ImportOrchestrator::new(sink, StubConfig::empty(), performance_profile());
        orchestrator
            .run(&request(scan.path(), Some("s7")))
            .await
            .unwrap();
    }

    // 默认主键 session_id,id,portfolio_name → 重复运行只更新不追加
    let conn = open_db(data.path());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM performance", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_summary_without_recognizable_columns_skipped() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    write_csv(
        &scan.path().join("b1/r1/x_performance_summary.csv"),
        "备注,其他\na,b\n",
    );

    let sink = test_helpers::RecordingSink::default();
    let handle = sink.clone();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), performance_profile());
    let outcome = orchestrator
        .run(&request(scan.path(), None))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::SkippedNoData);
    assert_eq!(
        outcome.files[0].status,
        FileStatus::Skipped {
            reason: SkipReason::NoRecognizedColumns
        }
    );
    assert_eq!(handle.upsert_calls(), 0);
}
