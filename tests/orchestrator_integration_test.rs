// ==========================================
// 导入编排器集成测试
// ==========================================
// 测试目标: 验证完整导入流程（发现 → 规范化 → 聚合 → 落库）
// ==========================================


use portfolio_import::importer::{
    contributions_profile, netvalue_profile, weights_profile, FileStatus, ImportError,
    ImportOrchestrator, ImportRequest, PortfolioImporter, RunStatus, SkipReason,
};
use portfolio_import::logging;
use portfolio_import::repository::SqliteTableSinkRepository;
use rusqlite::Connection;
use std::path::Path;
use test_helpers::{write_csv, RecordingSink, StubConfig};

const NETVALUE_CSV: &str =
    "日期,组合净值,基准净值,超额净值\n2025-01-20,1.05,1.01,0.04\n2025-01-21,1.06,1.02,0.04\n";

fn request(database: &str, table: &str, base: &Path, session: Option<&str>) -> ImportRequest {
    ImportRequest {
        database: database.to_string(),
        table: table.to_string(),
        base_folder: Some(base.to_path_buf()),
        sub_segments: vec![],
        session_id: session.map(str::to_string),
        record_id: None,
    }
}

fn open_db(data_dir: &Path, database: &str) -> Connection {
    let path = data_dir.join(format!("{}.db", database));
    portfolio_import::db::open_sqlite_connection(path.to_str().unwrap()).unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[tokio::test]
async fn test_netvalue_end_to_end() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(&scan.path().join("batchA/run1/fundB_回测.csv"), NETVALUE_CSV);

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());
    let outcome = orchestrator
        .run(&request("analytics", "netvalue", scan.path(), Some("s1")))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 2 });
    assert_eq!(outcome.files.len(), 1);
    assert!(matches!(
        outcome.files[0].status,
        FileStatus::Normalized { rows: 2 }
    ));

    let conn = open_db(data.path(), "analytics");
    assert_eq!(count_rows(&conn, "netvalue"), 2);

    // 组合名来自文件名、记录 ID 来自祖父目录、会话 ID 来自参数
    let (pname, id, session): (String, String, String) = conn
        .query_row(
            "SELECT portfolio_name, id, session_id FROM netvalue WHERE valuation_date = '2025-01-20'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(pname, "fundB");
    assert_eq!(id, "batchA");
    assert_eq!(session, "s1");
}

#[tokio::test]
async fn test_rerun_produces_same_row_count() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(&scan.path().join("batchA/run1/fundB_回测.csv"), NETVALUE_CSV);

    for _ in 0..2 {
        let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
        let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());
        let outcome = orchestrator
            .run(&request("analytics", "netvalue", scan.path(), Some("s1")))
            .await
            .unwrap();
        assert_eq!(outcome.status, RunStatus::Completed { rows_written: 2 });
    }

    // 幂等 upsert: 重复运行不产生重复行
    let conn = open_db(data.path(), "analytics");
    assert_eq!(count_rows(&conn, "netvalue"), 2);
}

#[tokio::test]
async fn test_invalid_file_skipped_while_run_completes() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(&scan.path().join("b1/r1/a_回测.csv"), NETVALUE_CSV);
    // 缺少超额净值列 → 该文件跳过
    write_csv(
        &scan.path().join("b1/r1/b_回测.csv"),
        "日期,组合净值,基准净值\n2025-01-20,1.05,1.01\n",
    );

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());
    let outcome = orchestrator
        .run(&request("analytics", "netvalue", scan.path(), Some("s1")))
        .await
        .unwrap();

    // 坏文件不拖垮运行
    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 2 });
    assert_eq!(outcome.files.len(), 2);
    assert!(matches!(
        outcome.files[0].status,
        FileStatus::Normalized { rows: 2 }
    ));
    assert_eq!(
        outcome.files[1].status,
        FileStatus::Skipped {
            reason: SkipReason::MissingRequiredField("excess_net_value".to_string())
        }
    );

    let conn = open_db(data.path(), "analytics");
    assert_eq!(count_rows(&conn, "netvalue"), 2);
}

#[tokio::test]
async fn test_empty_discovery_skips_without_sink_calls() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let sink = RecordingSink::default();
    let handle = sink.clone();

    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());
    let outcome = orchestrator
        .run(&request("analytics", "netvalue", scan.path(), None))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::SkippedNoFiles);
    assert!(outcome.files.is_empty());
    // 短路路径零建表/零 upsert；连接仍然释放
    assert_eq!(handle.create_calls(), 0);
    assert_eq!(handle.upsert_calls(), 0);
    assert_eq!(handle.close_calls(), 1);
}

#[tokio::test]
async fn test_run_via_importer_trait() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let sink = RecordingSink::default();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());

    // 通过 trait 对象调用同样可用
    let importer: &dyn PortfolioImporter = &orchestrator;
    let outcome = importer
        .run(&request("analytics", "netvalue", scan.path(), None))
        .await
        .unwrap();
    assert_eq!(outcome.status, RunStatus::SkippedNoFiles);
}

#[tokio::test]
async fn test_all_files_skipped_is_skipped_no_data() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    // 文件名缺少"回测"标记 → 全部跳过
    write_csv(&scan.path().join("b1/r1/fundB.csv"), NETVALUE_CSV);

    let sink = RecordingSink::default();
    let handle = sink.clone();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());
    let outcome = orchestrator
        .run(&request("analytics", "netvalue", scan.path(), None))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::SkippedNoData);
    assert_eq!(
        outcome.files[0].status,
        FileStatus::Skipped {
            reason: SkipReason::NameFilterMismatch("回测".to_string())
        }
    );
    assert_eq!(handle.upsert_calls(), 0);
}

#[tokio::test]
async fn test_missing_directory_is_fatal_and_sink_released() {
    logging::init_test();

    let sink = RecordingSink::default();
    let handle = sink.clone();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), netvalue_profile());

    let req = request("analytics", "netvalue", Path::new("/no/such/dir"), None);
    let err = orchestrator.run(&req).await.unwrap_err();

    assert!(matches!(err, ImportError::DirectoryNotFound(_)));
    // 任何退出路径都释放连接
    assert_eq!(handle.close_calls(), 1);
}

#[tokio::test]
async fn test_dropped_pk_fields_are_reported() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(&scan.path().join("b1/r1/fundB_回测.csv"), NETVALUE_CSV);

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(
        sink,
        StubConfig::with_pk("valuation_date,nonexistent_key,id"),
        netvalue_profile(),
    );
    let outcome = orchestrator
        .run(&request("analytics", "netvalue", scan.path(), Some("s1")))
        .await
        .unwrap();

    // 未知主键字段被降级剔除并上报，运行照常完成
    assert_eq!(outcome.dropped_pk_fields, vec!["nonexistent_key".to_string()]);
    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 2 });
}

#[tokio::test]
async fn test_weights_with_sub_segments() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(
        &scan.path().join("s1/r2/holdings.csv"),
        "valuation_date,code,portfolio_name,weight\n2025-01-20,600000,fundA_3,0.5\n",
    );

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(sink, StubConfig::empty(), weights_profile());
    let req = ImportRequest {
        database: "analytics".to_string(),
        table: "weights".to_string(),
        base_folder: Some(scan.path().to_path_buf()),
        sub_segments: vec!["s1".to_string(), "r2".to_string()],
        session_id: Some("s1".to_string()),
        record_id: Some("r2".to_string()),
    };
    let outcome = orchestrator.run(&req).await.unwrap();
    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 1 });

    let conn = open_db(data.path(), "analytics");
    let (pname, id, session): (String, String, String) = conn
        .query_row(
            "SELECT portfolio_name, id, session_id FROM weights",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    // 组合名列内编号被去掉；id/session 由参数补入
    assert_eq!(pname, "fundA");
    assert_eq!(id, "r2");
    assert_eq!(session, "s1");
}

#[tokio::test]
async fn test_contributions_inferred_schema() {
    logging::init_test();

    let scan = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_csv(
        &scan.path().join("batch1/run1/fundX_contribution.csv"),
        "valuation_date,code,contribution\n2025-01-20,600000,0.012\n2025-01-21,600036,0.008\n",
    );
    // 不可解析的压缩导出被跳过，不影响运行
    write_csv(
        &scan.path().join("batch1/run1/fundY_contribution.csvz"),
        "opaque-bytes",
    );

    let sink = SqliteTableSinkRepository::new(data.path()).unwrap();
    let orchestrator = ImportOrchestrator::new(
        sink,
        StubConfig::with_pk("valuation_date,code,portfolio_name"),
        contributions_profile(),
    )
    .with_parse_timeout(std::time::Duration::from_secs(30));
    let outcome = orchestrator
        .run(&request("analytics", "contrib", scan.path(), Some("s1")))
        .await
        .unwrap();

    assert_eq!(outcome.status, RunStatus::Completed { rows_written: 2 });
    assert_eq!(
        outcome.files[1].status,
        FileStatus::Skipped {
            reason: SkipReason::UnsupportedFormat("csvz".to_string())
        }
    );

    // 推断 Schema: 整数列 BIGINT / 小数列 DECIMAL / 日期列 DATETIME
    let conn = open_db(data.path(), "analytics");
    let ddl: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'contrib'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(ddl.contains("\"valuation_date\" DATETIME"), "ddl: {}", ddl);
    assert!(ddl.contains("\"code\" BIGINT"), "ddl: {}", ddl);
    assert!(ddl.contains("\"contribution\" DECIMAL(18,8)"), "ddl: {}", ddl);
    assert_eq!(count_rows(&conn, "contrib"), 2);
}
