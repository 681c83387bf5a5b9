// ==========================================
// 组合分析数据导入系统 - 导入编排器
// ==========================================
// 职责: 整合导入流程，从目录到数据库
// 流程: 发现 → 规范化（并发+超时保护）→ 聚合 → Schema 解析
//       → 主键校验 → 建表（失败不阻断）→ 落库
// 约定: 逐文件失败只记录不升级；连接在任何退出路径上释放
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::frame::FileRecord;
use crate::domain::schema::PrimaryKeySpec;
use crate::importer::error::{ImportResult, SkipReason};
use crate::importer::importer_trait::PortfolioImporter;
use crate::importer::profile::ImportProfile;
use crate::importer::row_normalizer::RowNormalizer;
use crate::importer::{aggregator, file_discoverer, path_resolver, schema_resolver};
use crate::repository::TableSinkRepository;
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 单文件解析的默认时限（防御性保护，超时只跳过该文件）
pub const DEFAULT_PARSE_TIMEOUT_SECS: u64 = 60;

/// 一次导入运行的请求
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// 目标库名
    pub database: String,
    /// 目标表名
    pub table: String,
    /// 扫描根目录（缺省: 配置 base_folder，再缺省: 当前目录）
    pub base_folder: Option<PathBuf>,
    /// 根目录下的有序子目录段
    pub sub_segments: Vec<String>,
    /// 会话 ID（可缺省）
    pub session_id: Option<String>,
    /// 记录 ID 显式覆盖（缺省时按路径祖父目录派生）
    pub record_id: Option<String>,
}

/// 运行终态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunStatus {
    /// 正常完成，含落库行数
    Completed { rows_written: usize },
    /// 未发现任何文件，未触达落库层
    SkippedNoFiles,
    /// 所有文件规范化失败，未触达落库层
    SkippedNoData,
}

/// 逐文件状态（结构化结果，测试可直接断言跳过原因）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FileStatus {
    Normalized { rows: usize },
    Skipped { reason: SkipReason },
}

/// 运行结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub run_id: String,
    pub status: RunStatus,
    pub files: Vec<FileOutcome>,
    /// 配置主键中不存在于 Schema、被降级丢弃的字段
    pub dropped_pk_fields: Vec<String>,
}

// ==========================================
// ImportOrchestrator - 导入编排器
// ==========================================
pub struct ImportOrchestrator<S, C>
where
    S: TableSinkRepository,
    C: ImportConfigReader,
{
    // 落库仓储
    sink: S,

    // 配置读取器
    config: C,

    // 导入变体配置
    profile: ImportProfile,

    // 单文件解析时限
    parse_timeout: Duration,
}

impl<S, C> ImportOrchestrator<S, C>
where
    S: TableSinkRepository,
    C: ImportConfigReader,
{
    pub fn new(sink: S, config: C, profile: ImportProfile) -> Self {
        Self {
            sink,
            config,
            profile,
            parse_timeout: Duration::from_secs(DEFAULT_PARSE_TIMEOUT_SECS),
        }
    }

    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    /// 执行一次完整导入
    ///
    /// 无论成败，落库连接在返回前释放。
    #[instrument(skip(self, request), fields(profile = self.profile.name, table = %request.table))]
    pub async fn run(&self, request: &ImportRequest) -> ImportResult<ImportOutcome> {
        let result = self.run_inner(request).await;
        if let Err(e) = self.sink.close().await {
            warn!(error = %e, "关闭数据库连接失败");
        }
        result
    }

    async fn run_inner(&self, request: &ImportRequest) -> ImportResult<ImportOutcome> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, "开始导入");

        // === 阶段 1: 发现文件 ===
        let base = request
            .base_folder
            .clone()
            .or_else(|| self.config.base_folder().map(PathBuf::from));
        let directory = path_resolver::resolve(base.as_deref(), &request.sub_segments);
        debug!(directory = %directory.display(), "扫描目录");

        let files = file_discoverer::discover(&directory, &self.profile.patterns)?;
        if files.is_empty() {
            info!(directory = %directory.display(), "未找到可导入文件");
            return Ok(ImportOutcome {
                run_id,
                status: RunStatus::SkippedNoFiles,
                files: vec![],
                dropped_pk_fields: vec![],
            });
        }
        info!(count = files.len(), "文件发现完成");

        // === 阶段 2: 规范化（逐文件隔离，并发 + 超时保护）===
        let records: Vec<FileRecord> = files
            .into_iter()
            .map(|path| {
                let record_id = request
                    .record_id
                    .clone()
                    .or_else(|| path_resolver::derive_record_id(&path));
                FileRecord::new(path, request.session_id.clone(), record_id)
            })
            .collect();

        let tasks = records.iter().map(|record| {
            let normalizer = RowNormalizer::new(self.profile.clone());
            let record = record.clone();
            let timeout = self.parse_timeout;
            async move {
                let handle = tokio::task::spawn_blocking(move || normalizer.normalize(&record));
                match tokio::time::timeout(timeout, handle).await {
                    Err(_elapsed) => Err(SkipReason::Timeout(timeout.as_secs())),
                    Ok(Err(join_err)) => Err(SkipReason::ParseFailed(join_err.to_string())),
                    Ok(Ok(result)) => result,
                }
            }
        });
        // join_all 保持发现顺序
        let results = join_all(tasks).await;

        let mut outcomes = Vec::with_capacity(records.len());
        let mut frames = Vec::new();
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(frame) => {
                    debug!(file = %record.path.display(), rows = frame.row_count(), "文件规范化完成");
                    outcomes.push(FileOutcome {
                        path: record.path.clone(),
                        status: FileStatus::Normalized {
                            rows: frame.row_count(),
                        },
                    });
                    frames.push(frame);
                }
                Err(reason) => {
                    warn!(file = %record.path.display(), reason = %reason, "跳过文件");
                    outcomes.push(FileOutcome {
                        path: record.path.clone(),
                        status: FileStatus::Skipped { reason },
                    });
                }
            }
        }
        info!(
            success = frames.len(),
            skipped = outcomes.len() - frames.len(),
            "规范化完成"
        );

        // === 阶段 3: 聚合 ===
        let dataset = match aggregator::aggregate(frames) {
            Some(dataset) => dataset,
            None => {
                info!("没有读取到任何数据");
                return Ok(ImportOutcome {
                    run_id,
                    status: RunStatus::SkippedNoData,
                    files: outcomes,
                    dropped_pk_fields: vec![],
                });
            }
        };

        // === 阶段 4: Schema 解析 ===
        let schema = schema_resolver::resolve(&self.profile.schema_source, &dataset);
        debug!(columns = schema.len(), "Schema 解析完成");

        // === 阶段 5: 主键校验 ===
        let pk_raw = self
            .config
            .pk()
            .map(str::to_string)
            .unwrap_or_else(|| self.profile.default_pk.to_string());
        let (pk, dropped_pk_fields) = PrimaryKeySpec::parse(&pk_raw).validate_against(&schema);
        for field in &dropped_pk_fields {
            warn!(field = %field, "主键字段不在 Schema 中，已从主键降级剔除");
        }
        if pk.is_empty() {
            warn!("主键为空，本次落库退化为无主键插入");
        }

        // === 阶段 6: 建表（失败不阻断，既有兼容表仍可接收数据）===
        if let Err(e) = self
            .sink
            .create_table_if_absent(&request.table, &schema, pk.fields(), &request.database)
            .await
        {
            warn!(
                error = %e,
                database = %request.database,
                table = %request.table,
                "建表失败，仍尝试落库"
            );
        }

        // === 阶段 7: 落库 ===
        let rows_written = self
            .sink
            .upsert(&dataset, &request.table, &schema, pk.fields(), &request.database)
            .await?;

        info!(
            run_id = %run_id,
            rows = rows_written,
            database = %request.database,
            table = %request.table,
            "导入完成"
        );

        Ok(ImportOutcome {
            run_id,
            status: RunStatus::Completed { rows_written },
            files: outcomes,
            dropped_pk_fields,
        })
    }
}

#[async_trait::async_trait]
impl<S, C> PortfolioImporter for ImportOrchestrator<S, C>
where
    S: TableSinkRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    async fn run(&self, request: &ImportRequest) -> ImportResult<ImportOutcome> {
        ImportOrchestrator::run(self, request).await
    }
}
