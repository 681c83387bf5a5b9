// ==========================================
// 组合分析数据导入系统 - 表落库 Repository 实现
// ==========================================
// 职责: 实现落库接口（使用 rusqlite）
// 设计: 逻辑库名 → ATTACH 到 <data_dir>/<库名>.db，
//       表名按 "<库名>"."<表名>" 限定
// ==========================================

use crate::db::configure_sqlite_connection;
use crate::domain::frame::AggregatedDataset;
use crate::domain::schema::CanonicalSchema;
use crate::domain::types::Value;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::table_sink_repo::TableSinkRepository;
use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, ToSql};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// 单元格值 → SQLite 绑定值
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Number(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Date(d) => {
                ToSqlOutput::Owned(SqlValue::Text(d.format("%Y-%m-%d").to_string()))
            }
            Value::DateTime(dt) => {
                ToSqlOutput::Owned(SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            }
        })
    }
}

/// SQL 标识符转义
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// ==========================================
// SqliteTableSinkRepository
// ==========================================
pub struct SqliteTableSinkRepository {
    conn: Arc<Mutex<Option<Connection>>>,
    data_dir: PathBuf,
}

impl SqliteTableSinkRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - data_dir: 库文件目录（每个逻辑库名对应一个 <库名>.db 文件）
    pub fn new(data_dir: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            data_dir,
        })
    }

    /// 确保逻辑库已附加（幂等）
    fn ensure_database(&self, conn: &Connection, database: &str) -> RepositoryResult<()> {
        let mut stmt = conn.prepare("PRAGMA database_list")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            if name == database {
                return Ok(());
            }
        }

        let db_path = self.data_dir.join(format!("{}.db", database));
        let db_path_str = db_path.display().to_string();
        conn.execute(
            &format!("ATTACH DATABASE ?1 AS {}", quote_ident(database)),
            rusqlite::params![db_path_str],
        )?;
        Ok(())
    }

    /// 按 Schema 字段顺序取一行的绑定值（缺失字段绑定 Null）
    fn row_params<'a>(row: &'a [Value], field_indices: &[Option<usize>]) -> Vec<&'a Value> {
        const NULL: &Value = &Value::Null;
        field_indices
            .iter()
            .map(|idx| match idx {
                Some(i) => row.get(*i).unwrap_or(NULL),
                None => NULL,
            })
            .collect()
    }
}

#[async_trait]
impl TableSinkRepository for SqliteTableSinkRepository {
    async fn create_table_if_absent(
        &self,
        table: &str,
        schema: &CanonicalSchema,
        pk_fields: &[String],
        database: &str,
    ) -> RepositoryResult<()> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let conn = guard.as_ref().ok_or(RepositoryError::ConnectionClosed)?;
        self.ensure_database(conn, database)?;

        let columns_sql: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.field), c.sql_type))
            .collect();

        let pk_sql = if pk_fields.is_empty() {
            String::new()
        } else {
            let quoted: Vec<String> = pk_fields.iter().map(|f| quote_ident(f)).collect();
            format!(", PRIMARY KEY ({})", quoted.join(", "))
        };

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} ({}{})",
            quote_ident(database),
            quote_ident(table),
            columns_sql.join(", "),
            pk_sql
        );
        conn.execute(&sql, [])?;
        Ok(())
    }

    async fn upsert(
        &self,
        dataset: &AggregatedDataset,
        table: &str,
        schema: &CanonicalSchema,
        pk_fields: &[String],
        database: &str,
    ) -> RepositoryResult<usize> {
        // 零行调用是安全的 no-op
        if dataset.rows.is_empty() {
            return Ok(0);
        }

        let mut guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let conn = guard.as_mut().ok_or(RepositoryError::ConnectionClosed)?;
        self.ensure_database(conn, database)?;

        // 列与占位符按 Schema 顺序
        let fields: Vec<&str> = schema.fields();
        let quoted: Vec<String> = fields.iter().map(|f| quote_ident(f)).collect();
        let placeholders: Vec<String> =
            (1..=fields.len()).map(|i| format!("?{}", i)).collect();

        // 主键冲突时更新非主键列；全列皆主键则忽略冲突
        let conflict_sql = if pk_fields.is_empty() {
            String::new()
        } else {
            let pk_quoted: Vec<String> = pk_fields.iter().map(|f| quote_ident(f)).collect();
            let updates: Vec<String> = fields
                .iter()
                .filter(|f| !pk_fields.iter().any(|pk| pk == *f))
                .map(|f| format!("{} = excluded.{}", quote_ident(f), quote_ident(f)))
                .collect();
            if updates.is_empty() {
                format!(" ON CONFLICT ({}) DO NOTHING", pk_quoted.join(", "))
            } else {
                format!(
                    " ON CONFLICT ({}) DO UPDATE SET {}",
                    pk_quoted.join(", "),
                    updates.join(", ")
                )
            }
        };

        let sql = format!(
            "INSERT INTO {}.{} ({}) VALUES ({}){}",
            quote_ident(database),
            quote_ident(table),
            quoted.join(", "),
            placeholders.join(", "),
            conflict_sql
        );

        // 数据集列下标按 Schema 字段对齐（缺失字段绑定 Null）
        let field_indices: Vec<Option<usize>> = fields
            .iter()
            .map(|f| dataset.column_index(f))
            .collect();

        let tx = conn.transaction()?;
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in &dataset.rows {
                let params = Self::row_params(row, &field_indices);
                stmt.execute(rusqlite::params_from_iter(params))?;
                count += 1;
            }
        }
        tx.commit()?;

        Ok(count)
    }

    async fn close(&self) -> RepositoryResult<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        // 已关闭时直接返回（可安全重复调用）
        if let Some(conn) = guard.take() {
            conn.close()
                .map_err(|(_, e)| RepositoryError::SqlError(e))?;
        }
        Ok(())
    }
}
