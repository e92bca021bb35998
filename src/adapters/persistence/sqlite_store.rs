//! SQLite-backed HR data store via libsql. Implements DataStorePort.
//!
//! One database file (`hr.db`) in the data directory. Query faults are returned as
//! the single-column `Error` table instead of being raised.

use crate::domain::{Column, DomainError, Table, Value};
use crate::ports::DataStorePort;
use libsql::Database;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Database file name inside the data directory.
pub const DB_FILE: &str = "hr.db";

pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Connect to (or create) the SQLite database in `base_dir`.
    /// Call this once at startup; the returned store is safe to share via Arc.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Query(e.to_string()))?;
        let db_path = base.join(DB_FILE);
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Query(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Query(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Query(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Query(e.to_string()))?
            .is_some()
        {}

        info!(path = %db_path.display(), "SQLite HR store connected");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn try_query(&self, sql: &str) -> Result<Table, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Query(e.to_string()))?;
        let mut rows = conn
            .query(sql, ())
            .await
            .map_err(|e| DomainError::Query(e.to_string()))?;

        let count = rows.column_count();
        let headers: Vec<String> = (0..count)
            .map(|i| {
                rows.column_name(i)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("column_{}", i))
            })
            .collect();

        let mut data = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Query(e.to_string()))?
        {
            let mut cells = Vec::with_capacity(headers.len());
            for i in 0..count {
                let v = row
                    .get_value(i)
                    .map_err(|e| DomainError::Query(e.to_string()))?;
                cells.push(from_sql_value(v));
            }
            data.push(cells);
        }
        Ok(Table::from_rows(headers, data))
    }
}

fn from_sql_value(v: libsql::Value) -> Value {
    match v {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::Integer(i),
        libsql::Value::Real(r) => Value::Real(r),
        libsql::Value::Text(s) => Value::Text(s),
        libsql::Value::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
    }
}

fn to_sql_value(v: &Value) -> libsql::Value {
    match v {
        Value::Null => libsql::Value::Null,
        Value::Integer(i) => libsql::Value::Integer(*i),
        Value::Real(r) => libsql::Value::Real(*r),
        Value::Text(s) => libsql::Value::Text(s.clone()),
    }
}

/// SQLite affinity for a column: INTEGER/REAL when numeric, else TEXT.
fn column_affinity(column: &Column) -> &'static str {
    if !column.is_numeric() {
        "TEXT"
    } else if column.values.iter().any(|v| matches!(v, Value::Real(_))) {
        "REAL"
    } else {
        "INTEGER"
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait::async_trait]
impl DataStorePort for SqliteStore {
    async fn run_query(&self, sql: &str) -> Table {
        debug!(sql, "running query");
        match self.try_query(sql).await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "query failed; returning error table");
                Table::error(e.to_string())
            }
        }
    }

    async fn import_table(&self, table_name: &str, table: &Table) -> Result<usize, DomainError> {
        if table.column_count() == 0 {
            return Err(DomainError::Import("table has no columns".to_string()));
        }
        let name = quote_ident(table_name);
        let defs: Vec<String> = table
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), column_affinity(c)))
            .collect();
        let placeholders: Vec<String> = (1..=table.column_count())
            .map(|i| format!("?{}", i))
            .collect();
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            name,
            placeholders.join(", ")
        );

        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Import(e.to_string()))?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Import(e.to_string()))?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", name), ())
            .await
            .map_err(|e| DomainError::Import(e.to_string()))?;
        tx.execute(&format!("CREATE TABLE {} ({})", name, defs.join(", ")), ())
            .await
            .map_err(|e| DomainError::Import(e.to_string()))?;
        for idx in 0..table.row_count() {
            let params: Vec<libsql::Value> = table.row(idx).into_iter().map(to_sql_value).collect();
            tx.execute(&insert, libsql::params_from_iter(params))
                .await
                .map_err(|e| DomainError::Import(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Import(e.to_string()))?;

        info!(
            table = table_name,
            rows = table.row_count(),
            columns = table.column_count(),
            "imported table"
        );
        Ok(table.row_count())
    }
}
