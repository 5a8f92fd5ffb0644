//! SQLite-backed incident store.
//!
//! One connection guarded by a mutex; every statement runs on the blocking
//! pool so async callers never stall the runtime. `created_at` is persisted
//! as integer microseconds since the Unix epoch.
//!
//! Search is evaluated by a registered scalar function that reuses
//! [`contains_ignore_case`], so case folding matches the in-memory store
//! instead of SQLite's ASCII-only `LIKE`.

use crate::domain::{
    contains_ignore_case, FilterSpec, Incident, IncidentUpdate, Severity, SortDirection,
    SortField, SortSpec, Status, StoreError,
};
use crate::ports::outbound::IncidentStore;
use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS incidents (
    id            TEXT PRIMARY KEY NOT NULL,
    title         TEXT NOT NULL,
    service       TEXT NOT NULL,
    severity      TEXT NOT NULL CHECK (severity IN ('SEV1', 'SEV2', 'SEV3', 'SEV4')),
    status        TEXT NOT NULL CHECK (status IN ('OPEN', 'MITIGATED', 'RESOLVED')),
    summary       TEXT,
    owner_id      TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_incidents_created_at ON incidents (created_at_us);
CREATE INDEX IF NOT EXISTS idx_incidents_service ON incidents (service);
CREATE INDEX IF NOT EXISTS idx_incidents_severity_status ON incidents (severity, status);
";

const COLUMNS: &str = "id, title, service, severity, status, summary, owner_id, created_at_us";

/// Name of the registered case-insensitive containment function.
const CONTAINS_FN: &str = "incident_contains";

/// SQLite incident store.
#[derive(Clone)]
pub struct SqliteIncidentStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteIncidentStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(backend)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(backend)?;
        info!(path = %path.display(), "Opened SQLite incident store");
        Self::init(conn)
    }

    /// Private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        conn.create_scalar_function(
            CONTAINS_FN,
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let haystack: Option<String> = ctx.get(0)?;
                let needle: String = ctx.get(1)?;
                Ok(haystack.is_some_and(|text| contains_ignore_case(&text, &needle)))
            },
        )
        .map_err(backend)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            let conn = guard.as_mut().ok_or(StoreError::Closed)?;
            f(conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl IncidentStore for SqliteIncidentStore {
    async fn create(&self, incident: Incident) -> Result<Incident, StoreError> {
        self.with_conn(move |conn| {
            insert(conn, &incident)?;
            Ok(incident)
        })
        .await
    }

    async fn create_many(&self, incidents: Vec<Incident>) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(backend)?;
            for incident in &incidents {
                insert(&tx, incident)?;
            }
            tx.commit().map_err(backend)?;
            Ok(incidents.len() as u64)
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Incident>, StoreError> {
        self.with_conn(move |conn| select_by_id(conn, id)).await
    }

    async fn find_many(
        &self,
        filter: &FilterSpec,
        sort: SortSpec,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Incident>, StoreError> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let (where_sql, mut args) = where_clause(&filter);
            let sql = format!(
                "SELECT {COLUMNS} FROM incidents{where_sql} ORDER BY {} LIMIT ? OFFSET ?",
                order_by(sort)
            );
            args.push(SqlValue::Integer(i64::from(limit)));
            args.push(SqlValue::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
            debug!(%sql, "find_many");

            let mut stmt = conn.prepare_cached(&sql).map_err(backend)?;
            let rows = stmt
                .query_map(params_from_iter(args), read_row)
                .map_err(backend)?;
            let mut incidents = Vec::new();
            for row in rows {
                incidents.push(row.map_err(backend)??);
            }
            Ok(incidents)
        })
        .await
    }

    async fn count(&self, filter: &FilterSpec) -> Result<u64, StoreError> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let (where_sql, args) = where_clause(&filter);
            let sql = format!("SELECT COUNT(*) FROM incidents{where_sql}");
            let total: i64 = conn
                .query_row(&sql, params_from_iter(args), |row| row.get(0))
                .map_err(backend)?;
            Ok(total.max(0) as u64)
        })
        .await
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        update: &IncidentUpdate,
    ) -> Result<Option<Incident>, StoreError> {
        let update = update.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(backend)?;

            let mut assignments = Vec::new();
            let mut args = Vec::new();
            if let Some(severity) = update.severity {
                assignments.push("severity = ?");
                args.push(SqlValue::Text(severity.as_str().to_string()));
            }
            if let Some(status) = update.status {
                assignments.push("status = ?");
                args.push(SqlValue::Text(status.as_str().to_string()));
            }
            if let Some(summary) = &update.summary {
                assignments.push("summary = ?");
                args.push(summary.clone().map_or(SqlValue::Null, SqlValue::Text));
            }

            if !assignments.is_empty() {
                let sql = format!(
                    "UPDATE incidents SET {} WHERE id = ?",
                    assignments.join(", ")
                );
                args.push(SqlValue::Text(id.to_string()));
                let changed = tx
                    .execute(&sql, params_from_iter(args))
                    .map_err(backend)?;
                if changed == 0 {
                    return Ok(None);
                }
            }

            let updated = select_by_id(&tx, id)?;
            tx.commit().map_err(backend)?;
            Ok(updated)
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.with_conn(|conn| {
            let removed = conn
                .execute("DELETE FROM incidents", [])
                .map_err(backend)?;
            Ok(removed as u64)
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            if let Some(conn) = conn.lock().take() {
                conn.close().map_err(|(_, e)| backend(e))?;
                info!("Closed SQLite incident store");
            }
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn insert(conn: &Connection, incident: &Incident) -> Result<(), StoreError> {
    conn.prepare_cached(&format!(
        "INSERT INTO incidents ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
    ))
    .and_then(|mut stmt| {
        stmt.execute(params![
            incident.id.to_string(),
            incident.title,
            incident.service,
            incident.severity.as_str(),
            incident.status.as_str(),
            incident.summary,
            incident.owner_id,
            incident.created_at.timestamp_micros(),
        ])
    })
    .map_err(backend)?;
    Ok(())
}

fn select_by_id(conn: &Connection, id: Uuid) -> Result<Option<Incident>, StoreError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM incidents WHERE id = ?1"),
            [id.to_string()],
            read_row,
        )
        .optional()
        .map_err(backend)?;
    row.transpose()
}

/// Map one row. The outer `Result` is rusqlite's, the inner one flags
/// values that do not decode into the domain types.
fn read_row(row: &Row<'_>) -> rusqlite::Result<Result<Incident, StoreError>> {
    let id: String = row.get(0)?;
    let severity: String = row.get(3)?;
    let status: String = row.get(4)?;
    let created_at_us: i64 = row.get(7)?;

    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(e) => return Ok(Err(StoreError::Corrupt(format!("id {id}: {e}")))),
    };
    let severity: Severity = match severity.parse() {
        Ok(severity) => severity,
        Err(e) => return Ok(Err(StoreError::Corrupt(format!("incident {id}: {e}")))),
    };
    let status: Status = match status.parse() {
        Ok(status) => status,
        Err(e) => return Ok(Err(StoreError::Corrupt(format!("incident {id}: {e}")))),
    };
    let Some(created_at) = DateTime::from_timestamp_micros(created_at_us) else {
        return Ok(Err(StoreError::Corrupt(format!(
            "incident {id}: timestamp {created_at_us}"
        ))));
    };

    Ok(Ok(Incident {
        id,
        title: row.get(1)?,
        service: row.get(2)?,
        severity,
        status,
        summary: row.get(5)?,
        owner_id: row.get(6)?,
        created_at,
    }))
}

/// ` WHERE ...` (with leading space) plus positional arguments, or an
/// empty clause when the filter has no active predicate.
fn where_clause(filter: &FilterSpec) -> (String, Vec<SqlValue>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut args = Vec::new();

    if let Some(severity) = filter.severity {
        conditions.push("severity = ?".into());
        args.push(SqlValue::Text(severity.as_str().to_string()));
    }
    if let Some(status) = filter.status {
        conditions.push("status = ?".into());
        args.push(SqlValue::Text(status.as_str().to_string()));
    }
    if let Some(service) = &filter.service {
        conditions.push("service = ?".into());
        args.push(SqlValue::Text(service.clone()));
    }
    if let Some(search) = &filter.search {
        conditions.push(format!(
            "({CONTAINS_FN}(title, ?) OR {CONTAINS_FN}(summary, ?))"
        ));
        args.push(SqlValue::Text(search.clone()));
        args.push(SqlValue::Text(search.clone()));
    }

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (sql, args)
}

/// Sort columns come from a fixed table, never from caller text.
fn order_by(sort: SortSpec) -> String {
    let key = match sort.field {
        SortField::CreatedAt => "created_at_us",
        SortField::Severity => "severity",
        SortField::Status => {
            "CASE status WHEN 'OPEN' THEN 0 WHEN 'MITIGATED' THEN 1 ELSE 2 END"
        }
        SortField::Service => "service",
    };
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!("{key} {direction}")
}
