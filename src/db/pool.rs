use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

use crate::error::HubError;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Strip an optional `sqlite://` scheme; `file:` URIs are passed through.
fn database_path(url: &str) -> &str {
    url.strip_prefix("sqlite://").unwrap_or(url)
}

/// Create a read-only SQLite connection pool for the given database URL.
///
/// Plain paths must already exist. Building the pool opens its initial
/// connections, so an unreadable database fails here rather than on first
/// query.
pub fn open_ro_pool(url: &str, max_size: u32) -> Result<DbPool, HubError> {
    let path = database_path(url);
    if !path.starts_with("file:") && !Path::new(path).exists() {
        return Err(HubError::Connect(format!("database not found: {path}")));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let manager = SqliteConnectionManager::file(path).with_flags(flags);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| HubError::Connect(e.to_string()))
}

/// Process-wide database handle.
///
/// The pool is opened lazily on first use. Concurrent first callers wait on
/// the same initialization; a failed attempt leaves the handle empty so the
/// next caller retries.
pub struct Database {
    url: String,
    name: String,
    max_size: u32,
    pool: OnceCell<DbPool>,
    connects: AtomicUsize,
}

impl Database {
    pub fn new(url: impl Into<String>, name: impl Into<String>, max_size: u32) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            max_size,
            pool: OnceCell::new(),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the database, as reported by health checks.
    pub fn location(&self) -> &str {
        database_path(&self.url)
    }

    /// The pool, connecting first if needed.
    pub async fn pool(&self) -> Result<&DbPool, HubError> {
        self.pool
            .get_or_try_init(|| async {
                let url = self.url.clone();
                let max_size = self.max_size;
                self.connects.fetch_add(1, Ordering::SeqCst);
                tracing::info!("Connecting to database {} at {}", self.name, self.location());

                let pool = tokio::task::spawn_blocking(move || open_ro_pool(&url, max_size)).await??;
                tracing::info!("Database {} connected", self.name);
                Ok::<DbPool, HubError>(pool)
            })
            .await
    }

    /// The pool if a connection was already established; never connects.
    pub fn connected(&self) -> Option<&DbPool> {
        self.pool.get()
    }

    /// Number of connection attempts made so far.
    pub fn connect_attempts(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn tmp_db_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("chart_hub_{tag}_{nanos}.db"))
    }

    /// Create `collection` with the untyped `Date`/`Close` columns.
    pub(crate) fn create_collection(conn: &Connection, collection: &str) {
        let ident = crate::db::records::quote_ident(collection);
        conn.execute_batch(&format!(r#"CREATE TABLE {ident} ("Date", "Close");"#))
            .unwrap();
    }

    pub(crate) fn insert_record(
        conn: &Connection,
        collection: &str,
        date: rusqlite::types::Value,
        close: rusqlite::types::Value,
    ) {
        let ident = crate::db::records::quote_ident(collection);
        conn.execute(
            &format!(r#"INSERT INTO {ident} ("Date", "Close") VALUES (?1, ?2)"#),
            (date, close),
        )
        .unwrap();
    }
}
