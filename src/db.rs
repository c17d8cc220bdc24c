use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

const FILE_POOL_SIZE: u32 = 5;
/// Session runners write history and snapshots while handlers read, so
/// writers wait for the lock instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where a `DATABASE_URL` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(String),
}

impl DatabaseLocation {
    /// Accepts `sqlite:` URLs with optional query parameters (e.g. `?mode=rwc`)
    /// as well as bare paths.
    pub fn parse(database_url: &str) -> Self {
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        let path = path.split('?').next().unwrap_or(path);
        let path = path.strip_prefix("//").unwrap_or(path);

        if path == ":memory:" {
            DatabaseLocation::Memory
        } else {
            DatabaseLocation::File(path.to_string())
        }
    }
}

pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    match DatabaseLocation::parse(database_url) {
        DatabaseLocation::Memory => create_memory_pool(),
        DatabaseLocation::File(path) => {
            let manager = SqliteConnectionManager::file(Path::new(&path)).with_init(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
                Ok(())
            });
            Pool::builder().max_size(FILE_POOL_SIZE).build(manager)
        }
    }
}

/// Single-connection pool over an in-memory database. Every pooled handle
/// shares the same connection, so migrations and queries see one database.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    Pool::builder()
        .max_size(1)
        .build(SqliteConnectionManager::memory())
}
