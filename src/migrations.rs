//! Embedded database migrations
//!
//! The SQL files under `migrations/` are compiled into the binary, so a
//! deployment only needs the executable and a writable database path.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DbPool;

pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

macro_rules! migration {
    ($name:literal) => {
        Migration {
            name: $name,
            sql: include_str!(concat!("../migrations/", $name)),
        }
    };
}

/// Every migration, in the order it must be applied.
pub const MIGRATIONS: &[Migration] = &[
    migration!("001_create_schedule.sql"),
    migration!("002_create_workout_history.sql"),
    migration!("003_create_pending_workouts.sql"),
    migration!("004_create_recommendations.sql"),
];

/// Apply migrations not yet recorded in `_migrations`. Each file runs in
/// its own transaction together with its bookkeeping row.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        if is_applied(&conn, migration.name)? {
            tracing::debug!("Skipping already applied migration: {}", migration.name);
            continue;
        }

        tracing::info!("Applying migration: {}", migration.name);
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute("INSERT INTO _migrations (name) VALUES (?1)", params![migration.name])?;
        tx.commit()?;
        applied += 1;
    }

    tracing::info!(applied, total = MIGRATIONS.len(), "Migrations completed");
    Ok(())
}

fn is_applied(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM _migrations WHERE name = ?1",
        params![name],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
}

/// Run every migration without bookkeeping, for fresh in-memory test databases.
pub fn run_migrations_for_tests(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    for migration in MIGRATIONS {
        conn.execute_batch(migration.sql)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[test]
    fn test_run_migrations_is_idempotent() {
        let pool = create_memory_pool().unwrap();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_migrations_are_numbered_in_order() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|m| m.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
