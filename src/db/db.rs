//! SQLite connection and schema for the local backend.
//!
//! The schema mirrors the remote tables column for column so both backends
//! answer the same queries. Schema changes are applied as numbered steps
//! tracked in `PRAGMA user_version`.

use rusqlite::{Connection, Result, Transaction};
use std::path::Path;
use tracing::debug;

const SCHEMA_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    created_at TEXT
)";
const SCHEMA_CATEGORIES: &str = "CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    color TEXT DEFAULT '#007bff',
    creator_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
    created_at TEXT
)";
const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    task_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT '待领取',
    priority TEXT NOT NULL DEFAULT 'medium',
    due_date TEXT,
    category_id INTEGER REFERENCES categories(category_id) ON DELETE SET NULL,
    assignee_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
    creator_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
    created_at TEXT,
    updated_at TEXT
)";
const INDEX_TASKS: &str = "
    CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_creator ON tasks(creator_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
";

struct Step {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

fn create_tables(tx: &Transaction) -> Result<()> {
    tx.execute(SCHEMA_USERS, [])?;
    tx.execute(SCHEMA_CATEGORIES, [])?;
    tx.execute(SCHEMA_TASKS, [])?;
    Ok(())
}

fn task_indexes(tx: &Transaction) -> Result<()> {
    tx.execute_batch(INDEX_TASKS)
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "create_tables",
        up: create_tables,
    },
    Step {
        version: 2,
        name: "task_indexes",
        up: task_indexes,
    },
];

pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn open(path: &Path) -> Result<Db> {
        let conn = Connection::open(path)?;
        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Db> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(mut conn: Connection) -> Result<Db> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&mut conn)?;
        Ok(Db { conn })
    }
}

pub fn schema_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;
    for step in STEPS.iter().filter(|step| step.version > current) {
        let tx = conn.transaction()?;
        (step.up)(&tx)?;
        tx.pragma_update(None, "user_version", step.version)?;
        tx.commit()?;
        debug!(version = step.version, name = step.name, "applied schema step");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_latest_version() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(schema_version(&db.conn).unwrap(), STEPS.len() as u32);
        let tables: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'categories', 'tasks')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn reopening_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.db");
        Db::open(&path).unwrap();
        let db = Db::open(&path).unwrap();
        assert_eq!(schema_version(&db.conn).unwrap(), 2);
    }
}
