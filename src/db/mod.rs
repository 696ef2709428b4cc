use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;
use thiserror::Error;

use crate::models::{
    DEFAULT_TRUST_SCORE, Item, NewItem, NewTask, NewWantedRequest, TRUST_REWARD, Task, TaskStatus,
    Transition, Urgency, User, WantedRequest, WantedStatus,
};

/// Schema version written by the newest migration in `run_migrations`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to open database: {0}")]
    Open(#[source] rusqlite::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),
}

impl DbError {
    fn from_write(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => DbError::Constraint(e.to_string()),
            _ => DbError::Query(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Which tasks `list_tasks` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Open,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardCounts {
    pub open_tasks: i64,
    pub available_items: i64,
    pub open_wanted: i64,
}

const TASK_COLUMNS: &str =
    "id, title, description, location, reward, posted_by, accepted_by, status, created_at, accepted_by_user";
const ITEM_COLUMNS: &str =
    "id, item_name, description, category, price_per_day, owner_name, is_available";
const WANTED_COLUMNS: &str =
    "id, item_name, max_budget, requester_name, urgency, status, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(DbError::Open)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(DbError::Open)?;
        Ok(Database { conn })
    }

    /// Create the baseline tables if they don't exist, then run any pending
    /// version-gated migrations. Safe to call on every startup.
    pub fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                trust_score INTEGER NOT NULL DEFAULT 100
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                title            TEXT,
                description      TEXT NOT NULL,
                location         TEXT,
                reward           REAL NOT NULL,
                posted_by        TEXT NOT NULL,
                accepted_by      TEXT,
                accepted_by_user INTEGER REFERENCES users(id),
                status           TEXT NOT NULL DEFAULT 'open',
                created_at       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                item_name     TEXT NOT NULL,
                description   TEXT,
                category      TEXT,
                price_per_day REAL NOT NULL,
                owner_name    TEXT NOT NULL,
                is_available  INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS wanted (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                item_name      TEXT NOT NULL,
                max_budget     REAL NOT NULL,
                requester_name TEXT NOT NULL,
                urgency        TEXT NOT NULL DEFAULT 'medium',
                status         TEXT NOT NULL DEFAULT 'open',
                created_at     TEXT NOT NULL
            );
            ",
            )
            .map_err(|e| DbError::Migration(e.to_string()))?;

        // Fresh databases start at version 0.
        self.conn.execute(
            "INSERT OR IGNORE INTO config (key, value) VALUES ('schema_version', '0')",
            [],
        )?;

        run_migrations(&self.conn)
    }

    // -- Config --

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        get_schema_version(&self.conn)
    }

    // -- Users --

    /// Return the user registered under `email`, registering them with `name`
    /// and the default trust score if the email is new. The bool is `true`
    /// when a row was created.
    pub fn find_or_create_user(&self, name: &str, email: &str) -> Result<(User, bool)> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO users (name, email, trust_score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(email) DO NOTHING",
                params![name, email, DEFAULT_TRUST_SCORE],
            )
            .map_err(DbError::from_write)?;

        let user = self
            .find_user_by_email(email)?
            .ok_or_else(|| DbError::Constraint(format!("user vanished after insert: {email}")))?;
        Ok((user, inserted == 1))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email, trust_score FROM users WHERE email = ?1",
                params![email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email, trust_score FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    // -- Tasks --

    pub fn insert_task(&self, task: &NewTask) -> Result<Task> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO tasks (title, description, location, reward, posted_by, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    task.title,
                    task.description,
                    task.location,
                    task.reward,
                    task.posted_by,
                    TaskStatus::Open.as_str(),
                    timestamp(now),
                ],
            )
            .map_err(DbError::from_write)?;

        Ok(Task {
            id: self.conn.last_insert_rowid(),
            title: task.title.clone(),
            description: task.description.clone(),
            location: task.location.clone(),
            reward: task.reward,
            posted_by: task.posted_by.clone(),
            accepted_by: None,
            accepted_by_user: None,
            status: TaskStatus::Open,
            created_at: now,
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Tasks newest first.
    pub fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let sql = match filter {
            TaskFilter::All => {
                format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC")
            }
            TaskFilter::Open => format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE status = 'open'
                 ORDER BY created_at DESC, id DESC"
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    /// Check-and-set: only an open task can be accepted. A task in any other
    /// state is left untouched and `Transition::Skipped` is returned.
    pub fn accept_task(&self, id: i64, user_id: i64, user_name: &str) -> Result<Transition> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks SET status = 'accepted', accepted_by = ?1, accepted_by_user = ?2
                 WHERE id = ?3 AND status = 'open'",
                params![user_name, user_id, id],
            )
            .map_err(DbError::from_write)?;
        Ok(if changed == 1 {
            Transition::Applied
        } else {
            Transition::Skipped
        })
    }

    /// Mark an accepted task completed and award `TRUST_REWARD` to the user
    /// who accepted it. Only that user may complete it; both updates commit
    /// together or not at all.
    pub fn complete_task(&mut self, id: i64, user_id: i64) -> Result<Transition> {
        let tx = self.conn.transaction()?;
        let changed = tx
            .execute(
                "UPDATE tasks SET status = 'completed'
                 WHERE id = ?1 AND status = 'accepted' AND accepted_by_user = ?2",
                params![id, user_id],
            )
            .map_err(DbError::from_write)?;
        if changed == 0 {
            return Ok(Transition::Skipped);
        }
        tx.execute(
            "UPDATE users SET trust_score = trust_score + ?1 WHERE id = ?2",
            params![TRUST_REWARD, user_id],
        )
        .map_err(DbError::from_write)?;
        tx.commit()?;
        Ok(Transition::Applied)
    }

    // -- Items --

    pub fn insert_item(&self, item: &NewItem) -> Result<Item> {
        self.conn
            .execute(
                "INSERT INTO items (item_name, description, category, price_per_day, owner_name, is_available)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                params![
                    item.item_name,
                    item.description,
                    item.category,
                    item.price_per_day,
                    item.owner_name,
                ],
            )
            .map_err(DbError::from_write)?;

        Ok(Item {
            id: self.conn.last_insert_rowid(),
            item_name: item.item_name.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            price_per_day: item.price_per_day,
            owner_name: item.owner_name.clone(),
            is_available: true,
        })
    }

    /// Items in listing order. Unavailable items are skipped unless
    /// `include_unavailable` is set.
    pub fn list_items(&self, include_unavailable: bool) -> Result<Vec<Item>> {
        let sql = if include_unavailable {
            format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id ASC")
        } else {
            format!("SELECT {ITEM_COLUMNS} FROM items WHERE is_available = 1 ORDER BY id ASC")
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    // -- Wanted requests --

    pub fn insert_wanted(&self, request: &NewWantedRequest) -> Result<WantedRequest> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO wanted (item_name, max_budget, requester_name, urgency, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    request.item_name,
                    request.max_budget,
                    request.requester_name,
                    request.urgency.as_str(),
                    WantedStatus::Open.as_str(),
                    timestamp(now),
                ],
            )
            .map_err(DbError::from_write)?;

        Ok(WantedRequest {
            id: self.conn.last_insert_rowid(),
            item_name: request.item_name.clone(),
            max_budget: request.max_budget,
            requester_name: request.requester_name.clone(),
            urgency: request.urgency,
            status: WantedStatus::Open,
            created_at: now,
        })
    }

    /// Open wanted requests, newest first.
    pub fn list_open_wanted(&self) -> Result<Vec<WantedRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WANTED_COLUMNS} FROM wanted WHERE status = 'open'
             ORDER BY created_at DESC, id DESC"
        ))?;
        let requests = stmt
            .query_map([], row_to_wanted)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requests)
    }

    // -- Stats --

    pub fn board_counts(&self) -> Result<BoardCounts> {
        let counts = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM tasks WHERE status = 'open'),
                (SELECT COUNT(*) FROM items WHERE is_available = 1),
                (SELECT COUNT(*) FROM wanted WHERE status = 'open')",
            [],
            |row| {
                Ok(BoardCounts {
                    open_tasks: row.get(0)?,
                    available_items: row.get(1)?,
                    open_wanted: row.get(2)?,
                })
            },
        )?;
        Ok(counts)
    }
}

/// Read the current schema version from the config table.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM config WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match value {
        Some(v) => v
            .parse::<i32>()
            .map_err(|e| DbError::Migration(format!("invalid schema_version value: {e}"))),
        None => Ok(0),
    }
}

/// Run all pending schema migrations in order.
///
/// Version 0 is the baseline created by the `CREATE TABLE IF NOT EXISTS`
/// block in `migrate()`. Each later step runs in its own transaction and
/// bumps `schema_version` inside it, so a failed step can be retried.
fn run_migrations(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version < 1 {
        conn.execute_batch(
            "BEGIN;
             CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status, created_at);
             CREATE INDEX IF NOT EXISTS idx_items_available ON items(is_available);
             CREATE INDEX IF NOT EXISTS idx_wanted_status ON wanted(status, created_at);
             INSERT OR REPLACE INTO config (key, value) VALUES ('schema_version', '1');
             COMMIT;",
        )
        .map_err(|e| DbError::Migration(format!("v1: {e}")))?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width so that TEXT ordering matches time ordering.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        trust_score: row.get(3)?,
    })
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get(7)?;
    let created_str: String = row.get(8)?;

    Ok(Task {
        id: row.get(0)?,
        title: row
            .get::<_, Option<String>>(1)?
            .filter(|t| !t.is_empty()),
        description: row.get(2)?,
        location: row
            .get::<_, Option<String>>(3)?
            .filter(|l| !l.is_empty()),
        reward: row.get(4)?,
        posted_by: row.get(5)?,
        accepted_by: row.get(6)?,
        status: TaskStatus::from_str(&status_str).unwrap_or(TaskStatus::Open),
        created_at: parse_timestamp(&created_str),
        accepted_by_user: row.get(9)?,
    })
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        item_name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        price_per_day: row.get(4)?,
        owner_name: row.get(5)?,
        is_available: row.get(6)?,
    })
}

fn row_to_wanted(row: &rusqlite::Row) -> rusqlite::Result<WantedRequest> {
    let urgency_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;
    let created_str: String = row.get(6)?;

    Ok(WantedRequest {
        id: row.get(0)?,
        item_name: row.get(1)?,
        max_budget: row.get(2)?,
        requester_name: row.get(3)?,
        urgency: Urgency::from_str(&urgency_str).unwrap_or(Urgency::Medium),
        status: WantedStatus::from_str(&status_str).unwrap_or(WantedStatus::Open),
        created_at: parse_timestamp(&created_str),
    })
}
