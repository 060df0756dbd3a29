//! SQLite schema creation and version check.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Unsupported schema version: expected {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Databases with a newer version are refused.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent. Safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? == 0 {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a platform database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        log::debug!("Creating schema v{CURRENT_VERSION} in {}", path.display());
        create_schema(&conn)?;
    } else if version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: version,
        });
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    get_schema_version(conn)
}

fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS students (
    id_student INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    register_date TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS courses (
    id_course INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    logo TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS bundles (
    id_bundle INTEGER PRIMARY KEY CHECK (id_bundle > 0),
    name TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    logo TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS bundle_courses (
    id_bundle INTEGER NOT NULL REFERENCES bundles(id_bundle) ON DELETE CASCADE,
    id_course INTEGER NOT NULL REFERENCES courses(id_course) ON DELETE CASCADE,
    PRIMARY KEY (id_bundle, id_course)
);
CREATE INDEX IF NOT EXISTS idx_bundle_courses_course ON bundle_courses(id_course);

CREATE TABLE IF NOT EXISTS purchases (
    id_student INTEGER NOT NULL REFERENCES students(id_student) ON DELETE CASCADE,
    id_bundle INTEGER NOT NULL REFERENCES bundles(id_bundle) ON DELETE CASCADE,
    date TEXT NOT NULL DEFAULT (datetime('now')),
    price REAL NOT NULL CHECK (price >= 0),
    PRIMARY KEY (id_student, id_bundle)
);
CREATE INDEX IF NOT EXISTS idx_purchases_bundle ON purchases(id_bundle);

CREATE TABLE IF NOT EXISTS modules (
    id_module INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS course_modules (
    id_course INTEGER NOT NULL REFERENCES courses(id_course) ON DELETE CASCADE,
    id_module INTEGER NOT NULL REFERENCES modules(id_module) ON DELETE CASCADE,
    module_order INTEGER NOT NULL,
    PRIMARY KEY (id_course, id_module)
);

CREATE TABLE IF NOT EXISTS videos (
    id_module INTEGER NOT NULL REFERENCES modules(id_module) ON DELETE CASCADE,
    class_order INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    videoID TEXT NOT NULL,
    length INTEGER NOT NULL CHECK (length >= 0),
    PRIMARY KEY (id_module, class_order)
);

CREATE TABLE IF NOT EXISTS questionnaires (
    id_module INTEGER NOT NULL REFERENCES modules(id_module) ON DELETE CASCADE,
    class_order INTEGER NOT NULL,
    question TEXT NOT NULL,
    q1 TEXT NOT NULL,
    q2 TEXT NOT NULL,
    q3 TEXT NOT NULL,
    q4 TEXT NOT NULL,
    answer INTEGER NOT NULL CHECK (answer BETWEEN 1 AND 4),
    PRIMARY KEY (id_module, class_order)
);

-- Watched classes (course progress)
CREATE TABLE IF NOT EXISTS student_historic (
    id_student INTEGER NOT NULL REFERENCES students(id_student) ON DELETE CASCADE,
    id_module INTEGER NOT NULL REFERENCES modules(id_module) ON DELETE CASCADE,
    class_order INTEGER NOT NULL,
    class_type TEXT NOT NULL,
    date TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (id_student, id_module, class_order)
);

CREATE TABLE IF NOT EXISTS notifications (
    id_notification INTEGER PRIMARY KEY AUTOINCREMENT,
    id_student INTEGER NOT NULL REFERENCES students(id_student) ON DELETE CASCADE,
    date TEXT NOT NULL DEFAULT (datetime('now')),
    id_reference INTEGER,
    type TEXT NOT NULL,
    message TEXT NOT NULL,
    read BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_notifications_student ON notifications(id_student, read);

CREATE TABLE IF NOT EXISTS support_topics (
    id_topic INTEGER PRIMARY KEY AUTOINCREMENT,
    id_student INTEGER NOT NULL REFERENCES students(id_student) ON DELETE CASCADE,
    category TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    date TEXT NOT NULL DEFAULT (datetime('now')),
    closed BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS support_topic_replies (
    id_reply INTEGER PRIMARY KEY AUTOINCREMENT,
    id_topic INTEGER NOT NULL REFERENCES support_topics(id_topic) ON DELETE CASCADE,
    id_user INTEGER NOT NULL REFERENCES students(id_student),
    date TEXT NOT NULL DEFAULT (datetime('now')),
    text TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_support_replies_topic ON support_topic_replies(id_topic);
"#;
