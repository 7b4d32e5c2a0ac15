//! SQL schema and migrations for the ghwatch SQLite store.
//!
//! Connection pragmas run on every open. Schema changes are an ordered list
//! of migrations gated on `PRAGMA user_version`; each one runs in its own
//! transaction and bumps the version as its last statement.

/// Applied on every connection open. WAL plus `synchronous = FULL` makes
/// each committed write durable before the call returns.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = FULL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
";

/// Migration `i` moves the schema from version `i` to `i + 1`.
pub const MIGRATIONS: &[&str] = &[V1_INITIAL, V2_OUTBOX_INDEXES];

/// The version a fully migrated database reports.
pub const LATEST_VERSION: i64 = MIGRATIONS.len() as i64;

const V1_INITIAL: &str = "
CREATE TABLE IF NOT EXISTS repositories (
    repo_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_id       INTEGER,
    full_name       TEXT    NOT NULL UNIQUE,   -- owner/name
    owner           TEXT    NOT NULL,
    name            TEXT    NOT NULL,
    description     TEXT,
    pushed_at       TEXT,                      -- fixed-width RFC 3339 UTC
    first_seen_at   TEXT    NOT NULL,
    last_checked_at TEXT    NOT NULL,
    is_watched      INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS issues (
    issue_id        INTEGER PRIMARY KEY,
    repo_id         INTEGER NOT NULL REFERENCES repositories(repo_id),
    issue_number    INTEGER NOT NULL,
    title           TEXT    NOT NULL,
    state           TEXT    NOT NULL,
    created_at      TEXT    NOT NULL,
    updated_at      TEXT    NOT NULL,
    author          TEXT,
    labels          TEXT    NOT NULL DEFAULT '[]',   -- JSON array of names
    first_seen_at   TEXT    NOT NULL,
    last_checked_at TEXT    NOT NULL,
    UNIQUE (repo_id, issue_number)
);

CREATE TABLE IF NOT EXISTS pull_requests (
    pr_id           INTEGER PRIMARY KEY,
    repo_id         INTEGER NOT NULL REFERENCES repositories(repo_id),
    pr_number       INTEGER NOT NULL,
    title           TEXT    NOT NULL,
    state           TEXT    NOT NULL,
    created_at      TEXT    NOT NULL,
    updated_at      TEXT    NOT NULL,
    author          TEXT,
    labels          TEXT    NOT NULL DEFAULT '[]',
    first_seen_at   TEXT    NOT NULL,
    last_checked_at TEXT    NOT NULL,
    UNIQUE (repo_id, pr_number)
);

-- Outbox. A row is pending while sent_at IS NULL and is updated exactly once.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    notification_type TEXT    NOT NULL,   -- new_issue | updated_issue | new_pr | updated_pr
    repo_full_name    TEXT    NOT NULL,
    item_number       INTEGER,
    title             TEXT    NOT NULL,
    created_at        TEXT    NOT NULL,
    sent_at           TEXT,
    send_error        TEXT
);

CREATE INDEX IF NOT EXISTS repositories_watched_idx ON repositories(is_watched);
CREATE INDEX IF NOT EXISTS issues_repo_idx          ON issues(repo_id);
CREATE INDEX IF NOT EXISTS pull_requests_repo_idx   ON pull_requests(repo_id);
CREATE INDEX IF NOT EXISTS notifications_sent_idx   ON notifications(sent_at);

PRAGMA user_version = 1;
";

const V2_OUTBOX_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS notifications_pending_idx
    ON notifications(created_at, notification_id) WHERE sent_at IS NULL;
CREATE INDEX IF NOT EXISTS notifications_failed_idx
    ON notifications(notification_id) WHERE send_error IS NOT NULL;

PRAGMA user_version = 2;
";
