//! [`SqliteStore`] — the SQLite implementation of [`MonitorStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};

use ghwatch_core::{
  item::{ItemKind, RemoteItem, TrackedItem, UpsertOutcome},
  notification::{NewNotification, NotificationId, NotificationRecord},
  repository::{RemoteRepository, RepoId, Repository},
  store::{MonitorStore, StoreStats},
};

use crate::{
  encode::{
    NOTIFICATION_COLUMNS, REPOSITORY_COLUMNS, RawNotification, RawRepository, RawTrackedItem,
    decode_dt, encode_dt, encode_labels, encode_number, item_table,
  },
  schema::{LATEST_VERSION, MIGRATIONS, PRAGMAS},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Monitor state backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All clones
/// share one background thread, so writes are serialised process-wide.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and bring its schema up to date.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// The schema version currently recorded in the database.
  pub async fn schema_version(&self) -> Result<i64> {
    Ok(
      self
        .conn
        .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
        .await?,
    )
  }

  async fn init_schema(&self) -> Result<()> {
    let (from, to): (i64, i64) = self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        let from: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if !(0..=LATEST_VERSION).contains(&from) {
          return Ok((from, from));
        }
        for migration in &MIGRATIONS[from as usize..] {
          let tx = conn.transaction()?;
          tx.execute_batch(migration)?;
          tx.commit()?;
        }
        Ok((from, LATEST_VERSION))
      })
      .await?;

    if from < 0 {
      return Err(Error::InvalidSchemaVersion(from));
    }
    if from > LATEST_VERSION {
      return Err(Error::SchemaTooNew { found: from, supported: LATEST_VERSION });
    }
    if from != to {
      info!(from, to, "migrated store schema");
    }
    Ok(())
  }
}

// ─── MonitorStore impl ───────────────────────────────────────────────────────

impl MonitorStore for SqliteStore {
  type Error = Error;

  // ── Repositories ──────────────────────────────────────────────────────────

  async fn upsert_repository(&self, repo: RemoteRepository) -> Result<RepoId> {
    let now_str       = encode_dt(Utc::now());
    let pushed_at_str = repo.pushed_at.map(encode_dt);

    let repo_id = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO repositories (
             remote_id, full_name, owner, name, description, pushed_at,
             first_seen_at, last_checked_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
           ON CONFLICT(full_name) DO UPDATE SET
             remote_id       = COALESCE(repositories.remote_id, excluded.remote_id),
             description     = excluded.description,
             pushed_at       = excluded.pushed_at,
             last_checked_at = excluded.last_checked_at
           RETURNING repo_id",
          rusqlite::params![
            repo.remote_id,
            repo.full_name,
            repo.owner,
            repo.name,
            repo.description,
            pushed_at_str,
            now_str,
          ],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(repo_id)
  }

  async fn find_repository_id(&self, full_name: &str) -> Result<Option<RepoId>> {
    let full_name = full_name.to_owned();

    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT repo_id FROM repositories WHERE full_name = ?1",
                rusqlite::params![full_name],
                |r| r.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn get_repository(&self, full_name: &str) -> Result<Option<Repository>> {
    let full_name = full_name.to_owned();

    let raw: Option<RawRepository> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REPOSITORY_COLUMNS} FROM repositories WHERE full_name = ?1"),
              rusqlite::params![full_name],
              RawRepository::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRepository::into_repository).transpose()
  }

  async fn list_watched_repositories(&self) -> Result<Vec<String>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT full_name FROM repositories
             WHERE is_watched = 1
             ORDER BY pushed_at DESC, repo_id ASC",
          )?;
          let names = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
          Ok(names)
        })
        .await?,
    )
  }

  async fn set_watch_flag(&self, full_name: &str, watched: bool) -> Result<bool> {
    let full_name = full_name.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE repositories SET is_watched = ?1 WHERE full_name = ?2",
          rusqlite::params![watched, full_name],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Tracked items ─────────────────────────────────────────────────────────

  async fn upsert_tracked_item(
    &self,
    repo_id: RepoId,
    kind:    ItemKind,
    item:    &RemoteItem,
  ) -> Result<UpsertOutcome> {
    let (table, number_col) = item_table(kind);
    let number         = encode_number(item.number)?;
    let title          = item.title.clone();
    let state          = item.state.clone();
    let created_at_str = encode_dt(item.created_at);
    let updated_at_str = encode_dt(item.updated_at);
    let author         = item.author.clone();
    let labels_str     = encode_labels(&item.labels)?;
    let now_str        = encode_dt(Utc::now());

    // Read and write in one transaction on the connection thread so no other
    // upsert of the same key can interleave.
    let stored: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let stored: Option<String> = tx
          .query_row(
            &format!("SELECT updated_at FROM {table} WHERE repo_id = ?1 AND {number_col} = ?2"),
            rusqlite::params![repo_id, number],
            |r| r.get(0),
          )
          .optional()?;

        tx.execute(
          &format!(
            "INSERT INTO {table} (
               repo_id, {number_col}, title, state, created_at, updated_at,
               author, labels, first_seen_at, last_checked_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(repo_id, {number_col}) DO UPDATE SET
               title           = excluded.title,
               state           = excluded.state,
               updated_at      = excluded.updated_at,
               labels          = excluded.labels,
               last_checked_at = excluded.last_checked_at"
          ),
          rusqlite::params![
            repo_id,
            number,
            title,
            state,
            created_at_str,
            updated_at_str,
            author,
            labels_str,
            now_str,
          ],
        )?;

        tx.commit()?;
        Ok(stored)
      })
      .await?;

    let stored = stored.as_deref().map(decode_dt).transpose()?;
    let outcome = UpsertOutcome::classify(stored, item.updated_at);
    debug!(repo_id, %kind, number = item.number, ?outcome, "upserted item");
    Ok(outcome)
  }

  async fn list_tracked_items(&self, repo_id: RepoId, kind: ItemKind) -> Result<Vec<TrackedItem>> {
    let (table, number_col) = item_table(kind);

    let raws: Vec<RawTrackedItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT repo_id, {number_col}, title, state, created_at, updated_at,
                  author, labels, first_seen_at, last_checked_at
           FROM {table}
           WHERE repo_id = ?1
           ORDER BY {number_col} ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![repo_id], RawTrackedItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_item(kind)).collect()
  }

  // ── Notification outbox ───────────────────────────────────────────────────

  async fn enqueue_notification(&self, input: NewNotification) -> Result<NotificationRecord> {
    let created_at  = Utc::now();
    let type_str    = input.notification_type.as_ref().to_owned();
    let repo        = input.repo_full_name.clone();
    let number      = input.item_number.map(encode_number).transpose()?;
    let title       = input.title.clone();
    let created_str = encode_dt(created_at);

    let notification_id: NotificationId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_type, repo_full_name, item_number, title, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![type_str, repo, number, title, created_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(NotificationRecord {
      notification_id,
      notification_type: input.notification_type,
      repo_full_name: input.repo_full_name,
      item_number: input.item_number,
      title: input.title,
      created_at,
      sent_at: None,
      send_error: None,
    })
  }

  async fn list_pending_notifications(&self) -> Result<Vec<NotificationRecord>> {
    let raws: Vec<RawNotification> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS}
           FROM notifications
           WHERE sent_at IS NULL
           ORDER BY created_at ASC, notification_id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_record).collect()
  }

  async fn mark_notification_outcome(
    &self,
    id:    NotificationId,
    error: Option<String>,
  ) -> Result<()> {
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET sent_at = ?1, send_error = ?2 WHERE notification_id = ?3",
          rusqlite::params![now_str, error, id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotificationNotFound(id));
    }
    Ok(())
  }

  async fn reopen_failed_notifications(&self) -> Result<u64> {
    let reopened = self
      .conn
      .call(|conn| {
        Ok(conn.execute(
          "UPDATE notifications SET sent_at = NULL, send_error = NULL
           WHERE sent_at IS NOT NULL AND send_error IS NOT NULL",
          [],
        )?)
      })
      .await?;

    if reopened > 0 {
      info!(reopened, "reopened failed notifications");
    }
    Ok(reopened as u64)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn stats(&self) -> Result<StoreStats> {
    let counts: [i64; 7] = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM repositories),
             (SELECT COUNT(*) FROM repositories WHERE is_watched = 1),
             (SELECT COUNT(*) FROM issues),
             (SELECT COUNT(*) FROM pull_requests),
             (SELECT COUNT(*) FROM notifications WHERE sent_at IS NULL),
             (SELECT COUNT(*) FROM notifications
                WHERE sent_at IS NOT NULL AND send_error IS NULL),
             (SELECT COUNT(*) FROM notifications
                WHERE sent_at IS NOT NULL AND send_error IS NOT NULL)",
          [],
          |r| Ok([r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?, r.get(6)?]),
        )?)
      })
      .await?;

    let [repositories, watched, issues, pull_requests, pending, sent, failed] =
      counts.map(|c| c as u64);
    Ok(StoreStats { repositories, watched, issues, pull_requests, pending, sent, failed })
  }
}
