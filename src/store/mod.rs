//! Persistent server collection backed by SQLite
//!
//! The store is the single shared mutable resource of the pipeline.
//! All access goes through an internal connection lock, so concurrent
//! per-source import tasks are serialized at the write boundary
//! (single-writer discipline) while fetch and decode proceed in
//! parallel.
//!
//! Dedup is enforced by a UNIQUE index on the entry fingerprint
//! (protocol+address+port+auth): appends skip entries whose fingerprint
//! is already present anywhere in the store, and replace-mode inserts
//! dedup within the incoming batch the same way.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result as AnyResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::{ImportMode, Protocol, ServerConfig, ServerRecord, Subscription};

/// SQLite-backed server and subscription store
pub struct ServerStore {
    conn: Mutex<Connection>,
}

impl ServerStore {
    /// Open (or create) the store at the given path
    pub fn open(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;

        // WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema().context("Failed to create SQLite schema")?;

        tracing::info!(path = %path.display(), "server store initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> AnyResult<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS servers (
                id TEXT PRIMARY KEY,
                protocol TEXT NOT NULL,
                address TEXT NOT NULL,
                port INTEGER NOT NULL,
                auth TEXT NOT NULL,
                subscription_id TEXT NOT NULL DEFAULT '',
                remarks TEXT NOT NULL DEFAULT '',
                fingerprint TEXT NOT NULL UNIQUE,
                added_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_servers_subscription
                ON servers(subscription_id);

            CREATE TABLE IF NOT EXISTS subscriptions (
                id TEXT PRIMARY KEY,
                remarks TEXT NOT NULL,
                url TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                added_at TEXT NOT NULL
            );
            "#,
        )
    }

    // ------------------------------------------------------------------
    // Servers
    // ------------------------------------------------------------------

    /// Merge a decoded batch into the store under `subscription_id`.
    ///
    /// Append: entries whose fingerprint already exists anywhere in the
    /// store are skipped. Replace (non-empty `subscription_id`): the
    /// subscription's prior entries are removed first, then the batch is
    /// inserted with the same fingerprint dedup.
    ///
    /// Returns the number of entries actually persisted.
    pub fn upsert(
        &self,
        subscription_id: &str,
        configs: &[ServerConfig],
        mode: ImportMode,
    ) -> Result<usize, rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        if mode == ImportMode::Replace && !subscription_id.is_empty() {
            tx.execute(
                "DELETE FROM servers WHERE subscription_id = ?1",
                params![subscription_id],
            )?;
        }

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO servers
                     (id, protocol, address, port, auth, subscription_id, remarks, fingerprint, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for config in configs {
                inserted += stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    config.protocol.as_scheme(),
                    config.address,
                    config.port,
                    config.auth,
                    subscription_id,
                    config.remarks,
                    config.fingerprint(),
                    Utc::now().to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            subscription_id,
            mode = mode.as_str(),
            batch = configs.len(),
            inserted,
            "merged batch into store"
        );
        Ok(inserted)
    }

    /// Remove all servers owned by a subscription, returning the count
    pub fn remove_subscription_servers(
        &self,
        subscription_id: &str,
    ) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM servers WHERE subscription_id = ?1",
            params![subscription_id],
        )
    }

    /// Remove every server in the store, returning the count
    pub fn remove_all_servers(&self) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM servers", [])
    }

    /// All servers in insertion order
    pub fn servers(&self) -> Result<Vec<ServerRecord>, rusqlite::Error> {
        self.query_servers("SELECT id, protocol, address, port, auth, subscription_id, remarks, fingerprint, added_at FROM servers ORDER BY rowid", &[])
    }

    /// Servers owned by one subscription, in insertion order
    pub fn servers_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<ServerRecord>, rusqlite::Error> {
        self.query_servers(
            "SELECT id, protocol, address, port, auth, subscription_id, remarks, fingerprint, added_at
             FROM servers WHERE subscription_id = ?1 ORDER BY rowid",
            &[&subscription_id],
        )
    }

    /// Total stored server count
    pub fn count_servers(&self) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM servers", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
    }

    fn query_servers(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<ServerRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt.query_map(args, |row| {
            let protocol: String = row.get(1)?;
            let port: i64 = row.get(3)?;
            let added_at: String = row.get(8)?;

            Ok(ServerRecord {
                id: row.get(0)?,
                config: ServerConfig {
                    protocol: Protocol::from_scheme(&protocol).unwrap_or(Protocol::Vmess),
                    address: row.get(2)?,
                    port: port as u16,
                    auth: row.get(4)?,
                    subscription_id: row.get(5)?,
                    remarks: row.get(6)?,
                },
                fingerprint: row.get(7)?,
                added_at: added_at
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        rows.collect()
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Persist a new subscription
    pub fn add_subscription(&self, sub: &Subscription) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO subscriptions (id, remarks, url, enabled, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sub.id,
                sub.remarks,
                sub.url,
                sub.enabled as i64,
                sub.added_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Remove a subscription and all servers it owns
    pub fn remove_subscription(&self, id: &str) -> Result<bool, rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM servers WHERE subscription_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// All subscriptions in insertion order
    pub fn subscriptions(&self) -> Result<Vec<Subscription>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, remarks, url, enabled, added_at FROM subscriptions ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            let enabled: i64 = row.get(3)?;
            let added_at: String = row.get(4)?;
            Ok(Subscription {
                id: row.get(0)?,
                remarks: row.get(1)?,
                url: row.get(2)?,
                enabled: enabled != 0,
                added_at: added_at
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        rows.collect()
    }

    /// Look up one subscription
    pub fn get_subscription(&self, id: &str) -> Result<Option<Subscription>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, remarks, url, enabled, added_at FROM subscriptions WHERE id = ?1",
            params![id],
            |row| {
                let enabled: i64 = row.get(3)?;
                let added_at: String = row.get(4)?;
                Ok(Subscription {
                    id: row.get(0)?,
                    remarks: row.get(1)?,
                    url: row.get(2)?,
                    enabled: enabled != 0,
                    added_at: added_at
                        .parse::<DateTime<Utc>>()
                        .unwrap_or_else(|_| Utc::now()),
                })
            },
        )
        .optional()
    }

    /// Enable or disable a subscription
    pub fn set_subscription_enabled(
        &self,
        id: &str,
        enabled: bool,
    ) -> Result<bool, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE subscriptions SET enabled = ?2 WHERE id = ?1",
            params![id, enabled as i64],
        )?;
        Ok(updated > 0)
    }
}
