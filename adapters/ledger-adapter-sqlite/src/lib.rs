//! SQLite-backed ledger of failed login attempts and bans.
//!
//! All events live in one append-only table keyed by address and epoch. The
//! adapter never updates rows; [`LedgerAdapterSqlite::purge_before`] removes
//! expired ones for housekeeping.

#![forbid(unsafe_code)]

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use loginguard_types::ledger_adapter::{AttemptEvent, BanEvent, LedgerAdapter};
use loginguard_types::prelude::*;

mod event;
mod schema;
mod utils;

use utils::inspect;

#[derive(Debug)]
pub struct LedgerAdapterSqlite {
	db: SqlitePool,
}

impl LedgerAdapterSqlite {
	/// Open (or create) the ledger database at `path`
	pub async fn new(path: impl AsRef<Path>) -> LgResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;

		schema::init_db(&db).await.inspect_err(inspect).or(Err(Error::DbError))?;
		info!("Ledger database opened at {}", path.display());

		Ok(Self { db })
	}

	/// Delete all events older than `before`, returning the number of rows removed
	pub async fn purge_before(&self, before: Timestamp) -> LgResult<u64> {
		event::purge_before(&self.db, before).await
	}
}

#[async_trait]
impl LedgerAdapter for LedgerAdapterSqlite {
	async fn record_attempt(&self, event: &AttemptEvent) -> LgResult<()> {
		event::insert_attempt(&self.db, event).await
	}

	async fn count_attempts_since(&self, address: &Address, since: Timestamp) -> LgResult<u32> {
		event::count_attempts_since(&self.db, address, since).await
	}

	async fn read_last_ban(&self, address: &Address) -> LgResult<Option<BanEvent>> {
		event::read_last_ban(&self.db, address).await
	}

	async fn record_ban(&self, event: &BanEvent) -> LgResult<()> {
		event::insert_ban(&self.db, event).await
	}
}

// vim: ts=4
