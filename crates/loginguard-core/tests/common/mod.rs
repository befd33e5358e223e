//! Common test utilities: an in-memory ledger and logging setup

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use loginguard_core::{GuardConfig, LoginGuard};
use loginguard_types::ledger_adapter::{AttemptEvent, BanEvent, EventType, LedgerAdapter};
use loginguard_types::prelude::*;

#[derive(Debug, Clone)]
pub struct Row {
	pub id: u64,
	pub epoch: Timestamp,
	pub typ: EventType,
	pub address: Address,
	pub ban: Option<BanEvent>,
}

/// Append-only ledger kept in memory, with switchable failures
#[derive(Debug, Default)]
pub struct MemoryLedger {
	rows: Mutex<Vec<Row>>,
	pub fail_reads: AtomicBool,
	pub fail_writes: AtomicBool,
	pub last_ban_reads: AtomicUsize,
}

impl MemoryLedger {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn bans(&self, address: &Address) -> Vec<BanEvent> {
		self.rows.lock().iter().filter(|r| r.address == *address).filter_map(|r| r.ban).collect()
	}

	pub fn attempts(&self, address: &Address) -> usize {
		self.rows
			.lock()
			.iter()
			.filter(|r| r.address == *address && r.typ == EventType::Attempt)
			.count()
	}

	fn push(&self, epoch: Timestamp, typ: EventType, address: Address, ban: Option<BanEvent>) {
		let mut rows = self.rows.lock();
		let id = rows.len() as u64 + 1;
		rows.push(Row { id, epoch, typ, address, ban });
	}

	fn check(&self, flag: &AtomicBool) -> LgResult<()> {
		if flag.load(Ordering::SeqCst) { Err(Error::DbError) } else { Ok(()) }
	}
}

#[async_trait]
impl LedgerAdapter for MemoryLedger {
	async fn record_attempt(&self, event: &AttemptEvent) -> LgResult<()> {
		self.check(&self.fail_writes)?;
		self.push(event.timestamp, EventType::Attempt, event.address, None);
		Ok(())
	}

	async fn count_attempts_since(&self, address: &Address, since: Timestamp) -> LgResult<u32> {
		self.check(&self.fail_reads)?;
		let rows = self.rows.lock();
		Ok(rows
			.iter()
			.filter(|r| r.address == *address && r.typ == EventType::Attempt && r.epoch >= since)
			.count() as u32)
	}

	async fn read_last_ban(&self, address: &Address) -> LgResult<Option<BanEvent>> {
		self.check(&self.fail_reads)?;
		self.last_ban_reads.fetch_add(1, Ordering::SeqCst);
		let rows = self.rows.lock();
		Ok(rows.iter().rev().filter(|r| r.address == *address).find_map(|r| r.ban))
	}

	async fn record_ban(&self, event: &BanEvent) -> LgResult<()> {
		self.check(&self.fail_writes)?;
		self.push(event.timestamp, EventType::Ban, event.address, Some(*event));
		Ok(())
	}
}

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub fn addr(s: &str) -> Address {
	Address::parse(s).unwrap()
}

/// Guard with the default policy and no whitelisted addresses
pub fn guard_with(config: GuardConfig, ledger: &Arc<MemoryLedger>) -> Arc<LoginGuard> {
	setup_test_logging();
	let adapter: Arc<dyn LedgerAdapter> = ledger.clone();
	Arc::new(LoginGuard::new(&config, adapter).unwrap())
}

pub fn open_config() -> GuardConfig {
	GuardConfig { whitelist: Vec::new(), ..GuardConfig::default() }
}

pub fn user(name: &str) -> serde_json::Value {
	serde_json::json!({ "user": name })
}

// vim: ts=4
