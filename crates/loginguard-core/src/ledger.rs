//! Request-scoped view of the attempt/ban ledger
//!
//! A `BanLedger` lives for one login flow. It forwards writes and counts to the
//! adapter and caches the most recent ban per address, so repeated lookups in
//! the same flow agree even if another flow writes a ban in between. Nothing is
//! cached across flows.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use loginguard_types::ledger_adapter::{AttemptEvent, BanEvent, LedgerAdapter};

use crate::gate::BanState;
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct BanLedger {
	adapter: Arc<dyn LedgerAdapter>,
	last_ban: Arc<Mutex<HashMap<Address, Option<BanEvent>>>>,
}

impl BanLedger {
	pub fn new(adapter: Arc<dyn LedgerAdapter>) -> Self {
		Self { adapter, last_ban: Arc::new(Mutex::new(HashMap::new())) }
	}

	pub async fn record_attempt(
		&self,
		address: &Address,
		data: serde_json::Value,
		now: Timestamp,
	) -> LgResult<()> {
		let event = AttemptEvent { timestamp: now, address: *address, data };
		self.adapter
			.record_attempt(&event)
			.await
			.inspect_err(|err| warn!("Ledger: recording attempt for {} failed: {}", address, err))
	}

	pub async fn count_attempts_since(&self, address: &Address, since: Timestamp) -> LgResult<u32> {
		self.adapter
			.count_attempts_since(address, since)
			.await
			.inspect_err(|err| warn!("Ledger: counting attempts for {} failed: {}", address, err))
	}

	/// Most recent ban for `address`, read through the flow's cache
	pub async fn most_recent_ban(&self, address: &Address) -> LgResult<Option<BanEvent>> {
		let cached = self.last_ban.lock().get(address).copied();
		if let Some(cached) = cached {
			return Ok(cached);
		}

		let ban = self
			.adapter
			.read_last_ban(address)
			.await
			.inspect_err(|err| warn!("Ledger: reading last ban for {} failed: {}", address, err))?;

		// A concurrent lookup in the same flow may have filled the slot first
		Ok(*self.last_ban.lock().entry(*address).or_insert(ban))
	}

	/// Append a ban; the flow's own write becomes its current ban
	pub async fn record_ban(&self, event: &BanEvent) -> LgResult<()> {
		self.adapter.record_ban(event).await.inspect_err(|err| {
			warn!("Ledger: recording ban for {} failed: {}", event.address, err);
		})?;
		self.last_ban.lock().insert(event.address, Some(*event));
		Ok(())
	}

	/// Ban state of `address` derived from its most recent ban
	pub async fn ban_state(&self, address: &Address, now: Timestamp) -> LgResult<BanState> {
		Ok(match self.most_recent_ban(address).await? {
			Some(ban) if ban.is_active(now) => {
				BanState::Banned { until: ban.lifted_at(), repeat: ban.repeat }
			}
			_ => BanState::Clear,
		})
	}
}

// vim: ts=4
