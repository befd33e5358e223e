//! Adapter that stores failed login attempts and issued bans.
//!
//! The ledger is append-only: events are written once and never updated. Expiry
//! of old rows is a housekeeping concern of the concrete adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Event kind, stored as the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
	Attempt,
	Ban,
}

impl EventType {
	pub fn as_code(self) -> i64 {
		match self {
			EventType::Attempt => 0,
			EventType::Ban => 1,
		}
	}

	pub fn from_code(code: i64) -> Option<Self> {
		match code {
			0 => Some(EventType::Attempt),
			1 => Some(EventType::Ban),
			_ => None,
		}
	}
}

/// A failed authentication attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptEvent {
	pub timestamp: Timestamp,
	pub address: Address,
	/// Opaque payload, e.g. the attempted user name
	pub data: serde_json::Value,
}

/// An issued ban
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEvent {
	pub timestamp: Timestamp,
	pub address: Address,
	/// Ban length in seconds
	pub duration: u64,
	/// Number of consecutive escalations that led to this ban
	pub repeat: u32,
}

impl BanEvent {
	/// Time at which the ban is lifted
	pub fn lifted_at(&self) -> Timestamp {
		self.timestamp.add_secs(self.duration)
	}

	pub fn is_active(&self, now: Timestamp) -> bool {
		self.lifted_at() > now
	}
}

/// Payload stored in the `data` column of ban rows
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BanData {
	pub duration: u64,
	pub repeat: u32,
}

#[async_trait]
pub trait LedgerAdapter: Debug + Send + Sync {
	/// Appends a failed attempt
	async fn record_attempt(&self, event: &AttemptEvent) -> LgResult<()>;

	/// Counts attempts for `address` with `epoch >= since`
	async fn count_attempts_since(&self, address: &Address, since: Timestamp) -> LgResult<u32>;

	/// Reads the most recently written ban for `address`
	async fn read_last_ban(&self, address: &Address) -> LgResult<Option<BanEvent>>;

	/// Appends a ban
	async fn record_ban(&self, event: &BanEvent) -> LgResult<()>;
}


// vim: ts=4
