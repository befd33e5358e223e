//! Guard configuration
//!
//! Loaded once at startup by the surrounding application (the demo server reads
//! it from YAML) and validated before the guard is built.

use serde::{Deserialize, Serialize};

use crate::access_list::AccessList;
use crate::escalation::EscalationPolicy;
use crate::prelude::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
	/// Addresses or CIDR ranges that are never blocked
	pub whitelist: Vec<String>,
	/// Addresses or CIDR ranges that are always blocked
	pub blacklist: Vec<String>,
	/// Failed attempts within `fail_reset` that trigger a ban
	pub fail_max: u32,
	/// Lookback window for counting failures (seconds)
	pub fail_reset: u64,
	/// Base ban duration (seconds)
	pub ban_period: u64,
	/// Growth factor of the ban duration for repeat offenders
	pub repeat_multiplier: u32,
	/// Minimum time after a ban during which a new ban counts as a repeat (seconds)
	pub repeat_reset: u64,
	/// Answer blocked requests with HTTP 403 instead of an in-page message
	pub ban_http_status: bool,
	/// Ledger retention used by the housekeeping purge (days)
	pub db_expire: u32,
}

impl Default for GuardConfig {
	fn default() -> Self {
		Self {
			whitelist: vec!["127.0.0.1".to_string()],
			blacklist: Vec::new(),
			fail_max: 5,
			fail_reset: 600,
			ban_period: 120,
			repeat_multiplier: 4,
			repeat_reset: 86400,
			ban_http_status: false,
			db_expire: 40,
		}
	}
}

impl GuardConfig {
	/// Check value ranges and parse both access lists
	pub fn validate(&self) -> LgResult<()> {
		if self.fail_max == 0 {
			return Err(Error::ConfigError("fail_max must be at least 1".into()));
		}
		if self.ban_period == 0 {
			return Err(Error::ConfigError("ban_period must be at least 1 second".into()));
		}
		if self.repeat_multiplier == 0 {
			return Err(Error::ConfigError("repeat_multiplier must be at least 1".into()));
		}
		self.access_list()?;
		Ok(())
	}

	pub fn access_list(&self) -> LgResult<AccessList> {
		AccessList::from_strs(&self.whitelist, &self.blacklist)
			.map_err(|err| Error::ConfigError(err.to_string()))
	}

	pub fn escalation_policy(&self) -> EscalationPolicy {
		EscalationPolicy {
			fail_max: self.fail_max,
			fail_reset: self.fail_reset,
			ban_period: self.ban_period,
			repeat_multiplier: self.repeat_multiplier,
			repeat_reset: self.repeat_reset,
		}
	}

	/// Retention window in seconds
	pub fn retention_secs(&self) -> u64 {
		u64::from(self.db_expire) * 86400
	}
}


// vim: ts=4
