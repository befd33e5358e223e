//! Login-time access check
//!
//! The same check runs before the login form is rendered and before an
//! authentication attempt is accepted, so both call sites always agree.

use crate::access_list::{AccessList, Decision};
use crate::duration::format_duration;
use crate::ledger::BanLedger;
use crate::prelude::*;

/// Ban state of an address, derived from its most recent ban
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanState {
	Clear,
	Banned { until: Timestamp, repeat: u32 },
}

/// Result of [`BanGate::check_access`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
	Allowed,
	/// Blacklisted
	Denied,
	/// Temporarily banned; seconds until the ban is lifted
	Banned { remaining: u64 },
}

impl AccessResult {
	pub fn is_allowed(&self) -> bool {
		matches!(self, AccessResult::Allowed)
	}

	/// End-user message for a blocked request
	pub fn message(&self) -> Option<String> {
		match self {
			AccessResult::Allowed => None,
			AccessResult::Denied => Some("Access denied.".to_string()),
			AccessResult::Banned { remaining } => Some(format!(
				"Too many failed login attempts. Please retry in {}.",
				format_duration(*remaining)
			)),
		}
	}
}

#[derive(Clone, Debug)]
pub struct BanGate {
	access_list: AccessList,
}

impl BanGate {
	pub fn new(access_list: AccessList) -> Self {
		Self { access_list }
	}

	pub fn access_list(&self) -> &AccessList {
		&self.access_list
	}

	pub async fn check_access(
		&self,
		ledger: &BanLedger,
		address: &Address,
		now: Timestamp,
	) -> AccessResult {
		match self.access_list.evaluate(address) {
			Decision::Allowed => {
				debug!("{} whitelisted", address);
				return AccessResult::Allowed;
			}
			Decision::Denied => {
				debug!("{} blacklisted", address);
				return AccessResult::Denied;
			}
			Decision::Neutral => {}
		}

		match ledger.ban_state(address, now).await {
			Ok(BanState::Banned { until, repeat }) => {
				debug!("{} banned until {} (repeat {})", address, until, repeat);
				AccessResult::Banned { remaining: now.secs_until(until) }
			}
			Ok(BanState::Clear) => AccessResult::Allowed,
			Err(_) => {
				error!("Ban state of {} unavailable, allowing access", address);
				AccessResult::Allowed
			}
		}
	}
}


// vim: ts=4
