//! Repeat-offender escalation
//!
//! Every failed login is appended to the ledger. Once an address reaches
//! `fail_max` attempts inside the lookback window a ban is issued. A ban that
//! follows a previous one within the escalation window counts as a repeat and
//! its duration grows geometrically:
//!
//! ```text
//! duration = ban_period * repeat_multiplier ^ repeat
//! window   = max(prior.duration * repeat_multiplier, repeat_reset)
//! ```
//!
//! The state per address is never stored; it is derived from the ledger on
//! each call. Two concurrent failures from one address may both issue a ban,
//! the later write then becomes the current ban.

use loginguard_types::ledger_adapter::BanEvent;

use crate::ledger::BanLedger;
use crate::prelude::*;

/// Escalation parameters, see [`crate::GuardConfig`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscalationPolicy {
	pub fail_max: u32,
	pub fail_reset: u64,
	pub ban_period: u64,
	pub repeat_multiplier: u32,
	pub repeat_reset: u64,
}

impl EscalationPolicy {
	/// Earliest attempt timestamp that counts toward a new ban.
	///
	/// Attempts made before the previous ban was lifted already caused that
	/// ban and must not count again.
	pub fn lookback_boundary(&self, prior: Option<&BanEvent>, now: Timestamp) -> Timestamp {
		let since = now.sub_secs(self.fail_reset);
		match prior {
			Some(ban) if ban.lifted_at() > since => ban.lifted_at(),
			_ => since,
		}
	}

	/// Repeat counter for a ban issued at `now`
	pub fn next_repeat(&self, prior: Option<&BanEvent>, now: Timestamp) -> u32 {
		let Some(prior) = prior else {
			return 0;
		};
		let window = prior
			.duration
			.saturating_mul(u64::from(self.repeat_multiplier))
			.max(self.repeat_reset);
		if now <= prior.timestamp.add_secs(window) { prior.repeat.saturating_add(1) } else { 0 }
	}

	/// Ban length in seconds for the given repeat counter
	pub fn ban_duration(&self, repeat: u32) -> u64 {
		if repeat == 0 {
			return self.ban_period;
		}
		self.ban_period.saturating_mul(u64::from(self.repeat_multiplier).saturating_pow(repeat))
	}
}

#[derive(Clone, Debug)]
pub struct EscalationEngine {
	policy: EscalationPolicy,
}

impl EscalationEngine {
	pub fn new(policy: EscalationPolicy) -> Self {
		Self { policy }
	}

	pub fn policy(&self) -> &EscalationPolicy {
		&self.policy
	}

	/// Record a failed login and issue a ban if the threshold is reached.
	///
	/// Storage failures are logged and end processing without a ban: the
	/// request then goes unprotected rather than failing. Returns the ban that
	/// was written, if any.
	pub async fn on_failed_attempt(
		&self,
		ledger: &BanLedger,
		address: &Address,
		data: serde_json::Value,
		now: Timestamp,
	) -> Option<BanEvent> {
		if ledger.record_attempt(address, data, now).await.is_err() {
			error!("Attempt from {} not recorded, address is unprotected", address);
			return None;
		}

		let prior = match ledger.most_recent_ban(address).await {
			Ok(prior) => prior,
			Err(_) => {
				error!("Ban history of {} unavailable, skipping ban check", address);
				return None;
			}
		};

		let since = self.policy.lookback_boundary(prior.as_ref(), now);
		let count = match ledger.count_attempts_since(address, since).await {
			Ok(count) => count,
			Err(_) => {
				error!("Attempt count of {} unavailable, skipping ban check", address);
				return None;
			}
		};
		debug!("{} failed attempts from {} since {}", count, address, since);

		if count < self.policy.fail_max {
			return None;
		}

		let repeat = self.policy.next_repeat(prior.as_ref(), now);
		let duration = self.policy.ban_duration(repeat);
		let ban = BanEvent { timestamp: now, address: *address, duration, repeat };

		if ledger.record_ban(&ban).await.is_err() {
			error!("Ban of {} for {}s not recorded", address, duration);
			return None;
		}
		info!("Banned {} for {}s (repeat {})", address, duration, repeat);

		Some(ban)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn policy() -> EscalationPolicy {
		EscalationPolicy {
			fail_max: 5,
			fail_reset: 600,
			ban_period: 120,
			repeat_multiplier: 4,
			repeat_reset: 86400,
		}
	}

	fn ban(at: i64, duration: u64, repeat: u32) -> BanEvent {
		BanEvent {
			timestamp: Timestamp(at),
			address: Address::V4([192, 0, 2, 1]),
			duration,
			repeat,
		}
	}

	#[test]
	fn test_ban_duration_growth() {
		let p = policy();
		assert_eq!(p.ban_duration(0), 120);
		assert_eq!(p.ban_duration(1), 480);
		assert_eq!(p.ban_duration(2), 1920);
		assert_eq!(p.ban_duration(3), 7680);
		assert_eq!(p.ban_duration(200), u64::MAX);
	}

	#[test]
	fn test_multiplier_one_keeps_period() {
		let p = EscalationPolicy { repeat_multiplier: 1, ..policy() };
		assert_eq!(p.ban_duration(5), 120);
	}

	#[test]
	fn test_lookback_boundary() {
		let p = policy();
		let now = Timestamp(10_000);
		assert_eq!(p.lookback_boundary(None, now), Timestamp(9_400));

		// Ban lifted long ago: plain window
		assert_eq!(p.lookback_boundary(Some(&ban(1_000, 120, 0)), now), Timestamp(9_400));

		// Ban lifted inside the window: boundary moves to the lift time
		assert_eq!(p.lookback_boundary(Some(&ban(9_500, 120, 0)), now), Timestamp(9_620));
	}

	#[test]
	fn test_first_ban_has_no_repeat() {
		assert_eq!(policy().next_repeat(None, Timestamp(1_000)), 0);
	}

	#[test]
	fn test_repeat_inside_window() {
		let p = EscalationPolicy { repeat_reset: 0, ..policy() };
		let prior = ban(1_000, 120, 0);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(1_000 + 480)), 1);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(1_000 + 481)), 0);
	}

	#[test]
	fn test_repeat_reset_floor() {
		let p = policy();
		let prior = ban(1_000, 120, 2);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(1_000 + 86_400)), 3);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(1_000 + 86_401)), 0);
	}

	#[test]
	fn test_long_ban_extends_window() {
		let p = EscalationPolicy { repeat_reset: 60, ..policy() };
		let prior = ban(0, 1920, 2);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(7_680)), 3);
		assert_eq!(p.next_repeat(Some(&prior), Timestamp(7_681)), 0);
	}
}

// vim: ts=4
