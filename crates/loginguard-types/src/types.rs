//! Common value types

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		Timestamp(chrono::Utc::now().timestamp())
	}

	/// Shift by a number of seconds, saturating at the i64 range
	pub fn add_secs(self, secs: u64) -> Self {
		Timestamp(self.0.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX)))
	}

	pub fn sub_secs(self, secs: u64) -> Self {
		Timestamp(self.0.saturating_sub(i64::try_from(secs).unwrap_or(i64::MAX)))
	}

	/// Seconds from `self` until `later`, zero if `later` is not in the future
	pub fn secs_until(self, later: Timestamp) -> u64 {
		u64::try_from(later.0.saturating_sub(self.0)).unwrap_or(0)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match chrono::DateTime::from_timestamp(self.0, 0) {
			Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
			None => write!(f, "@{}", self.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secs_until() {
		let t = Timestamp(1_000);
		assert_eq!(t.secs_until(Timestamp(1_120)), 120);
		assert_eq!(t.secs_until(Timestamp(1_000)), 0);
		assert_eq!(t.secs_until(Timestamp(900)), 0);
	}

	#[test]
	fn test_saturating_shift() {
		assert_eq!(Timestamp(10).add_secs(5), Timestamp(15));
		assert_eq!(Timestamp(10).sub_secs(600), Timestamp(-590));
		assert_eq!(Timestamp(i64::MAX - 1).add_secs(u64::MAX), Timestamp(i64::MAX));
	}

	#[test]
	fn test_display_iso() {
		assert_eq!(Timestamp(0).to_string(), "1970-01-01T00:00:00Z");
	}
}

// vim: ts=4
