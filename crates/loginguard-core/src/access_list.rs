//! Static whitelist / blacklist evaluation

use loginguard_types::address::{AccessEntry, matches_any};

use crate::prelude::*;

/// Outcome of the static list check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	/// Whitelisted: bypasses every other check, including an active ban
	Allowed,
	/// Blacklisted
	Denied,
	/// On neither list, defer to the ban ledger
	Neutral,
}

#[derive(Debug, Clone, Default)]
pub struct AccessList {
	allow: Vec<AccessEntry>,
	deny: Vec<AccessEntry>,
}

impl AccessList {
	pub fn new(allow: Vec<AccessEntry>, deny: Vec<AccessEntry>) -> Self {
		Self { allow, deny }
	}

	/// Parse both lists, failing on the first malformed entry
	pub fn from_strs(
		allow: impl IntoIterator<Item = impl AsRef<str>>,
		deny: impl IntoIterator<Item = impl AsRef<str>>,
	) -> LgResult<Self> {
		let allow = allow
			.into_iter()
			.map(|s| AccessEntry::parse(s.as_ref()))
			.collect::<LgResult<Vec<_>>>()?;
		let deny = deny
			.into_iter()
			.map(|s| AccessEntry::parse(s.as_ref()))
			.collect::<LgResult<Vec<_>>>()?;
		Ok(Self { allow, deny })
	}

	pub fn evaluate(&self, address: &Address) -> Decision {
		if matches_any(address, &self.allow) {
			Decision::Allowed
		} else if matches_any(address, &self.deny) {
			Decision::Denied
		} else {
			Decision::Neutral
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(s: &str) -> Address {
		Address::parse(s).unwrap()
	}

	#[test]
	fn test_allow_precedence() {
		let list = AccessList::from_strs(["10.0.0.0/8"], ["10.1.0.0/16", "10.1.2.3"]).unwrap();
		assert_eq!(list.evaluate(&addr("10.1.2.3")), Decision::Allowed);
	}

	#[test]
	fn test_deny_and_neutral() {
		let list = AccessList::from_strs(["127.0.0.1"], ["192.0.2.0/24", "2001:db8::/32"]).unwrap();
		assert_eq!(list.evaluate(&addr("127.0.0.1")), Decision::Allowed);
		assert_eq!(list.evaluate(&addr("192.0.2.99")), Decision::Denied);
		assert_eq!(list.evaluate(&addr("2001:db8::7")), Decision::Denied);
		assert_eq!(list.evaluate(&addr("198.51.100.1")), Decision::Neutral);
		assert_eq!(list.evaluate(&addr("::1")), Decision::Neutral);
	}

	#[test]
	fn test_empty_lists() {
		let list = AccessList::default();
		assert_eq!(list.evaluate(&addr("127.0.0.1")), Decision::Neutral);
	}

	#[test]
	fn test_malformed_entry_fails() {
		assert!(AccessList::from_strs(["127.0.0.1", "nope"], Vec::<String>::new()).is_err());
		assert!(AccessList::from_strs(Vec::<String>::new(), ["::/200"]).is_err());
	}
}

// vim: ts=4
