//! Network address classification and CIDR matching for IPv4 and IPv6

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
	/// IPv4 (32-bit)
	Ipv4,
	/// IPv6 (128-bit)
	Ipv6,
}

impl AddressFamily {
	pub fn bit_width(self) -> u8 {
		match self {
			AddressFamily::Ipv4 => 32,
			AddressFamily::Ipv6 => 128,
		}
	}
}

impl std::fmt::Display for AddressFamily {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AddressFamily::Ipv4 => write!(f, "ipv4"),
			AddressFamily::Ipv6 => write!(f, "ipv6"),
		}
	}
}

/// Source address of a login request. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
	V4([u8; 4]),
	V6([u8; 16]),
}

impl Address {
	/// Parse dotted-quad IPv4 or colon-form IPv6 text
	pub fn parse(text: &str) -> LgResult<Self> {
		let text = text.trim();
		if let Ok(ip) = Ipv4Addr::from_str(text) {
			return Ok(Address::V4(ip.octets()));
		}
		if let Ok(ip) = Ipv6Addr::from_str(text) {
			return Ok(Address::V6(ip.octets()));
		}
		Err(Error::Parse(format!("invalid address: {:?}", text)))
	}

	pub fn family(&self) -> AddressFamily {
		match self {
			Address::V4(_) => AddressFamily::Ipv4,
			Address::V6(_) => AddressFamily::Ipv6,
		}
	}

	pub fn octets(&self) -> &[u8] {
		match self {
			Address::V4(octets) => octets,
			Address::V6(octets) => octets,
		}
	}
}

impl FromStr for Address {
	type Err = Error;

	fn from_str(s: &str) -> LgResult<Self> {
		Address::parse(s)
	}
}

impl From<IpAddr> for Address {
	fn from(ip: IpAddr) -> Self {
		match ip {
			IpAddr::V4(ip) => Address::V4(ip.octets()),
			IpAddr::V6(ip) => Address::V6(ip.octets()),
		}
	}
}

impl From<Address> for IpAddr {
	fn from(addr: Address) -> Self {
		match addr {
			Address::V4(octets) => IpAddr::V4(Ipv4Addr::from(octets)),
			Address::V6(octets) => IpAddr::V6(Ipv6Addr::from(octets)),
		}
	}
}

impl std::fmt::Display for Address {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", IpAddr::from(*self))
	}
}

impl Serialize for Address {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;
		Address::parse(&text).map_err(serde::de::Error::custom)
	}
}

/// Network mask of `prefix` leading set bits in a 32-bit word
pub fn ipv4_mask(prefix: u8) -> u32 {
	match prefix {
		0 => 0,
		p if p >= 32 => u32::MAX,
		p => u32::MAX << (32 - u32::from(p)),
	}
}

/// Network mask of `prefix` leading set bits over 16 bytes
pub fn ipv6_mask(prefix: u8) -> [u8; 16] {
	let mut mask = [0u8; 16];
	let mut remaining = usize::from(prefix.min(128));
	for byte in &mut mask {
		let bits = remaining.min(8);
		if bits == 0 {
			break;
		}
		*byte = 0xff << (8 - bits);
		remaining -= bits;
	}
	mask
}

/// An address block sharing `prefix` leading bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrRange {
	network: Address,
	prefix: u8,
}

impl CidrRange {
	/// Build a range, masking host bits off the network address
	pub fn new(address: Address, prefix: u8) -> LgResult<Self> {
		let width = address.family().bit_width();
		if prefix > width {
			return Err(Error::Parse(format!(
				"prefix length /{} exceeds {} bits of {}",
				prefix,
				width,
				address.family()
			)));
		}
		let network = match address {
			Address::V4(octets) => {
				Address::V4((u32::from_be_bytes(octets) & ipv4_mask(prefix)).to_be_bytes())
			}
			Address::V6(octets) => {
				let mask = ipv6_mask(prefix);
				let mut masked = [0u8; 16];
				for (i, byte) in masked.iter_mut().enumerate() {
					*byte = octets[i] & mask[i];
				}
				Address::V6(masked)
			}
		};
		Ok(Self { network, prefix })
	}

	/// Parse `address/prefix` text
	pub fn parse(text: &str) -> LgResult<Self> {
		let (addr, prefix) = text
			.trim()
			.split_once('/')
			.ok_or_else(|| Error::Parse(format!("missing prefix length: {:?}", text)))?;
		let address = Address::parse(addr)?;
		// Plain decimal only: no sign, no leading zeros
		let plain = !prefix.is_empty()
			&& prefix.bytes().all(|b| b.is_ascii_digit())
			&& (prefix == "0" || !prefix.starts_with('0'));
		let prefix: u8 = prefix
			.parse()
			.ok()
			.filter(|_| plain)
			.ok_or_else(|| Error::Parse(format!("invalid prefix length: {:?}", text)))?;
		Self::new(address, prefix)
	}

	pub fn network(&self) -> Address {
		self.network
	}

	pub fn prefix(&self) -> u8 {
		self.prefix
	}

	pub fn family(&self) -> AddressFamily {
		self.network.family()
	}

	/// Whether `address` shares this range's leading bits. Never true across families.
	pub fn contains(&self, address: &Address) -> bool {
		match (self.network, address) {
			(Address::V4(net), Address::V4(addr)) => {
				let mask = ipv4_mask(self.prefix);
				u32::from_be_bytes(*addr) & mask == u32::from_be_bytes(net)
			}
			(Address::V6(net), Address::V6(addr)) => {
				let mask = ipv6_mask(self.prefix);
				addr.iter().zip(mask.iter()).zip(net.iter()).all(|((a, m), n)| a & m == *n)
			}
			_ => false,
		}
	}
}

impl FromStr for CidrRange {
	type Err = Error;

	fn from_str(s: &str) -> LgResult<Self> {
		CidrRange::parse(s)
	}
}

impl std::fmt::Display for CidrRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.network, self.prefix)
	}
}

/// A single whitelist or blacklist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEntry {
	Exact(Address),
	Range(CidrRange),
}

impl AccessEntry {
	pub fn parse(text: &str) -> LgResult<Self> {
		if text.contains('/') {
			CidrRange::parse(text).map(AccessEntry::Range)
		} else {
			Address::parse(text).map(AccessEntry::Exact)
		}
	}

	pub fn matches(&self, address: &Address) -> bool {
		match self {
			AccessEntry::Exact(entry) => entry == address,
			AccessEntry::Range(range) => range.contains(address),
		}
	}
}

impl FromStr for AccessEntry {
	type Err = Error;

	fn from_str(s: &str) -> LgResult<Self> {
		AccessEntry::parse(s)
	}
}

impl std::fmt::Display for AccessEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AccessEntry::Exact(addr) => write!(f, "{}", addr),
			AccessEntry::Range(range) => write!(f, "{}", range),
		}
	}
}

/// True if any entry matches `address`
pub fn matches_any(address: &Address, entries: &[AccessEntry]) -> bool {
	entries.iter().any(|entry| entry.matches(address))
}


// vim: ts=4
