//! Ban-decision engine for loginguard.
//!
//! Tracks failed login attempts per source address through a [`LedgerAdapter`],
//! bans addresses that exceed the failure threshold and escalates ban durations
//! for repeat offenders. Static whitelist and blacklist entries bypass the
//! dynamic logic.
//!
//! [`LedgerAdapter`]: loginguard_types::ledger_adapter::LedgerAdapter

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access_list;
pub mod config;
pub mod duration;
pub mod escalation;
pub mod extract;
pub mod gate;
pub mod guard;
pub mod ledger;
pub mod middleware;
pub mod prelude;

// Re-export commonly used types
pub use access_list::{AccessList, Decision};
pub use config::GuardConfig;
pub use escalation::{EscalationEngine, EscalationPolicy};
pub use gate::{AccessResult, BanGate, BanState};
pub use guard::{LoginFlow, LoginGuard};
pub use ledger::BanLedger;
pub use middleware::LoginGuardLayer;

// vim: ts=4
