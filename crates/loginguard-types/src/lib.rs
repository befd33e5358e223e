//! Shared types, adapter traits, and core utilities for loginguard.
//!
//! This crate holds the values that both the ban-decision engine and the
//! persistence adapters need: addresses and CIDR ranges, ledger event records,
//! the `LedgerAdapter` trait and the common error type.

#![forbid(unsafe_code)]

pub mod address;
pub mod error;
pub mod ledger_adapter;
pub mod prelude;
pub mod types;

// vim: ts=4
