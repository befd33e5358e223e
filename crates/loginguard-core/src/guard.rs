//! Entry point used by the surrounding application

use std::sync::Arc;

use loginguard_types::ledger_adapter::{BanEvent, LedgerAdapter};

use crate::config::GuardConfig;
use crate::escalation::EscalationEngine;
use crate::gate::{AccessResult, BanGate};
use crate::ledger::BanLedger;
use crate::prelude::*;

/// Validated configuration plus the injected ledger adapter
#[derive(Debug)]
pub struct LoginGuard {
	adapter: Arc<dyn LedgerAdapter>,
	gate: BanGate,
	engine: EscalationEngine,
	ban_http_status: bool,
}

impl LoginGuard {
	pub fn new(config: &GuardConfig, adapter: Arc<dyn LedgerAdapter>) -> LgResult<Self> {
		config.validate()?;
		Ok(Self {
			adapter,
			gate: BanGate::new(config.access_list()?),
			engine: EscalationEngine::new(config.escalation_policy()),
			ban_http_status: config.ban_http_status,
		})
	}

	/// Start a login flow with its own ban cache
	pub fn flow(self: &Arc<Self>) -> LoginFlow {
		LoginFlow { guard: Arc::clone(self), ledger: BanLedger::new(Arc::clone(&self.adapter)) }
	}

	pub fn gate(&self) -> &BanGate {
		&self.gate
	}

	pub fn engine(&self) -> &EscalationEngine {
		&self.engine
	}

	/// Whether blocked requests get HTTP 403 instead of an in-page message
	pub fn ban_http_status(&self) -> bool {
		self.ban_http_status
	}
}

/// One login request: the access checks and failure recording of a request
/// share this value so they see the same ban record
#[derive(Clone, Debug)]
pub struct LoginFlow {
	guard: Arc<LoginGuard>,
	ledger: BanLedger,
}

impl LoginFlow {
	pub async fn check_access(&self, address: &Address, now: Timestamp) -> AccessResult {
		self.guard.gate.check_access(&self.ledger, address, now).await
	}

	/// To be called after authentication failed elsewhere
	pub async fn on_failed_attempt(
		&self,
		address: &Address,
		data: serde_json::Value,
		now: Timestamp,
	) -> Option<BanEvent> {
		self.guard.engine.on_failed_attempt(&self.ledger, address, data, now).await
	}

	pub fn ledger(&self) -> &BanLedger {
		&self.ledger
	}

	pub fn guard(&self) -> &LoginGuard {
		&self.guard
	}
}

// vim: ts=4
