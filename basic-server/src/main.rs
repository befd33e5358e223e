//! Demo server: a login form guarded by loginguard
//!
//! Configuration is read from the YAML file named by `LOGINGUARD_CONFIG`;
//! logging is controlled with `RUST_LOG`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use loginguard_core::LoginGuard;
use loginguard_ledger_adapter_sqlite::LedgerAdapterSqlite;
use loginguard_types::ledger_adapter::LedgerAdapter;
use loginguard_types::prelude::*;

mod config;
mod handler;

use config::Config;

const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Remove ledger rows older than the retention window, periodically
async fn purge_task(adapter: Arc<LedgerAdapterSqlite>, retention_secs: u64) {
	let mut interval = tokio::time::interval(PURGE_INTERVAL);
	loop {
		interval.tick().await;
		let before = Timestamp::now().sub_secs(retention_secs);
		match adapter.purge_before(before).await {
			Ok(0) => {}
			Ok(n) => info!("Purged {} ledger events before {}", n, before),
			Err(err) => error!("Ledger purge failed: {}", err),
		}
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let config_path = std::env::var_os("LOGINGUARD_CONFIG").map(PathBuf::from);
	let config = Arc::new(Config::load(config_path.as_deref()).await?);

	let adapter = Arc::new(LedgerAdapterSqlite::new(&config.db_path).await?);
	let ledger: Arc<dyn LedgerAdapter> = adapter.clone();
	let guard = Arc::new(LoginGuard::new(&config.guard, ledger)?);

	tokio::spawn(purge_task(adapter, config.guard.retention_secs()));

	let app = handler::router(config.clone(), guard);

	let listener = tokio::net::TcpListener::bind(&*config.listen).await?;
	info!("Listening on {}", config.listen);
	axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

	Ok(())
}

// vim: ts=4
