//! Server configuration, read from a YAML file

use std::path::{Path, PathBuf};

use serde::Deserialize;

use loginguard_core::GuardConfig;
use loginguard_core::extract::ClientIpMode;
use loginguard_types::prelude::*;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
	pub listen: Box<str>,
	pub db_path: PathBuf,
	pub client_ip_mode: ClientIpMode,
	/// Demo credentials accepted by the login form
	pub demo_user: Box<str>,
	pub demo_password: Box<str>,
	pub guard: GuardConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			db_path: PathBuf::from("./data/ledger.db"),
			client_ip_mode: ClientIpMode::Direct,
			demo_user: "demo".into(),
			demo_password: "demo".into(),
			guard: GuardConfig::default(),
		}
	}
}

impl Config {
	/// Load from `path`, or use defaults if no path is given
	pub async fn load(path: Option<&Path>) -> LgResult<Self> {
		let Some(path) = path else {
			info!("No configuration file given, using defaults");
			return Ok(Self::default());
		};
		let text = tokio::fs::read_to_string(path).await?;
		let config: Config = serde_yaml::from_str(&text)
			.map_err(|err| Error::ConfigError(format!("{}: {}", path.display(), err)))?;
		config.guard.validate()?;
		Ok(config)
	}
}


// vim: ts=4
