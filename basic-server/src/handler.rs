//! Demo login form and login handler

use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use loginguard_core::middleware::ClientAddress;
use loginguard_core::{AccessResult, LoginFlow, LoginGuard, LoginGuardLayer};
use loginguard_types::prelude::*;

use crate::config::Config;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
	pub user: String,
	pub password: String,
}

fn page(message: Option<&str>) -> Html<String> {
	let notice = message.map(|m| format!("<p class=\"notice\">{}</p>", m)).unwrap_or_default();
	Html(format!(
		"<!DOCTYPE html>
<html><head><title>Login</title></head><body>
{}
<form method=\"post\" action=\"/login\">
<input name=\"user\" placeholder=\"User\">
<input name=\"password\" type=\"password\" placeholder=\"Password\">
<button type=\"submit\">Login</button>
</form>
</body></html>",
		notice
	))
}

/// GET /login
pub async fn get_login(result: Option<Extension<AccessResult>>) -> impl IntoResponse {
	let message = result.and_then(|Extension(result)| result.message());
	page(message.as_deref())
}

/// POST /login
pub async fn post_login(
	State(config): State<Arc<Config>>,
	address: Option<Extension<ClientAddress>>,
	result: Option<Extension<AccessResult>>,
	flow: Option<Extension<LoginFlow>>,
	Form(form): Form<LoginForm>,
) -> impl IntoResponse {
	if let Some(message) = result.and_then(|Extension(result)| result.message()) {
		return (StatusCode::FORBIDDEN, page(Some(&message)));
	}

	if form.user == *config.demo_user && form.password == *config.demo_password {
		info!("User {} logged in", form.user);
		return (StatusCode::OK, page(Some("Welcome!")));
	}

	if let (Some(Extension(ClientAddress(address))), Some(Extension(flow))) = (address, flow) {
		let data = serde_json::json!({ "user": form.user });
		if let Some(ban) = flow.on_failed_attempt(&address, data, Timestamp::now()).await {
			let message = AccessResult::Banned { remaining: ban.duration }.message();
			return (StatusCode::FORBIDDEN, page(message.as_deref()));
		}
	}

	(StatusCode::UNAUTHORIZED, page(Some("Login failed.")))
}

/// Login routes behind the guard layer
pub fn router(config: Arc<Config>, guard: Arc<LoginGuard>) -> Router {
	Router::new()
		.route("/login", get(get_login).post(post_login))
		.layer(LoginGuardLayer::new(guard, config.client_ip_mode))
		.with_state(config)
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::net::SocketAddr;

	use axum::body::Body;
	use axum::extract::ConnectInfo;
	use axum::http::{Request, header};
	use tower::ServiceExt;

	use loginguard_core::GuardConfig;
	use loginguard_ledger_adapter_sqlite::LedgerAdapterSqlite;

	async fn app(dir: &tempfile::TempDir, guard: GuardConfig) -> Router {
		let config = Arc::new(Config { guard, ..Config::default() });
		let adapter = LedgerAdapterSqlite::new(dir.path().join("ledger.db")).await.unwrap();
		let guard = Arc::new(LoginGuard::new(&config.guard, Arc::new(adapter)).unwrap());
		router(config, guard)
	}

	fn login(user: &str, password: &str) -> Request<Body> {
		let mut req = Request::builder()
			.method("POST")
			.uri("/login")
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(format!("user={}&password={}", user, password)))
			.unwrap();
		req.extensions_mut().insert(ConnectInfo("192.0.2.7:4000".parse::<SocketAddr>().unwrap()));
		req
	}

	async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
		let response = app.clone().oneshot(req).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
		(status, String::from_utf8(bytes.to_vec()).unwrap())
	}

	#[tokio::test]
	async fn test_valid_login() {
		let dir = tempfile::tempdir().unwrap();
		let app = app(&dir, GuardConfig::default()).await;

		let (status, body) = send(&app, login("demo", "demo")).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("Welcome!"));
	}

	#[tokio::test]
	async fn test_ban_with_page_message() {
		let dir = tempfile::tempdir().unwrap();
		let app = app(&dir, GuardConfig { fail_max: 2, ..GuardConfig::default() }).await;

		let (status, body) = send(&app, login("demo", "wrong")).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert!(body.contains("Login failed."));

		// The failure that crosses the threshold reports the new ban
		let (status, body) = send(&app, login("demo", "wrong")).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(body.contains("Too many failed login attempts. Please retry in 2m."));

		// Correct credentials are not checked while banned
		let (status, body) = send(&app, login("demo", "demo")).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(body.contains("Too many failed login attempts"));
		assert!(!body.contains("Welcome!"));

		let mut req = Request::builder().uri("/login").body(Body::empty()).unwrap();
		req.extensions_mut().insert(ConnectInfo("192.0.2.7:4000".parse::<SocketAddr>().unwrap()));
		let (status, body) = send(&app, req).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body.contains("Too many failed login attempts"));
	}

	#[tokio::test]
	async fn test_ban_with_http_status() {
		let dir = tempfile::tempdir().unwrap();
		let guard = GuardConfig { fail_max: 1, ban_http_status: true, ..GuardConfig::default() };
		let app = app(&dir, guard).await;

		let (status, body) = send(&app, login("demo", "wrong")).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(body.contains("Too many failed login attempts"));

		// Rejected by the layer before the handler runs
		let (status, body) = send(&app, login("demo", "demo")).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(body.contains("E-LOGIN-BANNED"));
	}

	#[tokio::test]
	async fn test_blacklisted_client() {
		let dir = tempfile::tempdir().unwrap();
		let guard = GuardConfig { blacklist: vec!["192.0.2.0/24".into()], ..GuardConfig::default() };
		let app = app(&dir, guard).await;

		let (status, body) = send(&app, login("demo", "demo")).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		assert!(body.contains("Access denied."));
	}
}

// vim: ts=4
