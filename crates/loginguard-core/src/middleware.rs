//! Tower middleware guarding login routes
//!
//! The layer runs the access check before the wrapped handler. Blocked requests
//! are answered with HTTP 403 when `ban_http_status` is set; otherwise the
//! verdict travels to the handler in the request extensions so it can render an
//! in-page message. The handler also finds the request's [`LoginFlow`] there and
//! reports authentication failures through it.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::Json;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use hyper::Request;
use tower::{Layer, Service};

use crate::duration::format_duration;
use crate::extract::{ClientIpMode, extract_client_ip};
use crate::gate::AccessResult;
use crate::guard::{LoginFlow, LoginGuard};
use crate::prelude::*;

/// Client address of the current request, as seen by the guard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientAddress(pub Address);

/// Response for a request refused by the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
	Denied,
	Banned { remaining: u64 },
}

impl GuardRejection {
	/// Rejection for a blocked result, `None` if the request is allowed
	pub fn from_access(result: AccessResult) -> Option<Self> {
		match result {
			AccessResult::Allowed => None,
			AccessResult::Denied => Some(GuardRejection::Denied),
			AccessResult::Banned { remaining } => Some(GuardRejection::Banned { remaining }),
		}
	}

	pub fn access_result(self) -> AccessResult {
		match self {
			GuardRejection::Denied => AccessResult::Denied,
			GuardRejection::Banned { remaining } => AccessResult::Banned { remaining },
		}
	}
}

impl IntoResponse for GuardRejection {
	fn into_response(self) -> Response {
		let message = self.access_result().message();
		match self {
			GuardRejection::Banned { remaining } => {
				let body = serde_json::json!({
					"error": {
						"code": "E-LOGIN-BANNED",
						"message": message,
						"details": {
							"remainingSecs": remaining,
							"retryIn": format_duration(remaining)
						}
					}
				});
				let mut response = (StatusCode::FORBIDDEN, Json(body)).into_response();
				if let Ok(val) = remaining.to_string().parse() {
					response.headers_mut().insert("Retry-After", val);
				}
				response
			}
			GuardRejection::Denied => {
				let body = serde_json::json!({
					"error": {
						"code": "E-LOGIN-DENIED",
						"message": message
					}
				});
				(StatusCode::FORBIDDEN, Json(body)).into_response()
			}
		}
	}
}

#[derive(Clone)]
pub struct LoginGuardLayer {
	guard: Arc<LoginGuard>,
	mode: ClientIpMode,
}

impl LoginGuardLayer {
	pub fn new(guard: Arc<LoginGuard>, mode: ClientIpMode) -> Self {
		Self { guard, mode }
	}
}

impl<S> Layer<S> for LoginGuardLayer {
	type Service = LoginGuardService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		LoginGuardService { inner, guard: self.guard.clone(), mode: self.mode }
	}
}

#[derive(Clone)]
pub struct LoginGuardService<S> {
	inner: S,
	guard: Arc<LoginGuard>,
	mode: ClientIpMode,
}

impl<S> Service<Request<Body>> for LoginGuardService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let guard = self.guard.clone();
		let mode = self.mode;
		let mut inner = self.inner.clone();

		Box::pin(async move {
			let Some(address) = extract_client_ip(&req, mode) else {
				warn!("Client address unavailable, login request not guarded");
				return inner.call(req).await;
			};

			let flow: LoginFlow = guard.flow();
			let result = flow.check_access(&address, Timestamp::now()).await;

			if guard.ban_http_status()
				&& let Some(rejection) = GuardRejection::from_access(result)
			{
				return Ok(rejection.into_response());
			}

			req.extensions_mut().insert(ClientAddress(address));
			req.extensions_mut().insert(result);
			req.extensions_mut().insert(flow);
			inner.call(req).await
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_allowed_is_not_rejected() {
		assert_eq!(GuardRejection::from_access(AccessResult::Allowed), None);
		assert_eq!(
			GuardRejection::from_access(AccessResult::Banned { remaining: 5 }),
			Some(GuardRejection::Banned { remaining: 5 })
		);
	}

	#[tokio::test]
	async fn test_banned_rejection() {
		let response = GuardRejection::Banned { remaining: 120 }.into_response();
		assert_eq!(response.status(), StatusCode::FORBIDDEN);
		assert_eq!(
			response.headers().get("Retry-After").and_then(|v| v.to_str().ok()),
			Some("120")
		);
		let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(body["error"]["code"], "E-LOGIN-BANNED");
		assert_eq!(body["error"]["details"]["retryIn"], "2m");
		assert_eq!(
			body["error"]["message"],
			"Too many failed login attempts. Please retry in 2m."
		);
	}

	#[tokio::test]
	async fn test_denied_rejection() {
		let response = GuardRejection::Denied.into_response();
		assert_eq!(response.status(), StatusCode::FORBIDDEN);
		assert!(response.headers().get("Retry-After").is_none());
		let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
		assert_eq!(body["error"]["code"], "E-LOGIN-DENIED");
		assert_eq!(body["error"]["message"], "Access denied.");
	}
}

// vim: ts=4
