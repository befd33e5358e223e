//! Client address extraction from HTTP requests
//!
//! Forwarding headers are only read in the mode naming them, and only the part
//! written by the proxy itself is used. Anything to the left of that comes from
//! the client and is ignored.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use hyper::Request;
use hyper::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Where the client address comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientIpMode {
	/// Peer address of the TCP connection
	#[default]
	Direct,
	/// Behind a reverse proxy appending to `X-Forwarded-For`
	Proxy,
	/// Behind a reverse proxy setting `X-Real-IP`
	RealIp,
	/// Behind a reverse proxy appending to `Forwarded` (RFC 7239)
	Forwarded,
}

/// Extract the client address of a request
///
/// - `Direct`: peer address from `ConnectInfo`
/// - `Proxy`: rightmost `X-Forwarded-For` entry
/// - `RealIp`: last `X-Real-IP` header
/// - `Forwarded`: `for=` of the rightmost `Forwarded` element
///
/// The proxy modes fall back to the peer address when the header is missing
/// or unparseable.
pub fn extract_client_ip<B>(req: &Request<B>, mode: ClientIpMode) -> Option<Address> {
	let peer = || req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());
	let ip = match mode {
		ClientIpMode::Direct => peer(),
		ClientIpMode::Proxy => extract_from_xff(req).or_else(peer),
		ClientIpMode::RealIp => extract_from_x_real_ip(req).or_else(peer),
		ClientIpMode::Forwarded => extract_from_forwarded(req).or_else(peer),
	};
	ip.map(|ip| Address::from(ip.to_canonical()))
}

/// Last occurrence of a header; proxies append new lines after existing ones
fn last_header<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
	req.headers().get_all(name).iter().next_back().and_then(|h: &HeaderValue| h.to_str().ok())
}

/// Rightmost entry of X-Forwarded-For, appended by the trusted proxy
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	last_header(req, "x-forwarded-for")
		.and_then(|s| s.rsplit(',').next())
		.and_then(|ip| ip.trim().parse().ok())
}

fn extract_from_x_real_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	last_header(req, "x-real-ip").and_then(|s| s.trim().parse().ok())
}

/// `for=` parameter of the rightmost Forwarded element
fn extract_from_forwarded<B>(req: &Request<B>) -> Option<IpAddr> {
	let element = last_header(req, "forwarded")?.rsplit(',').next()?;
	let value = element
		.split(';')
		.map(str::trim)
		.find(|pair| pair.get(..4).is_some_and(|key| key.eq_ignore_ascii_case("for=")))?
		.get(4..)?;
	let cleaned = value.trim_matches('"').trim_start_matches('[');
	// "[2001:db8::1]:4711" or "[2001:db8::1]"
	let cleaned = cleaned.split(']').next().unwrap_or(cleaned);
	cleaned.parse().ok().or_else(|| cleaned.parse::<SocketAddr>().ok().map(|sa| sa.ip()))
}


// vim: ts=4
