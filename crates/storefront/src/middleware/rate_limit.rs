//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Provides configurable rate limiters for different endpoint categories:
//! - `auth_rate_limiter`: Strict limits for login and signup (~10/min)
//! - `api_rate_limiter`: Relaxed limits for the rest of `/api` (~60/min after a burst of 50)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Proxy headers checked for the client address, in order.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Key extractor that prefers proxy headers and falls back to the socket
/// peer address.
///
/// The peer address is only present when the server is started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if let Some(ip) = ip_from_headers(req.headers()) {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// First parseable client address in the proxy headers.
///
/// `X-Forwarded-For` may carry a chain; its first entry is the client.
fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Seconds to replenish one auth token.
const AUTH_REPLENISH_SECS: u64 = 6;
const AUTH_BURST: u32 = 5;

/// Seconds to replenish one API token.
const API_REPLENISH_SECS: u64 = 1;
const API_BURST: u32 = 50;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(AUTH_REPLENISH_SECS) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(AUTH_BURST)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for general API: a burst of 50, then one request per
/// second (~60 per minute) per IP.
///
/// Configuration: 1 request per second (replenish), burst of 50.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(50)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(API_REPLENISH_SECS)
        .burst_size(API_BURST)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tower_governor::key_extractor::KeyExtractor;

    fn request_with(headers: &[(&'static str, &'static str)]) -> Request<()> {
        let mut req = Request::new(());
        for (name, value) in headers {
            req.headers_mut()
                .insert(*name, HeaderValue::from_static(value));
        }
        req
    }

    /// Requests per minute a client can sustain once its burst is spent.
    const fn sustained_per_minute(replenish_secs: u64) -> u64 {
        60 / replenish_secs
    }

    #[test]
    fn test_sustained_rates() {
        assert_eq!(sustained_per_minute(AUTH_REPLENISH_SECS), 10);
        assert_eq!(AUTH_BURST, 5);
        assert_eq!(sustained_per_minute(API_REPLENISH_SECS), 60);
        assert_eq!(API_BURST, 50);
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let req = request_with(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "203.0.113.7"),
        ]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let req = request_with(&[("x-forwarded-for", "198.51.100.4, 10.0.0.1")]);
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request_with(&[("x-real-ip", "not an ip")]);
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.9:51000".parse::<SocketAddr>().unwrap()));
        let ip = ClientIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_address_is_an_error() {
        let req = request_with(&[]);
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
