//! Rate limiting middleware using governor and `tower_governor`.
//!
//! The form endpoints are public and unauthenticated, so they are throttled
//! per client IP to keep scripted submissions from flooding the store.
//!
//! Client IP headers are only honoured when the site sits behind a proxy
//! that sets them (`SITE_TRUST_PROXY_HEADERS`); a directly exposed server
//! keys on the TCP peer address alone.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client IP.
///
/// With `trust_proxy_headers` set, checks `CF-Connecting-IP`, then the first
/// `X-Forwarded-For` hop, then `X-Real-IP`. Otherwise, or when none of those
/// parse, the TCP peer address is used, which requires serving with
/// `into_make_service_with_connect_info`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy_headers {
            forwarded_client_ip(req)
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client IP as reported by a reverse proxy.
fn forwarded_client_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let headers = req.headers();

    // Cloudflare's real client IP
    if let Some(ip) = headers
        .get("cf-connecting-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    // First hop of X-Forwarded-For
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the form API: ~30 requests per minute per IP.
///
/// Configuration: 1 request every 2 seconds (replenish), burst of 10.
/// A person filling in forms never comes close; a script does.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(2)` and `burst_size(10)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
#[allow(clippy::expect_used)]
pub fn api_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(2) // Replenish 1 token every 2 seconds
        .burst_size(10)
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(10) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    const BEHIND_PROXY: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: false,
    };

    fn request_with(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/contact");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    fn with_peer(mut req: Request<()>, peer: &str) -> Request<()> {
        let peer: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[test]
    fn test_extract_prefers_cloudflare_header() {
        let req = request_with(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1"),
        ]);
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_first_forwarded_hop() {
        let req = request_with(&[("x-forwarded-for", "198.51.100.1, 10.0.0.1")]);
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_falls_back_to_peer_address() {
        let req = with_peer(request_with(&[]), "192.0.2.10:51234");
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.10".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_ignores_headers_when_not_behind_proxy() {
        let peer = "192.0.2.10:51234";
        for spoofed in ["203.0.113.1", "203.0.113.2"] {
            let req = with_peer(
                request_with(&[
                    ("cf-connecting-ip", spoofed),
                    ("x-forwarded-for", spoofed),
                    ("x-real-ip", spoofed),
                ]),
                peer,
            );
            let ip = DIRECT.extract(&req).unwrap();
            assert_eq!(ip, "192.0.2.10".parse::<IpAddr>().unwrap());
        }
    }

    #[test]
    fn test_extract_without_any_source_fails() {
        let req = request_with(&[("x-forwarded-for", "not-an-ip")]);
        assert!(BEHIND_PROXY.extract(&req).is_err());

        let req = request_with(&[("x-forwarded-for", "203.0.113.9")]);
        assert!(DIRECT.extract(&req).is_err());
    }
}
