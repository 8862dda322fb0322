use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Sentinel stored when no client address can be determined.
pub const UNKNOWN_IP: &str = "unknown";

/// Server-observed request context attached to every ingested event.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            ip: client_ip(headers, peer),
            user_agent: headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
        }
    }
}

/// Resolve the client address: first hop of `x-forwarded-for` when it
/// parses as an address, then the socket peer, then the sentinel.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| hop.parse::<IpAddr>().is_ok());

    if let Some(hop) = forwarded {
        return hop.to_string();
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_IP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.0.2.1:4242".parse().unwrap())
    }

    #[test]
    fn prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_peer_without_header() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "192.0.2.1");
    }

    #[test]
    fn garbage_forwarded_hop_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert_eq!(client_ip(&headers, peer()), "192.0.2.1");
    }

    #[test]
    fn sentinel_when_nothing_is_known() {
        assert_eq!(client_ip(&HeaderMap::new(), None), UNKNOWN_IP);
    }
}
