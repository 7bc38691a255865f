use axum::{
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{HeaderMap, header::USER_AGENT},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::AppState;
use crate::db::NewRequestLog;

/// Writes one request-log row for every request that reaches the gated API,
/// after the response status is known.
pub async fn record_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path().to_string(), |uri| uri.path().to_string());
    let method = request.method().to_string();

    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let ip_address = resolve_client_ip(
        request.headers(),
        peer_ip,
        state.shared.config.server.trust_forwarded_for,
    )
    .map(|ip| ip.to_string());

    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    state
        .shared
        .audit
        .record(NewRequestLog {
            endpoint,
            method,
            status_code: response.status().as_u16(),
            ip_address,
            user_agent,
        })
        .await;

    response
}

fn extract_forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<IpAddr>().ok())
}

fn resolve_client_ip(
    headers: &HeaderMap,
    peer_ip: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        extract_forwarded_ip(headers).or(peer_ip)
    } else {
        peer_ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_resolve_client_ip() {
        let peer: IpAddr = "10.0.0.1".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(resolve_client_ip(&headers, Some(peer), true), Some(peer));

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(
            resolve_client_ip(&headers, Some(peer), true),
            Some("203.0.113.7".parse().unwrap())
        );
        assert_eq!(resolve_client_ip(&headers, Some(peer), false), Some(peer));

        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        assert_eq!(resolve_client_ip(&headers, None, true), None);
    }
}
