//! Request correlation IDs.
//!
//! An `x-request-id` from an upstream proxy is reused when it looks sane,
//! otherwise a UUID v4 is minted. The ID lands on the `http_request` span, the
//! Sentry scope and the response, so a cart failure reported by a customer can
//! be traced back to its log lines.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound ID accepted as-is.
const MAX_INBOUND_LEN: usize = 128;

/// The caller's request ID if usable, else a fresh one.
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INBOUND_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Tag the request with its correlation ID and echo it back.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn headers(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_reuses_upstream_id() {
        assert_eq!(resolve_request_id(&headers("cf-7a1b2c")), "cf-7a1b2c");
    }

    #[test]
    fn test_replaces_unusable_ids() {
        let blank = resolve_request_id(&headers("   "));
        assert!(Uuid::parse_str(&blank).is_ok());

        let spaced = resolve_request_id(&headers("two words"));
        assert!(Uuid::parse_str(&spaced).is_ok());

        let long = resolve_request_id(&headers(&"a".repeat(MAX_INBOUND_LEN + 1)));
        assert!(Uuid::parse_str(&long).is_ok());

        let missing = resolve_request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&missing).is_ok());
    }
}
