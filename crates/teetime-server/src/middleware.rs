use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Caller-supplied IDs are only echoed when short and printable.
fn accept_inbound(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let sane = !trimmed.is_empty()
        && trimmed.len() <= MAX_REQUEST_ID_LEN
        && trimmed.bytes().all(|b| b.is_ascii_graphic());
    sane.then(|| trimmed.to_owned())
}

/// Reuses a sane inbound `x-request-id` or mints a `UUIDv4`, then exposes it
/// to handlers as [`RequestId`] and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(accept_inbound)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_ids() {
        assert_eq!(accept_inbound(" req-42 ").as_deref(), Some("req-42"));
    }

    #[test]
    fn rejects_blank_oversized_and_spaced_ids() {
        assert_eq!(accept_inbound("   "), None);
        assert_eq!(accept_inbound(&"x".repeat(MAX_REQUEST_ID_LEN + 1)), None);
        assert_eq!(accept_inbound("two words"), None);
    }
}
