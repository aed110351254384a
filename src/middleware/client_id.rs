use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// HTTP header carrying the browser client's identity
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const MAX_CLIENT_ID_LEN: usize = 64;

/// Identity of the browser client that sent the request
///
/// All per-client state (interaction counts, recent searches, the stored
/// user) is keyed by this value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts up to 64 ASCII letters, digits, `-` or `_`
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_CLIENT_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reads the client ID from `x-client-id`, or issues a fresh one when it is
/// missing or malformed. The ID is stored in the request extensions and
/// echoed on the response so the client can keep using it.
pub async fn client_id_middleware(mut request: Request, next: Next) -> Response {
    let client_id = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(ClientId::parse)
        .unwrap_or_else(ClientId::new);

    request.extensions_mut().insert(client_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(client_id.as_str()) {
        response.headers_mut().insert(CLIENT_ID_HEADER, header_value);
    }

    response
}

/// Tracing span for a request, tagged with its client ID
pub fn make_span_with_client_id(request: &Request<Body>) -> tracing::Span {
    let client_id = request
        .extensions()
        .get::<ClientId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        client_id = %client_id,
    )
}
