use axum::http::HeaderMap;

/// Header carrying the acting user's identifier.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Per-request caller details handed explicitly to service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: String,
}

impl RequestContext {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .map(Self::new)
            .unwrap_or_else(Self::anonymous)
    }
}
