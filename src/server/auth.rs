//! HTTP basic authentication middleware.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Accounts accepted by `require_basic_auth`
#[derive(Debug, Clone)]
pub struct BasicAuth {
    users: BTreeMap<String, String>,
    realm: String,
}

impl BasicAuth {
    pub fn new(users: BTreeMap<String, String>, realm: impl Into<String>) -> Self {
        Self {
            users,
            realm: realm.into(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Username if `headers` carry valid credentials
    pub fn authenticate(&self, headers: &HeaderMap) -> Option<&str> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        let (name, expected) = self.users.get_key_value(user)?;
        (expected == password).then_some(name.as_str())
    }

    fn challenge(&self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", self.realm))],
            Json(serde_json::json!({ "error": "unauthorized" })),
        )
            .into_response()
    }
}

pub async fn require_basic_auth(State(auth): State<Arc<BasicAuth>>, req: Request, next: Next) -> Response {
    match auth.authenticate(req.headers()) {
        Some(user) => {
            tracing::debug!(user, path = req.uri().path(), "authenticated");
            next.run(req).await
        }
        None => {
            tracing::warn!(path = req.uri().path(), "authentication failed");
            auth.challenge()
        }
    }
}

/// `Authorization` header value for `user:password`
pub fn basic_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}
