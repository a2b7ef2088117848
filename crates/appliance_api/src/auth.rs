// --- File: crates/appliance_api/src/auth.rs ---
//! Resolves the caller of every `/api` request.

use std::sync::Arc;

use appliance_common::error::ApplianceError;
use appliance_common::models::Identity;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::handlers::ApiState;

/// Development user every request acts as when no token verifier is configured.
pub const MOCK_USER_ID: &str = "mock-user-id";
pub const MOCK_USER_EMAIL: &str = "mock@example.com";

pub fn mock_identity() -> Identity {
    Identity {
        user_id: MOCK_USER_ID.to_string(),
        email: Some(MOCK_USER_EMAIL.to_string()),
        access_token: None,
    }
}

/// The identity a request runs as.
///
/// With a verifier the `Authorization: Bearer` token is mandatory and is
/// checked on every request. Without one the request runs as the mock user.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Identity);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<Arc<ApiState>> for RequestIdentity {
    type Rejection = ApplianceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(verifier) = state.verifier.as_ref() else {
            return Ok(Self(mock_identity()));
        };

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApplianceError::NotAuthenticated("Missing bearer token".to_string())
        })?;
        match verifier.verify(token).await {
            Ok(identity) => {
                debug!("Request authenticated as {}", identity.user_id);
                Ok(Self(identity))
            }
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer eyJhbGci"));
        assert_eq!(bearer_token(&headers), Some("eyJhbGci"));
    }
}
