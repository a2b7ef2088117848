// --- File: crates/appliance_supabase/src/auth.rs ---
//! Supabase Auth (GoTrue) as an `IdentityProvider` and `TokenVerifier`.

use std::sync::{Mutex, MutexGuard};

use appliance_common::error::{ApplianceError, StoreError};
use appliance_common::models::{Identity, IdentityEvent};
use appliance_common::services::{BoxFuture, IdentityProvider, TokenVerifier};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::client::SupabaseClient;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl AuthUser {
    fn into_identity(self, access_token: String) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email,
            access_token: Some(access_token),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug)]
struct Session {
    identity: Identity,
    refresh_token: Option<String>,
}

/// Client errors from the auth endpoints mean the credentials or token were rejected.
fn auth_error(err: StoreError) -> ApplianceError {
    match err {
        StoreError::Api { status, message } if (400..500).contains(&status) => {
            ApplianceError::NotAuthenticated(message)
        }
        other => other.into(),
    }
}

pub struct SupabaseAuth {
    client: SupabaseClient,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<IdentityEvent>,
}

impl SupabaseAuth {
    pub fn new(client: SupabaseClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            session: Mutex::new(None),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn install(
        &self,
        identity: Identity,
        refresh_token: Option<String>,
        event: fn(Identity) -> IdentityEvent,
    ) -> Identity {
        *self.lock() = Some(Session {
            identity: identity.clone(),
            refresh_token,
        });
        let _ = self.events.send(event(identity.clone()));
        identity
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<TokenResponse, ApplianceError> {
        let request = self
            .client
            .request(Method::POST, &self.client.auth_url("token"), None)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        self.client.send_json(request).await.map_err(auth_error)
    }

    /// Resolve the user behind an access token.
    async fn fetch_user(&self, access_token: &str) -> Result<Identity, ApplianceError> {
        let request =
            self.client
                .request_with_token(Method::GET, &self.client.auth_url("user"), access_token);
        let user: AuthUser = self.client.send_json(request).await.map_err(auth_error)?;
        Ok(user.into_identity(access_token.to_string()))
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ApplianceError> {
        let response = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        let identity = response.user.into_identity(response.access_token);
        info!("Signed in as {}", identity.user_id);
        Ok(self.install(identity, response.refresh_token, IdentityEvent::SignedIn))
    }

    /// Adopt a session obtained elsewhere, e.g. restored from a previous run.
    pub async fn set_session(
        &self,
        access_token: &str,
        refresh_token: Option<String>,
    ) -> Result<Identity, ApplianceError> {
        let identity = self.fetch_user(access_token).await?;
        info!("Restored session for {}", identity.user_id);
        Ok(self.install(identity, refresh_token, IdentityEvent::SignedIn))
    }

    pub async fn refresh_session(&self) -> Result<Identity, ApplianceError> {
        let refresh_token = self
            .lock()
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
            .ok_or_else(|| ApplianceError::NotAuthenticated("No session to refresh".to_string()))?;
        let response = self
            .token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await?;
        let identity = response.user.into_identity(response.access_token);
        Ok(self.install(identity, response.refresh_token, IdentityEvent::TokenRefreshed))
    }

    /// Forget the session. The local state is cleared even when the remote
    /// logout call fails.
    pub async fn sign_out(&self) {
        let previous = self.lock().take();
        let Some(session) = previous else {
            return;
        };
        if let Some(token) = session.identity.access_token.as_deref() {
            let request =
                self.client
                    .request_with_token(Method::POST, &self.client.auth_url("logout"), token);
            if let Err(e) = self.client.send_empty(request).await {
                warn!("Remote logout failed: {}", e);
            }
        }
        info!("Signed out {}", session.identity.user_id);
        let _ = self.events.send(IdentityEvent::SignedOut);
    }
}

impl IdentityProvider for SupabaseAuth {
    fn current_identity(&self) -> BoxFuture<'_, Option<Identity>, ApplianceError> {
        let current = self.lock().as_ref().map(|session| session.identity.clone());
        Box::pin(async move { Ok(current) })
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}

impl TokenVerifier for SupabaseAuth {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Identity, ApplianceError> {
        Box::pin(self.fetch_user(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_mean_not_authenticated() {
        let rejected = auth_error(StoreError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        });
        assert!(matches!(rejected, ApplianceError::NotAuthenticated(m) if m == "Invalid login credentials"));

        let outage = auth_error(StoreError::Api {
            status: 503,
            message: "down".to_string(),
        });
        assert!(matches!(outage, ApplianceError::RemoteUnavailable(_)));
    }
}
