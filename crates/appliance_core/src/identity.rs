//! A manually driven identity provider.

use appliance_common::error::ApplianceError;
use appliance_common::models::{Identity, IdentityEvent};
use appliance_common::services::{BoxFuture, IdentityProvider, TokenVerifier};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::info;

const EVENT_CAPACITY: usize = 16;

/// Holds the current identity in memory and broadcasts every change.
///
/// Useful for tests and for embedding the session where sign-in happens
/// elsewhere. As a `TokenVerifier` it accepts only the current identity's
/// access token.
pub struct StaticIdentityProvider {
    current: Mutex<Option<Identity>>,
    events: broadcast::Sender<IdentityEvent>,
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl StaticIdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current: Mutex::new(initial),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Identity>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn sign_in(&self, identity: Identity) {
        info!("Signed in as {}", identity.user_id);
        *self.lock() = Some(identity.clone());
        // No subscribers is fine.
        let _ = self.events.send(IdentityEvent::SignedIn(identity));
    }

    pub fn sign_out(&self) {
        info!("Signed out");
        *self.lock() = None;
        let _ = self.events.send(IdentityEvent::SignedOut);
    }

    /// Replace the token of the signed-in user. Does nothing when signed out.
    pub fn refresh_token(&self, token: impl Into<String>) {
        let refreshed = {
            let mut current = self.lock();
            match current.as_mut() {
                Some(identity) => {
                    identity.access_token = Some(token.into());
                    identity.clone()
                }
                None => return,
            }
        };
        let _ = self.events.send(IdentityEvent::TokenRefreshed(refreshed));
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> BoxFuture<'_, Option<Identity>, ApplianceError> {
        let current = self.lock().clone();
        Box::pin(async move { Ok(current) })
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}

impl TokenVerifier for StaticIdentityProvider {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Identity, ApplianceError> {
        let current = self.lock().clone();
        Box::pin(async move {
            current
                .filter(|identity| identity.access_token.as_deref() == Some(token))
                .ok_or_else(|| ApplianceError::NotAuthenticated("Invalid token".to_string()))
        })
    }
}
