// --- File: crates/services/appliance_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Chooses the store and identity implementations from the configuration:
//! Supabase when it is enabled and complete, otherwise an in-memory store
//! where every request runs as the mock user.
use appliance_api::ApiState;
use appliance_common::error::ApplianceError;
use appliance_common::services::{
    ApplianceStore, Clock, IdentityProvider, SystemClock, TokenVerifier,
};
use appliance_config::AppConfig;
use appliance_core::{ApplianceSession, FileCache, MemoryStore, StaticIdentityProvider};
use appliance_supabase::{SupabaseAuth, SupabaseClient, SupabaseStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ApplianceServiceFactory {
    store: Arc<dyn ApplianceStore>,
    identity_provider: Arc<dyn IdentityProvider>,
    /// `None` in mock mode.
    verifier: Option<Arc<dyn TokenVerifier>>,
    clock: Arc<dyn Clock>,
    cache_path: PathBuf,
}

impl ApplianceServiceFactory {
    pub fn new(config: &AppConfig) -> Result<Self, ApplianceError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache_path = PathBuf::from(&config.cache.path);

        let Some(supabase) = config.active_supabase() else {
            if config.use_supabase {
                warn!("use_supabase is set but the Supabase section is incomplete");
            }
            info!("ℹ️ Running in mock mode with an in-memory store");
            return Ok(Self {
                store: Arc::new(MemoryStore::new(clock.clone())),
                identity_provider: Arc::new(StaticIdentityProvider::default()),
                verifier: None,
                clock,
                cache_path,
            });
        };

        info!("ℹ️ Initializing Supabase services for {}", supabase.url);
        let client = SupabaseClient::from_config(supabase)?;
        let auth = Arc::new(SupabaseAuth::new(client.clone()));
        let verifier: Arc<dyn TokenVerifier> = auth.clone();
        Ok(Self {
            store: Arc::new(SupabaseStore::new(client, clock.clone())),
            identity_provider: auth,
            verifier: Some(verifier),
            clock,
            cache_path,
        })
    }

    pub fn is_mock_mode(&self) -> bool {
        self.verifier.is_none()
    }

    pub fn api_state(&self) -> ApiState {
        ApiState::new(self.store.clone(), self.verifier.clone(), self.clock.clone())
    }

    #[allow(dead_code)]
    pub fn identity_provider(&self) -> Arc<dyn IdentityProvider> {
        self.identity_provider.clone()
    }

    /// A session over the configured store and the on-disk snapshot.
    #[allow(dead_code)]
    pub fn session(&self) -> ApplianceSession {
        ApplianceSession::new(
            self.store.clone(),
            Arc::new(FileCache::new(self.cache_path.clone())),
            self.clock.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appliance_config::SupabaseConfig;
    use appliance_core::DataSource;

    #[tokio::test]
    async fn test_default_config_runs_in_mock_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cache.path = dir.path().join("appliances.json").display().to_string();

        let factory = ApplianceServiceFactory::new(&config).unwrap();
        assert!(factory.is_mock_mode());
        assert!(factory.api_state().is_mock_mode());

        let mut session = factory.session();
        session
            .initialize(factory.identity_provider().as_ref())
            .await
            .unwrap();
        assert_eq!(session.source(), Some(DataSource::SampleData));
        assert_eq!(session.appliances().len(), 22);
    }

    #[test]
    fn test_incomplete_supabase_falls_back_to_mock_mode() {
        let config = AppConfig {
            use_supabase: true,
            supabase: Some(SupabaseConfig {
                url: "https://demo.supabase.co".into(),
                ..SupabaseConfig::default()
            }),
            ..AppConfig::default()
        };
        assert!(ApplianceServiceFactory::new(&config).unwrap().is_mock_mode());
    }

    #[test]
    fn test_complete_supabase_verifies_tokens() {
        let config = AppConfig {
            use_supabase: true,
            supabase: Some(SupabaseConfig {
                url: "https://demo.supabase.co".into(),
                anon_key: "anon".into(),
                service_role_key: None,
                timeout_secs: 5,
            }),
            ..AppConfig::default()
        };
        let factory = ApplianceServiceFactory::new(&config).unwrap();
        assert!(!factory.is_mock_mode());
    }
}
