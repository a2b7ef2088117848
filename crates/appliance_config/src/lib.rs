use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;
pub use models::*;

/// Load the application configuration.
///
/// Sources are layered in this order, later ones winning:
/// `config/default`, `config/{RUN_ENV}`, then `APPLIANCE_BUDDY__*` environment
/// variables. `"secret_from_env"` markers are resolved afterwards and the
/// short variable names used by hosted deployments (`SUPABASE_URL`, `PORT`, ...)
/// fill whatever is still empty.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .try_parsing(true),
        );

    let raw: serde_json::Value = builder.build()?.try_deserialize()?;
    let config = resolve_secrets(raw)?;
    Ok(apply_legacy_env(config))
}

/// Resolve `"secret_from_env"` markers and deserialize into `AppConfig`.
pub fn resolve_secrets(mut raw: serde_json::Value) -> Result<AppConfig, ConfigError> {
    env_vars::inject_env_vars(&mut raw);
    serde_json::from_value(raw).map_err(|e| ConfigError::Message(e.to_string()))
}

/// Fill empty settings from the unprefixed variables the deployment scripts set.
pub fn apply_legacy_env(mut config: AppConfig) -> AppConfig {
    if let Ok(port) = env::var("PORT") {
        if let Ok(port) = port.parse() {
            config.server.port = port;
        }
    }

    let url = env::var("SUPABASE_URL").ok();
    let anon_key = env::var("SUPABASE_ANON_KEY").ok();
    let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY").ok();
    if url.is_none() && anon_key.is_none() && service_role_key.is_none() {
        return config;
    }

    let supabase = config.supabase.get_or_insert_with(SupabaseConfig::default);
    if supabase.url.trim().is_empty() {
        if let Some(url) = url {
            supabase.url = url;
        }
    }
    if supabase.anon_key.trim().is_empty() {
        if let Some(anon_key) = anon_key {
            supabase.anon_key = anon_key;
        }
    }
    if supabase.service_role_key().is_none() {
        supabase.service_role_key = service_role_key;
    }
    config
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// `DOTENV_OVERRIDE` wins over a `.env*` first command line argument, which
/// wins over plain `.env`. The file is read at most once per process.
///
/// # Returns
///
/// The path that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_secrets_defaults_missing_sections() {
        let config = resolve_secrets(json!({ "server": { "host": "127.0.0.1", "port": 8080 } }))
            .expect("config should deserialize");

        assert_eq!(config.server.port, 8080);
        assert!(!config.use_supabase);
        assert!(config.supabase.is_none());
        assert_eq!(config.cache.path, ".appliance_buddy/appliances.json");
        assert_eq!(config.logging.level, "info");
        assert!(config.active_supabase().is_none());
    }

    #[test]
    fn test_active_supabase_requires_flag_and_complete_section() {
        let mut config = resolve_secrets(json!({
            "use_supabase": false,
            "supabase": { "url": "https://demo.supabase.co", "anon_key": "anon" }
        }))
        .expect("config should deserialize");
        assert!(config.active_supabase().is_none());

        config.use_supabase = true;
        let supabase = config.active_supabase().expect("supabase should be active");
        assert_eq!(supabase.url, "https://demo.supabase.co");
        assert_eq!(supabase.timeout_secs, 30);

        config.supabase = Some(SupabaseConfig {
            url: String::new(),
            ..SupabaseConfig::default()
        });
        assert!(config.active_supabase().is_none());
    }

    #[test]
    fn test_unresolved_marker_is_not_a_key() {
        let supabase = SupabaseConfig {
            url: "https://demo.supabase.co".into(),
            anon_key: "anon".into(),
            service_role_key: Some(SECRET_MARKER.into()),
            timeout_secs: 30,
        };
        assert_eq!(supabase.service_role_key(), None);
    }
}
