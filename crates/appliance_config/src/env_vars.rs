//! Environment variable naming for Appliance Buddy configuration.
//!
//! Plain settings follow `APPLIANCE_BUDDY__SECTION__KEY`, secrets follow
//! `APPLIANCE_BUDDY_SECRET_SECTION_KEY` with a fallback to the short legacy
//! form (`SUPABASE_SERVICE_ROLE_KEY`) that the hosted deployments already use.

use std::env;

use crate::models::SECRET_MARKER;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "APPLIANCE_BUDDY";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "APPLIANCE_BUDDY_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// # Arguments
///
/// * `path` - The configuration path (e.g., "server.host")
///
/// # Returns
///
/// The environment variable name (e.g., "APPLIANCE_BUDDY__SERVER__HOST")
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
/// (e.g. "supabase.service_role_key" -> "APPLIANCE_BUDDY_SECRET_SUPABASE_SERVICE_ROLE_KEY").
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to its legacy short name
/// (e.g. "supabase.service_role_key" -> "SUPABASE_SERVICE_ROLE_KEY").
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Paths whose names mark them as credentials.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

/// Get an environment variable for a path
///
/// Secrets try the prefixed name first and then the legacy name. Plain
/// settings only use the prefixed `__` form.
pub fn get_env_var(path: &str) -> Option<String> {
    if is_secret_path(path) {
        env::var(secret_path_to_env_var(path))
            .or_else(|_| env::var(legacy_secret_path_to_env_var(path)))
            .ok()
    } else {
        env::var(config_path_to_env_var(path)).ok()
    }
}

/// Replace every `"secret_from_env"` string in a JSON tree with the matching
/// environment value.
///
/// # Returns
///
/// `true` if any values were replaced, `false` otherwise
pub fn inject_env_vars(value: &mut serde_json::Value) -> bool {
    use serde_json::Value;

    fn walk(path: Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_env_var(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    tracing::warn!("env var for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_path_to_env_var() {
        assert_eq!(
            config_path_to_env_var("server.port"),
            "APPLIANCE_BUDDY__SERVER__PORT"
        );
        assert_eq!(
            config_path_to_env_var("cache.path"),
            "APPLIANCE_BUDDY__CACHE__PATH"
        );
    }

    #[test]
    fn test_secret_path_to_env_var() {
        assert_eq!(
            secret_path_to_env_var("supabase.service_role_key"),
            "APPLIANCE_BUDDY_SECRET_SUPABASE_SERVICE_ROLE_KEY"
        );
        assert_eq!(
            legacy_secret_path_to_env_var("supabase.service_role_key"),
            "SUPABASE_SERVICE_ROLE_KEY"
        );
    }

    #[test]
    fn test_is_secret_path() {
        assert!(is_secret_path("supabase.service_role_key"));
        assert!(is_secret_path("supabase.anon_key"));
        assert!(!is_secret_path("supabase.url"));
        assert!(!is_secret_path("server.host"));
    }

    #[test]
    fn test_inject_env_vars_replaces_marker() {
        env::set_var(
            "APPLIANCE_BUDDY_SECRET_TESTSECTION_API_TOKEN",
            "injected-value",
        );
        let mut value = json!({
            "testsection": { "api_token": "secret_from_env", "plain": "kept" }
        });

        assert!(inject_env_vars(&mut value));
        assert_eq!(value["testsection"]["api_token"], "injected-value");
        assert_eq!(value["testsection"]["plain"], "kept");
        env::remove_var("APPLIANCE_BUDDY_SECRET_TESTSECTION_API_TOKEN");
    }

    #[test]
    fn test_inject_env_vars_leaves_missing_marker() {
        let mut value = json!({ "nowhere": { "missing_secret": "secret_from_env" } });
        assert!(!inject_env_vars(&mut value));
        assert_eq!(value["nowhere"]["missing_secret"], SECRET_MARKER);
    }
}
