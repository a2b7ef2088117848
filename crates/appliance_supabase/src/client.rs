// --- File: crates/appliance_supabase/src/client.rs ---
//! Thin HTTP plumbing shared by the PostgREST store and the GoTrue client.

use appliance_common::error::{ApplianceError, StoreError};
use appliance_common::http::client::create_client;
use appliance_common::models::Identity;
use appliance_config::models::SupabaseConfig;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Connection details for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

/// PostgREST and GoTrue both answer errors with some of these fields.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

impl SupabaseClient {
    pub fn from_config(config: &SupabaseConfig) -> Result<Self, ApplianceError> {
        if !config.is_complete() {
            return Err(ApplianceError::ConfigError(
                "Supabase url and anon key are required".to_string(),
            ));
        }
        let http = create_client(config.timeout_secs, true).map_err(|e| {
            ApplianceError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;
        Ok(Self::with_client(
            http,
            &config.url,
            &config.anon_key,
            config.service_role_key().map(str::to_string),
        ))
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        anon_key: &str,
        service_role_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_role_key,
        }
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Bearer to send for `identity`: the user's own token, else the service role key.
    fn bearer<'a>(&'a self, identity: Option<&'a Identity>) -> &'a str {
        identity
            .and_then(|i| i.access_token.as_deref())
            .or(self.service_role_key.as_deref())
            .unwrap_or(&self.anon_key)
    }

    /// A request carrying the project key and the bearer for `identity`.
    pub fn request(&self, method: Method, url: &str, identity: Option<&Identity>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer(identity))
    }

    /// A request authorized with an explicit user token.
    pub fn request_with_token(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send, check the status and decode a JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(StoreError::from)
    }

    /// Send and check the status, discarding the body.
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), StoreError> {
        let response = request.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("Supabase responded {}", status);
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or(text);
    warn!("Supabase error {}: {}", status, message);
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(service_role_key: Option<&str>) -> SupabaseClient {
        SupabaseClient::with_client(
            Client::new(),
            "https://project.supabase.co/",
            "anon",
            service_role_key.map(str::to_string),
        )
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let client = client(None);
        assert_eq!(
            client.rest_url("appliances"),
            "https://project.supabase.co/rest/v1/appliances"
        );
        assert_eq!(client.auth_url("user"), "https://project.supabase.co/auth/v1/user");
    }

    #[test]
    fn test_bearer_prefers_user_token() {
        let with_service = client(Some("service"));
        let user = Identity::new("u1").with_access_token("user-token");
        let tokenless = Identity::new("u1");

        assert_eq!(with_service.bearer(Some(&user)), "user-token");
        assert_eq!(with_service.bearer(Some(&tokenless)), "service");
        assert_eq!(client(None).bearer(None), "anon");
    }

    #[test]
    fn test_incomplete_config_rejected() {
        let err = SupabaseClient::from_config(&SupabaseConfig::default()).unwrap_err();
        assert!(matches!(err, ApplianceError::ConfigError(_)));
    }
}
