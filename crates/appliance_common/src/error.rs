use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// The error type shared by every Appliance Buddy crate.
#[derive(Error, Debug)]
pub enum ApplianceError {
    /// The operation needed an identity and none was present.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// The persistence collaborator failed (network, server, permission).
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// An ownership-scoped lookup found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User supplied fields failed the input checks.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Reading or writing the local snapshot failed.
    #[error("Local cache error: {0}")]
    CacheError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Errors raised by `ApplianceStore` implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ApplianceError {
    fn status_code(&self) -> u16 {
        match self {
            ApplianceError::NotAuthenticated(_) => 401,
            ApplianceError::RemoteUnavailable(_) => 502,
            ApplianceError::NotFound(_) => 404,
            ApplianceError::Validation(_) => 400,
            ApplianceError::CacheError(_) => 500,
            ApplianceError::ConfigError(_) => 500,
            ApplianceError::InternalError(_) => 500,
        }
    }
}

impl From<StoreError> for ApplianceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(message) => ApplianceError::NotFound(message),
            other => ApplianceError::RemoteUnavailable(other.to_string()),
        }
    }
}

impl From<FieldErrors> for ApplianceError {
    fn from(errors: FieldErrors) -> Self {
        ApplianceError::Validation(errors)
    }
}

// Common error conversions
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ApplianceError {
    fn from(err: reqwest::Error) -> Self {
        ApplianceError::RemoteUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for ApplianceError {
    fn from(err: serde_json::Error) -> Self {
        ApplianceError::CacheError(err.to_string())
    }
}

impl From<std::io::Error> for ApplianceError {
    fn from(err: std::io::Error) -> Self {
        ApplianceError::CacheError(err.to_string())
    }
}

// Utility functions for error handling
pub fn not_authenticated<T: fmt::Display>(message: T) -> ApplianceError {
    ApplianceError::NotAuthenticated(message.to_string())
}

pub fn remote_unavailable<T: fmt::Display>(message: T) -> ApplianceError {
    ApplianceError::RemoteUnavailable(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ApplianceError {
    ApplianceError::NotFound(message.to_string())
}

/// A single-field validation failure.
pub fn validation_error(field: &str, message: &str) -> ApplianceError {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    ApplianceError::Validation(errors)
}

pub fn internal_error<T: fmt::Display>(message: T) -> ApplianceError {
    ApplianceError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(not_authenticated("no session").status_code(), 401);
        assert_eq!(remote_unavailable("timeout").status_code(), 502);
        assert_eq!(not_found("appliance").status_code(), 404);
        assert_eq!(validation_error("name", "required").status_code(), 400);
        assert_eq!(internal_error("boom").status_code(), 500);
    }

    #[test]
    fn test_store_error_maps_not_found_only() {
        let err: ApplianceError = StoreError::NotFound("Appliance abc".into()).into();
        assert!(matches!(err, ApplianceError::NotFound(_)));

        let err: ApplianceError = StoreError::Api {
            status: 403,
            message: "permission denied".into(),
        }
        .into();
        assert!(matches!(err, ApplianceError::RemoteUnavailable(_)));

        let err: ApplianceError = StoreError::Decode("bad json".into()).into();
        assert!(matches!(err, ApplianceError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("purchaseDate", "Purchase date is required");
        errors.add("purchaseDate", "Purchase date cannot be in the future");
        errors.add("brand", "Brand is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("purchaseDate"), Some("Purchase date is required"));
        assert_eq!(
            errors.to_string(),
            "brand: Brand is required; purchaseDate: Purchase date is required"
        );
    }
}
