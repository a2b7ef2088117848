// --- File: crates/appliance_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ApplianceError, HttpStatusCode};

// Include the client module
pub mod client;

/// Implement IntoResponse for ApplianceError so handlers can return `Result<_, ApplianceError>`.
///
/// The body is `{"error": {"message", "code"}}`, with an extra `fields` map for
/// validation failures.
impl IntoResponse for ApplianceError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            ApplianceError::Validation(fields) => json!({
                "error": {
                    "message": self.to_string(),
                    "code": status_code.as_u16(),
                    "fields": fields,
                }
            }),
            _ => json!({
                "error": {
                    "message": self.to_string(),
                    "code": status_code.as_u16(),
                }
            }),
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{not_found, validation_error};

    #[test]
    fn test_not_found_response_status() {
        let response = not_found("Appliance 42").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_response_status() {
        let response = validation_error("name", "Appliance name is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
