#[cfg(test)]
mod tests {
    use crate::handlers::ApiState;
    use crate::routes::routes;
    use appliance_common::models::{Identity, NewAppliance};
    use appliance_common::services::{ApplianceStore, TokenVerifier};
    use appliance_common::FixedClock;
    use appliance_core::{MemoryStore, StaticIdentityProvider};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
        ))
    }

    fn mock_app() -> (Router, Arc<MemoryStore>) {
        let clock = clock();
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let state = ApiState::new(store.clone(), None, clock);
        (routes(Arc::new(state)), store)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn dishwasher() -> Value {
        json!({
            "name": "Bosch Dishwasher",
            "brand": "Bosch",
            "model": "SHXM4AY55N",
            "purchaseDate": "2025-01-10",
            "warrantyDurationMonths": 12,
            "purchaseLocation": "Lowe's"
        })
    }

    async fn create_dishwasher(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/appliances", Some(dishwasher()), None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_and_banner() {
        let (app, _) = mock_app();

        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "OK", "message": "Appliance Buddy Backend is running" })
        );

        let (status, body) = send(&app, "GET", "/api", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API routes available: /api/appliances");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (app, _) = mock_app();
        let (status, body) = send(&app, "GET", "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Route not found" }));
    }

    #[tokio::test]
    async fn test_create_and_list_as_mock_user() {
        let (app, _) = mock_app();

        let (status, created) =
            send(&app, "POST", "/api/appliances", Some(dishwasher()), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["userId"], "mock-user-id");
        assert_eq!(created["warrantyStatus"], "Active");
        assert!(created["warrantyEndDate"]
            .as_str()
            .unwrap()
            .starts_with("2026-01-10"));

        let (status, list) = send(&app, "GET", "/api/appliances", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], "Bosch Dishwasher");
    }

    #[tokio::test]
    async fn test_invalid_appliance_reports_fields() {
        let (app, _) = mock_app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/appliances",
            Some(json!({ "brand": "Bosch", "model": "X", "warrantyDurationMonths": 12 })),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = &body["error"]["fields"];
        assert_eq!(fields["name"], "Appliance name is required");
        assert_eq!(fields["purchaseDate"], "Purchase date is required");
        assert!(fields.get("brand").is_none());
    }

    #[tokio::test]
    async fn test_task_status_and_summary_follow_completion() {
        let (app, _) = mock_app();
        let id = create_dishwasher(&app).await;

        let (status, task) = send(
            &app,
            "POST",
            &format!("/api/appliances/{}/maintenance-tasks", id),
            Some(json!({
                "taskName": "Clean filter",
                "scheduledDate": "2025-06-01",
                "frequency": "Monthly"
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["status"], "Overdue");

        let (status, summary) = send(&app, "GET", "/api/appliances/summary", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["overdueTasks"], 1);

        let task_id = task["id"].as_str().unwrap();
        let (status, task) = send(
            &app,
            "PUT",
            &format!("/api/maintenance-tasks/{}", task_id),
            Some(json!({ "completedDate": "2025-06-14" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["status"], "Completed");
        assert_eq!(task["taskName"], "Clean filter");

        let (_, summary) = send(&app, "GET", "/api/appliances/summary", None, None).await;
        assert_eq!(summary["totalAppliances"], 1);
        assert_eq!(summary["activeWarranties"], 1);
        assert_eq!(summary["overdueTasks"], 0);
        assert_eq!(summary["completedTasks"], 1);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/api/maintenance-tasks/{}", task_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, list) = send(&app, "GET", "/api/appliances", None, None).await;
        assert!(list[0]["maintenanceTasks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contacts_and_documents_round_trip() {
        let (app, _) = mock_app();
        let id = create_dishwasher(&app).await;

        let (status, contact) = send(
            &app,
            "POST",
            &format!("/api/appliances/{}/support-contacts", id),
            Some(json!({ "name": "Customer Service", "phone": "1-800-944-2904", "email": " " })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(contact.get("email").map_or(true, Value::is_null));

        let contact_id = contact["id"].as_str().unwrap();
        let (status, contact) = send(
            &app,
            "PUT",
            &format!("/api/support-contacts/{}", contact_id),
            Some(json!({ "company": "Bosch", "phone": null })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contact["company"], "Bosch");
        assert!(contact.get("phone").map_or(true, Value::is_null));

        let (status, document) = send(
            &app,
            "POST",
            &format!("/api/appliances/{}/documents", id),
            Some(json!({ "title": "User Manual", "url": "https://www.bosch-home.com/us/manual" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/documents/{}", document["id"].as_str().unwrap()),
            Some(json!({ "url": "" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["url"], "Document URL is required");

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/api/support-contacts/{}", contact_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Support contact deleted successfully.");
    }

    #[tokio::test]
    async fn test_other_users_appliance_is_not_found() {
        let (app, store) = mock_app();
        let foreign = store
            .create_appliance(
                &Identity::new("someone-else"),
                NewAppliance {
                    name: "Oven".into(),
                    brand: "GE".into(),
                    model: "JB645RKSS".into(),
                    purchase_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                    warranty_duration_months: 12,
                    serial_number: None,
                    purchase_location: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        let uri = format!("/api/appliances/{}", foreign.id);

        let (status, _) = send(&app, "PUT", &uri, Some(json!({ "name": "Mine" })), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            "POST",
            &format!("{}/documents", uri),
            Some(json!({ "title": "Manual", "url": "https://example.com" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, "GET", "/api/appliances", None, None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_appliance() {
        let (app, _) = mock_app();
        let id = create_dishwasher(&app).await;

        let (status, body) =
            send(&app, "DELETE", &format!("/api/appliances/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Appliance deleted successfully.");

        let (_, list) = send(&app, "GET", "/api/appliances", None, None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_token_required_with_verifier() {
        let clock = clock();
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticIdentityProvider::new(Some(
            Identity::new("owner").with_access_token("t1"),
        )));
        let app = routes(Arc::new(ApiState::new(store, Some(verifier), clock)));

        let (status, body) = send(&app, "GET", "/api/appliances", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 401);

        let (status, _) = send(&app, "GET", "/api/appliances", None, Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "GET", "/api/appliances", None, Some("t1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
