// --- File: crates/appliance_api/src/routes.rs ---

use crate::handlers::{
    api_index_handler, create_appliance_handler, create_linked_document_handler,
    create_maintenance_task_handler, create_support_contact_handler, delete_appliance_handler,
    delete_linked_document_handler, delete_maintenance_task_handler,
    delete_support_contact_handler, health_handler, list_appliances_handler, not_found_handler,
    summary_handler, update_appliance_handler, update_linked_document_handler,
    update_maintenance_task_handler, update_support_contact_handler, ApiState,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Routes below `/api`.
pub fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(api_index_handler))
        .route(
            "/appliances",
            get(list_appliances_handler).post(create_appliance_handler),
        )
        .route("/appliances/summary", get(summary_handler))
        .route(
            "/appliances/{id}",
            put(update_appliance_handler).delete(delete_appliance_handler),
        )
        .route(
            "/appliances/{id}/support-contacts",
            post(create_support_contact_handler),
        )
        .route(
            "/appliances/{id}/maintenance-tasks",
            post(create_maintenance_task_handler),
        )
        .route(
            "/appliances/{id}/documents",
            post(create_linked_document_handler),
        )
        .route(
            "/support-contacts/{id}",
            put(update_support_contact_handler).delete(delete_support_contact_handler),
        )
        .route(
            "/maintenance-tasks/{id}",
            put(update_maintenance_task_handler).delete(delete_maintenance_task_handler),
        )
        .route(
            "/documents/{id}",
            put(update_linked_document_handler).delete(delete_linked_document_handler),
        )
}

/// The whole application: health check, `/api` and the JSON 404 fallback.
pub fn routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .fallback(not_found_handler)
        .with_state(state)
}
