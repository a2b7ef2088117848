// --- File: crates/appliance_api/src/handlers.rs ---
use std::sync::Arc;

use appliance_common::error::ApplianceError;
use appliance_common::models::{
    ApplianceInput, ApplianceUpdate, LinkedDocument, LinkedDocumentUpdate, MaintenanceTaskUpdate,
    NewLinkedDocument, NewMaintenanceTask, NewSupportContact, SupportContact,
    SupportContactUpdate,
};
use appliance_common::services::{ApplianceStore, Clock, TokenVerifier};
use appliance_core::status::task_status;
use appliance_core::validation::{
    validate_appliance, validate_appliance_update, validate_linked_document,
    validate_linked_document_update, validate_maintenance_task, validate_maintenance_task_update,
    validate_support_contact, validate_support_contact_update,
};
use appliance_core::{ApplianceView, MaintenanceTaskView, WarrantySummary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::RequestIdentity;

/// Shared state of the API routes.
pub struct ApiState {
    pub store: Arc<dyn ApplianceStore>,
    /// `None` runs every request as the mock user.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    pub clock: Arc<dyn Clock>,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn ApplianceStore>,
        verifier: Option<Arc<dyn TokenVerifier>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            verifier,
            clock,
        }
    }

    pub fn is_mock_mode(&self) -> bool {
        self.verifier.is_none()
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Appliance Buddy"
))]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Appliance Buddy Backend is running".to_string(),
    })
}

pub async fn api_index_handler() -> Json<MessageResponse> {
    MessageResponse::new("API routes available: /api/appliances")
}

pub async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}

// --- Appliances ---

/// All appliances of the caller with warranty and task status as of now.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/appliances",
    responses(
        (status = 200, description = "Appliances, newest first", body = Vec<ApplianceView>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 502, description = "Remote store unavailable")
    ),
    tag = "Appliances"
))]
pub async fn list_appliances_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
) -> Result<Json<Vec<ApplianceView>>, ApplianceError> {
    let appliances = state.store.list_appliances(&identity).await?;
    Ok(Json(ApplianceView::evaluate_all(
        &appliances,
        state.clock.now(),
    )))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/appliances/summary",
    responses((status = 200, description = "Dashboard counters", body = WarrantySummary)),
    tag = "Appliances"
))]
pub async fn summary_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
) -> Result<Json<WarrantySummary>, ApplianceError> {
    let appliances = state.store.list_appliances(&identity).await?;
    let views = ApplianceView::evaluate_all(&appliances, state.clock.now());
    Ok(Json(WarrantySummary::from_views(&views)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/appliances",
    request_body = ApplianceInput,
    responses(
        (status = 201, description = "Appliance created", body = ApplianceView),
        (status = 400, description = "Validation failed")
    ),
    tag = "Appliances"
))]
pub async fn create_appliance_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Json(input): Json<ApplianceInput>,
) -> Result<(StatusCode, Json<ApplianceView>), ApplianceError> {
    let now = state.clock.now();
    let appliance = validate_appliance(input, now)?.into_inner();
    let created = state.store.create_appliance(&identity, appliance).await?;
    info!("Appliance {} created for {}", created.id, identity.user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApplianceView::evaluate(&created, now)),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/appliances/{id}",
    params(("id" = Uuid, Path, description = "Appliance id")),
    request_body = ApplianceUpdate,
    responses(
        (status = 200, description = "Updated appliance", body = ApplianceView),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such appliance for this user")
    ),
    tag = "Appliances"
))]
pub async fn update_appliance_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
    Json(update): Json<ApplianceUpdate>,
) -> Result<Json<ApplianceView>, ApplianceError> {
    let update = validate_appliance_update(update)?.into_inner();
    let updated = state.store.update_appliance(&identity, id, update).await?;
    Ok(Json(ApplianceView::evaluate(&updated, state.clock.now())))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/appliances/{id}",
    params(("id" = Uuid, Path, description = "Appliance id")),
    responses(
        (status = 200, description = "Appliance and its records deleted", body = MessageResponse),
        (status = 404, description = "No such appliance for this user")
    ),
    tag = "Appliances"
))]
pub async fn delete_appliance_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApplianceError> {
    state.store.delete_appliance(&identity, id).await?;
    info!("Appliance {} deleted for {}", id, identity.user_id);
    Ok(MessageResponse::new("Appliance deleted successfully."))
}

// --- Support contacts ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/appliances/{id}/support-contacts",
    params(("id" = Uuid, Path, description = "Parent appliance id")),
    request_body = NewSupportContact,
    responses((status = 201, description = "Contact created", body = SupportContact)),
    tag = "Support contacts"
))]
pub async fn create_support_contact_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(appliance_id): Path<Uuid>,
    Json(contact): Json<NewSupportContact>,
) -> Result<(StatusCode, Json<SupportContact>), ApplianceError> {
    let contact = validate_support_contact(contact)?.into_inner();
    let created = state
        .store
        .create_support_contact(&identity, appliance_id, contact)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/support-contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    request_body = SupportContactUpdate,
    responses((status = 200, description = "Updated contact", body = SupportContact)),
    tag = "Support contacts"
))]
pub async fn update_support_contact_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
    Json(update): Json<SupportContactUpdate>,
) -> Result<Json<SupportContact>, ApplianceError> {
    let update = validate_support_contact_update(update)?.into_inner();
    let updated = state
        .store
        .update_support_contact(&identity, id, update)
        .await?;
    Ok(Json(updated))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/support-contacts/{id}",
    params(("id" = Uuid, Path, description = "Contact id")),
    responses((status = 200, description = "Contact deleted", body = MessageResponse)),
    tag = "Support contacts"
))]
pub async fn delete_support_contact_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApplianceError> {
    state.store.delete_support_contact(&identity, id).await?;
    Ok(MessageResponse::new("Support contact deleted successfully."))
}

// --- Maintenance tasks ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/appliances/{id}/maintenance-tasks",
    params(("id" = Uuid, Path, description = "Parent appliance id")),
    request_body = NewMaintenanceTask,
    responses((status = 201, description = "Task created", body = MaintenanceTaskView)),
    tag = "Maintenance tasks"
))]
pub async fn create_maintenance_task_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(appliance_id): Path<Uuid>,
    Json(task): Json<NewMaintenanceTask>,
) -> Result<(StatusCode, Json<MaintenanceTaskView>), ApplianceError> {
    let task = validate_maintenance_task(task)?.into_inner();
    let created = state
        .store
        .create_maintenance_task(&identity, appliance_id, task)
        .await?;
    let status = task_status(&created, state.clock.now());
    Ok((
        StatusCode::CREATED,
        Json(MaintenanceTaskView {
            task: created,
            status,
        }),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/maintenance-tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = MaintenanceTaskUpdate,
    responses((status = 200, description = "Updated task with its current status", body = MaintenanceTaskView)),
    tag = "Maintenance tasks"
))]
pub async fn update_maintenance_task_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
    Json(update): Json<MaintenanceTaskUpdate>,
) -> Result<Json<MaintenanceTaskView>, ApplianceError> {
    let update = validate_maintenance_task_update(update)?.into_inner();
    let updated = state
        .store
        .update_maintenance_task(&identity, id, update)
        .await?;
    let status = task_status(&updated, state.clock.now());
    Ok(Json(MaintenanceTaskView {
        task: updated,
        status,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/maintenance-tasks/{id}",
    params(("id" = Uuid, Path, description = "Task id")),
    responses((status = 200, description = "Task deleted", body = MessageResponse)),
    tag = "Maintenance tasks"
))]
pub async fn delete_maintenance_task_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApplianceError> {
    state.store.delete_maintenance_task(&identity, id).await?;
    Ok(MessageResponse::new("Maintenance task deleted successfully."))
}

// --- Documents ---

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/appliances/{id}/documents",
    params(("id" = Uuid, Path, description = "Parent appliance id")),
    request_body = NewLinkedDocument,
    responses((status = 201, description = "Document link created", body = LinkedDocument)),
    tag = "Documents"
))]
pub async fn create_linked_document_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(appliance_id): Path<Uuid>,
    Json(document): Json<NewLinkedDocument>,
) -> Result<(StatusCode, Json<LinkedDocument>), ApplianceError> {
    let document = validate_linked_document(document)?.into_inner();
    let created = state
        .store
        .create_linked_document(&identity, appliance_id, document)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = LinkedDocumentUpdate,
    responses((status = 200, description = "Updated document link", body = LinkedDocument)),
    tag = "Documents"
))]
pub async fn update_linked_document_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
    Json(update): Json<LinkedDocumentUpdate>,
) -> Result<Json<LinkedDocument>, ApplianceError> {
    let update = validate_linked_document_update(update)?.into_inner();
    let updated = state
        .store
        .update_linked_document(&identity, id, update)
        .await?;
    Ok(Json(updated))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses((status = 200, description = "Document link deleted", body = MessageResponse)),
    tag = "Documents"
))]
pub async fn delete_linked_document_handler(
    State(state): State<Arc<ApiState>>,
    RequestIdentity(identity): RequestIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApplianceError> {
    state.store.delete_linked_document(&identity, id).await?;
    Ok(MessageResponse::new("Document deleted successfully."))
}
