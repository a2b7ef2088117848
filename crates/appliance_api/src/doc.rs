// File: crates/appliance_api/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{HealthResponse, MessageResponse};
use appliance_common::models::{
    Appliance, ApplianceInput, ApplianceUpdate, Frequency, LinkedDocument, LinkedDocumentUpdate,
    MaintenanceStatus, MaintenanceTask, MaintenanceTaskUpdate, NewLinkedDocument,
    NewMaintenanceTask, NewSupportContact, ServiceProvider, SupportContact, SupportContactUpdate,
    WarrantyStatus,
};
use appliance_core::{ApplianceView, MaintenanceTaskView, WarrantySummary};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler,
        crate::handlers::list_appliances_handler,
        crate::handlers::summary_handler,
        crate::handlers::create_appliance_handler,
        crate::handlers::update_appliance_handler,
        crate::handlers::delete_appliance_handler,
        crate::handlers::create_support_contact_handler,
        crate::handlers::update_support_contact_handler,
        crate::handlers::delete_support_contact_handler,
        crate::handlers::create_maintenance_task_handler,
        crate::handlers::update_maintenance_task_handler,
        crate::handlers::delete_maintenance_task_handler,
        crate::handlers::create_linked_document_handler,
        crate::handlers::update_linked_document_handler,
        crate::handlers::delete_linked_document_handler
    ),
    components(
        schemas(
            Appliance,
            ApplianceInput,
            ApplianceUpdate,
            ApplianceView,
            SupportContact,
            NewSupportContact,
            SupportContactUpdate,
            MaintenanceTask,
            MaintenanceTaskView,
            NewMaintenanceTask,
            MaintenanceTaskUpdate,
            ServiceProvider,
            LinkedDocument,
            NewLinkedDocument,
            LinkedDocumentUpdate,
            Frequency,
            WarrantyStatus,
            MaintenanceStatus,
            WarrantySummary,
            HealthResponse,
            MessageResponse
        )
    ),
    tags(
        (name = "Appliances", description = "Appliances with derived warranty status"),
        (name = "Support contacts", description = "Support contacts per appliance"),
        (name = "Maintenance tasks", description = "Scheduled maintenance per appliance"),
        (name = "Documents", description = "Linked manuals and receipts")
    )
)]
pub struct ApplianceApiDoc;
