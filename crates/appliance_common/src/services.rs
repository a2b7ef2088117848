// --- File: crates/appliance_common/src/services.rs ---
//! Service abstractions for the collaborators around the core.
//!
//! These traits decouple the session and the HTTP layer from Supabase, from
//! the on-disk snapshot and from the wall clock so each can be swapped for
//! an in-memory version in tests.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{ApplianceError, StoreError};
use crate::models::{
    Appliance, ApplianceUpdate, Identity, IdentityEvent, LinkedDocument, LinkedDocumentUpdate,
    MaintenanceTask, MaintenanceTaskUpdate, NewAppliance, NewLinkedDocument, NewMaintenanceTask,
    NewSupportContact, SupportContact, SupportContactUpdate,
};

pub use crate::clock::{Clock, FixedClock, SystemClock};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Remote persistence for appliances and their child records.
///
/// Every call is made on behalf of `identity` and only sees records owned by
/// `identity.user_id`. Lookups of records owned by someone else fail with
/// `StoreError::NotFound`, the same as records that do not exist.
pub trait ApplianceStore: Send + Sync {
    /// All appliances of the owner with children attached, newest first.
    fn list_appliances<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> BoxFuture<'a, Vec<Appliance>, StoreError>;

    fn create_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        appliance: NewAppliance,
    ) -> BoxFuture<'a, Appliance, StoreError>;

    /// Apply a partial update and return the re-read record.
    fn update_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: ApplianceUpdate,
    ) -> BoxFuture<'a, Appliance, StoreError>;

    /// Delete an appliance together with its children.
    fn delete_appliance<'a>(&'a self, identity: &'a Identity, id: Uuid)
        -> BoxFuture<'a, (), StoreError>;

    fn list_support_contacts<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<SupportContact>, StoreError>;

    fn create_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        contact: NewSupportContact,
    ) -> BoxFuture<'a, SupportContact, StoreError>;

    fn update_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: SupportContactUpdate,
    ) -> BoxFuture<'a, SupportContact, StoreError>;

    fn delete_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError>;

    fn list_maintenance_tasks<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<MaintenanceTask>, StoreError>;

    fn create_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        task: NewMaintenanceTask,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError>;

    fn update_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: MaintenanceTaskUpdate,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError>;

    fn delete_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError>;

    fn list_linked_documents<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<LinkedDocument>, StoreError>;

    fn create_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        document: NewLinkedDocument,
    ) -> BoxFuture<'a, LinkedDocument, StoreError>;

    fn update_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: LinkedDocumentUpdate,
    ) -> BoxFuture<'a, LinkedDocument, StoreError>;

    fn delete_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError>;
}

/// Session state of the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in identity, if any.
    fn current_identity(&self) -> BoxFuture<'_, Option<Identity>, ApplianceError>;

    /// Identity-changed events from now on.
    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent>;
}

/// Resolves a bearer token presented to the backend.
pub trait TokenVerifier: Send + Sync {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Identity, ApplianceError>;
}

/// The durable on-device snapshot of the whole appliance collection.
///
/// Snapshots are replaced wholesale; there are no partial writes.
pub trait LocalCache: Send + Sync {
    fn load_snapshot(&self) -> Result<Option<Vec<Appliance>>, ApplianceError>;

    fn store_snapshot(&self, appliances: &[Appliance]) -> Result<(), ApplianceError>;

    fn clear(&self) -> Result<(), ApplianceError>;
}
