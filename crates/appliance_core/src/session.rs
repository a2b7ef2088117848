//! The client-side view of a user's appliances and the rules for where it
//! comes from.
//!
//! With an identity every read and write goes to the remote store, and a
//! successful answer is authoritative. A failed remote read falls back to the
//! local snapshot, then to the generated sample set. Without an identity the
//! remote store is never contacted: reads come from the snapshot (or the
//! sample set when there is none) and every successful write replaces the
//! whole snapshot with the current collection.
//!
//! Remote failures never surface as errors. They leave a `Notice` behind and
//! the view is refreshed through the read path. `NotFound` is returned to the
//! caller.

use std::sync::Arc;

use appliance_common::error::{ApplianceError, StoreError};
use appliance_common::models::{
    Appliance, ApplianceUpdate, Identity, IdentityEvent, LinkedDocument, LinkedDocumentUpdate,
    MaintenanceTask, MaintenanceTaskUpdate, NewAppliance, NewLinkedDocument, NewMaintenanceTask,
    NewSupportContact, SupportContact, SupportContactUpdate,
};
use appliance_common::services::{ApplianceStore, Clock, IdentityProvider, LocalCache};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::sample_data::generate_sample_appliances;
use crate::status::{ApplianceView, WarrantySummary};
use crate::validation::Validated;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load appliances. Please try again.";
pub const SAMPLE_LOADED_MESSAGE: &str = "Sample data loaded successfully.";

/// Where the collection currently on display came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    LocalCache,
    /// Generated demo data that has not been written anywhere yet.
    SampleData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing, non-fatal message produced by a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Action::Add => "added",
            Action::Update => "updated",
            Action::Delete => "deleted",
        }
    }
}

const APPLIANCE: &str = "Appliance";
const SUPPORT_CONTACT: &str = "Support contact";
const MAINTENANCE_TASK: &str = "Maintenance task";
const DOCUMENT: &str = "Document";

fn success_message(record: &str, action: Action) -> String {
    format!("{} {} successfully.", record, action.past())
}

fn failure_message(record: &str, action: Action) -> String {
    format!(
        "Failed to {} {}. Please try again.",
        action.verb(),
        record.to_lowercase()
    )
}

fn missing(record: &str, id: Uuid) -> ApplianceError {
    ApplianceError::NotFound(format!("{} {} not found", record, id))
}

/// One user's appliance collection plus the reconciliation rules around it.
///
/// Driven through `&mut self`, so operations never overlap.
pub struct ApplianceSession {
    store: Arc<dyn ApplianceStore>,
    cache: Arc<dyn LocalCache>,
    clock: Arc<dyn Clock>,
    identity: Option<Identity>,
    appliances: Vec<Appliance>,
    /// `None` until something is loaded, and again after sign-out.
    source: Option<DataSource>,
    notices: Vec<Notice>,
}

impl ApplianceSession {
    pub fn new(
        store: Arc<dyn ApplianceStore>,
        cache: Arc<dyn LocalCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            identity: None,
            appliances: Vec::new(),
            source: None,
            notices: Vec::new(),
        }
    }

    /// Pick up the provider's current identity and load the collection.
    pub async fn initialize(
        &mut self,
        provider: &dyn IdentityProvider,
    ) -> Result<(), ApplianceError> {
        self.identity = provider.current_identity().await?;
        self.reload().await;
        Ok(())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn source(&self) -> Option<DataSource> {
        self.source
    }

    /// The raw records, without derived statuses.
    pub fn appliances(&self) -> &[Appliance] {
        &self.appliances
    }

    /// The collection with warranty and task statuses evaluated now.
    pub fn views(&self) -> Vec<ApplianceView> {
        ApplianceView::evaluate_all(&self.appliances, self.clock.now())
    }

    pub fn summary(&self) -> WarrantySummary {
        WarrantySummary::from_views(&self.views())
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand over the notices recorded so far and forget them.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn handle_identity_event(&mut self, event: IdentityEvent) {
        match event {
            IdentityEvent::SignedIn(identity) => {
                info!("Identity {} signed in, reloading from remote", identity.user_id);
                self.identity = Some(identity);
                self.reload().await;
            }
            IdentityEvent::SignedOut => {
                info!("Signed out, clearing in-memory appliances");
                self.identity = None;
                self.appliances.clear();
                self.source = None;
            }
            IdentityEvent::TokenRefreshed(identity) => {
                debug!("Token refreshed for {}", identity.user_id);
                self.identity = Some(identity);
            }
        }
    }

    /// Apply every identity event already queued on `events`.
    pub async fn apply_pending_events(
        &mut self,
        events: &mut broadcast::Receiver<IdentityEvent>,
    ) {
        loop {
            match events.try_recv() {
                Ok(event) => self.handle_identity_event(event).await,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} identity events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    /// Re-read the collection following the fallback chain.
    pub async fn reload(&mut self) {
        let Some(identity) = self.identity.clone() else {
            self.load_local_or_sample();
            return;
        };

        match self.store.list_appliances(&identity).await {
            Ok(appliances) => {
                debug!("Loaded {} appliances from remote", appliances.len());
                self.appliances = appliances;
                self.source = Some(DataSource::Remote);
            }
            Err(e) => {
                warn!("Remote load failed, falling back to local data: {}", e);
                self.notices.push(Notice::error(LOAD_FAILED_MESSAGE));
                self.load_local_or_sample();
            }
        }
    }

    /// Drop the local snapshot and show a fresh sample set.
    pub fn reset_to_sample_data(&mut self) -> Result<(), ApplianceError> {
        self.cache.clear()?;
        self.appliances = generate_sample_appliances(self.clock.now());
        self.source = Some(DataSource::SampleData);
        self.notices.push(Notice::success(SAMPLE_LOADED_MESSAGE));
        info!("Reset to {} sample appliances", self.appliances.len());
        Ok(())
    }

    fn load_local_or_sample(&mut self) {
        match self.cache.load_snapshot() {
            Ok(Some(appliances)) => {
                self.appliances = appliances;
                self.source = Some(DataSource::LocalCache);
            }
            Ok(None) => {
                self.appliances = generate_sample_appliances(self.clock.now());
                self.source = Some(DataSource::SampleData);
            }
            Err(e) => {
                warn!("Local snapshot unusable, showing sample data: {}", e);
                self.appliances = generate_sample_appliances(self.clock.now());
                self.source = Some(DataSource::SampleData);
            }
        }
    }

    /// The collection local writes apply to, loaded if the view is empty or remote.
    fn local_collection(&mut self) -> &mut Vec<Appliance> {
        if !matches!(
            self.source,
            Some(DataSource::LocalCache) | Some(DataSource::SampleData)
        ) {
            self.load_local_or_sample();
        }
        &mut self.appliances
    }

    fn persist_local(&mut self) -> Result<(), ApplianceError> {
        self.cache.store_snapshot(&self.appliances)?;
        self.source = Some(DataSource::LocalCache);
        Ok(())
    }

    fn local_appliance(&mut self, id: Uuid) -> Result<&mut Appliance, ApplianceError> {
        self.local_collection()
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| missing(APPLIANCE, id))
    }

    /// Finish a remote write: reload and record a notice either way.
    ///
    /// `Ok(None)` means the write failed remotely and was absorbed.
    async fn settle_remote<T>(
        &mut self,
        result: Result<T, StoreError>,
        record: &str,
        action: Action,
    ) -> Result<Option<T>, ApplianceError> {
        match result {
            Ok(value) => {
                self.reload().await;
                self.notices.push(Notice::success(success_message(record, action)));
                Ok(Some(value))
            }
            Err(StoreError::NotFound(message)) => Err(ApplianceError::NotFound(message)),
            Err(e) => {
                warn!("Remote {} of {} failed: {}", action.verb(), record, e);
                self.notices.push(Notice::error(failure_message(record, action)));
                self.reload().await;
                Ok(None)
            }
        }
    }

    // --- Appliances ---

    /// Add an appliance. Returns `Ok(None)` when a remote write failed.
    pub async fn add_appliance(
        &mut self,
        appliance: Validated<NewAppliance>,
    ) -> Result<Option<Appliance>, ApplianceError> {
        let appliance = appliance.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self.store.create_appliance(&identity, appliance).await;
            return self.settle_remote(result, APPLIANCE, Action::Add).await;
        }

        let record = Appliance::from_new(Uuid::new_v4(), appliance, None, self.clock.now());
        self.local_collection().push(record.clone());
        self.persist_local()?;
        debug!("Added appliance {} locally", record.id);
        Ok(Some(record))
    }

    pub async fn update_appliance(
        &mut self,
        id: Uuid,
        update: Validated<ApplianceUpdate>,
    ) -> Result<Option<Appliance>, ApplianceError> {
        let update = update.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self.store.update_appliance(&identity, id, update).await;
            return self.settle_remote(result, APPLIANCE, Action::Update).await;
        }

        let now = self.clock.now();
        let appliance = self.local_appliance(id)?;
        appliance.apply_update(update, now);
        let updated = appliance.clone();
        self.persist_local()?;
        Ok(Some(updated))
    }

    /// Delete an appliance and its children. Returns whether it was applied.
    pub async fn delete_appliance(&mut self, id: Uuid) -> Result<bool, ApplianceError> {
        if let Some(identity) = self.identity.clone() {
            let result = self.store.delete_appliance(&identity, id).await;
            return Ok(self
                .settle_remote(result, APPLIANCE, Action::Delete)
                .await?
                .is_some());
        }

        let appliances = self.local_collection();
        let before = appliances.len();
        appliances.retain(|a| a.id != id);
        if appliances.len() == before {
            return Err(missing(APPLIANCE, id));
        }
        self.persist_local()?;
        Ok(true)
    }

    // --- Support contacts ---

    pub async fn add_support_contact(
        &mut self,
        appliance_id: Uuid,
        contact: Validated<NewSupportContact>,
    ) -> Result<Option<SupportContact>, ApplianceError> {
        let contact = contact.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self
                .store
                .create_support_contact(&identity, appliance_id, contact)
                .await;
            return self.settle_remote(result, SUPPORT_CONTACT, Action::Add).await;
        }

        let record = SupportContact::from_new(Uuid::new_v4(), appliance_id, contact);
        self.local_appliance(appliance_id)?
            .support_contacts
            .push(record.clone());
        self.persist_local()?;
        Ok(Some(record))
    }

    pub async fn update_support_contact(
        &mut self,
        id: Uuid,
        update: Validated<SupportContactUpdate>,
    ) -> Result<Option<SupportContact>, ApplianceError> {
        let update = update.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self.store.update_support_contact(&identity, id, update).await;
            return self
                .settle_remote(result, SUPPORT_CONTACT, Action::Update)
                .await;
        }

        let contact = self
            .local_collection()
            .iter_mut()
            .flat_map(|a| a.support_contacts.iter_mut())
            .find(|c| c.id == id)
            .ok_or_else(|| missing(SUPPORT_CONTACT, id))?;
        contact.apply_update(update);
        let updated = contact.clone();
        self.persist_local()?;
        Ok(Some(updated))
    }

    pub async fn delete_support_contact(&mut self, id: Uuid) -> Result<bool, ApplianceError> {
        if let Some(identity) = self.identity.clone() {
            let result = self.store.delete_support_contact(&identity, id).await;
            return Ok(self
                .settle_remote(result, SUPPORT_CONTACT, Action::Delete)
                .await?
                .is_some());
        }

        let appliance = self
            .local_collection()
            .iter_mut()
            .find(|a| a.support_contacts.iter().any(|c| c.id == id))
            .ok_or_else(|| missing(SUPPORT_CONTACT, id))?;
        appliance.support_contacts.retain(|c| c.id != id);
        self.persist_local()?;
        Ok(true)
    }

    // --- Maintenance tasks ---

    pub async fn add_maintenance_task(
        &mut self,
        appliance_id: Uuid,
        task: Validated<NewMaintenanceTask>,
    ) -> Result<Option<MaintenanceTask>, ApplianceError> {
        let task = task.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self
                .store
                .create_maintenance_task(&identity, appliance_id, task)
                .await;
            return self.settle_remote(result, MAINTENANCE_TASK, Action::Add).await;
        }

        let record = MaintenanceTask::from_new(Uuid::new_v4(), appliance_id, task);
        self.local_appliance(appliance_id)?
            .maintenance_tasks
            .push(record.clone());
        self.persist_local()?;
        Ok(Some(record))
    }

    pub async fn update_maintenance_task(
        &mut self,
        id: Uuid,
        update: Validated<MaintenanceTaskUpdate>,
    ) -> Result<Option<MaintenanceTask>, ApplianceError> {
        let update = update.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self
                .store
                .update_maintenance_task(&identity, id, update)
                .await;
            return self
                .settle_remote(result, MAINTENANCE_TASK, Action::Update)
                .await;
        }

        let task = self
            .local_collection()
            .iter_mut()
            .flat_map(|a| a.maintenance_tasks.iter_mut())
            .find(|t| t.id == id)
            .ok_or_else(|| missing(MAINTENANCE_TASK, id))?;
        task.apply_update(update);
        let updated = task.clone();
        self.persist_local()?;
        Ok(Some(updated))
    }

    pub async fn delete_maintenance_task(&mut self, id: Uuid) -> Result<bool, ApplianceError> {
        if let Some(identity) = self.identity.clone() {
            let result = self.store.delete_maintenance_task(&identity, id).await;
            return Ok(self
                .settle_remote(result, MAINTENANCE_TASK, Action::Delete)
                .await?
                .is_some());
        }

        let appliance = self
            .local_collection()
            .iter_mut()
            .find(|a| a.maintenance_tasks.iter().any(|t| t.id == id))
            .ok_or_else(|| missing(MAINTENANCE_TASK, id))?;
        appliance.maintenance_tasks.retain(|t| t.id != id);
        self.persist_local()?;
        Ok(true)
    }

    // --- Linked documents ---

    pub async fn add_linked_document(
        &mut self,
        appliance_id: Uuid,
        document: Validated<NewLinkedDocument>,
    ) -> Result<Option<LinkedDocument>, ApplianceError> {
        let document = document.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self
                .store
                .create_linked_document(&identity, appliance_id, document)
                .await;
            return self.settle_remote(result, DOCUMENT, Action::Add).await;
        }

        let record = LinkedDocument::from_new(Uuid::new_v4(), appliance_id, document);
        self.local_appliance(appliance_id)?
            .linked_documents
            .push(record.clone());
        self.persist_local()?;
        Ok(Some(record))
    }

    pub async fn update_linked_document(
        &mut self,
        id: Uuid,
        update: Validated<LinkedDocumentUpdate>,
    ) -> Result<Option<LinkedDocument>, ApplianceError> {
        let update = update.into_inner();
        if let Some(identity) = self.identity.clone() {
            let result = self.store.update_linked_document(&identity, id, update).await;
            return self.settle_remote(result, DOCUMENT, Action::Update).await;
        }

        let document = self
            .local_collection()
            .iter_mut()
            .flat_map(|a| a.linked_documents.iter_mut())
            .find(|d| d.id == id)
            .ok_or_else(|| missing(DOCUMENT, id))?;
        document.apply_update(update);
        let updated = document.clone();
        self.persist_local()?;
        Ok(Some(updated))
    }

    pub async fn delete_linked_document(&mut self, id: Uuid) -> Result<bool, ApplianceError> {
        if let Some(identity) = self.identity.clone() {
            let result = self.store.delete_linked_document(&identity, id).await;
            return Ok(self
                .settle_remote(result, DOCUMENT, Action::Delete)
                .await?
                .is_some());
        }

        let appliance = self
            .local_collection()
            .iter_mut()
            .find(|a| a.linked_documents.iter().any(|d| d.id == id))
            .ok_or_else(|| missing(DOCUMENT, id))?;
        appliance.linked_documents.retain(|d| d.id != id);
        self.persist_local()?;
        Ok(true)
    }
}
