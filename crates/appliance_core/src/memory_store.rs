//! An `ApplianceStore` that keeps everything in process memory.
//!
//! Used by the backend when Supabase is not configured and by tests that
//! need a remote store. Ownership rules match the Supabase store: every
//! record belongs to the user who created it and is invisible to others.

use appliance_common::error::StoreError;
use appliance_common::models::{
    Appliance, ApplianceUpdate, Identity, LinkedDocument, LinkedDocumentUpdate, MaintenanceTask,
    MaintenanceTaskUpdate, NewAppliance, NewLinkedDocument, NewMaintenanceTask,
    NewSupportContact, SupportContact, SupportContactUpdate,
};
use appliance_common::services::{ApplianceStore, BoxFuture, Clock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

pub struct MemoryStore {
    /// Insertion order; children live inside their appliance.
    appliances: Mutex<Vec<Appliance>>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            appliances: Mutex::new(Vec::new()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail with `StoreError::Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Appliance>> {
        self.appliances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(
                "In-memory store is switched off".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn owned_by<'v>(
        appliances: &'v mut [Appliance],
        identity: &Identity,
        id: Uuid,
    ) -> Result<&'v mut Appliance, StoreError> {
        appliances
            .iter_mut()
            .find(|a| a.id == id && a.user_id.as_deref() == Some(identity.user_id.as_str()))
            .ok_or_else(|| StoreError::NotFound(format!("Appliance {} not found", id)))
    }

    fn owned_appliances<'v>(
        appliances: &'v mut [Appliance],
        identity: &'v Identity,
    ) -> impl DoubleEndedIterator<Item = &'v mut Appliance> + 'v {
        appliances
            .iter_mut()
            .filter(move |a| a.user_id.as_deref() == Some(identity.user_id.as_str()))
    }

    fn list_children<T: Clone>(
        &self,
        identity: &Identity,
        appliance_ids: &[Uuid],
        children: impl Fn(&Appliance) -> &Vec<T>,
    ) -> Result<Vec<T>, StoreError> {
        self.check_available()?;
        let mut guard = self.lock();
        let items = Self::owned_appliances(&mut guard, identity)
            .filter(|a| appliance_ids.contains(&a.id))
            .flat_map(|a| children(a).clone())
            .collect();
        Ok(items)
    }
}

impl ApplianceStore for MemoryStore {
    fn list_appliances<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> BoxFuture<'a, Vec<Appliance>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            // Reverse first so equal timestamps still list the latest insert on top.
            let mut owned: Vec<Appliance> = Self::owned_appliances(&mut guard, identity)
                .rev()
                .map(|a| a.clone())
                .collect();
            owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(owned)
        })
    }

    fn create_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        appliance: NewAppliance,
    ) -> BoxFuture<'a, Appliance, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let record = Appliance::from_new(
                Uuid::new_v4(),
                appliance,
                Some(identity.user_id.clone()),
                self.clock.now(),
            );
            debug!("Created appliance {} for {}", record.id, identity.user_id);
            self.lock().push(record.clone());
            Ok(record)
        })
    }

    fn update_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: ApplianceUpdate,
    ) -> BoxFuture<'a, Appliance, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let now = self.clock.now();
            let mut guard = self.lock();
            let appliance = Self::owned_by(&mut guard, identity, id)?;
            appliance.apply_update(update, now);
            Ok(appliance.clone())
        })
    }

    fn delete_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            Self::owned_by(&mut guard, identity, id)?;
            guard.retain(|a| a.id != id);
            Ok(())
        })
    }

    fn list_support_contacts<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<SupportContact>, StoreError> {
        Box::pin(async move {
            self.list_children(identity, appliance_ids, |a| &a.support_contacts)
        })
    }

    fn create_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        contact: NewSupportContact,
    ) -> BoxFuture<'a, SupportContact, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_by(&mut guard, identity, appliance_id)?;
            let record = SupportContact::from_new(Uuid::new_v4(), appliance_id, contact);
            appliance.support_contacts.push(record.clone());
            Ok(record)
        })
    }

    fn update_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: SupportContactUpdate,
    ) -> BoxFuture<'a, SupportContact, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let contact = Self::owned_appliances(&mut guard, identity)
                .flat_map(|a| a.support_contacts.iter_mut())
                .find(|c| c.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("Support contact {} not found", id)))?;
            contact.apply_update(update);
            Ok(contact.clone())
        })
    }

    fn delete_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_appliances(&mut guard, identity)
                .find(|a| a.support_contacts.iter().any(|c| c.id == id))
                .ok_or_else(|| StoreError::NotFound(format!("Support contact {} not found", id)))?;
            appliance.support_contacts.retain(|c| c.id != id);
            Ok(())
        })
    }

    fn list_maintenance_tasks<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<MaintenanceTask>, StoreError> {
        Box::pin(async move {
            self.list_children(identity, appliance_ids, |a| &a.maintenance_tasks)
        })
    }

    fn create_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        task: NewMaintenanceTask,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_by(&mut guard, identity, appliance_id)?;
            let record = MaintenanceTask::from_new(Uuid::new_v4(), appliance_id, task);
            appliance.maintenance_tasks.push(record.clone());
            Ok(record)
        })
    }

    fn update_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: MaintenanceTaskUpdate,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let task = Self::owned_appliances(&mut guard, identity)
                .flat_map(|a| a.maintenance_tasks.iter_mut())
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("Maintenance task {} not found", id)))?;
            task.apply_update(update);
            Ok(task.clone())
        })
    }

    fn delete_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_appliances(&mut guard, identity)
                .find(|a| a.maintenance_tasks.iter().any(|t| t.id == id))
                .ok_or_else(|| StoreError::NotFound(format!("Maintenance task {} not found", id)))?;
            appliance.maintenance_tasks.retain(|t| t.id != id);
            Ok(())
        })
    }

    fn list_linked_documents<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<LinkedDocument>, StoreError> {
        Box::pin(async move {
            self.list_children(identity, appliance_ids, |a| &a.linked_documents)
        })
    }

    fn create_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        document: NewLinkedDocument,
    ) -> BoxFuture<'a, LinkedDocument, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_by(&mut guard, identity, appliance_id)?;
            let record = LinkedDocument::from_new(Uuid::new_v4(), appliance_id, document);
            appliance.linked_documents.push(record.clone());
            Ok(record)
        })
    }

    fn update_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: LinkedDocumentUpdate,
    ) -> BoxFuture<'a, LinkedDocument, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let document = Self::owned_appliances(&mut guard, identity)
                .flat_map(|a| a.linked_documents.iter_mut())
                .find(|d| d.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("Document {} not found", id)))?;
            document.apply_update(update);
            Ok(document.clone())
        })
    }

    fn delete_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut guard = self.lock();
            let appliance = Self::owned_appliances(&mut guard, identity)
                .find(|a| a.linked_documents.iter().any(|d| d.id == id))
                .ok_or_else(|| StoreError::NotFound(format!("Document {} not found", id)))?;
            appliance.linked_documents.retain(|d| d.id != id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appliance_common::clock::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn store() -> (MemoryStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap(),
        ));
        (MemoryStore::new(clock.clone()), clock)
    }

    fn new_appliance(name: &str) -> NewAppliance {
        NewAppliance {
            name: name.into(),
            brand: "Bosch".into(),
            model: "SHXM4AY55N".into(),
            purchase_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            warranty_duration_months: 12,
            serial_number: None,
            purchase_location: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let (store, clock) = store();
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");

        store.create_appliance(&alice, new_appliance("first")).await.unwrap();
        clock.advance(Duration::minutes(1));
        store.create_appliance(&alice, new_appliance("second")).await.unwrap();
        store.create_appliance(&bob, new_appliance("bob's")).await.unwrap();

        let names: Vec<_> = store
            .list_appliances(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(store.list_appliances(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_users_records_are_not_found() {
        let (store, _) = store();
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");
        let created = store.create_appliance(&alice, new_appliance("dryer")).await.unwrap();

        let err = store
            .update_appliance(&bob, created.id, ApplianceUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(matches!(
            store.delete_appliance(&bob, created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store
                .create_support_contact(&bob, created.id, NewSupportContact::default())
                .await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let (store, clock) = store();
        let alice = Identity::new("alice");
        let created = store.create_appliance(&alice, new_appliance("dryer")).await.unwrap();

        clock.advance(Duration::hours(2));
        let updated = store
            .update_appliance(
                &alice,
                created.id,
                ApplianceUpdate {
                    name: Some("washer".into()),
                    ..ApplianceUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "washer");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, created.created_at + Duration::hours(2));
    }

    #[tokio::test]
    async fn test_children_and_cascading_delete() {
        let (store, _) = store();
        let alice = Identity::new("alice");
        let appliance = store.create_appliance(&alice, new_appliance("dryer")).await.unwrap();

        let contact = store
            .create_support_contact(
                &alice,
                appliance.id,
                NewSupportContact {
                    name: "Support".into(),
                    ..NewSupportContact::default()
                },
            )
            .await
            .unwrap();
        store
            .create_linked_document(
                &alice,
                appliance.id,
                NewLinkedDocument {
                    title: "Manual".into(),
                    url: "https://example.com/manual.pdf".into(),
                },
            )
            .await
            .unwrap();

        let ids = [appliance.id];
        assert_eq!(store.list_support_contacts(&alice, &ids).await.unwrap(), vec![contact.clone()]);
        assert_eq!(store.list_linked_documents(&alice, &ids).await.unwrap().len(), 1);

        store.delete_support_contact(&alice, contact.id).await.unwrap();
        assert!(store.list_support_contacts(&alice, &ids).await.unwrap().is_empty());

        store.delete_appliance(&alice, appliance.id).await.unwrap();
        assert!(store.list_linked_documents(&alice, &ids).await.unwrap().is_empty());
        assert!(store.list_appliances(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_switch() {
        let (store, _) = store();
        let alice = Identity::new("alice");
        store.set_unavailable(true);
        assert!(matches!(
            store.list_appliances(&alice).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.list_appliances(&alice).await.unwrap().is_empty());
    }
}
