// --- File: crates/appliance_supabase/src/store.rs ---
//! `ApplianceStore` over the Supabase REST interface.
//!
//! Appliances are filtered by `user_id`. Child records are checked through an
//! inner join on their parent appliance, so a record owned by another user
//! looks exactly like one that does not exist.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use appliance_common::error::StoreError;
use appliance_common::models::{
    Appliance, ApplianceUpdate, Identity, LinkedDocument, LinkedDocumentUpdate, MaintenanceTask,
    MaintenanceTaskUpdate, NewAppliance, NewLinkedDocument, NewMaintenanceTask,
    NewSupportContact, SupportContact, SupportContactUpdate,
};
use appliance_common::services::{ApplianceStore, BoxFuture, Clock};
use appliance_core::status::task_status;
use reqwest::Method;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::SupabaseClient;
use crate::rows::{
    ApplianceColumns, ApplianceRow, LinkedDocumentRow, MaintenanceTaskColumns, MaintenanceTaskRow,
    SupportContactRow, APPLIANCES, LINKED_DOCUMENTS, MAINTENANCE_TASKS, SUPPORT_CONTACTS,
};

const OWNER_JOIN: &str = "*,appliances!inner(user_id)";

fn eq(value: impl Display) -> String {
    format!("eq.{}", value)
}

fn in_list(ids: &[Uuid]) -> String {
    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("in.({})", ids.join(","))
}

fn first<T>(rows: Vec<T>, missing: impl FnOnce() -> String) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound(missing()))
}

fn group_by_appliance<T>(
    items: Vec<T>,
    appliance_id: impl Fn(&T) -> Uuid,
) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(appliance_id(&item)).or_default().push(item);
    }
    grouped
}

pub struct SupabaseStore {
    client: SupabaseClient,
    clock: Arc<dyn Clock>,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        identity: &Identity,
        table: &str,
        filter: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .client
            .request(Method::GET, &self.client.rest_url(table), Some(identity))
            .query(filter);
        self.client.send_json(request).await
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        identity: &Identity,
        table: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let request = self
            .client
            .request(Method::POST, &self.client.rest_url(table), Some(identity))
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<T> = self.client.send_json(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("Insert into {} returned no row", table)))
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        identity: &Identity,
        table: &str,
        filter: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .client
            .request(Method::PATCH, &self.client.rest_url(table), Some(identity))
            .query(filter)
            .header("Prefer", "return=representation")
            .json(body);
        self.client.send_json(request).await
    }

    async fn delete(
        &self,
        identity: &Identity,
        table: &str,
        filter: &[(&str, String)],
    ) -> Result<(), StoreError> {
        let request = self
            .client
            .request(Method::DELETE, &self.client.rest_url(table), Some(identity))
            .query(filter);
        self.client.send_empty(request).await
    }

    async fn owned_appliance(&self, identity: &Identity, id: Uuid) -> Result<ApplianceRow, StoreError> {
        let rows = self
            .select(
                identity,
                APPLIANCES,
                &[("id", eq(id)), ("user_id", eq(&identity.user_id))],
            )
            .await?;
        first(rows, || format!("Appliance {} not found", id))
    }

    /// A child row, only if its parent appliance belongs to `identity`.
    async fn owned_child<T: DeserializeOwned>(
        &self,
        identity: &Identity,
        table: &str,
        label: &str,
        id: Uuid,
    ) -> Result<T, StoreError> {
        let rows = self
            .select(
                identity,
                table,
                &[
                    ("select", OWNER_JOIN.to_string()),
                    ("id", eq(id)),
                    ("appliances.user_id", eq(&identity.user_id)),
                ],
            )
            .await?;
        first(rows, || format!("{} {} not found", label, id))
    }

    async fn list_children<T: DeserializeOwned>(
        &self,
        identity: &Identity,
        table: &str,
        appliance_ids: &[Uuid],
    ) -> Result<Vec<T>, StoreError> {
        if appliance_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            identity,
            table,
            &[
                ("select", OWNER_JOIN.to_string()),
                ("appliance_id", in_list(appliance_ids)),
                ("appliances.user_id", eq(&identity.user_id)),
            ],
        )
        .await
    }

    async fn attach_children(
        &self,
        identity: &Identity,
        rows: Vec<ApplianceRow>,
    ) -> Result<Vec<Appliance>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (contacts, tasks, documents) = tokio::try_join!(
            self.list_support_contacts(identity, &ids),
            self.list_maintenance_tasks(identity, &ids),
            self.list_linked_documents(identity, &ids),
        )?;

        let mut contacts = group_by_appliance(contacts, |c| c.appliance_id);
        let mut tasks = group_by_appliance(tasks, |t| t.appliance_id);
        let mut documents = group_by_appliance(documents, |d| d.appliance_id);

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                row.into_appliance(
                    contacts.remove(&id).unwrap_or_default(),
                    tasks.remove(&id).unwrap_or_default(),
                    documents.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }
}

impl ApplianceStore for SupabaseStore {
    fn list_appliances<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> BoxFuture<'a, Vec<Appliance>, StoreError> {
        Box::pin(async move {
            let rows: Vec<ApplianceRow> = self
                .select(
                    identity,
                    APPLIANCES,
                    &[
                        ("user_id", eq(&identity.user_id)),
                        ("order", "created_at.desc".to_string()),
                    ],
                )
                .await?;
            let appliances = self.attach_children(identity, rows).await?;
            debug!(
                "Loaded {} appliances for {}",
                appliances.len(),
                identity.user_id
            );
            Ok(appliances)
        })
    }

    fn create_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        appliance: NewAppliance,
    ) -> BoxFuture<'a, Appliance, StoreError> {
        Box::pin(async move {
            let columns = ApplianceColumns::from_new(&appliance, &identity.user_id);
            let row: ApplianceRow = self.insert(identity, APPLIANCES, &columns).await?;
            info!("Created appliance {} for {}", row.id, identity.user_id);
            Ok(row.into_appliance(Vec::new(), Vec::new(), Vec::new()))
        })
    }

    fn update_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: ApplianceUpdate,
    ) -> BoxFuture<'a, Appliance, StoreError> {
        Box::pin(async move {
            let now = self.clock.now();
            let mut appliance = self
                .owned_appliance(identity, id)
                .await?
                .into_appliance(Vec::new(), Vec::new(), Vec::new());
            appliance.apply_update(update, now);

            let mut columns = ApplianceColumns::from_appliance(&appliance);
            columns.updated_at = Some(now);
            let rows: Vec<ApplianceRow> = self
                .patch(
                    identity,
                    APPLIANCES,
                    &[("id", eq(id)), ("user_id", eq(&identity.user_id))],
                    &columns,
                )
                .await?;
            let row = first(rows, || "Appliance not found after update".to_string())?;

            let mut reread = self.attach_children(identity, vec![row]).await?;
            reread
                .pop()
                .ok_or_else(|| StoreError::NotFound("Appliance not found after update".to_string()))
        })
    }

    fn delete_appliance<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.owned_appliance(identity, id).await?;
            let by_parent = [("appliance_id", eq(id))];
            tokio::try_join!(
                self.delete(identity, SUPPORT_CONTACTS, &by_parent),
                self.delete(identity, MAINTENANCE_TASKS, &by_parent),
                self.delete(identity, LINKED_DOCUMENTS, &by_parent),
            )?;
            self.delete(
                identity,
                APPLIANCES,
                &[("id", eq(id)), ("user_id", eq(&identity.user_id))],
            )
            .await?;
            info!("Deleted appliance {} for {}", id, identity.user_id);
            Ok(())
        })
    }

    fn list_support_contacts<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<SupportContact>, StoreError> {
        Box::pin(async move {
            let rows: Vec<SupportContactRow> = self
                .list_children(identity, SUPPORT_CONTACTS, appliance_ids)
                .await?;
            Ok(rows.into_iter().map(SupportContact::from).collect())
        })
    }

    fn create_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        contact: NewSupportContact,
    ) -> BoxFuture<'a, SupportContact, StoreError> {
        Box::pin(async move {
            self.owned_appliance(identity, appliance_id).await?;
            // The id column is filled in by the database.
            let contact = SupportContact::from_new(Uuid::nil(), appliance_id, contact);
            let row: SupportContactRow = self
                .insert(identity, SUPPORT_CONTACTS, &SupportContactRow::from(&contact))
                .await?;
            Ok(row.into())
        })
    }

    fn update_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: SupportContactUpdate,
    ) -> BoxFuture<'a, SupportContact, StoreError> {
        Box::pin(async move {
            let row: SupportContactRow = self
                .owned_child(identity, SUPPORT_CONTACTS, "Support contact", id)
                .await?;
            let mut contact = SupportContact::from(row);
            contact.apply_update(update);
            let rows: Vec<SupportContactRow> = self
                .patch(
                    identity,
                    SUPPORT_CONTACTS,
                    &[("id", eq(id))],
                    &SupportContactRow::from(&contact),
                )
                .await?;
            first(rows, || format!("Support contact {} not found", id)).map(SupportContact::from)
        })
    }

    fn delete_support_contact<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.owned_child::<IgnoredAny>(identity, SUPPORT_CONTACTS, "Support contact", id)
                .await?;
            self.delete(identity, SUPPORT_CONTACTS, &[("id", eq(id))]).await
        })
    }

    fn list_maintenance_tasks<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<MaintenanceTask>, StoreError> {
        Box::pin(async move {
            let rows: Vec<MaintenanceTaskRow> = self
                .list_children(identity, MAINTENANCE_TASKS, appliance_ids)
                .await?;
            Ok(rows.into_iter().map(MaintenanceTask::from).collect())
        })
    }

    fn create_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        task: NewMaintenanceTask,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError> {
        Box::pin(async move {
            self.owned_appliance(identity, appliance_id).await?;
            let task = MaintenanceTask::from_new(Uuid::nil(), appliance_id, task);
            let status = task_status(&task, self.clock.now());
            let row: MaintenanceTaskRow = self
                .insert(
                    identity,
                    MAINTENANCE_TASKS,
                    &MaintenanceTaskColumns::from_task(&task, status),
                )
                .await?;
            Ok(row.into())
        })
    }

    fn update_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: MaintenanceTaskUpdate,
    ) -> BoxFuture<'a, MaintenanceTask, StoreError> {
        Box::pin(async move {
            let row: MaintenanceTaskRow = self
                .owned_child(identity, MAINTENANCE_TASKS, "Maintenance task", id)
                .await?;
            let mut task = MaintenanceTask::from(row);
            task.apply_update(update);
            let status = task_status(&task, self.clock.now());
            let rows: Vec<MaintenanceTaskRow> = self
                .patch(
                    identity,
                    MAINTENANCE_TASKS,
                    &[("id", eq(id))],
                    &MaintenanceTaskColumns::from_task(&task, status),
                )
                .await?;
            first(rows, || format!("Maintenance task {} not found", id)).map(MaintenanceTask::from)
        })
    }

    fn delete_maintenance_task<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.owned_child::<IgnoredAny>(identity, MAINTENANCE_TASKS, "Maintenance task", id)
                .await?;
            self.delete(identity, MAINTENANCE_TASKS, &[("id", eq(id))]).await
        })
    }

    fn list_linked_documents<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_ids: &'a [Uuid],
    ) -> BoxFuture<'a, Vec<LinkedDocument>, StoreError> {
        Box::pin(async move {
            let rows: Vec<LinkedDocumentRow> = self
                .list_children(identity, LINKED_DOCUMENTS, appliance_ids)
                .await?;
            Ok(rows.into_iter().map(LinkedDocument::from).collect())
        })
    }

    fn create_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        appliance_id: Uuid,
        document: NewLinkedDocument,
    ) -> BoxFuture<'a, LinkedDocument, StoreError> {
        Box::pin(async move {
            self.owned_appliance(identity, appliance_id).await?;
            let document = LinkedDocument::from_new(Uuid::nil(), appliance_id, document);
            let row: LinkedDocumentRow = self
                .insert(identity, LINKED_DOCUMENTS, &LinkedDocumentRow::from(&document))
                .await?;
            Ok(row.into())
        })
    }

    fn update_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
        update: LinkedDocumentUpdate,
    ) -> BoxFuture<'a, LinkedDocument, StoreError> {
        Box::pin(async move {
            let row: LinkedDocumentRow = self
                .owned_child(identity, LINKED_DOCUMENTS, "Document", id)
                .await?;
            let mut document = LinkedDocument::from(row);
            document.apply_update(update);
            let rows: Vec<LinkedDocumentRow> = self
                .patch(
                    identity,
                    LINKED_DOCUMENTS,
                    &[("id", eq(id))],
                    &LinkedDocumentRow::from(&document),
                )
                .await?;
            first(rows, || format!("Document {} not found", id)).map(LinkedDocument::from)
        })
    }

    fn delete_linked_document<'a>(
        &'a self,
        identity: &'a Identity,
        id: Uuid,
    ) -> BoxFuture<'a, (), StoreError> {
        Box::pin(async move {
            self.owned_child::<IgnoredAny>(identity, LINKED_DOCUMENTS, "Document", id)
                .await?;
            self.delete(identity, LINKED_DOCUMENTS, &[("id", eq(id))]).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_list_joins_ids() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_eq!(
            in_list(&[a, b]),
            format!("in.({},{})", a, b)
        );
    }

    #[test]
    fn test_group_by_appliance_keeps_order() {
        let grouped = group_by_appliance(vec![(1u128, "a"), (2, "b"), (1, "c")], |(id, _)| {
            Uuid::from_u128(*id)
        });
        assert_eq!(grouped[&Uuid::from_u128(1)], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&Uuid::from_u128(2)].len(), 1);
    }
}
