// --- File: crates/appliance_supabase/src/rows.rs ---
//! Table rows as PostgREST reads and writes them (snake_case columns,
//! date-only strings) and their conversion to the domain records.

use appliance_common::models::{
    flexible_date, Appliance, Frequency, LinkedDocument, MaintenanceStatus, MaintenanceTask,
    NewAppliance, ServiceProvider, SupportContact,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const APPLIANCES: &str = "appliances";
pub const SUPPORT_CONTACTS: &str = "support_contacts";
pub const MAINTENANCE_TASKS: &str = "maintenance_tasks";
pub const LINKED_DOCUMENTS: &str = "linked_documents";

/// Dates are stored without a time of day.
pub fn date_only(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplianceRow {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub model: String,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub purchase_date: DateTime<Utc>,
    pub warranty_duration_months: u32,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub purchase_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl ApplianceRow {
    pub fn into_appliance(
        self,
        support_contacts: Vec<SupportContact>,
        maintenance_tasks: Vec<MaintenanceTask>,
        linked_documents: Vec<LinkedDocument>,
    ) -> Appliance {
        Appliance {
            id: self.id,
            name: self.name,
            brand: self.brand,
            model: self.model,
            purchase_date: self.purchase_date,
            warranty_duration_months: self.warranty_duration_months,
            serial_number: non_empty(self.serial_number),
            purchase_location: non_empty(self.purchase_location),
            notes: non_empty(self.notes),
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            support_contacts,
            maintenance_tasks,
            linked_documents,
        }
    }
}

/// Mutable appliance columns, written in full on insert and update.
#[derive(Debug, Serialize)]
pub struct ApplianceColumns<'a> {
    pub name: &'a str,
    pub brand: &'a str,
    pub model: &'a str,
    pub purchase_date: String,
    pub warranty_duration_months: u32,
    pub serial_number: Option<&'a str>,
    pub purchase_location: Option<&'a str>,
    pub notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<'a> ApplianceColumns<'a> {
    pub fn from_appliance(appliance: &'a Appliance) -> Self {
        Self {
            name: &appliance.name,
            brand: &appliance.brand,
            model: &appliance.model,
            purchase_date: date_only(appliance.purchase_date),
            warranty_duration_months: appliance.warranty_duration_months,
            serial_number: appliance.serial_number.as_deref(),
            purchase_location: appliance.purchase_location.as_deref(),
            notes: appliance.notes.as_deref(),
            user_id: None,
            updated_at: None,
        }
    }

    pub fn from_new(appliance: &'a NewAppliance, user_id: &'a str) -> Self {
        Self {
            name: &appliance.name,
            brand: &appliance.brand,
            model: &appliance.model,
            purchase_date: date_only(appliance.purchase_date),
            warranty_duration_months: appliance.warranty_duration_months,
            serial_number: appliance.serial_number.as_deref(),
            purchase_location: appliance.purchase_location.as_deref(),
            notes: appliance.notes.as_deref(),
            user_id: Some(user_id),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportContactRow {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub appliance_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<SupportContactRow> for SupportContact {
    fn from(row: SupportContactRow) -> Self {
        Self {
            id: row.id,
            appliance_id: row.appliance_id,
            name: row.name,
            company: non_empty(row.company),
            phone: non_empty(row.phone),
            email: non_empty(row.email),
            website: non_empty(row.website),
            notes: non_empty(row.notes),
        }
    }
}

impl From<&SupportContact> for SupportContactRow {
    fn from(contact: &SupportContact) -> Self {
        Self {
            id: contact.id,
            appliance_id: contact.appliance_id,
            name: contact.name.clone(),
            company: contact.company.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            website: contact.website.clone(),
            notes: contact.notes.clone(),
        }
    }
}

/// The provider is flattened into four nullable columns.
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceTaskRow {
    pub id: Uuid,
    pub appliance_id: Uuid,
    pub task_name: String,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub scheduled_date: DateTime<Utc>,
    pub frequency: Frequency,
    #[serde(default)]
    pub service_provider_name: Option<String>,
    #[serde(default)]
    pub service_provider_phone: Option<String>,
    #[serde(default)]
    pub service_provider_email: Option<String>,
    #[serde(default)]
    pub service_provider_notes: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "flexible_date::deserialize_option")]
    pub completed_date: Option<DateTime<Utc>>,
}

impl From<MaintenanceTaskRow> for MaintenanceTask {
    fn from(row: MaintenanceTaskRow) -> Self {
        let service_provider = non_empty(row.service_provider_name).map(|name| ServiceProvider {
            name,
            phone: non_empty(row.service_provider_phone),
            email: non_empty(row.service_provider_email),
            notes: non_empty(row.service_provider_notes),
        });
        Self {
            id: row.id,
            appliance_id: row.appliance_id,
            task_name: row.task_name,
            scheduled_date: row.scheduled_date,
            frequency: row.frequency,
            service_provider,
            notes: non_empty(row.notes),
            completed_date: row.completed_date,
        }
    }
}

/// Task columns as written. `status` is stored for other readers of the
/// table; this crate always derives it again on read.
#[derive(Debug, Serialize)]
pub struct MaintenanceTaskColumns<'a> {
    pub appliance_id: Uuid,
    pub task_name: &'a str,
    pub scheduled_date: String,
    pub frequency: Frequency,
    pub service_provider_name: Option<&'a str>,
    pub service_provider_phone: Option<&'a str>,
    pub service_provider_email: Option<&'a str>,
    pub service_provider_notes: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub status: MaintenanceStatus,
    pub completed_date: Option<String>,
}

impl<'a> MaintenanceTaskColumns<'a> {
    pub fn from_task(task: &'a MaintenanceTask, status: MaintenanceStatus) -> Self {
        let provider = task.service_provider.as_ref();
        Self {
            appliance_id: task.appliance_id,
            task_name: &task.task_name,
            scheduled_date: date_only(task.scheduled_date),
            frequency: task.frequency,
            service_provider_name: provider.map(|p| p.name.as_str()),
            service_provider_phone: provider.and_then(|p| p.phone.as_deref()),
            service_provider_email: provider.and_then(|p| p.email.as_deref()),
            service_provider_notes: provider.and_then(|p| p.notes.as_deref()),
            notes: task.notes.as_deref(),
            status,
            completed_date: task.completed_date.map(date_only),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedDocumentRow {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub appliance_id: Uuid,
    pub title: String,
    pub url: String,
}

impl From<LinkedDocumentRow> for LinkedDocument {
    fn from(row: LinkedDocumentRow) -> Self {
        Self {
            id: row.id,
            appliance_id: row.appliance_id,
            title: row.title,
            url: row.url,
        }
    }
}

impl From<&LinkedDocument> for LinkedDocumentRow {
    fn from(document: &LinkedDocument) -> Self {
        Self {
            id: document.id,
            appliance_id: document.appliance_id,
            title: document.title.clone(),
            url: document.url.clone(),
        }
    }
}

/// Empty strings in the table mean "not set".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_task_row_rebuilds_provider() {
        let row: MaintenanceTaskRow = serde_json::from_value(json!({
            "id": "2f1b6c1e-6a59-4a5c-9d0b-6f0b7c1d2e3f",
            "appliance_id": "7d3c2b1a-0f9e-4d8c-8b7a-6f5e4d3c2b1a",
            "task_name": "Replace water filter",
            "scheduled_date": "2025-06-20",
            "frequency": "Monthly",
            "service_provider_name": "Appliance Service Co",
            "service_provider_phone": "555-123-4567",
            "service_provider_email": "",
            "service_provider_notes": null,
            "notes": null,
            "status": "Upcoming",
            "completed_date": null,
            "created_at": "2025-06-01T10:00:00.123456+00:00"
        }))
        .unwrap();
        let task = MaintenanceTask::from(row);

        assert_eq!(
            task.scheduled_date,
            Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap()
        );
        let provider = task.service_provider.unwrap();
        assert_eq!(provider.name, "Appliance Service Co");
        assert_eq!(provider.email, None);
        assert_eq!(task.completed_date, None);
    }

    #[test]
    fn test_task_columns_write_dates_and_status() {
        let task = MaintenanceTask {
            id: Uuid::new_v4(),
            appliance_id: Uuid::nil(),
            task_name: "Descale machine".into(),
            scheduled_date: Utc.with_ymd_and_hms(2025, 6, 20, 15, 30, 0).unwrap(),
            frequency: Frequency::OneTime,
            service_provider: None,
            notes: None,
            completed_date: Some(Utc.with_ymd_and_hms(2025, 6, 19, 8, 0, 0).unwrap()),
        };
        let value =
            serde_json::to_value(MaintenanceTaskColumns::from_task(&task, MaintenanceStatus::Completed))
                .unwrap();

        assert_eq!(value["scheduled_date"], "2025-06-20");
        assert_eq!(value["completed_date"], "2025-06-19");
        assert_eq!(value["frequency"], "One-time");
        assert_eq!(value["status"], "Completed");
        assert!(value["service_provider_name"].is_null());
    }

    #[test]
    fn test_appliance_row_drops_empty_strings() {
        let row: ApplianceRow = serde_json::from_value(json!({
            "id": "7d3c2b1a-0f9e-4d8c-8b7a-6f5e4d3c2b1a",
            "name": "Sonos Arc Soundbar",
            "brand": "Sonos",
            "model": "Arc",
            "purchase_date": "2023-06-15",
            "warranty_duration_months": 12,
            "serial_number": "",
            "purchase_location": "Sonos.com",
            "notes": null,
            "user_id": "u1",
            "created_at": "2025-06-01T10:00:00+00:00",
            "updated_at": "2025-06-01T10:00:00+00:00"
        }))
        .unwrap();
        let appliance = row.into_appliance(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(appliance.serial_number, None);
        assert_eq!(appliance.purchase_location.as_deref(), Some("Sonos.com"));
        assert_eq!(appliance.user_id.as_deref(), Some("u1"));
    }
}
