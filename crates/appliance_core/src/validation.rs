//! Input checks applied before anything reaches a store or the session.
//!
//! Validation produces a `Validated<T>` wrapper. The session's mutating
//! methods only accept that wrapper, so unchecked input cannot reach them.

use appliance_common::error::FieldErrors;
use appliance_common::models::{
    ApplianceInput, ApplianceUpdate, LinkedDocumentUpdate, MaintenanceTaskUpdate, NewAppliance,
    NewLinkedDocument, NewMaintenanceTask, NewSupportContact, ServiceProvider,
    SupportContactUpdate,
};
use chrono::{DateTime, Utc};

/// Input that passed validation. Only this module can construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> AsRef<T> for Validated<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Trim; an empty value becomes `None`.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same as `optional_text` for the "clear or set" slot of an update.
fn optional_update(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(optional_text)
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.is_empty() {
        errors.add(field, message);
    }
}

fn clean_provider(provider: Option<ServiceProvider>) -> Option<ServiceProvider> {
    provider.and_then(|p| {
        let name = p.name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(ServiceProvider {
            name,
            phone: optional_text(p.phone),
            email: optional_text(p.email),
            notes: optional_text(p.notes),
        })
    })
}

/// Check a new appliance.
///
/// Name, brand and model are required. The purchase date is required and must
/// not lie after `now`. The warranty runs for at least one month.
pub fn validate_appliance(
    input: ApplianceInput,
    now: DateTime<Utc>,
) -> Result<Validated<NewAppliance>, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = trimmed(input.name);
    let brand = trimmed(input.brand);
    let model = trimmed(input.model);
    require(&mut errors, "name", &name, "Appliance name is required");
    require(&mut errors, "brand", &brand, "Brand is required");
    require(&mut errors, "model", &model, "Model is required");

    match input.purchase_date {
        None => errors.add("purchaseDate", "Purchase date is required"),
        Some(date) if date > now => {
            errors.add("purchaseDate", "Purchase date cannot be in the future")
        }
        Some(_) => {}
    }

    let months = u32::try_from(input.warranty_duration_months)
        .ok()
        .filter(|months| *months >= 1);
    if months.is_none() {
        errors.add(
            "warrantyDurationMonths",
            "Warranty duration must be at least 1 month",
        );
    }

    match (input.purchase_date, months) {
        (Some(purchase_date), Some(warranty_duration_months)) if errors.is_empty() => {
            Ok(Validated(NewAppliance {
                name,
                brand,
                model,
                purchase_date,
                warranty_duration_months,
                serial_number: optional_text(input.serial_number),
                purchase_location: optional_text(input.purchase_location),
                notes: optional_text(input.notes),
            }))
        }
        _ => Err(errors),
    }
}

/// Check a partial appliance update. Only the present slots are checked.
pub fn validate_appliance_update(
    update: ApplianceUpdate,
) -> Result<Validated<ApplianceUpdate>, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = update.name.map(trimmed);
    let brand = update.brand.map(trimmed);
    let model = update.model.map(trimmed);
    if let Some(name) = &name {
        require(&mut errors, "name", name, "Appliance name is required");
    }
    if let Some(brand) = &brand {
        require(&mut errors, "brand", brand, "Brand is required");
    }
    if let Some(model) = &model {
        require(&mut errors, "model", model, "Model is required");
    }
    if update.warranty_duration_months == Some(0) {
        errors.add(
            "warrantyDurationMonths",
            "Warranty duration must be at least 1 month",
        );
    }

    errors.into_result()?;

    Ok(Validated(ApplianceUpdate {
        name,
        brand,
        model,
        purchase_date: update.purchase_date,
        warranty_duration_months: update.warranty_duration_months,
        serial_number: optional_update(update.serial_number),
        purchase_location: optional_update(update.purchase_location),
        notes: optional_update(update.notes),
    }))
}

pub fn validate_support_contact(
    contact: NewSupportContact,
) -> Result<Validated<NewSupportContact>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = trimmed(contact.name);
    require(&mut errors, "name", &name, "Contact name is required");
    errors.into_result()?;

    Ok(Validated(NewSupportContact {
        name,
        company: optional_text(contact.company),
        phone: optional_text(contact.phone),
        email: optional_text(contact.email),
        website: optional_text(contact.website),
        notes: optional_text(contact.notes),
    }))
}

pub fn validate_support_contact_update(
    update: SupportContactUpdate,
) -> Result<Validated<SupportContactUpdate>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = update.name.map(trimmed);
    if let Some(name) = &name {
        require(&mut errors, "name", name, "Contact name is required");
    }
    errors.into_result()?;

    Ok(Validated(SupportContactUpdate {
        name,
        company: optional_update(update.company),
        phone: optional_update(update.phone),
        email: optional_update(update.email),
        website: optional_update(update.website),
        notes: optional_update(update.notes),
    }))
}

pub fn validate_maintenance_task(
    task: NewMaintenanceTask,
) -> Result<Validated<NewMaintenanceTask>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let task_name = trimmed(task.task_name);
    require(&mut errors, "taskName", &task_name, "Task name is required");
    errors.into_result()?;

    Ok(Validated(NewMaintenanceTask {
        task_name,
        scheduled_date: task.scheduled_date,
        frequency: task.frequency,
        service_provider: clean_provider(task.service_provider),
        notes: optional_text(task.notes),
        completed_date: task.completed_date,
    }))
}

pub fn validate_maintenance_task_update(
    update: MaintenanceTaskUpdate,
) -> Result<Validated<MaintenanceTaskUpdate>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let task_name = update.task_name.map(trimmed);
    if let Some(task_name) = &task_name {
        require(&mut errors, "taskName", task_name, "Task name is required");
    }
    errors.into_result()?;

    Ok(Validated(MaintenanceTaskUpdate {
        task_name,
        scheduled_date: update.scheduled_date,
        frequency: update.frequency,
        service_provider: update.service_provider.map(clean_provider),
        notes: optional_update(update.notes),
        completed_date: update.completed_date,
    }))
}

pub fn validate_linked_document(
    document: NewLinkedDocument,
) -> Result<Validated<NewLinkedDocument>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = trimmed(document.title);
    let url = trimmed(document.url);
    require(&mut errors, "title", &title, "Document title is required");
    require(&mut errors, "url", &url, "Document URL is required");
    errors.into_result()?;

    Ok(Validated(NewLinkedDocument { title, url }))
}

pub fn validate_linked_document_update(
    update: LinkedDocumentUpdate,
) -> Result<Validated<LinkedDocumentUpdate>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = update.title.map(trimmed);
    let url = update.url.map(trimmed);
    if let Some(title) = &title {
        require(&mut errors, "title", title, "Document title is required");
    }
    if let Some(url) = &url {
        require(&mut errors, "url", url, "Document URL is required");
    }
    errors.into_result()?;

    Ok(Validated(LinkedDocumentUpdate { title, url }))
}
