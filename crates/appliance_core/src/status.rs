//! Warranty and maintenance status derivation.
//!
//! Everything here is a pure function of its inputs and an explicit `now`.
//! Nothing is cached: statuses are recomputed every time a record is read.

use appliance_common::models::{
    Appliance, MaintenanceStatus, MaintenanceTask, WarrantyStatus,
};
use chrono::{DateTime, Months, Utc};
use serde::Serialize;

/// Warranties ending within this many whole days are reported as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Add calendar months to a timestamp.
///
/// The day of month is kept when it exists in the target month and clamped to
/// the month's last day otherwise: Jan 31 + 1 month is Feb 29 in a leap year,
/// Feb 28 in other years. Time of day is unchanged. Results beyond chrono's
/// range saturate to `DateTime::<Utc>::MAX_UTC`.
pub fn add_calendar_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Subtract calendar months with the same clamping rule as `add_calendar_months`.
pub fn sub_calendar_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The moment the warranty runs out.
pub fn warranty_end_date(purchase_date: DateTime<Utc>, duration_months: u32) -> DateTime<Utc> {
    add_calendar_months(purchase_date, duration_months)
}

/// Derive the warranty status.
///
/// * `Expired` when `now` is strictly after the end date.
/// * `Active` when the end date is exactly `now` (not yet past).
/// * `ExpiringSoon` when at most 30 whole days remain. Partial days are
///   truncated, so an end 30 days and 23 hours away still counts.
/// * `Active` otherwise.
pub fn warranty_status(
    purchase_date: DateTime<Utc>,
    duration_months: u32,
    now: DateTime<Utc>,
) -> WarrantyStatus {
    let end = warranty_end_date(purchase_date, duration_months);
    if now > end {
        return WarrantyStatus::Expired;
    }
    if end == now {
        return WarrantyStatus::Active;
    }
    if (end - now).num_days() <= EXPIRING_SOON_DAYS {
        WarrantyStatus::ExpiringSoon
    } else {
        WarrantyStatus::Active
    }
}

/// Derive the status of a maintenance task.
///
/// A completion date always wins. Without one the task is overdue once the
/// scheduled moment is strictly in the past.
pub fn maintenance_status(
    scheduled_date: DateTime<Utc>,
    completed_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> MaintenanceStatus {
    if completed_date.is_some() {
        MaintenanceStatus::Completed
    } else if scheduled_date < now {
        MaintenanceStatus::Overdue
    } else {
        MaintenanceStatus::Upcoming
    }
}

/// Convenience for `maintenance_status` on a stored task.
pub fn task_status(task: &MaintenanceTask, now: DateTime<Utc>) -> MaintenanceStatus {
    maintenance_status(task.scheduled_date, task.completed_date, now)
}

/// A task together with its status at evaluation time.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTaskView {
    #[serde(flatten)]
    pub task: MaintenanceTask,
    pub status: MaintenanceStatus,
}

/// An appliance as shown to the presentation layer, with every derived value filled in.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceView {
    #[serde(flatten)]
    pub appliance: Appliance,
    pub warranty_end_date: DateTime<Utc>,
    pub warranty_status: WarrantyStatus,
    /// Replaces the raw task list of `appliance` in serialized output.
    pub maintenance_tasks: Vec<MaintenanceTaskView>,
}

impl ApplianceView {
    pub fn evaluate(appliance: &Appliance, now: DateTime<Utc>) -> Self {
        let maintenance_tasks = appliance
            .maintenance_tasks
            .iter()
            .map(|task| MaintenanceTaskView {
                status: task_status(task, now),
                task: task.clone(),
            })
            .collect();

        let mut appliance = appliance.clone();
        // Emptied so the flattened record does not serialize a second, status-less list.
        appliance.maintenance_tasks.clear();

        Self {
            warranty_end_date: warranty_end_date(
                appliance.purchase_date,
                appliance.warranty_duration_months,
            ),
            warranty_status: warranty_status(
                appliance.purchase_date,
                appliance.warranty_duration_months,
                now,
            ),
            appliance,
            maintenance_tasks,
        }
    }

    pub fn evaluate_all(appliances: &[Appliance], now: DateTime<Utc>) -> Vec<Self> {
        appliances
            .iter()
            .map(|appliance| Self::evaluate(appliance, now))
            .collect()
    }
}

/// Dashboard counters over a set of evaluated appliances.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantySummary {
    pub total_appliances: usize,
    pub active_warranties: usize,
    pub expiring_soon: usize,
    pub expired_warranties: usize,
    pub upcoming_tasks: usize,
    pub overdue_tasks: usize,
    pub completed_tasks: usize,
}

impl WarrantySummary {
    pub fn from_views(views: &[ApplianceView]) -> Self {
        let mut summary = Self {
            total_appliances: views.len(),
            ..Self::default()
        };
        for view in views {
            match view.warranty_status {
                WarrantyStatus::Active => summary.active_warranties += 1,
                WarrantyStatus::ExpiringSoon => summary.expiring_soon += 1,
                WarrantyStatus::Expired => summary.expired_warranties += 1,
            }
            for task in &view.maintenance_tasks {
                match task.status {
                    MaintenanceStatus::Upcoming => summary.upcoming_tasks += 1,
                    MaintenanceStatus::Overdue => summary.overdue_tasks += 1,
                    MaintenanceStatus::Completed => summary.completed_tasks += 1,
                }
            }
        }
        summary
    }
}
