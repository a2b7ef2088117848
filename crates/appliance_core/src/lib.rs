// --- File: crates/appliance_core/src/lib.rs ---
// Declare modules within this crate
pub mod cache;
pub mod identity;
pub mod memory_store;
pub mod sample_data;
pub mod session;
pub mod status;
#[cfg(test)]
mod status_proptest;
pub mod validation;

pub use cache::{FileCache, MemoryCache};
pub use identity::StaticIdentityProvider;
pub use memory_store::MemoryStore;
pub use sample_data::generate_sample_appliances;
pub use session::{ApplianceSession, DataSource, Notice, NoticeLevel};
pub use status::{
    add_calendar_months, maintenance_status, warranty_end_date, warranty_status, ApplianceView,
    MaintenanceTaskView, WarrantySummary,
};
pub use validation::Validated;
