// --- File: crates/appliance_api/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod doc;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod routes;

pub use handlers::ApiState;
pub use routes::routes;
