// --- File: crates/appliance_supabase/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod client;
mod rows;
pub mod store;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use store::SupabaseStore;
