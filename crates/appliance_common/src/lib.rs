// --- File: crates/appliance_common/src/lib.rs ---

// Declare modules within this crate
pub mod clock; // Injectable time source
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    internal_error, not_authenticated, not_found, remote_unavailable, validation_error,
    ApplianceError, FieldErrors, HttpStatusCode, StoreError,
};

// Re-export HTTP utilities for easier access
pub use http::client::create_client;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_config, init_with_level, log_error, log_result};

pub use clock::{Clock, FixedClock, SystemClock};
pub use services::{ApplianceStore, BoxFuture, IdentityProvider, LocalCache, TokenVerifier};
