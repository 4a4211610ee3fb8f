//! Library entrypoint for the EduLift user store setup.
//!
//! The binary only wires these together; integration tests under `tests/`
//! import the schema, index and provisioning modules directly.

pub mod config;
pub mod error;
pub mod indexes;
pub mod models;
pub mod schema;
pub mod services;
pub mod summary;

pub use error::{SetupError, SetupResult};
