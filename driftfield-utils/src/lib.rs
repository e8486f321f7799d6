// Driftfield shared utilities
//
// Configuration model, CLI arguments, error types and logging setup used by
// the client crate and the `driftfield` binary.

pub mod cli;
pub mod config;
pub mod consts;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

pub use config::{FieldConfig, FieldSettings};
pub use errors::{DriftError, DriftResult};
