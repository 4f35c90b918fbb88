//! Shared foundation: errors, configuration, and logging for the call
//! graph engine and its query server.

pub mod config;
pub mod error;
pub mod logging;

pub use config::EngineConfig;
pub use error::{CgError, CgResult};
