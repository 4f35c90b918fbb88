//! Module Registry Builder (C1): parses `go.mod`, walks the project tree,
//! and maps directories to import paths and back.

pub mod gomod;
pub mod gowork;
pub mod registry;
pub mod version;

pub use registry::ModuleRegistry;
pub use version::resolve_toolchain_version;
