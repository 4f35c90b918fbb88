//! Stdlib Manifest Loader (C2): version-aware remote registry with
//! graceful degradation when the registry is unreachable.

pub mod loader;
pub mod manifest;

pub use loader::{default_http_client, load_stdlib_manifest, try_load, StdlibLoader};
