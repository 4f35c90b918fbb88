//! Wire shapes for the stdlib manifest document.
//!
//! `<baseURL>/go<major>.<minor>/manifest.json`. Missing optional fields are
//! tolerated — an older or partially-populated manifest should still load.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GoVersion {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnValue {
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub returns: Vec<ReturnValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeEntry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageEntry {
    #[serde(rename = "importPath")]
    pub import_path: String,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDocument {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    #[serde(rename = "registryVersion")]
    pub registry_version: String,
    #[serde(rename = "goVersion")]
    pub go_version: GoVersion,
    pub packages: Vec<PackageEntry>,
}

/// A package's functions and types, indexed by name for O(1) lookup.
#[derive(Debug, Clone)]
pub struct PackageIndex {
    pub functions: HashMap<String, FunctionEntry>,
    pub types: HashMap<String, TypeEntry>,
}

impl From<PackageEntry> for PackageIndex {
    fn from(entry: PackageEntry) -> Self {
        Self {
            functions: entry
                .functions
                .into_iter()
                .map(|f| (f.name.clone(), f))
                .collect(),
            types: entry.types.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }
}
