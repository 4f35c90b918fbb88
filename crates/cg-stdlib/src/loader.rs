//! Stdlib Manifest Loader (C2).
//!
//! The loader is the *authoritative* source for "is this import path part of
//! the standard library" — nothing else in the pipeline classifies an
//! import as stdlib. Absence of an entry is authoritative too: "this name
//! is not in this stdlib version", not "we don't know".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cg_foundation::error::{CgError, CgResult};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::manifest::{FunctionEntry, ManifestDocument, PackageIndex, TypeEntry};

/// Immutable after load. Read-only from every consuming thread.
#[derive(Debug)]
pub struct StdlibLoader {
    version: String,
    registry_version: String,
    packages: HashMap<String, PackageIndex>,
}

impl StdlibLoader {
    /// `validate(importPath) -> bool`. The sole authority on stdlib
    /// membership — classification code must never approximate this.
    pub fn validate(&self, import_path: &str) -> bool {
        self.packages.contains_key(import_path)
    }

    pub fn get_function(&self, import_path: &str, name: &str) -> Option<&FunctionEntry> {
        self.packages.get(import_path)?.functions.get(name)
    }

    pub fn get_type(&self, import_path: &str, name: &str) -> Option<&TypeEntry> {
        self.packages.get(import_path)?.types.get(name)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn registry_version(&self) -> &str {
        &self.registry_version
    }

    fn from_document(version: String, doc: ManifestDocument) -> Self {
        let packages = doc
            .packages
            .into_iter()
            .map(|pkg| (pkg.import_path.clone(), PackageIndex::from(pkg)))
            .collect();
        Self {
            version,
            registry_version: doc.registry_version,
            packages,
        }
    }
}

/// Fetches and parses the stdlib manifest for `version` (e.g. "1.21") from
/// `base_url`, consulting an on-disk cache first when `cache_dir` is given.
/// On any transport or parse error this returns `Err`; callers implementing
/// the pipeline's graceful-degradation policy should log a warning and
/// proceed with no loader attached rather than propagate the failure.
pub async fn load_stdlib_manifest(
    client: &Client,
    base_url: &str,
    version: &str,
    cache_dir: Option<&Path>,
) -> CgResult<StdlibLoader> {
    if let Some(dir) = cache_dir {
        if let Some(doc) = read_cache(dir, base_url, version) {
            info!(version, "loaded stdlib manifest from cache");
            return Ok(StdlibLoader::from_document(version.to_string(), doc));
        }
    }

    let url = format!("{base_url}/go{version}/manifest.json");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| CgError::network(format!("fetching {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(CgError::network(format!(
            "fetching {url}: HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| CgError::network(format!("reading body of {url}: {e}")))?;

    let doc: ManifestDocument = serde_json::from_str(&body)
        .map_err(|e| CgError::invalid_data(format!("parsing manifest from {url}: {e}")))?;

    if let Some(dir) = cache_dir {
        write_cache(dir, base_url, version, &body);
    }

    Ok(StdlibLoader::from_document(version.to_string(), doc))
}

/// Best-effort attempt that never fails the build: logs a warning and
/// returns `None` on any error, per the pipeline's graceful degradation
/// policy for stdlib metadata unavailability.
pub async fn try_load(
    client: &Client,
    base_url: &str,
    version: &str,
    cache_dir: Option<&Path>,
) -> Option<StdlibLoader> {
    match load_stdlib_manifest(client, base_url, version, cache_dir).await {
        Ok(loader) => Some(loader),
        Err(err) => {
            warn!(error = %err, version, "stdlib manifest unavailable, continuing without stdlib enrichment");
            None
        }
    }
}

pub fn default_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .expect("failed to build HTTP client")
}

fn cache_key(base_url: &str, version: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(base_url.as_bytes());
    hasher.update(b"|");
    hasher.update(version.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn cache_path(dir: &Path, base_url: &str, version: &str) -> PathBuf {
    dir.join(format!("{}.json", cache_key(base_url, version)))
}

fn read_cache(dir: &Path, base_url: &str, version: &str) -> Option<ManifestDocument> {
    let path = cache_path(dir, base_url, version);
    let body = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&body).ok()
}

fn write_cache(dir: &Path, base_url: &str, version: &str, body: &str) {
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    let path = cache_path(dir, base_url, version);
    if let Err(err) = std::fs::write(&path, body) {
        warn!(error = %err, path = %path.display(), "failed to write stdlib manifest cache");
    }
}
