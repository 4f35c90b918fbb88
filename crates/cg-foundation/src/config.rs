//! Engine configuration, layered from defaults, an optional config file, and
//! environment variables (in that order of increasing precedence).

use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{CgError, CgResult};

const DEFAULT_STDLIB_BASE_URL: &str = "https://stdlib.codegraph.dev";
const DEFAULT_REQUEST_DEADLINE_MS: u64 = 30_000;

/// Log output format, selected via `--log-format` or `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process-wide configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL the stdlib manifest loader fetches `go<major.minor>/manifest.json` from.
    pub stdlib_base_url: String,
    /// Directory the stdlib manifest cache is written under. Defaults to the
    /// OS cache directory when unset.
    pub stdlib_cache_dir: Option<PathBuf>,
    /// Per-request deadline for the query server, in milliseconds.
    pub request_deadline_ms: u64,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stdlib_base_url: DEFAULT_STDLIB_BASE_URL.to_string(),
            stdlib_cache_dir: None,
            request_deadline_ms: DEFAULT_REQUEST_DEADLINE_MS,
            log_format: LogFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional TOML file plus `CG_*` environment
    /// variables, falling back to the built-in defaults.
    pub fn load(config_file: Option<&std::path::Path>) -> CgResult<Self> {
        let mut figment = Figment::from(figment::providers::Serialized::defaults(
            EngineConfig::default(),
        ));

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CG_").split("_").lowercase(true));

        figment
            .extract()
            .map_err(|e| CgError::invalid_data(format!("invalid configuration: {e}")))
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.request_deadline_ms)
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.stdlib_cache_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("dev", "codegraph", "cg-cli")
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".cg-cache"))
        })
    }
}
