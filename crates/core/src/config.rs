use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default upper bound for a single external tool invocation.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

/// Environment variables that override tool locations when the config file is silent.
pub const FLS_ENV: &str = "RIPPER_FLS";
pub const ICAT_ENV: &str = "RIPPER_ICAT";
pub const FSSTAT_ENV: &str = "RIPPER_FSSTAT";
pub const FILE_ENV: &str = "RIPPER_FILE";

/// Serializable configuration for the external forensic tools.
///
/// Every path is optional. Resolution order is: explicit value here, then the
/// matching `RIPPER_*` environment variable, then the bare tool name on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fls: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icat: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsstat: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Per-invocation timeout in seconds; `None` uses `DEFAULT_TOOL_TIMEOUT_SECS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ToolConfig {
    /// Load a tool config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tool config at {}", path.display()))?;
        let config: ToolConfig =
            serde_json::from_str(&body).context("Failed to parse tool config JSON")?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Resolve every tool path and the timeout into concrete values.
    pub fn resolve(&self) -> ResolvedTools {
        ResolvedTools {
            fls: resolve_tool(self.fls.as_deref(), FLS_ENV, "fls"),
            icat: resolve_tool(self.icat.as_deref(), ICAT_ENV, "icat"),
            fsstat: resolve_tool(self.fsstat.as_deref(), FSSTAT_ENV, "fsstat"),
            file: resolve_tool(self.file.as_deref(), FILE_ENV, "file"),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS)),
        }
    }
}

/// Concrete tool locations after applying config, environment, and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTools {
    pub fls: PathBuf,
    pub icat: PathBuf,
    pub fsstat: PathBuf,
    pub file: PathBuf,
    #[serde(serialize_with = "serialize_secs")]
    pub timeout: Duration,
}

fn resolve_tool(configured: Option<&Path>, env_var: &str, default_name: &str) -> PathBuf {
    if let Some(p) = configured {
        return p.to_path_buf();
    }
    std::env::var_os(env_var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_name))
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}
