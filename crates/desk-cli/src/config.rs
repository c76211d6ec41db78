use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use desk_jobs::JobConfig;
use desk_server::ServerConfig;
use desk_sla::SlaConfig;

/// Settings for every desk component, read from a TOML file.
///
/// ```toml
/// [sla]
/// scope_match = "all"
///
/// [server]
/// bind_addr = "0.0.0.0:8787"
///
/// [jobs]
/// steps = 20
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub sla: SlaConfig,
    pub server: ServerConfig,
    pub jobs: JobConfig,
}

impl DeskConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.jobs.validate()?;
        Ok(config)
    }

    /// The default config when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
