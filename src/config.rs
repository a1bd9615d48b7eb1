use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::export::{DeliveryKind, ExportSettings, MAX_SCALE};

/// Environment variable names
pub mod env_vars {
    pub const LOG: &str = "NOTEWALL_LOG";
    pub const OUTPUT_DIR: &str = "NOTEWALL_OUTPUT_DIR";
    pub const DELIVERY: &str = "NOTEWALL_DELIVERY";
    pub const MOBILE: &str = "NOTEWALL_MOBILE";
}

/// Default values
pub mod defaults {
    pub const OUTPUT_DIR: &str = ".";
    pub const SCALE: u32 = 2;
    pub const RELEASE_DELAY_MS: u64 = 100;
    pub const LOG_FILTER: &str = "warn";
}

pub const CONFIG_FILE: &str = "config.yaml";

fn default_output_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_DIR)
}

fn default_scale() -> u32 {
    defaults::SCALE
}

fn default_release_delay_ms() -> u64 {
    defaults::RELEASE_DELAY_MS
}

/// Project settings stored in `.notewall/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotewallConfig {
    /// Where exported wallpapers land. Relative paths are taken from the
    /// project root.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub delivery: DeliveryKind,
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default = "default_release_delay_ms")]
    pub release_delay_ms: u64,
    /// Command used to open wallpapers; the platform opener when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
}

impl Default for NotewallConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delivery: DeliveryKind::default(),
            scale: default_scale(),
            release_delay_ms: default_release_delay_ms(),
            viewer: None,
        }
    }
}

impl NotewallConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read `config.yaml` from `dir`. A missing or unreadable file yields the
    /// defaults; the project stays usable either way.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Could not read {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_yaml(&contents) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!("Malformed {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(CONFIG_FILE), self.to_yaml()?)?;
        Ok(())
    }

    /// Apply `NOTEWALL_*` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(env_vars::OUTPUT_DIR).filter(|d| !d.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(env_vars::DELIVERY) {
            match value.parse() {
                Ok(kind) => self.delivery = kind,
                Err(e) => warn!("Ignoring {}: {}", env_vars::DELIVERY, e),
            }
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if self.scale == 0 || self.scale > MAX_SCALE {
            warn!(
                "scale {} out of range 1..={}, using {}",
                self.scale,
                MAX_SCALE,
                defaults::SCALE
            );
            self.scale = defaults::SCALE;
        }
        self
    }

    /// `output_dir` made absolute against `root`.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            self.output_dir.clone()
        } else {
            root.join(&self.output_dir)
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            scale: self.scale,
            release_delay: Duration::from_millis(self.release_delay_ms),
        }
    }
}
