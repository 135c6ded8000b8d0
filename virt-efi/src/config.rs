use crate::{
    environment::EfiEnvironment,
    probe::HostFilesystem,
    table::{FirmwareTable, TableOverride},
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Where firmware is installed when nothing else is configured.
pub const DEFAULT_FIRMWARE_DIR: &str = "/usr/share/OVMF";

/// Overrides the configured firmware directory.
pub const FIRMWARE_DIR_ENV: &str = "VIRT_EFI_FIRMWARE_DIR";

/// Resolver settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    pub firmware_dir: PathBuf,
    pub table: FirmwareTable,
}

/// The configuration file as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    firmware_dir: Option<PathBuf>,
    table: TableOverride,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            firmware_dir: PathBuf::from(DEFAULT_FIRMWARE_DIR),
            table: FirmwareTable::default(),
        }
    }
}

impl ResolverConfig {
    /// The default configuration with any environment override applied.
    pub fn from_env() -> Self {
        Self::default().with_dir_override(std::env::var_os(FIRMWARE_DIR_ENV))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse configuration")?;

        Ok(Self {
            firmware_dir: file
                .firmware_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIRMWARE_DIR)),
            table: FirmwareTable::default().with_override(file.table)?,
        })
    }

    /// Load a configuration file. The environment takes precedence over the
    /// file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading resolver configuration");

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        let config =
            Self::from_toml(&content).with_context(|| format!("In {}", path.display()))?;

        Ok(config.with_dir_override(std::env::var_os(FIRMWARE_DIR_ENV)))
    }

    fn with_dir_override(mut self, dir: Option<OsString>) -> Self {
        if let Some(dir) = dir.filter(|dir| !dir.is_empty()) {
            debug!(dir = ?dir, "Firmware directory overridden by {}", FIRMWARE_DIR_ENV);
            self.firmware_dir = PathBuf::from(dir);
        }
        self
    }

    /// Detect the firmware available under this configuration.
    pub fn detect(&self, arch: &str) -> EfiEnvironment {
        EfiEnvironment::detect_with(&self.table, &HostFilesystem, arch, &self.firmware_dir)
    }
}
