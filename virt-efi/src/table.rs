//! Well-known firmware filenames for each architecture and boot mode.

use crate::{arch::FirmwareArch, mode::BootMode};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    path::{Component, Path},
    sync::OnceLock,
};

pub const OVMF_CODE: &str = "OVMF_CODE.fd";
pub const OVMF_VARS: &str = "OVMF_VARS.fd";
pub const OVMF_CODE_SECURE_BOOT: &str = "OVMF_CODE.secboot.fd";
pub const OVMF_VARS_SECURE_BOOT: &str = "OVMF_VARS.secboot.fd";
pub const OVMF_CODE_SEV: &str = "OVMF_CODE.cc.fd";
pub const OVMF_VARS_SEV: &str = OVMF_VARS;
pub const AAVMF_CODE: &str = "AAVMF_CODE.fd";
pub const AAVMF_VARS: &str = "AAVMF_VARS.fd";
pub const AAVMF_CODE_CCA: &str = "AAVMF_CODE.cca.fd";
pub const AAVMF_VARS_CCA: &str = "AAVMF_VARS.cca.fd";

/// Candidate filenames for the two halves of a firmware pair, in order of
/// preference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairNames {
    pub code: Vec<String>,
    pub vars: Vec<String>,
}

impl PairNames {
    pub fn new(code: &[&str], vars: &[&str]) -> Self {
        Self {
            code: code.iter().map(|name| name.to_string()).collect(),
            vars: vars.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.code.is_empty() {
            bail!("No candidate filenames for the code image");
        }
        if self.vars.is_empty() {
            bail!("No candidate filenames for the vars image");
        }
        for name in self.code.iter().chain(self.vars.iter()) {
            let mut components = Path::new(name).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(_)), None) => {}
                _ => bail!("Firmware filename must be a bare filename: {:?}", name),
            }
        }
        Ok(())
    }
}

/// Filenames to probe for each boot mode of one architecture. A mode without
/// names is not supported and is never probed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchTable {
    pub standard: Option<PairNames>,
    pub secure_boot: Option<PairNames>,
    pub sev: Option<PairNames>,
    pub cca: Option<PairNames>,
}

impl ArchTable {
    pub fn get(&self, mode: BootMode) -> Option<&PairNames> {
        match mode {
            BootMode::Standard => self.standard.as_ref(),
            BootMode::SecureBoot => self.secure_boot.as_ref(),
            BootMode::Sev => self.sev.as_ref(),
            BootMode::Cca => self.cca.as_ref(),
        }
    }

    /// Replace every mode that `other` declares.
    fn merge(&mut self, other: ArchTable) {
        let ArchTable {
            standard,
            secure_boot,
            sev,
            cca,
        } = other;

        self.standard = standard.or(self.standard.take());
        self.secure_boot = secure_boot.or(self.secure_boot.take());
        self.sev = sev.or(self.sev.take());
        self.cca = cca.or(self.cca.take());
    }

    fn validate(&self) -> Result<()> {
        for (mode, names) in [
            (BootMode::Standard, &self.standard),
            (BootMode::SecureBoot, &self.secure_boot),
            (BootMode::Sev, &self.sev),
            (BootMode::Cca, &self.cca),
        ] {
            if let Some(names) = names {
                names
                    .validate()
                    .with_context(|| format!("Invalid filenames for boot mode '{mode}'"))?;
            }
        }
        Ok(())
    }
}

/// The mapping from (architecture, boot mode, slot) to firmware filenames.
///
/// Tables other than the built-in one come from [`FirmwareTable::with_override`],
/// so every filename is known to stay inside the firmware directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FirmwareTable {
    arm64: ArchTable,
    generic: ArchTable,
}

/// Partial table as written in a configuration file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableOverride {
    pub arm64: ArchTable,
    pub generic: ArchTable,
}

impl Default for FirmwareTable {
    fn default() -> Self {
        Self {
            arm64: ArchTable {
                standard: Some(PairNames::new(&[AAVMF_CODE], &[AAVMF_VARS])),
                secure_boot: None,
                sev: None,
                cca: Some(PairNames::new(&[AAVMF_CODE_CCA], &[AAVMF_VARS_CCA])),
            },
            generic: ArchTable {
                standard: Some(PairNames::new(&[OVMF_CODE], &[OVMF_VARS])),
                secure_boot: Some(PairNames::new(
                    &[OVMF_CODE_SECURE_BOOT],
                    &[OVMF_VARS_SECURE_BOOT],
                )),
                sev: Some(PairNames::new(&[OVMF_CODE_SEV], &[OVMF_VARS_SEV])),
                cca: None,
            },
        }
    }
}

impl FirmwareTable {
    /// The built-in table.
    pub fn builtin() -> &'static FirmwareTable {
        static BUILTIN: OnceLock<FirmwareTable> = OnceLock::new();
        BUILTIN.get_or_init(FirmwareTable::default)
    }

    pub fn arch(&self, arch: FirmwareArch) -> &ArchTable {
        match arch {
            FirmwareArch::Arm64 => &self.arm64,
            FirmwareArch::Generic => &self.generic,
        }
    }

    /// Filenames for the given architecture and boot mode, if supported.
    pub fn names(&self, arch: FirmwareArch, mode: BootMode) -> Option<&PairNames> {
        self.arch(arch).get(mode)
    }

    /// Apply an override on top of this table.
    pub fn with_override(mut self, table: TableOverride) -> Result<Self> {
        self.arm64.merge(table.arm64);
        self.generic.merge(table.generic);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.arm64.validate().context("Invalid arm64 firmware table")?;
        self.generic
            .validate()
            .context("Invalid generic firmware table")?;
        Ok(())
    }

    /// Parse a TOML override and apply it to the built-in table.
    pub fn from_toml(content: &str) -> Result<Self> {
        let table: TableOverride =
            toml::from_str(content).context("Failed to parse firmware table")?;
        FirmwareTable::default().with_override(table)
    }

    /// Load a TOML override from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read firmware table: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("In {}", path.display()))
    }
}
