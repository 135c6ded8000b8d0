use crate::{
    arch::FirmwareArch,
    mode::BootMode,
    probe::{HostFilesystem, Probe},
    table::FirmwareTable,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use strum::IntoEnumIterator;
use tracing::debug;

/// The code and vars images for one boot mode. Either may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FirmwarePair {
    code: Option<PathBuf>,
    vars: Option<PathBuf>,
}

impl FirmwarePair {
    pub fn code(&self) -> Option<&Path> {
        self.code.as_deref()
    }

    pub fn vars(&self) -> Option<&Path> {
        self.vars.as_deref()
    }

    /// Whether both images were found.
    pub fn is_bootable(&self) -> bool {
        self.code.is_some() && self.vars.is_some()
    }
}

/// Snapshot of the UEFI firmware available in a directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EfiEnvironment {
    standard: FirmwarePair,
    secure_boot: FirmwarePair,
    sev: FirmwarePair,
    cca: FirmwarePair,
}

impl EfiEnvironment {
    /// Detect the firmware in `dir` on the host filesystem.
    ///
    /// Missing or unreadable binaries are simply absent from the result. The
    /// directory itself is not checked.
    pub fn detect(arch: &str, dir: impl AsRef<Path>) -> Self {
        Self::detect_with(FirmwareTable::builtin(), &HostFilesystem, arch, dir)
    }

    /// Detect the firmware in `dir` using the given filenames and probe.
    pub fn detect_with(
        table: &FirmwareTable,
        probe: &impl Probe,
        arch: &str,
        dir: impl AsRef<Path>,
    ) -> Self {
        let arch = FirmwareArch::from_arch(arch);
        let dir = dir.as_ref();

        // Some filenames appear in more than one slot
        let mut probed: HashMap<PathBuf, bool> = HashMap::new();
        let mut find = |names: &[String]| -> Option<PathBuf> {
            names
                .iter()
                .map(|name| dir.join(name))
                .find(|path| {
                    *probed
                        .entry(path.clone())
                        .or_insert_with(|| probe.exists(path))
                })
        };

        let mut environment = EfiEnvironment::default();
        for mode in BootMode::iter() {
            if let Some(names) = table.names(arch, mode) {
                *environment.pair_mut(mode) = FirmwarePair {
                    code: find(names.code.as_slice()),
                    vars: find(names.vars.as_slice()),
                };
            }
        }

        // The secure boot code image can boot with secure boot disabled when
        // paired with the plain vars image
        if arch == FirmwareArch::Generic && environment.standard.code.is_none() {
            environment.standard.code = environment.secure_boot.code.clone();
        }

        debug!(
            %arch,
            dir = %dir.display(),
            bootable = ?environment.bootable_modes(),
            "Detected EFI environment"
        );
        environment
    }

    pub fn pair(&self, mode: BootMode) -> &FirmwarePair {
        match mode {
            BootMode::Standard => &self.standard,
            BootMode::SecureBoot => &self.secure_boot,
            BootMode::Sev => &self.sev,
            BootMode::Cca => &self.cca,
        }
    }

    fn pair_mut(&mut self, mode: BootMode) -> &mut FirmwarePair {
        match mode {
            BootMode::Standard => &mut self.standard,
            BootMode::SecureBoot => &mut self.secure_boot,
            BootMode::Sev => &mut self.sev,
            BootMode::Cca => &mut self.cca,
        }
    }

    pub fn bootable_mode(&self, mode: BootMode) -> bool {
        self.pair(mode).is_bootable()
    }

    pub fn code(&self, mode: BootMode) -> Option<&Path> {
        self.pair(mode).code()
    }

    pub fn vars(&self, mode: BootMode) -> Option<&Path> {
        self.pair(mode).vars()
    }

    /// All boot modes with both images present.
    pub fn bootable_modes(&self) -> Vec<BootMode> {
        BootMode::iter()
            .filter(|mode| self.bootable_mode(*mode))
            .collect()
    }

    /// Whether the guest can boot with the given flags. See
    /// [`BootMode::from_flags`] for how combined flags are resolved.
    pub fn bootable(&self, secure_boot: bool, sev: bool, cca: bool) -> bool {
        self.bootable_mode(BootMode::from_flags(secure_boot, sev, cca))
    }

    /// The code image for the given flags. This may be present even when the
    /// mode is not bootable.
    pub fn efi_code(&self, secure_boot: bool, sev: bool, cca: bool) -> Option<&Path> {
        self.code(BootMode::from_flags(secure_boot, sev, cca))
    }

    /// The vars image for the given flags.
    pub fn efi_vars(&self, secure_boot: bool, sev: bool, cca: bool) -> Option<&Path> {
        self.vars(BootMode::from_flags(secure_boot, sev, cca))
    }
}
