use strum::Display;

/// Firmware family to look for, derived from the guest architecture.
///
/// Only ARM64 guests use a different set of firmware binaries (AAVMF). Every
/// other architecture string is treated as x86 and probed for OVMF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum FirmwareArch {
    #[strum(serialize = "arm64")]
    Arm64,
    #[strum(serialize = "generic")]
    Generic,
}

impl FirmwareArch {
    /// The architecture string that selects [`FirmwareArch::Arm64`].
    pub const ARM64: &'static str = "arm64";

    pub fn from_arch(arch: &str) -> Self {
        if arch == Self::ARM64 {
            FirmwareArch::Arm64
        } else {
            FirmwareArch::Generic
        }
    }
}
