use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Boot mode of the guest, which selects one firmware pair.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BootMode {
    /// Plain UEFI
    #[default]
    #[strum(serialize = "standard")]
    Standard,
    #[strum(serialize = "secure_boot")]
    SecureBoot,
    /// AMD Secure Encrypted Virtualization
    #[strum(serialize = "sev")]
    Sev,
    /// ARM Confidential Compute Architecture
    #[strum(serialize = "cca")]
    Cca,
}

impl BootMode {
    /// Select a mode from independent flags.
    ///
    /// Flags are not expected to be combined, but when they are the first one
    /// set in the order `secure_boot`, `sev`, `cca` wins.
    pub fn from_flags(secure_boot: bool, sev: bool, cca: bool) -> Self {
        if secure_boot {
            BootMode::SecureBoot
        } else if sev {
            BootMode::Sev
        } else if cca {
            BootMode::Cca
        } else {
            BootMode::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flags() {
        assert_eq!(BootMode::from_flags(false, false, false), BootMode::Standard);
        assert_eq!(BootMode::from_flags(true, false, false), BootMode::SecureBoot);
        assert_eq!(BootMode::from_flags(false, true, false), BootMode::Sev);
        assert_eq!(BootMode::from_flags(false, false, true), BootMode::Cca);
    }

    #[test]
    fn test_priority() {
        assert_eq!(BootMode::from_flags(true, true, true), BootMode::SecureBoot);
        assert_eq!(BootMode::from_flags(true, true, false), BootMode::SecureBoot);
        assert_eq!(BootMode::from_flags(true, false, true), BootMode::SecureBoot);
        assert_eq!(BootMode::from_flags(false, true, true), BootMode::Sev);
    }

    #[test]
    fn test_display() {
        assert_eq!(BootMode::SecureBoot.to_string(), "secure_boot");
        assert_eq!(BootMode::default().to_string(), "standard");
    }
}
