//! Detection of the UEFI firmware images available to a virtual machine.
//!
//! ```no_run
//! use virt_efi::EfiEnvironment;
//!
//! let environment = EfiEnvironment::detect("amd64", "/usr/share/OVMF");
//! if environment.bootable(true, false, false) {
//!     let code = environment.efi_code(true, false, false);
//!     let vars = environment.efi_vars(true, false, false);
//! }
//! ```

pub mod arch;
pub mod config;
pub mod environment;
pub mod mode;
pub mod probe;
pub mod table;

pub use arch::FirmwareArch;
pub use config::ResolverConfig;
pub use environment::{EfiEnvironment, FirmwarePair};
pub use mode::BootMode;
pub use probe::{HostFilesystem, Probe, VirtualFilesystem};
pub use table::FirmwareTable;
