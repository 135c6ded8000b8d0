//! Existence checks against a filesystem.

use std::{
    cell::Cell,
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

/// Answers whether a firmware binary is present.
pub trait Probe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probes the real filesystem with a stat call.
///
/// Any error, including permission denied, means the binary is absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostFilesystem;

impl Probe for HostFilesystem {
    fn exists(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(_) => {
                trace!(path = %path.display(), "Found firmware binary");
                true
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                trace!(path = %path.display(), "Firmware binary not found");
                false
            }
            Err(error) => {
                debug!(path = %path.display(), %error, "Treating inaccessible firmware binary as absent");
                false
            }
        }
    }
}

/// An in-memory set of paths that exist.
#[derive(Debug, Default)]
pub struct VirtualFilesystem {
    files: HashSet<PathBuf>,
    probes: Cell<usize>,
}

impl VirtualFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the filesystem.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    /// Add several files under the same directory.
    pub fn with_files_in<'a>(
        mut self,
        dir: impl AsRef<Path>,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        for name in names {
            self.files.insert(dir.as_ref().join(name));
        }
        self
    }

    /// How many times [`Probe::exists`] has been called.
    pub fn probes(&self) -> usize {
        self.probes.get()
    }
}

impl Probe for VirtualFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.files.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_filesystem() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        std::fs::write(tmp.path().join("OVMF_CODE.fd"), b"")?;

        assert!(HostFilesystem.exists(&tmp.path().join("OVMF_CODE.fd")));
        assert!(!HostFilesystem.exists(&tmp.path().join("OVMF_VARS.fd")));
        Ok(())
    }

    #[test]
    fn test_host_filesystem_missing_directory() {
        assert!(!HostFilesystem.exists(Path::new("/nonexistent/goes/here/OVMF_CODE.fd")));
    }

    #[test]
    fn test_host_filesystem_not_a_directory() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        std::fs::write(tmp.path().join("file"), b"")?;

        // ENOTDIR rather than ENOENT
        assert!(!HostFilesystem.exists(&tmp.path().join("file").join("OVMF_CODE.fd")));
        Ok(())
    }

    #[test]
    fn test_virtual_filesystem() {
        let fs = VirtualFilesystem::new()
            .with_file("/fw/a")
            .with_files_in("/fw", ["b", "c"]);

        assert!(fs.exists(Path::new("/fw/a")));
        assert!(fs.exists(Path::new("/fw/c")));
        assert!(!fs.exists(Path::new("/fw/d")));
        assert_eq!(fs.probes(), 3);
    }
}
