//! Filesystem probe consumed by the `path` rule.
//!
//! Probes are blocking and uncached; each call hits the filesystem inline.

use std::io;
use std::path::Path;

/// Type information for an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStat {
    pub is_file: bool,
    pub is_dir: bool,
}

/// Existence and type queries used by path validation.
pub trait FsProbe {
    fn exists(&self, path: &Path) -> bool;

    /// Inspect an existing path. An error here means the path exists but
    /// could not be read, which is reported separately from a type mismatch.
    fn stat(&self, path: &Path) -> io::Result<PathStat>;
}

/// Probe backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FsProbe for StdFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn stat(&self, path: &Path) -> io::Result<PathStat> {
        let metadata = std::fs::metadata(path)?;
        Ok(PathStat {
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
        })
    }
}

impl<P: FsProbe + ?Sized> FsProbe for &P {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn stat(&self, path: &Path) -> io::Result<PathStat> {
        (**self).stat(path)
    }
}
