use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// Advisory exclusive lock held for the duration of a hook invocation.
///
/// The tracker itself is lock-free; this guard is the caller-side mutual
/// exclusion around the ledger read-modify-write when the host runs hooks
/// in parallel. Released on drop.
pub struct PassLock {
    file: File,
}

impl PassLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("failed to lock {}", path.display()))?;
        Ok(Self { file })
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
