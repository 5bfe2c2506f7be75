//! Hosts-file engine behind devbox switching.
//!
//! A switch rewrites the managed region of the OS hosts file (see
//! [`rewrite`]). Every write is preceded by a copy to `<path>.backup`, which is
//! restored if the write fails. Operations on one [`HostsFile`] (and its
//! clones) are serialized, and new contents are staged in a sibling file and
//! renamed into place.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{DeviceId, FavoriteSelector};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod rewrite;

pub const MAX_BOX_NUMBER: u64 = 255;

#[derive(Debug, Error)]
pub enum HostsError {
    #[error("cannot find hosts file")]
    Unavailable,
    #[error("failed to read hosts file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to backup hosts: {0}")]
    Backup(#[source] io::Error),
    #[error("failed to write hosts: {0}")]
    Write(#[source] io::Error),
    #[error("failed to restore backup: {0}")]
    Restore(#[source] io::Error),
    #[error("box number must be between 1 and 255, got {0}")]
    InvalidBoxNumber(u64),
    #[error("unknown favorite: {0}")]
    UnknownFavorite(String),
}

pub type Result<T> = std::result::Result<T, HostsError>;

/// Location of the hosts file on the running platform.
pub fn system_hosts_path() -> Result<PathBuf> {
    if cfg!(windows) {
        Ok(PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts"))
    } else if cfg!(unix) {
        Ok(PathBuf::from("/etc/hosts"))
    } else {
        Err(HostsError::Unavailable)
    }
}

#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn system() -> Result<Self> {
        system_hosts_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".backup")
    }

    pub fn favorites(&self) -> Result<Vec<FavoriteSelector>> {
        let _guard = self.lock();
        let lines = self.read_lines()?;
        Ok(rewrite::collect_favorites(&lines))
    }

    pub fn swap(&self, device_id: DeviceId) -> Result<()> {
        let box_number = device_id.0;
        if box_number == 0 || box_number > MAX_BOX_NUMBER {
            return Err(HostsError::InvalidBoxNumber(box_number));
        }
        self.rewrite_with(|lines| Ok(rewrite::apply_swap(lines, box_number)))?;
        info!(path = %self.path.display(), box_number, "swapped devbox");
        Ok(())
    }

    pub fn activate_favorite(&self, selector: &FavoriteSelector) -> Result<()> {
        self.rewrite_with(|lines| {
            if !rewrite::has_managed_favorite(&*lines, selector.as_str()) {
                return Err(HostsError::UnknownFavorite(selector.to_string()));
            }
            Ok(rewrite::apply_favorite(lines, selector.as_str()))
        })?;
        info!(path = %self.path.display(), %selector, "activated favorite");
        Ok(())
    }

    pub fn restore_backup(&self) -> Result<()> {
        let _guard = self.lock();
        self.restore_backup_locked()
    }

    fn restore_backup_locked(&self) -> Result<()> {
        fs::copy(self.backup_path(), &self.path).map_err(HostsError::Restore)?;
        Ok(())
    }

    /// Reads, rewrites and replaces the file under the lock. Nothing is
    /// backed up or written when `rewrite` fails.
    fn rewrite_with(
        &self,
        rewrite: impl FnOnce(&mut [String]) -> Result<usize>,
    ) -> Result<()> {
        let _guard = self.lock();
        let mut lines = self.read_lines()?;
        let changed = rewrite(&mut lines)?;
        self.backup()?;
        debug!(path = %self.path.display(), changed, total = lines.len(), "rewrote managed region");

        if let Err(error) = self.replace_contents(&lines.join("\n")) {
            warn!(path = %self.path.display(), %error, "hosts write failed; restoring backup");
            self.restore_backup_locked()?;
            return Err(HostsError::Write(error));
        }
        Ok(())
    }

    /// Stages `contents` next to the hosts file and renames it over the
    /// original. Falls back to an in-place write where the rename is refused,
    /// e.g. a bind-mounted `/etc/hosts`.
    fn replace_contents(&self, contents: &str) -> io::Result<()> {
        let staging = self.sibling(".tmp");
        let staged = fs::write(&staging, contents)
            .and_then(|()| fs::metadata(&self.path))
            .and_then(|meta| fs::set_permissions(&staging, meta.permissions()))
            .and_then(|()| fs::rename(&staging, &self.path));
        if let Err(error) = staged {
            debug!(path = %self.path.display(), %error, "staged replace failed; writing in place");
            let _ = fs::remove_file(&staging);
            fs::write(&self.path, contents)?;
        }
        Ok(())
    }

    fn sibling(&self, suffix: impl AsRef<OsStr>) -> PathBuf {
        let mut raw = self.path.clone().into_os_string();
        raw.push(suffix);
        PathBuf::from(raw)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn backup(&self) -> Result<()> {
        fs::copy(&self.path, self.backup_path()).map_err(HostsError::Backup)?;
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        let raw = fs::read_to_string(&self.path).map_err(HostsError::Read)?;
        Ok(raw.split('\n').map(str::to_string).collect())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
