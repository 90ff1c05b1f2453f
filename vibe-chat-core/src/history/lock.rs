//! Best-effort advisory lock on a sidecar file

use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Exclusive advisory lock held until the guard is dropped.
///
/// Acquisition never fails. When the lock file cannot be opened, or the
/// platform has no advisory locking, the guard holds nothing and writers
/// fall back on the atomic rename alone.
pub(crate) struct LockGuard {
    file: Option<File>,
    locked: bool,
}

impl LockGuard {
    /// Block until the exclusive lock on `path` is held, or give up quietly
    pub(crate) fn acquire(path: &Path) -> Self {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!("Proceeding without history lock {}: {}", path.display(), e);
                return Self {
                    file: None,
                    locked: false,
                };
            }
        };

        let locked = lock_exclusive(&file);
        if !locked {
            debug!("Advisory lock unavailable for {}", path.display());
        }

        Self {
            file: Some(file),
            locked,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.locked {
            if let Some(file) = &self.file {
                unlock(file);
            }
        }
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    // SAFETY: the descriptor is owned by `file`, which outlives the call.
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) == 0 }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;
    // SAFETY: as above; unlocking a descriptor we locked is always sound.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> bool {
    false
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::io::AsRawFd;
    use tempfile::TempDir;

    fn try_lock(path: &Path) -> bool {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        let ok = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 };
        if ok {
            unsafe {
                libc::flock(file.as_raw_fd(), libc::LOCK_UN);
            }
        }
        ok
    }

    #[test]
    fn test_lock_excludes_other_descriptors_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.lock");

        let guard = LockGuard::acquire(&path);
        assert!(guard.is_locked());
        assert!(!try_lock(&path));

        drop(guard);
        assert!(try_lock(&path));
    }

    #[test]
    fn test_unopenable_lock_path_degrades_gracefully() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let guard = LockGuard::acquire(temp_dir.path());
        assert!(!guard.is_locked());
    }
}
