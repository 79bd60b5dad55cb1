use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::ocfl::error::Result;
use crate::ocfl::{util, DigestAlgorithm, OcflError};

/// Default amount of time `LockManager::acquire` will retry before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// An object lock manager that works by attempting to atomically create files using a hash
/// of the object's id. The lock files are automatically removed when the guard goes out of
/// scope. Readers never take a lock; they rely on the storage engine's atomic root-inventory
/// publish to observe either the old or the new version, never a partial one.
pub struct LockManager {
    locks_dir: PathBuf,
    digest_algorithm: DigestAlgorithm,
    timeout: Duration,
}

pub struct ObjectLock {
    lock_path: PathBuf,
}

impl LockManager {
    /// Creates a new lock manager with the default acquire timeout. `locks_dir` must already
    /// exist.
    pub fn new(locks_dir: impl AsRef<Path>) -> Self {
        Self::with_timeout(locks_dir, DEFAULT_LOCK_TIMEOUT)
    }

    /// Creates a new lock manager that gives up acquiring a lock after `timeout` has elapsed.
    pub fn with_timeout(locks_dir: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            locks_dir: locks_dir.as_ref().to_path_buf(),
            digest_algorithm: DigestAlgorithm::Sha256,
            timeout,
        }
    }

    /// Acquires a lock on the given object, retrying on a short interval until the configured
    /// timeout elapses. If the lock cannot be acquired in time, `OcflError::LockError` is
    /// returned. The lock is _not_ reentrant.
    pub fn acquire(&self, object_id: &str) -> Result<ObjectLock> {
        let hash = self.digest_algorithm.hash_hex(&mut object_id.as_bytes())?;
        let lock_path = self.locks_dir.join(format!("{}.lock", hash.as_ref()));

        let start = Instant::now();

        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(_) => return Ok(ObjectLock { lock_path }),
                Err(_) if start.elapsed() < self.timeout => {
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(_) => {
                    return Err(OcflError::LockError(object_id.to_string()));
                }
            }
        }
    }

    /// Runs `task` while holding the write lock for `object_id`. The lock is released when
    /// this function returns, regardless of whether `task` succeeded.
    pub fn do_in_write_lock<T, F>(&self, object_id: &str, task: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _lock = self.acquire(object_id)?;
        task()
    }
}

impl Drop for ObjectLock {
    fn drop(&mut self) {
        debug!("Releasing lock {}", self.lock_path.to_string_lossy());
        if let Err(e) = util::remove_file_ignore_not_found(&self.lock_path) {
            error!(
                "Failed to remove lock file {}: {}",
                self.lock_path.to_string_lossy(),
                e
            );
        }
    }
}
