use core::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::{error, io};

#[cfg(feature = "s3")]
use rusoto_core::region::ParseRegionError;
#[cfg(feature = "s3")]
use rusoto_core::RusotoError;
use thiserror::Error;

use crate::ocfl::{InventoryPath, VersionNum};

pub type Result<T, E = OcflError> = core::result::Result<T, E>;

/// The full error taxonomy surfaced by the library. Every fallible operation in every
/// component funnels into one of these variants rather than leaking component-specific
/// error types to callers.
#[derive(Error)]
pub enum OcflError {
    /// Object, version, or logical path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An import or a new-object write collided with an object that already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The caller's expectation of HEAD was violated by a concurrent writer.
    #[error("Object {object_id} is out of sync: {message}")]
    ObjectOutOfSync { object_id: String, message: String },

    /// A runtime invariant was violated (e.g. a mutable head is already active).
    #[error("Illegal state: {0}")]
    OcflState(String),

    /// A computed digest did not match the digest that was declared for it.
    #[error("Fixity check failed for {path}: expected {expected}, found {actual}")]
    FixityCheck {
        path: String,
        expected: String,
        actual: String,
    },

    /// The on-disk object tree violates an OCFL invariant: a dangling manifest entry,
    /// malformed inventory, missing sidecar, or mismatched root/sidecar digests.
    #[error("Object {object_id} is corrupt: {message}")]
    CorruptObject { object_id: String, message: String },

    /// A write lock could not be acquired within its configured timeout.
    #[error("Failed to acquire lock on {0}")]
    LockError(String),

    /// An underlying I/O failure, wrapped with enough context to diagnose it.
    #[error("{0}")]
    OcflIo(io::Error),

    /// The caller supplied an invalid argument; no side effects were performed.
    #[error("Invalid input: {0}")]
    OcflInput(String),

    /// Configuration was invalid or incomplete for the requested operation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The repository or backend is closed and no longer accepts requests.
    #[error("The repository is closed")]
    Closed,

    /// One of several related operations failed; a batch rollback or multi-file copy/move.
    #[error("{0}")]
    Multi(MultiError),

    /// Catch-all for third-party errors that do not deserve their own variant.
    #[error("{0}")]
    Wrapped(Box<dyn error::Error + Send + Sync>),
}

/// Aggregates multiple independent failures encountered while performing a batch of
/// otherwise-independent operations (e.g. rolling back several staged files).
pub struct MultiError {
    pub errors: Vec<OcflError>,
}

impl MultiError {
    pub fn new(errors: Vec<OcflError>) -> Self {
        Self { errors }
    }
}

impl Display for MultiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl Debug for MultiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Constructs an `OcflError::NotFound` describing a missing object or object version.
pub fn not_found(object_id: &str, version_num: Option<VersionNum>) -> OcflError {
    match version_num {
        Some(version) => OcflError::NotFound(format!("Object {} version {}", object_id, version)),
        None => OcflError::NotFound(format!("Object {}", object_id)),
    }
}

/// Constructs an `OcflError::NotFound` describing a missing logical path within an object.
pub fn not_found_path(object_id: &str, path: &str) -> OcflError {
    OcflError::NotFound(format!("Path {} not found in object {}", path, object_id))
}

impl Debug for OcflError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<io::Error> for OcflError {
    fn from(e: io::Error) -> Self {
        OcflError::OcflIo(e)
    }
}

impl From<globset::Error> for OcflError {
    fn from(e: globset::Error) -> Self {
        OcflError::Wrapped(Box::new(e))
    }
}

impl From<serde_json::Error> for OcflError {
    fn from(e: serde_json::Error) -> Self {
        OcflError::Wrapped(Box::new(e))
    }
}

impl From<walkdir::Error> for OcflError {
    fn from(e: walkdir::Error) -> Self {
        OcflError::Wrapped(Box::new(e))
    }
}

impl From<toml::de::Error> for OcflError {
    fn from(e: toml::de::Error) -> Self {
        OcflError::InvalidConfiguration(e.to_string())
    }
}

#[cfg(feature = "s3")]
impl From<ParseRegionError> for OcflError {
    fn from(e: ParseRegionError) -> Self {
        OcflError::Wrapped(Box::new(e))
    }
}

#[cfg(feature = "s3")]
impl<T: error::Error + Send + Sync + 'static> From<RusotoError<T>> for OcflError {
    fn from(e: RusotoError<T>) -> Self {
        OcflError::Wrapped(Box::new(e))
    }
}
