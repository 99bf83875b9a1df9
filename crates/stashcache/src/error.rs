//! Error types for stashcache

use std::fmt;
use std::io;

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a memoizing factory
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for cache operations
///
/// Misses, expiry and eviction are ordinary outcomes and never show up here.
#[derive(Debug)]
pub enum Error {
    /// The cache has been closed
    Closed,

    /// A memoizing factory returned an error
    Factory(BoxError),

    /// A memoizing factory panicked
    FactoryPanicked(String),

    /// The expiry sweeper thread could not be started
    Spawn(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Closed => write!(f, "Cache is closed"),
            Error::Factory(e) => write!(f, "Factory failed: {}", e),
            Error::FactoryPanicked(msg) => write!(f, "Factory panicked: {}", msg),
            Error::Spawn(e) => write!(f, "Failed to start sweeper: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Factory(e) => Some(e.as_ref()),
            Error::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Spawn(err)
    }
}

impl Error {
    /// Build a `FactoryPanicked` from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Error::FactoryPanicked(msg)
    }
}
