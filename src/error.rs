use std::error::Error as StdError;
use std::sync::Arc;

use futures::task::SpawnError;

/// Why a promise was rejected.
///
/// Errors are cheap to clone: a rejection is forwarded as-is to every
/// continuation attached downstream of it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// An untyped payload was offered to a promise of a different type.
    #[error("cannot resolve a promise of type `{expected}` with {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    /// Rejected by the producer, or returned as `Err` from a continuation.
    #[error(transparent)]
    Rejected(Arc<dyn StdError + Send + Sync>),
    /// A continuation callback panicked.
    #[error("continuation panicked: {message}")]
    Panicked { message: String },
    /// The executor refused to run a continuation.
    #[error("failed to schedule continuation: {0}")]
    Spawn(#[source] Arc<SpawnError>),
}

impl Error {
    /// A rejection carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = message.into().into();
        Self::Rejected(Arc::from(boxed))
    }

    /// A rejection wrapping any error type.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Rejected(Arc::new(err))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::msg(message)
    }
}

impl From<SpawnError> for Error {
    fn from(err: SpawnError) -> Self {
        Self::Spawn(Arc::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}
