use thiserror::Error;

/// Failure categories raised by the translation layer and the session.
///
/// They travel inside [`crate::Error`], match them with
/// `error.downcast_ref::<QuarryError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuarryError {
    /// Missing or contradictory entity metadata, like a lookup by key on a keyless entity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Caller supplied input that cannot be used.
    #[error("argument error: {0}")]
    Argument(String),

    /// Predicate shape outside the translatable subset.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Operation invalid in the current connection or transaction state.
    #[error("invalid state: {0}")]
    ResourceState(String),
}

impl QuarryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedExpression(message.into())
    }

    pub fn resource_state(message: impl Into<String>) -> Self {
        Self::ResourceState(message.into())
    }
}
