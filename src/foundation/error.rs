/// Convenience result type used across framestrip.
pub type FramestripResult<T> = Result<T, FramestripError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramestripError {
    /// A file could not be decoded as an image. Reported per file.
    #[error("decode error: '{name}': {reason}")]
    Decode {
        /// Display name of the file that failed.
        name: String,
        /// Underlying decoder message.
        reason: String,
    },

    /// An aggregate failed its commit checks.
    #[error("validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Split counts below one.
    #[error("invalid split factor: {x}x{y} (both must be >= 1)")]
    InvalidSplitFactor {
        /// Requested column count.
        x: u32,
        /// Requested row count.
        y: u32,
    },

    /// Invalid timeline or rendering parameters.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramestripError {
    /// Build a [`FramestripError::Decode`] value.
    pub fn decode(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a single-reason [`FramestripError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Build a [`FramestripError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Human-readable reasons carried by a validation failure, empty for other kinds.
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Validation(reasons) => reasons,
            _ => &[],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
