/// Convenience result type used across trirast.
pub type RasterResult<T> = Result<T, RasterError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Degenerate or off-screen geometry is never an error; it is skipped and counted in
/// [`crate::RenderStats`]. Only caller-contract violations surface here.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Caller-provided draw data or buffer dimensions violate the pipeline contract.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool for parallel rasterization could not be set up.
    #[error("threading error: {0}")]
    Threading(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build a [`RasterError::InvalidConfig`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`RasterError::Threading`] value.
    pub fn threading(msg: impl Into<String>) -> Self {
        Self::Threading(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
