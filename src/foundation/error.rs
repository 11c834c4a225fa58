/// Convenience result type used across Sapling.
pub type SaplingResult<T> = Result<T, SaplingError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Most anomalies inside the growth and compositing core degrade instead of failing; these
/// variants cover the boundary cases that cannot.
#[derive(thiserror::Error, Debug)]
pub enum SaplingError {
    /// Invalid caller-provided data (stage sizes, export targets).
    #[error("validation error: {0}")]
    Validation(String),

    /// A rendering surface could not be created or used.
    #[error("render error: {0}")]
    Render(String),

    /// Background or other asset data could not be used.
    #[error("asset error: {0}")]
    Asset(String),

    /// Snapshot or image encoding failures.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SaplingError {
    /// Build a [`SaplingError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SaplingError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SaplingError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`SaplingError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
