use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NhdrError>;

#[derive(Debug, Error)]
pub enum NhdrError {
    /// dimensionality, counts or lengths that don't fit together
    #[error("input shape error: {0}")]
    InputShape(String),

    #[error("spacing along axis {axis} is {value}, cannot invert for the measurement frame")]
    ZeroSpacing { axis: usize, value: f64 },

    #[error("all {count} gradient strengths are zero, no reference strength to normalize against")]
    DegenerateStrengths { count: usize },

    #[error("gradient {index} has invalid strength {value}")]
    NegativeStrength { index: usize, value: f64 },

    #[error("malformed source {file:?} at line {line}: {reason}")]
    Malformed {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("no volume found for prefix {0:?} (looked for .nii.gz and .nii)")]
    VolumeNotFound(PathBuf),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[cfg(feature = "io-nifti")]
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),
}

impl NhdrError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        NhdrError::InputShape(msg.into())
    }
}
