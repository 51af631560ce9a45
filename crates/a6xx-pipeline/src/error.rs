use a6xx_protocol::AllocError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Recoverable pipeline construction failures.
///
/// Sizing or emission mismatches inside the builder are not represented here: they are
/// internal bugs and panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("out of host memory")]
    OutOfHostMemory,

    #[error("out of device memory")]
    OutOfDeviceMemory,

    #[error("invalid pipeline description: {0}")]
    InvalidDescription(String),
}

impl PipelineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidDescription(msg.into())
    }
}

impl From<AllocError> for PipelineError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::OutOfDeviceMemory { .. } => Self::OutOfDeviceMemory,
        }
    }
}
