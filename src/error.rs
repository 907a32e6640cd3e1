use alloc::string::String;
use enough::StopReason;

use crate::engine::EngineError;
use crate::format::PixelFormatGuid;
use crate::host::HostStatus;
use crate::stream::StreamError;

/// Errors from JPEG XR decoding and bitmap assembly.
///
/// Every variant is terminal for the decode call that produced it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JxrError {
    #[error("stream I/O error: {0}")]
    StreamIo(StreamError),

    #[error("no JPEG XR decoder available: {0}")]
    FormatUnavailable(EngineError),

    #[error("decoder engine error: {0}")]
    Engine(EngineError),

    #[error("degenerate image geometry: {width}x{height}")]
    DegenerateGeometry { width: u32, height: u32 },

    #[error("unsupported native pixel format {0}")]
    UnsupportedPixelFormat(PixelFormatGuid),

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailure { bytes: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("aborted by progress callback")]
    UserAbort,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl JxrError {
    /// Coarse status reported across the plugin boundary.
    pub fn host_status(&self) -> HostStatus {
        match self {
            JxrError::UserAbort | JxrError::Cancelled(_) => HostStatus::Abort,
            JxrError::AllocationFailure { .. } => HostStatus::NoMemory,
            _ => HostStatus::MemoryError,
        }
    }

    /// Classify an engine failure. File-I/O codes come from the stream adapter.
    pub(crate) fn from_engine(err: EngineError) -> Self {
        match err {
            EngineError::FileIo => JxrError::StreamIo(StreamError::EngineReported),
            other => JxrError::Engine(other),
        }
    }
}

impl From<StopReason> for JxrError {
    fn from(r: StopReason) -> Self {
        JxrError::Cancelled(r)
    }
}

impl From<StreamError> for JxrError {
    fn from(e: StreamError) -> Self {
        JxrError::StreamIo(e)
    }
}
