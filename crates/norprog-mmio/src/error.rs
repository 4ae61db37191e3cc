//! Error types for memory-mapped flash access

use thiserror::Error;

/// Errors raised while setting up memory-mapped access
#[derive(Debug, Error)]
pub enum MmioError {
    /// Opening /dev/mem failed
    #[error("Failed to open /dev/mem: {0}")]
    Open(#[from] std::io::Error),

    /// mmap of the physical range failed
    #[error("Failed to map {size:#x} bytes at physical address {address:#x}")]
    MemoryMap { address: u64, size: usize },

    /// Physical mapping is not available on this platform
    #[error("Physical memory mapping is only supported on Linux")]
    NotSupported,

    /// Missing required parameter
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },
}

/// Result type for memory-mapped flash access
pub type Result<T> = std::result::Result<T, MmioError>;
