//! Error types for the bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Link I/O error
    #[error("Link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame is shorter than the operation requires
    #[error("Short frame: need {needed} bytes, got {actual}")]
    ShortFrame { needed: usize, actual: usize },

    /// Frame has the right length but the wrong shape
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// Port index outside the configured range
    #[error("Unknown port: {0}")]
    UnknownPort(usize),

    /// Startup configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure
    #[error("Link error: {0}")]
    Link(String),

    /// No more frames can be received
    #[error("Link closed")]
    LinkClosed,
}

impl Error {
    /// Create a short-frame error
    pub fn short_frame(needed: usize, actual: usize) -> Self {
        Error::ShortFrame { needed, actual }
    }

    /// Create a configuration error with a custom message
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create a link error with a custom message
    pub fn link<S: Into<String>>(msg: S) -> Self {
        Error::Link(msg.into())
    }

    /// Ensure `data` holds at least `needed` bytes
    pub fn check_len(data: &[u8], needed: usize) -> Result<()> {
        if data.len() < needed {
            Err(Error::short_frame(needed, data.len()))
        } else {
            Ok(())
        }
    }
}
