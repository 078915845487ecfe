//! Error types for the SPAKE2 core.

use thiserror::Error;

/// Errors returned by [`crate::Session`] operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A party name exceeded `MAX_NAME_LEN` (256 bytes).
    #[error("name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Length of the rejected name, in bytes.
        len: usize,
        /// The maximum permitted length.
        max: usize,
    },

    /// An output buffer was too small for the requested value. Unreachable
    /// from this crate's own `[u8; N]`-returning API; kept for a future
    /// C-ABI wrapper built on top of it.
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall {
        /// Bytes required.
        need: usize,
        /// Bytes actually available.
        have: usize,
    },

    /// The peer's message failed to decode as a valid curve point.
    #[error("peer message is not a valid curve point")]
    BadPeerMessage,

    /// The session was not in the right phase for the requested operation
    /// (e.g. `process` called before `generate`, or called twice).
    #[error("session in wrong state for this operation")]
    WrongState,

    /// The supplied random source failed.
    #[error("random source failed: {0}")]
    RngFailure(#[from] rand::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
