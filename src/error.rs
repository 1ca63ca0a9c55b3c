//! Error handling.

use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Only [`IfdexError::EmptyInput`] ever aborts an extraction. The other
/// variants surface through recoverable channels: `OutOfRange` and `Decode`
/// are recorded on the offending directory as [`TagError`]s, and
/// `TypeMismatch` is returned by the typed getters on [`Directory`].
///
/// [`TagError`]: crate::TagError
/// [`Directory`]: crate::Directory
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IfdexError {
    /// The input buffer was empty. The sole hard failure of [`extract`].
    ///
    /// [`extract`]: crate::extract
    #[error("empty input buffer")]
    EmptyInput,

    /// A read would touch bytes outside the buffer.
    #[error("cannot read {count} bytes at offset {index}: buffer length is {length}")]
    OutOfRange {
        /// Requested start offset.
        index: u64,
        /// Requested byte count.
        count: u64,
        /// Length of the underlying buffer.
        length: u64,
    },

    /// A stored value could not be coerced to the requested shape.
    #[error("cannot coerce {actual} to {requested}")]
    TypeMismatch {
        /// The shape the caller asked for.
        requested: &'static str,
        /// A short description of the stored value.
        actual: String,
    },

    /// A tag value could not be decoded (unknown type code, charset failure).
    #[error("decode error: {0}")]
    Decode(String),
}

/// Crate-specific result type.
pub type IfdexResult<T> = std::result::Result<T, IfdexError>;
