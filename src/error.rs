//! Error type shared by the accessors and the decoder.

/// Errors returned by [`CompactArray`](crate::CompactArray) operations.
#[derive(Debug, thiserror::Error)]
pub enum CompactError {
    /// `get`/`get2` called with an index outside the array.
    #[error("index {index} out of range for array of length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// Number of elements in the array.
        len: usize,
    },

    /// `slice` called with an invalid range or a wrongly sized output buffer.
    #[error("slice {start}..{end} of array of length {len} does not fit output of length {out}")]
    SizeMismatch {
        /// Requested start (inclusive).
        start: usize,
        /// Requested end (exclusive).
        end: usize,
        /// Number of elements in the array.
        len: usize,
        /// Length of the output buffer.
        out: usize,
    },

    /// Decoded bytes do not describe a structurally valid array.
    #[error("corrupt encoding: {0}")]
    CorruptEncoding(String),

    /// Bytes are not a valid wire message.
    #[error(transparent)]
    Decode(#[from] prost::DecodeError),
}
