//! Succinct, read-optimized arrays of `u32`.
//!
//! `polypack` stores a large sequence of unsigned 32-bit integers close to its
//! information-theoretic size while keeping O(1) random access with no
//! decompression pass. It suits data that is written once and read many
//! times, and that is mostly monotonic or locally smooth:
//!
//! - offset tables into larger blobs
//! - posting-list or rank payloads in compact indexes
//! - cumulative counters and timestamps
//!
//! # How it works
//!
//! The sequence is cut into segments of 1024 elements. Each segment is split
//! into spans (at most 64, starting on 16-element boundaries), and every span
//! gets a least-squares quadratic fit. Only the residual between each value and
//! its prediction is stored, bit-packed at a width chosen from the fixed set
//! `{0, 1, 2, 4, 8, 16, 32, 64}` so decoding is a shift and a mask.
//!
//! Reading element `i` is: segment `i / 1024`, span by popcount over the
//! segment's span bitmap, evaluate the polynomial, add the residual.
//!
//! # Example
//!
//! ```rust
//! use polypack::CompactArray;
//!
//! let offsets: Vec<u32> = (0..10_000).map(|i| i * 16 + i % 5).collect();
//!
//! let a = CompactArray::from_u32(&offsets);
//! assert_eq!(a.get(1234).unwrap(), offsets[1234]);
//!
//! // Persist and restore.
//! let bytes = a.to_bytes();
//! let b = CompactArray::from_bytes(&bytes).unwrap();
//! assert_eq!(b.get(9999).unwrap(), offsets[9999]);
//!
//! // Far fewer than 32 bits per element.
//! assert!(a.stat()["bits/elt"] < 16);
//! ```
//!
//! # References
//!
//! - Ferragina, P. & Vinciguerra, G. (2020). "The PGM-index: a fully-dynamic
//!   compressed learned index with provable worst-case bounds"
//! - Lemire, D. & Boytsov, L. (2015). "Decoding billions of integers per second
//!   through vectorization"

#![warn(missing_docs)]
#![warn(clippy::all)]

mod array;
mod bits;
mod builder;
mod error;
mod poly;
mod proto;
mod segment;
mod span;
mod stat;
mod traits;
mod width;

pub use array::CompactArray;
pub use builder::{Builder, DEFAULT_SPAN_OVERHEAD};
pub use error::CompactError;
pub use poly::{Poly, POLY_COEF_CNT};
pub use proto::{CompactArrayProto, SegmentProto, SpanProto};
pub use segment::{Segment, MAX_SPANS_PER_SEGMENT, SEGMENT_SIZE};
pub use span::{Span, MIN_SPAN};
pub use stat::Stat;
pub use traits::IntSequence;
pub use width::{residual_width, WIDTH_CLASSES};
