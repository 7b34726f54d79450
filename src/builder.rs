//! One-shot construction of a [`CompactArray`].

use tracing::{debug, trace};

use crate::array::CompactArray;
use crate::bits::BitStore;
use crate::segment::{self, segment_count};
use crate::span::FittedSpan;

/// Default per-span cost in bytes used when deciding whether to merge spans.
pub const DEFAULT_SPAN_OVERHEAD: u32 = 12;

/// Builds [`CompactArray`]s.
///
/// The only tunable is the per-span overhead charged by the span merger:
/// a larger value favours fewer, wider spans, a smaller value favours more
/// spans with narrower residuals. The packed layout itself is fixed.
#[derive(Clone, Debug)]
pub struct Builder {
    span_overhead: u32,
}

impl Builder {
    /// Create a builder with the default span overhead.
    pub fn new() -> Self {
        Self {
            span_overhead: DEFAULT_SPAN_OVERHEAD,
        }
    }

    /// Create a builder charging `bytes` per span.
    ///
    /// # Arguments
    ///
    /// * `bytes` - estimated metadata size of one span (coefficients, width, offset)
    pub fn with_span_overhead(bytes: u32) -> Self {
        Self {
            span_overhead: bytes,
        }
    }

    /// Per-span overhead in bytes.
    pub fn span_overhead(&self) -> u32 {
        self.span_overhead
    }

    /// Encode `values`.
    ///
    /// Any input is accepted, including an empty slice.
    ///
    /// # Panics
    ///
    /// Panics if `values` holds more than `u32::MAX` elements.
    pub fn build(&self, values: &[u32]) -> CompactArray {
        assert!(
            values.len() <= u32::MAX as usize,
            "at most u32::MAX elements are supported, got {}",
            values.len()
        );
        let n = values.len() as u32;
        let nseg = segment_count(n);

        let mut segments = Vec::with_capacity(nseg);
        let mut fitted: Vec<FittedSpan> = Vec::new();
        for k in 0..nseg as u32 {
            let (seg, spans) =
                segment::build_segment(values, k, fitted.len() as u32, self.span_overhead);
            trace!(segment = k, spans = spans.len(), "segment built");
            segments.push(seg);
            fitted.extend(spans);
        }

        let total_bits: u64 = fitted.iter().map(|f| f.span.residual_bits()).sum();
        let mut store = BitStore::with_bits(total_bits);
        let mut spans = Vec::with_capacity(fitted.len());

        let mut offset = 0u64;
        for FittedSpan { mut span, residuals } in fitted {
            let width = span.residual_width;
            span.bit_offset = offset;
            for (x, &r) in residuals.iter().enumerate() {
                store.write(offset + x as u64 * width as u64, width, r);
            }
            offset += span.residual_bits();
            spans.push(span);
        }

        debug!(
            n,
            segments = segments.len(),
            spans = spans.len(),
            residual_words = store.words().len(),
            "compact array built"
        );

        CompactArray::from_parts(n, segments, spans, store)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
