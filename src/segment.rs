//! Segments: fixed windows of elements grouping up to 64 spans.
//!
//! Every span inside a segment starts on a multiple of [`MIN_SPAN`] relative
//! to the segment start, so one `u64` bitmap records all span starts and the
//! span holding an element is found with a single popcount.

use crate::span::{self, FittedSpan, Span, MIN_SPAN};

/// log2 of [`SEGMENT_SIZE`].
pub const SEGMENT_SHIFT: u32 = 10;

/// Elements per segment (the last one may be shorter).
pub const SEGMENT_SIZE: u32 = 1 << SEGMENT_SHIFT;

const SPAN_SHIFT: u32 = MIN_SPAN.trailing_zeros();

/// Maximum number of spans a segment can hold.
pub const MAX_SPANS_PER_SEGMENT: u32 = SEGMENT_SIZE / MIN_SPAN;

/// Directory entry for one window of the array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First element index.
    pub start: u32,
    /// One past the last element index.
    pub end: u32,
    /// Index of the segment's first span in the span arena.
    pub first_span: u32,
    /// Number of spans in the segment.
    pub span_cnt: u32,
    /// Bit `k` is set when a span starts at `start + k * MIN_SPAN`.
    pub bitmap: u64,
}

impl Segment {
    /// Arena index of the span containing element `i`.
    ///
    /// `i` must lie in `[start, end)`.
    #[inline]
    pub fn span_index(&self, i: u32) -> usize {
        let k = (i - self.start) >> SPAN_SHIFT;
        let upto = u64::MAX >> (63 - k);
        let rank = (self.bitmap & upto).count_ones();
        (self.first_span + rank - 1) as usize
    }

    /// Build the bitmap for spans starting at `starts`, all inside the
    /// segment beginning at `seg_start`.
    ///
    /// Returns `None` if a start is misaligned or outside the segment.
    pub fn bitmap_for(seg_start: u32, starts: impl IntoIterator<Item = u32>) -> Option<u64> {
        let mut bitmap = 0u64;
        for s in starts {
            let rel = s.checked_sub(seg_start)?;
            if rel % MIN_SPAN != 0 || rel >= SEGMENT_SIZE {
                return None;
            }
            bitmap |= 1u64 << (rel >> SPAN_SHIFT);
        }
        Some(bitmap)
    }
}

/// Window `[start, end)` of segment number `k` in an array of `n` elements.
#[inline]
pub fn segment_window(k: u32, n: u32) -> (u32, u32) {
    let start = k << SEGMENT_SHIFT;
    (start, start.saturating_add(SEGMENT_SIZE).min(n))
}

/// Number of segments covering `n` elements.
#[inline]
pub fn segment_count(n: u32) -> usize {
    (n as usize).div_ceil(SEGMENT_SIZE as usize)
}

/// Split segment `k` of `values` into spans.
///
/// The spans are numbered from `first_span` in the caller's arena.
pub(crate) fn build_segment(
    values: &[u32],
    k: u32,
    first_span: u32,
    overhead: u32,
) -> (Segment, Vec<FittedSpan>) {
    let (start, end) = segment_window(k, values.len() as u32);
    let spans = span::build_spans(values, start, end, overhead);

    let bitmap = spans
        .iter()
        .fold(0u64, |bm, s| bm | (1u64 << ((s.span.start - start) >> SPAN_SHIFT)));

    let segment = Segment {
        start,
        end,
        first_span,
        span_cnt: spans.len() as u32,
        bitmap,
    };
    (segment, spans)
}

/// Check that `spans` tile `[seg.start, seg.end)` in order.
pub(crate) fn validate_spans(seg: &Segment, spans: &[Span]) -> Result<(), String> {
    let mut expect = seg.start;
    for sp in spans {
        if sp.start != expect {
            return Err(format!(
                "span {}-{} does not start at {} in segment {}-{}",
                sp.start, sp.end, expect, seg.start, seg.end
            ));
        }
        if sp.end <= sp.start {
            return Err(format!("empty span {}-{}", sp.start, sp.end));
        }
        expect = sp.end;
    }
    if expect != seg.end {
        return Err(format!(
            "spans end at {} but segment {}-{} ends at {}",
            expect, seg.start, seg.end, seg.end
        ));
    }
    Ok(())
}
