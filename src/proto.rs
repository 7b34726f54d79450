//! Wire format.
//!
//! A [`CompactArray`] is persisted as a protobuf message. Spans are nested in
//! their segment; bit offsets and span bitmaps are derived data and are
//! rebuilt on decode, after every structural invariant has been checked.

use prost::Message;
use tracing::{debug, warn};

use crate::array::CompactArray;
use crate::bits::{words_for, BitStore};
use crate::error::CompactError;
use crate::poly::{Poly, POLY_COEF_CNT};
use crate::segment::{self, segment_count, segment_window, Segment};
use crate::span::Span;
use crate::width::is_width_class;

/// A whole array.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CompactArrayProto {
    /// Number of elements.
    #[prost(uint32, tag = "1")]
    pub n: u32,
    /// Segments in index order.
    #[prost(message, repeated, tag = "2")]
    pub segments: ::std::vec::Vec<SegmentProto>,
    /// Packed residual words.
    #[prost(fixed64, repeated, tag = "3")]
    pub residuals: ::std::vec::Vec<u64>,
}

/// One segment and its spans.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentProto {
    /// First element index.
    #[prost(uint32, tag = "1")]
    pub start: u32,
    /// One past the last element index.
    #[prost(uint32, tag = "2")]
    pub end: u32,
    /// Spans in index order.
    #[prost(message, repeated, tag = "3")]
    pub spans: ::std::vec::Vec<SpanProto>,
}

/// One span.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpanProto {
    /// First element index.
    #[prost(uint32, tag = "1")]
    pub start: u32,
    /// One past the last element index.
    #[prost(uint32, tag = "2")]
    pub end: u32,
    /// Polynomial coefficients, lowest degree first.
    #[prost(double, repeated, tag = "3")]
    pub poly: ::std::vec::Vec<f64>,
    /// Bits per residual.
    #[prost(uint32, tag = "4")]
    pub residual_width: u32,
    /// Estimated size in bytes.
    #[prost(uint32, tag = "5")]
    pub mem: u32,
}

impl From<&CompactArray> for CompactArrayProto {
    fn from(a: &CompactArray) -> Self {
        let segments = a
            .segments
            .iter()
            .map(|seg| {
                let lo = seg.first_span as usize;
                let hi = lo + seg.span_cnt as usize;
                SegmentProto {
                    start: seg.start,
                    end: seg.end,
                    spans: a.spans[lo..hi].iter().map(SpanProto::from).collect(),
                }
            })
            .collect();

        Self {
            n: a.n,
            segments,
            residuals: a.residuals.words().to_vec(),
        }
    }
}

impl From<&Span> for SpanProto {
    fn from(sp: &Span) -> Self {
        Self {
            start: sp.start,
            end: sp.end,
            poly: sp.poly.to_vec(),
            residual_width: sp.residual_width,
            mem: sp.mem,
        }
    }
}

fn corrupt(msg: String) -> CompactError {
    warn!(reason = %msg, "rejecting corrupt compact array");
    CompactError::CorruptEncoding(msg)
}

impl TryFrom<CompactArrayProto> for CompactArray {
    type Error = CompactError;

    fn try_from(msg: CompactArrayProto) -> Result<Self, Self::Error> {
        let n = msg.n;
        if msg.segments.len() != segment_count(n) {
            return Err(corrupt(format!(
                "{} segments for {} elements, want {}",
                msg.segments.len(),
                n,
                segment_count(n)
            )));
        }

        let mut segments = Vec::with_capacity(msg.segments.len());
        let mut spans: Vec<Span> = Vec::new();
        let mut bit_offset = 0u64;

        for (k, seg) in msg.segments.into_iter().enumerate() {
            let (start, end) = segment_window(k as u32, n);
            if (seg.start, seg.end) != (start, end) {
                return Err(corrupt(format!(
                    "segment {} covers {}-{}, want {}-{}",
                    k, seg.start, seg.end, start, end
                )));
            }

            let first_span = spans.len() as u32;
            for sp in seg.spans {
                if sp.end <= sp.start {
                    return Err(corrupt(format!("empty span {}-{}", sp.start, sp.end)));
                }
                let poly: Poly = sp.poly.as_slice().try_into().map_err(|_| {
                    corrupt(format!(
                        "span {}-{} has {} coefficients, want {}",
                        sp.start,
                        sp.end,
                        sp.poly.len(),
                        POLY_COEF_CNT
                    ))
                })?;
                if !is_width_class(sp.residual_width) {
                    return Err(corrupt(format!(
                        "span {}-{} has residual width {}",
                        sp.start, sp.end, sp.residual_width
                    )));
                }

                let span = Span {
                    start: sp.start,
                    end: sp.end,
                    poly,
                    residual_width: sp.residual_width,
                    mem: sp.mem,
                    bit_offset,
                };
                bit_offset += span.residual_bits();
                spans.push(span);
            }

            let own = &spans[first_span as usize..];
            let bitmap = Segment::bitmap_for(start, own.iter().map(|s| s.start))
                .ok_or_else(|| corrupt(format!("misaligned span start in segment {}", k)))?;
            let segment = Segment {
                start,
                end,
                first_span,
                span_cnt: own.len() as u32,
                bitmap,
            };
            segment::validate_spans(&segment, own).map_err(corrupt)?;
            segments.push(segment);
        }

        if msg.residuals.len() != words_for(bit_offset) {
            return Err(corrupt(format!(
                "{} residual words, layout needs {}",
                msg.residuals.len(),
                words_for(bit_offset)
            )));
        }

        debug!(n, segments = segments.len(), spans = spans.len(), "compact array decoded");

        Ok(CompactArray::from_parts(
            n,
            segments,
            spans,
            BitStore::from_words(msg.residuals),
        ))
    }
}

impl CompactArray {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        CompactArrayProto::from(self).encode_to_vec()
    }

    /// Deserialize bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// [`CompactError::Decode`] for malformed protobuf,
    /// [`CompactError::CorruptEncoding`] when the message does not describe a
    /// valid array.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompactError> {
        let msg = CompactArrayProto::decode(bytes)?;
        CompactArray::try_from(msg)
    }
}
