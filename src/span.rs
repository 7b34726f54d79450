//! Spans: runs of elements sharing one polynomial and one residual width.

use std::fmt;

use crate::poly::{self, Poly};
use crate::width::residual_width;

/// Spans start on multiples of this many elements within their segment.
pub const MIN_SPAN: u32 = 16;

/// How many times the residual floor is folded into `c0` before giving up.
const FOLD_ATTEMPTS: usize = 4;

/// A contiguous index range `[start, end)` decoded with one polynomial.
///
/// `mem` is the estimated cost in bytes: the per-span overhead the span was
/// built with plus its packed residuals, rounded up to whole bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    /// First element index (global).
    pub start: u32,
    /// One past the last element index (global).
    pub end: u32,
    /// Polynomial over the span-local offset `i - start`.
    pub poly: Poly,
    /// Bits per stored residual, one of the width classes.
    pub residual_width: u32,
    /// Estimated size in bytes.
    pub mem: u32,
    /// Bit position of the first residual in the shared buffer.
    pub bit_offset: u64,
}

impl Span {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Bits occupied by this span's residuals.
    #[inline]
    pub fn residual_bits(&self) -> u64 {
        self.residual_width as u64 * self.len() as u64
    }

    /// Whether `i` falls inside the span.
    #[inline]
    pub fn contains(&self, i: u32) -> bool {
        self.start <= i && i < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}({}): width: {}, mem: {}, poly: [",
            self.start, self.end, self.residual_width, self.residual_width, self.mem
        )?;
        for (k, c) in self.poly.iter().enumerate() {
            if k > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str("]")
    }
}

/// A span under construction, still holding its residuals.
#[derive(Clone, Debug)]
pub(crate) struct FittedSpan {
    pub span: Span,
    pub residuals: Vec<u64>,
}

/// Fit `values[start..end]` and offset-encode its residuals.
///
/// After the first fit the smallest residual is folded into `c0` so that all
/// stored residuals are non-negative. Rounding may need a second fold; if that
/// still fails only the constant candidate is used.
///
/// The constant polynomial `c0 = min(values)` is always tried as well and
/// wins when its residual width is strictly narrower, which bounds every span
/// at 32 bits for `u32` input.
pub(crate) fn fit_span(values: &[u32], start: u32, end: u32, overhead: u32) -> FittedSpan {
    let ys = &values[start as usize..end as usize];
    let mut poly = poly::fit(ys);

    let floor = raw_residuals(ys, &poly).into_iter().min().unwrap_or(0);
    poly[0] += floor as f64;

    let mut fitted = None;
    for _ in 0..FOLD_ATTEMPTS {
        let residuals = raw_residuals(ys, &poly);
        let floor = residuals.iter().copied().min().unwrap_or(0);
        if floor >= 0 {
            let residuals: Vec<u64> = residuals.iter().map(|&r| r as u64).collect();
            let width = residual_width(residuals.iter().copied().max().unwrap_or(0));
            fitted = Some((poly, residuals, width));
            break;
        }
        poly[0] += floor as f64;
    }

    let (poly, residuals, width) = match fitted {
        Some(f) if f.2 <= constant_width(ys) => f,
        _ => constant_fit(ys),
    };

    let mem = span_mem(overhead, width, end - start);

    FittedSpan {
        span: Span {
            start,
            end,
            poly,
            residual_width: width,
            mem,
            bit_offset: 0,
        },
        residuals,
    }
}

fn constant_width(ys: &[u32]) -> u32 {
    let lo = ys.iter().copied().min().unwrap_or(0);
    let hi = ys.iter().copied().max().unwrap_or(0);
    residual_width((hi - lo) as u64)
}

/// `c0 = min(ys)`: residuals are `y - min`, always exact.
fn constant_fit(ys: &[u32]) -> (Poly, Vec<u64>, u32) {
    let lo = ys.iter().copied().min().unwrap_or(0);
    let poly = [lo as f64, 0.0, 0.0];
    let residuals = ys.iter().map(|&y| (y - lo) as u64).collect();
    (poly, residuals, constant_width(ys))
}

fn raw_residuals(ys: &[u32], poly: &Poly) -> Vec<i64> {
    ys.iter()
        .enumerate()
        .map(|(x, &y)| y as i64 - poly::predict(poly, x as u32))
        .collect()
}

/// Cost in bytes of a span of `len` elements at `width` bits each.
#[inline]
pub(crate) fn span_mem(overhead: u32, width: u32, len: u32) -> u32 {
    let bits = width as u64 * len as u64;
    overhead.saturating_add(bits.div_ceil(8) as u32)
}

/// Partition `values[start..end]` into spans.
///
/// The range is cut into [`MIN_SPAN`]-element chunks. Walking left to right,
/// the current span absorbs the next chunk whenever the refitted span costs
/// no more than keeping the two apart.
pub(crate) fn build_spans(values: &[u32], start: u32, end: u32, overhead: u32) -> Vec<FittedSpan> {
    let mut spans = Vec::new();
    if start >= end {
        return spans;
    }

    let chunk_end = |s: u32| s.saturating_add(MIN_SPAN).min(end);

    let mut cur = fit_span(values, start, chunk_end(start), overhead);
    let mut next_start = cur.span.end;

    while next_start < end {
        let next = fit_span(values, next_start, chunk_end(next_start), overhead);
        let merged = fit_span(values, cur.span.start, next.span.end, overhead);

        if merged.span.mem as u64 <= cur.span.mem as u64 + next.span.mem as u64 {
            cur = merged;
        } else {
            spans.push(cur);
            cur = next;
        }
        next_start = cur.span.end;
    }
    spans.push(cur);

    spans
}
