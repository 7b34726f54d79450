//! The built, read-only array and its accessors.

use crate::bits::BitStore;
use crate::builder::Builder;
use crate::error::CompactError;
use crate::poly;
use crate::segment::{Segment, SEGMENT_SHIFT};
use crate::span::Span;

/// An immutable, compressed sequence of `u32` with O(1) random access.
///
/// Elements are grouped into segments of 1024, each split into spans that
/// share a quadratic polynomial. Every element is stored as the residual
/// between its value and the span's prediction, bit-packed at the span's
/// width class. Reads never decompress anything beyond the requested
/// elements, and concurrent reads need no synchronisation.
///
/// # Example
///
/// ```rust
/// use polypack::CompactArray;
///
/// let values: Vec<u32> = (0..1000).map(|i| i * 3 + i % 7).collect();
/// let a = CompactArray::from_u32(&values);
///
/// assert_eq!(a.len(), 1000);
/// assert_eq!(a.get(500).unwrap(), values[500]);
/// assert_eq!(a.get2(10).unwrap(), (values[10], values[11]));
///
/// let mut out = vec![0; 20];
/// a.slice(100, 120, &mut out).unwrap();
/// assert_eq!(out, &values[100..120]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CompactArray {
    pub(crate) n: u32,
    pub(crate) segments: Vec<Segment>,
    pub(crate) spans: Vec<Span>,
    pub(crate) residuals: BitStore,
}

impl CompactArray {
    /// Encode `values` with the default [`Builder`].
    pub fn from_u32(values: &[u32]) -> Self {
        Builder::new().build(values)
    }

    pub(crate) fn from_parts(
        n: u32,
        segments: Vec<Segment>,
        spans: Vec<Span>,
        residuals: BitStore,
    ) -> Self {
        Self {
            n,
            segments,
            spans,
            residuals,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.n as usize
    }

    /// Whether the array holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment directory, in index order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All spans, in index order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The packed residual words.
    pub fn residual_words(&self) -> &[u64] {
        self.residuals.words()
    }

    /// Element at `i`.
    ///
    /// # Errors
    ///
    /// [`CompactError::OutOfRange`] if `i >= len()`.
    #[inline]
    pub fn get(&self, i: usize) -> Result<u32, CompactError> {
        let i = self.check_index(i)?;
        let sp = &self.spans[self.span_index(i)];
        Ok(self.decode(sp, i))
    }

    /// Elements at `i` and `i + 1`.
    ///
    /// The span lookup is shared when both elements live in the same span.
    ///
    /// # Errors
    ///
    /// [`CompactError::OutOfRange`] if `i + 1 >= len()`.
    #[inline]
    pub fn get2(&self, i: usize) -> Result<(u32, u32), CompactError> {
        let j = i
            .checked_add(1)
            .filter(|&j| j < self.len())
            .ok_or(CompactError::OutOfRange {
                index: i,
                len: self.len(),
            })?;
        let (i, j) = (i as u32, j as u32);

        let idx = self.span_index(i);
        let sp = &self.spans[idx];
        let first = self.decode(sp, i);
        let second = if sp.contains(j) {
            self.decode(sp, j)
        } else {
            self.decode(&self.spans[idx + 1], j)
        };
        Ok((first, second))
    }

    /// Decode `[start, end)` into `out`.
    ///
    /// Consecutive elements reuse the current span; only the first element
    /// pays for a lookup.
    ///
    /// # Errors
    ///
    /// [`CompactError::SizeMismatch`] unless `start <= end <= len()` and
    /// `out.len() == end - start`. Nothing is written on error.
    pub fn slice(&self, start: usize, end: usize, out: &mut [u32]) -> Result<(), CompactError> {
        if start > end || end > self.len() || out.len() != end - start {
            return Err(CompactError::SizeMismatch {
                start,
                end,
                len: self.len(),
                out: out.len(),
            });
        }
        self.decode_range(start as u32, out);
        Ok(())
    }

    /// Decode the whole array.
    pub fn to_vec(&self) -> Vec<u32> {
        let mut out = vec![0; self.len()];
        self.decode_range(0, &mut out);
        out
    }

    /// Fill `out` with the elements starting at `start`. The caller has
    /// checked that `start + out.len() <= len()`.
    fn decode_range(&self, start: u32, out: &mut [u32]) {
        if out.is_empty() {
            return;
        }

        let mut idx = self.span_index(start);
        let mut sp = &self.spans[idx];
        for (i, slot) in (start..).zip(out.iter_mut()) {
            if i >= sp.end {
                idx += 1;
                sp = &self.spans[idx];
            }
            *slot = self.decode(sp, i);
        }
    }

    #[inline]
    fn check_index(&self, i: usize) -> Result<u32, CompactError> {
        if i < self.len() {
            Ok(i as u32)
        } else {
            Err(CompactError::OutOfRange {
                index: i,
                len: self.len(),
            })
        }
    }

    #[inline]
    fn span_index(&self, i: u32) -> usize {
        self.segments[(i >> SEGMENT_SHIFT) as usize].span_index(i)
    }

    #[inline]
    fn decode(&self, sp: &Span, i: u32) -> u32 {
        let x = i - sp.start;
        let width = sp.residual_width;
        let residual = self
            .residuals
            .read(sp.bit_offset + x as u64 * width as u64, width);
        poly::predict(&sp.poly, x).wrapping_add(residual as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_all(values: &[u32]) -> CompactArray {
        let a = CompactArray::from_u32(values);
        assert_eq!(a.len(), values.len());
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(a.get(i).unwrap(), v, "i={}", i);
        }
        a
    }

    #[test]
    fn test_small_inputs() {
        for values in [vec![], vec![0], vec![1], vec![1, 2], vec![5, 3, 9]] {
            check_all(&values);
        }
    }

    #[test]
    fn test_empty() {
        let a = check_all(&[]);
        assert!(a.is_empty());
        assert!(matches!(
            a.get(0),
            Err(CompactError::OutOfRange { index: 0, len: 0 })
        ));
        assert!(a.get2(0).is_err());
        assert!(a.slice(0, 0, &mut []).is_ok());
        assert!(a.to_vec().is_empty());
    }

    #[test]
    fn test_get_out_of_range() {
        let values: Vec<u32> = (0..100).collect();
        let a = check_all(&values);
        assert!(a.get(100).is_err());
        assert!(a.get(164).is_err());
        assert!(a.get(usize::MAX).is_err());
    }

    #[test]
    fn test_get2_crosses_spans_and_segments() {
        let values: Vec<u32> = (0..5000u32)
            .map(|i| match (i / 300) % 3 {
                0 => i * 2,
                1 => 1_000_000 - i,
                _ => i.wrapping_mul(2654435761) >> 20,
            })
            .collect();
        let a = check_all(&values);
        assert!(a.spans().len() > a.segment_count());

        for i in 0..values.len() - 1 {
            assert_eq!(a.get2(i).unwrap(), (values[i], values[i + 1]), "i={}", i);
        }
        assert!(a.get2(values.len() - 1).is_err());
        assert!(a.get2(usize::MAX).is_err());
    }

    #[test]
    fn test_slice() {
        let values: Vec<u32> = (0..3000u32).map(|i| i * i / 7 + (i % 11)).collect();
        let a = check_all(&values);

        for (s, e) in [(0, 0), (0, 3000), (17, 18), (1000, 2100), (1023, 1025), (2999, 3000)] {
            let mut out = vec![0; e - s];
            a.slice(s, e, &mut out).unwrap();
            assert_eq!(out, &values[s..e]);
        }
        assert_eq!(a.to_vec(), values);
    }

    #[test]
    fn test_to_vec_matches_slice() {
        for n in [0usize, 1, 16, 1023, 1024, 1025, 4100] {
            let values: Vec<u32> = (0..n as u32).map(|i| (i * 37) ^ (i >> 3)).collect();
            let a = check_all(&values);

            let mut out = vec![0; n];
            a.slice(0, n, &mut out).unwrap();
            assert_eq!(a.to_vec(), out, "n={}", n);
            assert_eq!(a.to_vec(), values, "n={}", n);
        }
    }

    #[test]
    fn test_slice_size_mismatch() {
        let a = CompactArray::from_u32(&[1, 2, 3, 4]);
        let mut out = [0u32; 2];

        assert!(matches!(
            a.slice(0, 3, &mut out),
            Err(CompactError::SizeMismatch { out: 2, .. })
        ));
        assert!(a.slice(3, 2, &mut []).is_err());
        assert!(a.slice(3, 5, &mut out).is_err());
        assert!(a.slice(2, 4, &mut out).is_ok());
        assert_eq!(out, [3, 4]);
    }
}
