//! Read-only random access over `u32` sequences.

use crate::array::CompactArray;
use crate::error::CompactError;

/// Random access to an immutable sequence of `u32`.
///
/// Implemented by [`CompactArray`] and by plain `[u32]` slices, so callers and
/// benchmarks can swap the compressed representation for the raw one.
pub trait IntSequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `i`.
    fn get(&self, i: usize) -> Result<u32, CompactError>;

    /// Elements at `i` and `i + 1`.
    fn get2(&self, i: usize) -> Result<(u32, u32), CompactError>;

    /// Copy `[start, end)` into `out`, which must be exactly `end - start` long.
    fn slice(&self, start: usize, end: usize, out: &mut [u32]) -> Result<(), CompactError>;
}

impl IntSequence for CompactArray {
    fn len(&self) -> usize {
        CompactArray::len(self)
    }

    fn get(&self, i: usize) -> Result<u32, CompactError> {
        CompactArray::get(self, i)
    }

    fn get2(&self, i: usize) -> Result<(u32, u32), CompactError> {
        CompactArray::get2(self, i)
    }

    fn slice(&self, start: usize, end: usize, out: &mut [u32]) -> Result<(), CompactError> {
        CompactArray::slice(self, start, end, out)
    }
}

impl IntSequence for [u32] {
    fn len(&self) -> usize {
        <[u32]>::len(self)
    }

    fn get(&self, i: usize) -> Result<u32, CompactError> {
        <[u32]>::get(self, i)
            .copied()
            .ok_or(CompactError::OutOfRange {
                index: i,
                len: <[u32]>::len(self),
            })
    }

    fn get2(&self, i: usize) -> Result<(u32, u32), CompactError> {
        match i.checked_add(2).and_then(|e| <[u32]>::get(self, i..e)) {
            Some(pair) => Ok((pair[0], pair[1])),
            None => Err(CompactError::OutOfRange {
                index: i,
                len: <[u32]>::len(self),
            }),
        }
    }

    fn slice(&self, start: usize, end: usize, out: &mut [u32]) -> Result<(), CompactError> {
        match <[u32]>::get(self, start..end) {
            Some(src) if src.len() == out.len() => {
                out.copy_from_slice(src);
                Ok(())
            }
            _ => Err(CompactError::SizeMismatch {
                start,
                end,
                len: <[u32]>::len(self),
                out: out.len(),
            }),
        }
    }
}
