//! Bit-packed residual storage.
//!
//! Bits are numbered little-endian inside each `u64` word: bit `b` of the
//! buffer is bit `b % 64` of word `b / 64`. A value may straddle two words.

/// Mask with the low `width` bits set, `width` in `0..=64`.
#[inline]
fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// One contiguous, fixed-size bit buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitStore {
    words: Vec<u64>,
}

impl BitStore {
    /// Zeroed buffer able to hold exactly `bits` bits.
    pub fn with_bits(bits: u64) -> Self {
        Self {
            words: vec![0; words_for(bits)],
        }
    }

    /// Wrap already packed words.
    pub fn from_words(words: Vec<u64>) -> Self {
        Self { words }
    }

    /// The packed words.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.words.len() * 8
    }

    /// Extract `width` bits starting at bit `offset`.
    ///
    /// `width == 0` always yields 0 without touching the buffer.
    #[inline]
    pub fn read(&self, offset: u64, width: u32) -> u64 {
        if width == 0 {
            return 0;
        }
        let idx = (offset >> 6) as usize;
        let shift = (offset & 63) as u32;

        let lo = self.words[idx] >> shift;
        if shift + width <= 64 {
            lo & low_mask(width)
        } else {
            let hi = self.words[idx + 1] << (64 - shift);
            (lo | hi) & low_mask(width)
        }
    }

    /// Store the low `width` bits of `value` at bit `offset`.
    ///
    /// Target bits must still be zero: every position is written once.
    #[inline]
    pub fn write(&mut self, offset: u64, width: u32, value: u64) {
        if width == 0 {
            return;
        }
        let value = value & low_mask(width);
        let idx = (offset >> 6) as usize;
        let shift = (offset & 63) as u32;

        self.words[idx] |= value << shift;
        if shift + width > 64 {
            self.words[idx + 1] |= value >> (64 - shift);
        }
    }
}

/// Number of words needed to hold `bits` bits.
#[inline]
pub(crate) fn words_for(bits: u64) -> usize {
    bits.div_ceil(64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(1), 1);
        assert_eq!(low_mask(32), 0xffff_ffff);
        assert_eq!(low_mask(64), u64::MAX);
    }

    #[test]
    fn test_sized_exactly() {
        assert_eq!(BitStore::with_bits(0).words().len(), 0);
        assert_eq!(BitStore::with_bits(1).words().len(), 1);
        assert_eq!(BitStore::with_bits(64).words().len(), 1);
        assert_eq!(BitStore::with_bits(65).words().len(), 2);
        assert_eq!(BitStore::with_bits(1220).byte_len(), 160);
    }

    #[test]
    fn test_straddling_value() {
        let mut store = BitStore::with_bits(128);
        store.write(60, 8, 0xab);
        assert_eq!(store.read(60, 8), 0xab);
        assert_eq!(store.words()[0] >> 60, 0xb);
        assert_eq!(store.words()[1], 0xa);
    }

    #[test]
    fn test_full_width_values() {
        let mut store = BitStore::with_bits(64 * 3);
        store.write(0, 64, u64::MAX);
        store.write(96, 64, 0x0123_4567_89ab_cdef);
        assert_eq!(store.read(0, 64), u64::MAX);
        assert_eq!(store.read(96, 64), 0x0123_4567_89ab_cdef);
        assert_eq!(store.read(64, 32), 0);
    }

    #[test]
    fn test_mixed_widths_back_to_back() {
        let widths = [1u32, 2, 4, 8, 16, 32, 64, 0, 2, 32];
        let total: u64 = widths.iter().map(|&w| w as u64 * 5).sum();
        let mut store = BitStore::with_bits(total);

        let mut offset = 0u64;
        for (i, &w) in widths.iter().enumerate() {
            for k in 0..5u64 {
                store.write(offset + k * w as u64, w, (i as u64 * 31 + k) & low_mask(w));
            }
            offset += 5 * w as u64;
        }

        let mut offset = 0u64;
        for (i, &w) in widths.iter().enumerate() {
            for k in 0..5u64 {
                let want = (i as u64 * 31 + k) & low_mask(w);
                assert_eq!(store.read(offset + k * w as u64, w), want, "width {}", w);
            }
            offset += 5 * w as u64;
        }
    }

    #[test]
    fn test_zero_width_reads_nothing() {
        let store = BitStore::default();
        assert_eq!(store.read(1 << 40, 0), 0);
    }
}
