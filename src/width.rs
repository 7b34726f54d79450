//! Residual width classes.
//!
//! Residuals are stored at one of a few fixed widths rather than the exact
//! number of significant bits. Every class divides 64, so decoding is a shift
//! and a mask and never needs variable-length bit arithmetic.

/// All widths a span may use, in increasing order.
pub const WIDTH_CLASSES: [u32; 8] = [0, 1, 2, 4, 8, 16, 32, 64];

/// Smallest width class able to hold `margin`.
///
/// `0` means every residual of the span is zero: decoding yields the
/// prediction itself and no bits are stored.
///
/// # Example
///
/// ```rust
/// use polypack::residual_width;
///
/// assert_eq!(residual_width(0), 0);
/// assert_eq!(residual_width(3), 2);
/// assert_eq!(residual_width(16), 8);
/// assert_eq!(residual_width(u64::MAX), 64);
/// ```
#[inline]
pub fn residual_width(margin: u64) -> u32 {
    match margin {
        0 => 0,
        1 => 1,
        2..=0x3 => 2,
        0x4..=0xf => 4,
        0x10..=0xff => 8,
        0x100..=0xffff => 16,
        0x1_0000..=0xffff_ffff => 32,
        _ => 64,
    }
}

/// Whether `width` is one of [`WIDTH_CLASSES`].
#[inline]
pub(crate) fn is_width_class(width: u32) -> bool {
    WIDTH_CLASSES.contains(&width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let cases: [(u64, u32); 13] = [
            (0, 0),
            (1, 1),
            (2, 2),
            (3, 2),
            (4, 4),
            (15, 4),
            (16, 8),
            (255, 8),
            (256, 16),
            (65535, 16),
            (65536, 32),
            (0x7fff_ffff, 32),
            (-1i64 as u64, 64),
        ];

        for (i, (input, want)) in cases.iter().enumerate() {
            assert_eq!(
                residual_width(*input),
                *want,
                "{}-th: input: {:#x}",
                i + 1,
                input
            );
        }
    }

    #[test]
    fn test_class_boundaries() {
        for &w in &WIDTH_CLASSES[1..7] {
            let max = (1u64 << w) - 1;
            assert_eq!(residual_width(max), w);
            assert!(residual_width(max + 1) > w);
        }
        assert_eq!(residual_width(1 << 32), 64);
    }

    #[test]
    fn test_is_width_class() {
        assert!(is_width_class(0));
        assert!(is_width_class(64));
        assert!(!is_width_class(3));
        assert!(!is_width_class(128));
    }
}
