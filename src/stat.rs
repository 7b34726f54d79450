//! Size and shape counters.

use std::collections::BTreeMap;
use std::mem::size_of;

use crate::array::CompactArray;
use crate::segment::Segment;
use crate::span::Span;

/// Named counters reported by [`CompactArray::stat`].
///
/// Keys: `n`, `seg_cnt`, `span_cnt`, `spans/seg`, `mem_elts`, `elt_width`,
/// `mem_total`, `bits/elt`.
pub type Stat = BTreeMap<&'static str, u64>;

impl CompactArray {
    /// Bytes used by the structure, heap included.
    pub fn mem_total(&self) -> usize {
        size_of::<CompactArray>()
            + self.segments.len() * size_of::<Segment>()
            + self.spans.len() * size_of::<Span>()
            + self.residuals.byte_len()
    }

    /// Counters describing the encoding.
    ///
    /// - `mem_elts`: bytes of packed residuals
    /// - `elt_width`: residual bits per element, truncated
    /// - `spans/seg`: `span_cnt * 1000 / (seg_cnt * 1000 + 1)`. The `+ 1`
    ///   keeps this strictly below the true ratio before truncation, so it
    ///   reads as a floor: 1 span in 1 segment reports 0, 5 spans report 4
    /// - `bits/elt`: total bits per element, truncated
    ///
    /// Ratios are 0 for an empty array.
    pub fn stat(&self) -> Stat {
        let n = self.n as u64;
        let seg_cnt = self.segments.len() as u64;
        let span_cnt = self.spans.len() as u64;
        let mem_elts = self.residuals.byte_len() as u64;
        let mem_total = self.mem_total() as u64;

        let per_elt = |bytes: u64| if n == 0 { 0 } else { bytes * 8 / n };

        let mut st = Stat::new();
        st.insert("n", n);
        st.insert("seg_cnt", seg_cnt);
        st.insert("span_cnt", span_cnt);
        st.insert("spans/seg", (span_cnt * 1000) / (seg_cnt * 1000 + 1));
        st.insert("mem_elts", mem_elts);
        st.insert("elt_width", per_elt(mem_elts));
        st.insert("mem_total", mem_total);
        st.insert("bits/elt", per_elt(mem_total));
        st
    }
}
