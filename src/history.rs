use crate::Ohlcv;

use std::collections::VecDeque;

/// Read-only, index-addressable view of the bars delivered so far.
///
/// Index `0` is the oldest bar. The host owns and appends to the
/// underlying storage; indicators only read from it. When the host calls
/// [`Indicator::compute`](crate::Indicator::compute) with `index = i`, the
/// history is expected to hold bars `0..=i`, with bar `i` being the one
/// currently computed.
///
/// Implemented for slices, [`Vec`] and [`VecDeque`]. Implement it on your
/// own series type to avoid copying bars.
pub trait History {
    /// Bar type stored in the history.
    type Bar: Ohlcv;

    /// Returns the bar at `index`, or `None` if out of range.
    fn get(&self, index: usize) -> Option<&Self::Bar>;

    /// Returns the bar preceding `index`.
    ///
    /// For `index == 0` (or a missing predecessor) this falls back to the
    /// bar at `index` itself, so the first bar compares against its own
    /// high and low. Returns `None` only if `index` itself is missing.
    fn prior_of(&self, index: usize) -> Option<&Self::Bar> {
        index
            .checked_sub(1)
            .and_then(|prev| self.get(prev))
            .or_else(|| self.get(index))
    }
}

impl<B: Ohlcv> History for [B] {
    type Bar = B;

    #[inline]
    fn get(&self, index: usize) -> Option<&B> {
        <[B]>::get(self, index)
    }
}

impl<B: Ohlcv> History for Vec<B> {
    type Bar = B;

    #[inline]
    fn get(&self, index: usize) -> Option<&B> {
        self.as_slice().get(index)
    }
}

impl<B: Ohlcv> History for VecDeque<B> {
    type Bar = B;

    #[inline]
    fn get(&self, index: usize) -> Option<&B> {
        VecDeque::get(self, index)
    }
}
