use std::sync::Arc;

use parking_lot::RwLock;

/// Which outcome token a mid-price update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Up,
    Down,
}

/// Point-in-time copy of the live fields, taken under one lock so the odds
/// pair and the reference price are mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSnapshot {
    pub up_odd: f64,
    pub down_odd: f64,
    pub reference_price: f64,
}

#[derive(Debug)]
struct LiveState {
    up_odd: f64,
    down_odd: f64,
    reference_price: f64,
}

/// Process-wide market state. Two writer roles touch disjoint fields — the
/// CLOB feed owns the odds pair, the RTDS feed owns the reference price —
/// and the sampler reads all three in one snapshot. A single lock keeps any
/// read from pairing `up_odd` and `down_odd` from different updates.
#[derive(Debug)]
pub struct MarketState {
    inner: RwLock<LiveState>,
}

impl MarketState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(LiveState {
                up_odd: 0.5,
                down_odd: 0.5,
                // 0 = no reference price received yet.
                reference_price: 0.0,
            }),
        })
    }

    /// Apply a mid-price for one outcome token. Sets both odds from the one
    /// mid, which is what keeps `up_odd + down_odd == 1` at every
    /// observation point.
    pub fn set_mid(&self, side: Side, mid: f64) {
        let mut s = self.inner.write();
        match side {
            Side::Up => {
                s.up_odd = mid;
                s.down_odd = 1.0 - mid;
            }
            Side::Down => {
                s.down_odd = mid;
                s.up_odd = 1.0 - mid;
            }
        }
    }

    pub fn set_reference_price(&self, value: f64) {
        self.inner.write().reference_price = value;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let s = self.inner.read();
        StateSnapshot {
            up_odd: s.up_odd,
            down_odd: s.down_odd,
            reference_price: s.reference_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_even_odds_with_unknown_reference() {
        let state = MarketState::new();
        let snap = state.snapshot();
        assert_eq!(snap.up_odd, 0.5);
        assert_eq!(snap.down_odd, 0.5);
        assert_eq!(snap.reference_price, 0.0);
    }

    #[test]
    fn mid_update_sets_complement() {
        let state = MarketState::new();
        state.set_mid(Side::Up, 0.41);
        let snap = state.snapshot();
        assert!((snap.up_odd - 0.41).abs() < 1e-12);
        assert!((snap.down_odd - 0.59).abs() < 1e-12);
        assert!((snap.up_odd + snap.down_odd - 1.0).abs() < 1e-12);

        state.set_mid(Side::Down, 0.30);
        let snap = state.snapshot();
        assert!((snap.down_odd - 0.30).abs() < 1e-12);
        assert!((snap.up_odd - 0.70).abs() < 1e-12);
    }

    #[test]
    fn reference_price_is_independent_of_odds() {
        let state = MarketState::new();
        state.set_mid(Side::Up, 0.62);
        state.set_reference_price(67_432.15);
        let snap = state.snapshot();
        assert!((snap.up_odd - 0.62).abs() < 1e-12);
        assert!((snap.reference_price - 67_432.15).abs() < 1e-9);
    }
}
