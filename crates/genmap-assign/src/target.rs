//! Target response derivation

use crate::config::IdealGate;
use genmap_catalog::{GateFunction, InputWindow, ResponseTarget};

/// Derives the curve a part should have at one circuit position, given the
/// input window its producers leave it.
pub trait TargetPolicy: Send + Sync {
    fn target(&self, function: GateFunction, window: InputWindow) -> ResponseTarget;
}

impl TargetPolicy for IdealGate {
    /// Full-swing output with the threshold at the geometric centre of the
    /// window, the point of equal fold-headroom on both sides.
    fn target(&self, _function: GateFunction, window: InputWindow) -> ResponseTarget {
        // XOR of identical ranges can leave a zero low side
        let low = window.low.max(window.high * 1e-3);
        ResponseTarget {
            low: self.low,
            high: self.high,
            threshold: (low * window.high).sqrt(),
            steepness: self.steepness,
        }
    }
}
