//! Response Function Model
//!
//! A gate's analog transfer characteristic is a Hill function of its
//! combined input concentration. Steady-state levels divide the expression
//! rate by the decay rate, matching the steady-state model of the circuit
//! evaluator.
//!
//! The two operations the assigner relies on are:
//! - [`input_window`]: the concentration window a gate must separate, given
//!   the worst-case output ranges of its producers
//! - [`ResponseFunction::compose`]: whether a candidate switches inside that
//!   window, and which output range it realizes if so

use crate::function::{GateFunction, Polarity};
use serde::{Deserialize, Serialize};

fn default_decay() -> f64 {
    1.0
}

/// Parameters of a Hill-type response curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillParams {
    /// Basal expression
    pub ymin: f64,
    /// Saturated expression
    pub ymax: f64,
    /// Input concentration at half-maximal response
    #[serde(alias = "K")]
    pub k: f64,
    /// Hill coefficient (steepness)
    pub n: f64,
    /// First-order decay rate of the output protein
    #[serde(default = "default_decay")]
    pub decay: f64,
}

impl HillParams {
    /// Create parameters with unit decay
    pub fn new(ymin: f64, ymax: f64, k: f64, n: f64) -> Self {
        Self {
            ymin,
            ymax,
            k,
            n,
            decay: 1.0,
        }
    }

    /// Builder: set the decay rate
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Check the numeric domain. Returns a description of the first problem.
    pub fn check(&self) -> Option<String> {
        let all = [self.ymin, self.ymax, self.k, self.n, self.decay];
        if all.iter().any(|v| !v.is_finite()) {
            return Some("parameters must be finite".to_string());
        }
        if self.ymin <= 0.0 {
            return Some(format!("ymin must be positive, got {}", self.ymin));
        }
        if self.ymax <= self.ymin {
            return Some(format!(
                "ymax ({}) must exceed ymin ({})",
                self.ymax, self.ymin
            ));
        }
        if self.k <= 0.0 {
            return Some(format!("K must be positive, got {}", self.k));
        }
        if self.n <= 0.0 {
            return Some(format!("n must be positive, got {}", self.n));
        }
        if self.decay <= 0.0 {
            return Some(format!("decay must be positive, got {}", self.decay));
        }
        None
    }
}

/// Worst-case logical levels carried by a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRange {
    /// Highest level that still reads as logical 0
    pub low: f64,
    /// Lowest level that still reads as logical 1
    pub high: f64,
}

impl SignalRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Level for a logical value
    pub fn level(&self, value: bool) -> f64 {
        if value {
            self.high
        } else {
            self.low
        }
    }

    /// Ratio between the logical-1 and logical-0 levels
    pub fn on_off_ratio(&self) -> f64 {
        self.high / self.low
    }
}

impl Default for SignalRange {
    fn default() -> Self {
        Self {
            low: 0.01,
            high: 3.0,
        }
    }
}

/// Combined-input window a gate must separate
///
/// Every input combination that has to drive the response to its low-input
/// side combines to at most `low`; every other combination combines to at
/// least `high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputWindow {
    pub low: f64,
    pub high: f64,
}

impl InputWindow {
    /// True when the two sides do not overlap
    pub fn is_separable(&self) -> bool {
        self.low < self.high
    }

    /// Geometric centre of the window
    pub fn center(&self) -> f64 {
        (self.low * self.high).sqrt()
    }
}

/// Compute the window a gate implementing `function` must separate when its
/// inputs carry `ranges` (one per input, in order).
pub fn input_window(function: GateFunction, ranges: &[SignalRange]) -> InputWindow {
    let arity = ranges.len();
    let mut low = f64::NEG_INFINITY;
    let mut high = f64::INFINITY;
    let mut bits = vec![false; arity];
    let mut levels = vec![0.0; arity];

    for combo in 0..(1usize << arity) {
        for (i, range) in ranges.iter().enumerate() {
            bits[i] = combo & (1 << i) != 0;
            levels[i] = range.level(bits[i]);
        }
        let x = function.combine(&levels);
        let out = function.eval(&bits);
        let high_side = match function.polarity() {
            Polarity::Activating => out,
            Polarity::Repressing => !out,
        };
        if high_side {
            high = high.min(x);
        } else {
            low = low.max(x);
        }
    }

    InputWindow { low, high }
}

/// A gate's analog transfer characteristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseFunction {
    pub params: HillParams,
    pub polarity: Polarity,
}

impl ResponseFunction {
    pub fn new(params: HillParams, polarity: Polarity) -> Self {
        Self { params, polarity }
    }

    /// Repressor-type response
    pub fn repressor(ymin: f64, ymax: f64, k: f64, n: f64) -> Self {
        Self::new(HillParams::new(ymin, ymax, k, n), Polarity::Repressing)
    }

    /// Activator-type response
    pub fn activator(ymin: f64, ymax: f64, k: f64, n: f64) -> Self {
        Self::new(HillParams::new(ymin, ymax, k, n), Polarity::Activating)
    }

    /// Expression rate for a combined input concentration
    pub fn evaluate(&self, x: f64) -> f64 {
        let p = &self.params;
        let r = (x.max(0.0) / p.k).powf(p.n);
        match self.polarity {
            Polarity::Repressing => p.ymin + (p.ymax - p.ymin) / (1.0 + r),
            Polarity::Activating => p.ymin + (p.ymax - p.ymin) * r / (1.0 + r),
        }
    }

    /// Steady-state output level for a combined input concentration
    pub fn steady_state(&self, x: f64) -> f64 {
        self.evaluate(x) / self.params.decay
    }

    /// Steady-state output bounds over all inputs
    pub fn output_bounds(&self) -> SignalRange {
        SignalRange {
            low: self.params.ymin / self.params.decay,
            high: self.params.ymax / self.params.decay,
        }
    }

    /// Check that this response switches inside `window` and return the
    /// output range it realizes when driven at the window edges.
    ///
    /// The threshold `K` must sit inside the window with `margin` (>= 1) of
    /// headroom on both sides.
    pub fn compose(&self, window: InputWindow, margin: f64) -> Option<SignalRange> {
        if !window.is_separable() {
            return None;
        }
        let k = self.params.k;
        if window.low * margin > k || k * margin > window.high {
            return None;
        }
        let at_low = self.steady_state(window.low);
        let at_high = self.steady_state(window.high);
        let range = match self.polarity {
            Polarity::Repressing => SignalRange {
                low: at_high,
                high: at_low,
            },
            Polarity::Activating => SignalRange {
                low: at_low,
                high: at_high,
            },
        };
        Some(range)
    }
}
