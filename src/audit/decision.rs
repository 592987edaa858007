//! Bias decision engine
//!
//! Pure thresholding of the three summary metrics into violation flags
//! and a severity score. The thresholds are fixed industry rule-of-thumb
//! figures, not derived quantities.

use serde::Serialize;

/// Absolute demographic parity difference above this is a violation.
pub const DPD_THRESHOLD: f64 = 0.10;

/// Absolute equal opportunity difference above this is a violation.
pub const EOD_THRESHOLD: f64 = 0.10;

/// Disparate impact ratio below this is a violation (the four-fifths rule).
pub const DIR_THRESHOLD: f64 = 0.80;

/// Which metric thresholds were violated.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Violations {
    pub dpd: bool,
    pub eod: bool,
    pub dir: bool,
}

impl Violations {
    pub fn any(&self) -> bool {
        self.dpd || self.eod || self.dir
    }
}

/// Outcome of thresholding one attribute's metrics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BiasDecision {
    pub violations: Violations,
    /// Weighted violation count scaled to [0, 10], rounded to 2 decimals.
    pub severity_score: f64,
    pub bias_present: bool,
}

/// Threshold `(dpd, eod, dir)` into a decision.
pub fn evaluate_bias(dpd: f64, eod: f64, dir: f64) -> BiasDecision {
    let violations = Violations {
        dpd: dpd.abs() > DPD_THRESHOLD,
        eod: eod.abs() > EOD_THRESHOLD,
        dir: dir < DIR_THRESHOLD,
    };

    // Weights sum to 1.00 across the three violations
    let severity = 0.33 * violations.dpd as u8 as f64
        + 0.33 * violations.eod as u8 as f64
        + 0.34 * violations.dir as u8 as f64;

    BiasDecision {
        violations,
        severity_score: round2(severity * 10.0),
        bias_present: violations.any(),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
