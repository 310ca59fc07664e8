//! Running cost totals.

use serde::{Deserialize, Serialize};

/// Cost totals accumulated across completed turns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct CostTotals {
    pub input: f64,
    pub output: f64,
    pub total: f64,
}

impl CostTotals {
    /// Fold the costs reported by one `done` event into the totals.
    ///
    /// Missing values count as zero. Negative or non-finite values are
    /// clamped to zero so the totals never go down.
    pub fn record(&mut self, input: Option<f64>, output: Option<f64>, total: Option<f64>) {
        self.input += non_negative(input);
        self.output += non_negative(output);
        self.total += non_negative(total);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_zero(&self) -> bool {
        self.input == 0.0 && self.output == 0.0 && self.total == 0.0
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
