//! Uncertainty-bearing scalar values with linear error propagation.
//!
//! A `Measure` is a nominal value plus a standard deviation. The arithmetic
//! operators propagate uncertainty to first order and treat both operands as
//! independent; correlated combinations (the same underlying variable
//! appearing on both sides of an expression) are handled analytically by the
//! calculation kernels, not here.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: f64,
    pub stddev: f64,
}

impl Measure {
    pub fn new(value: f64, stddev: f64) -> Self {
        Self {
            value,
            stddev: stddev.abs(),
        }
    }

    /// A value with zero uncertainty.
    pub fn exact(value: f64) -> Self {
        Self { value, stddev: 0.0 }
    }

    /// Multiply by an exact scalar.
    pub fn scale(self, k: f64) -> Self {
        Self {
            value: self.value * k,
            stddev: self.stddev * k.abs(),
        }
    }
}

impl Add for Measure {
    type Output = Measure;

    fn add(self, rhs: Measure) -> Measure {
        Measure {
            value: self.value + rhs.value,
            stddev: self.stddev.hypot(rhs.stddev),
        }
    }
}

impl Sub for Measure {
    type Output = Measure;

    fn sub(self, rhs: Measure) -> Measure {
        Measure {
            value: self.value - rhs.value,
            stddev: self.stddev.hypot(rhs.stddev),
        }
    }
}

impl Mul for Measure {
    type Output = Measure;

    fn mul(self, rhs: Measure) -> Measure {
        Measure {
            value: self.value * rhs.value,
            stddev: (rhs.value * self.stddev).hypot(self.value * rhs.stddev),
        }
    }
}

impl Div for Measure {
    type Output = Measure;

    fn div(self, rhs: Measure) -> Measure {
        Measure {
            value: self.value / rhs.value,
            stddev: (self.stddev / rhs.value)
                .hypot(self.value * rhs.stddev / (rhs.value * rhs.value)),
        }
    }
}
