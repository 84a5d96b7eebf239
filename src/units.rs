//! Unit parsing and conversion for table columns.
//!
//! Covers the two dimensions the calculators care about: molar flow rates
//! (required for rate-mode inputs) and dimensionless fractions. Anything
//! else parses as `Unknown` and is rejected wherever a dimension is
//! required.

use serde::{Deserialize, Serialize};

/// Dimension categories for compatibility checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// Amount of substance per time (mol/s and friends)
    MolarFlow,
    /// Pure number (mole fractions, percentages, conversion results)
    Dimensionless,
    /// Unrecognized unit string
    Unknown,
}

/// A parsed unit: symbol, dimension, and factor to the dimension's base unit
/// (mol/s for molar flow, 1 for dimensionless).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    symbol: String,
    dimension: Dimension,
    factor: f64,
}

impl Unit {
    /// Parse a unit string into a dimension and a base-unit factor
    pub fn parse(unit: &str) -> Self {
        let trimmed = unit.trim();
        let (dimension, factor) = match trimmed.to_lowercase().as_str() {
            "mol/s" => (Dimension::MolarFlow, 1.0),
            "mol/min" => (Dimension::MolarFlow, 1.0 / 60.0),
            "mol/h" | "mol/hr" => (Dimension::MolarFlow, 1.0 / 3600.0),
            "mmol/s" => (Dimension::MolarFlow, 1e-3),
            "mmol/min" => (Dimension::MolarFlow, 1e-3 / 60.0),
            "mmol/h" | "mmol/hr" => (Dimension::MolarFlow, 1e-3 / 3600.0),
            "umol/s" | "µmol/s" => (Dimension::MolarFlow, 1e-6),
            "umol/min" | "µmol/min" => (Dimension::MolarFlow, 1e-6 / 60.0),
            "" | "ratio" | "frac" | "fraction" => (Dimension::Dimensionless, 1.0),
            "%" | "percent" => (Dimension::Dimensionless, 0.01),
            _ => (Dimension::Unknown, 1.0),
        };
        Self {
            symbol: trimmed.to_string(),
            dimension,
            factor,
        }
    }

    /// The unit of dimensionless results (conversion fractions)
    pub fn dimensionless() -> Self {
        Self {
            symbol: String::new(),
            dimension: Dimension::Dimensionless,
            factor: 1.0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimension == Dimension::Dimensionless
    }

    /// Multiplier converting magnitudes in `self` to magnitudes in `other`.
    /// `None` when the dimensions are incompatible or unknown.
    pub fn factor_to(&self, other: &Unit) -> Option<f64> {
        if self.dimension == Dimension::Unknown || self.dimension != other.dimension {
            return None;
        }
        Some(self.factor / other.factor)
    }
}
