//! reactab - post-processing of catalysis and electrochemistry data tables
//!
//! This library computes derived quantities from tabular experiment data:
//! feedstock conversion, elemental selectivity and yield. Columns may hold
//! plain floats, unit-bearing magnitudes, or uncertainty-bearing values;
//! each transform picks the matching arithmetic once per call and
//! propagates units and uncertainty through to its output columns.
//!
//! # Features
//!
//! - Row-aligned tables with homogeneous typed columns
//! - Reactant, product and mixed conversion bases, whole-molecule or per
//!   element
//! - Intermediate accumulator columns reused across sequential calls
//! - Unit conversion (mol/s, mol/min, ...) and first-order uncertainty
//!   propagation, including correlated operands
//!
//! # Example
//!
//! ```
//! use reactab::core::{conversion, Conversion};
//! use reactab::types::{ColumnValue, Table};
//!
//! let mut table = Table::new();
//! table.insert("xin->CH4", ColumnValue::Float(vec![0.1, 0.1]));
//! table.insert("xout->CH4", ColumnValue::Float(vec![0.095, 0.09]));
//!
//! let spec = Conversion::new("CH4").xin("xin").xout("xout");
//! conversion(&mut table, &spec)?;
//!
//! let x = table.column("Xr->CH4").unwrap();
//! assert_eq!(x.values, ColumnValue::Float(vec![0.05, 0.1]));
//! # Ok::<(), reactab::error::ReactabError>(())
//! ```

pub mod core;
pub mod error;
pub mod formula;
pub mod measure;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use crate::core::{catalytic_yield, conversion, selectivity, Conversion, Role, Selectivity};
pub use error::{ReactabError, ReactabResult};
pub use measure::Measure;
pub use types::{Column, ColumnValue, Table};
pub use units::Unit;
