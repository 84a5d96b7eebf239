//! Core transforms operating row-wise over a table

pub mod conversion;
mod kernels;
pub mod selectivity;

pub use conversion::{conversion, Conversion, Role};
pub use selectivity::{catalytic_yield, selectivity, Selectivity};
