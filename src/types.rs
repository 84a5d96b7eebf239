use crate::measure::Measure;
use crate::units::Unit;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

//==============================================================================
// Column Model
//==============================================================================

/// Column value families (homogeneous arrays).
///
/// Each column commits to one representation at creation; the calculators
/// pick one arithmetic implementation per family at entry rather than
/// inspecting values row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    /// Plain real numbers
    Float(Vec<f64>),
    /// Magnitudes with a shared physical unit
    Quantity(Vec<f64>, Unit),
    /// Nominal values with standard deviations
    Uncertain(Vec<Measure>),
}

impl ColumnValue {
    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            ColumnValue::Float(v) => v.len(),
            ColumnValue::Quantity(v, _) => v.len(),
            ColumnValue::Uncertain(v) => v.len(),
        }
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the family name as a string
    pub fn family_name(&self) -> &'static str {
        match self {
            ColumnValue::Float(_) => "Float",
            ColumnValue::Quantity(_, _) => "Quantity",
            ColumnValue::Uncertain(_) => "Uncertain",
        }
    }

    /// Nominal magnitudes, ignoring units and uncertainty
    pub fn nominal(&self) -> Vec<f64> {
        match self {
            ColumnValue::Float(v) => v.clone(),
            ColumnValue::Quantity(v, _) => v.clone(),
            ColumnValue::Uncertain(v) => v.iter().map(|m| m.value).collect(),
        }
    }
}

/// A named column in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValue,
}

impl Column {
    pub fn new(name: String, values: ColumnValue) -> Self {
        Self { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//==============================================================================
// Table
//==============================================================================

/// A rectangular collection of named, row-aligned columns.
///
/// Calculator calls mutate the table in place: they add or overwrite columns
/// (including the intermediate accumulator columns later calls reuse) and
/// never remove existing ones. Ownership stays with the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: HashMap<String, Column>,
}

impl Table {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }

    /// Insert a column, silently replacing any column of the same name
    pub fn insert(&mut self, name: &str, values: ColumnValue) {
        self.columns
            .insert(name.to_string(), Column::new(name.to_string(), values));
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Remove a column (caller-side operation; the calculators never do this)
    pub fn remove(&mut self, name: &str) -> Option<Column> {
        self.columns.remove(name)
    }

    /// Get the number of rows (length of first column, all should be same)
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map_or(0, |col| col.len())
    }

    /// Validate all columns have the same length
    pub fn validate_lengths(&self) -> Result<(), String> {
        let row_count = self.row_count();
        for (name, column) in &self.columns {
            if column.len() != row_count {
                return Err(format!(
                    "Column '{}' has {} rows, expected {} rows",
                    name,
                    column.len(),
                    row_count
                ));
            }
        }
        Ok(())
    }
}

/// Column-group naming convention: the per-species column of group `xin`
/// for species `CH4` is `"xin->CH4"`.
pub fn group_key(group: &str, species: &str) -> String {
    format!("{group}->{species}")
}
