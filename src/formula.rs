//! Chemical formula parsing.
//!
//! Resolves a formula string such as `"C3H8"` or `"Ca(OH)2"` into a map from
//! element symbol to stoichiometric count. Strings that do not parse are not
//! an error at the feedstock level; they remain usable as opaque labels for
//! whole-molecule conversion, but requesting an elemental basis for them
//! fails with a `Resolution` error.

use crate::error::{ReactabError, ReactabResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// IUPAC element symbols, ordered by atomic number.
const ELEMENTS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][a-z]?)(\d*)|(\()|(\))(\d*)").unwrap());

fn is_element(symbol: &str) -> bool {
    ELEMENTS.contains(&symbol)
}

/// Parse a chemical formula into element counts.
///
/// Supports element symbols with optional integer counts and parenthesized
/// groups with multipliers. The whole string must tokenize; partial matches
/// (e.g. `"propane"`) are rejected.
pub fn parse_formula(formula: &str) -> ReactabResult<BTreeMap<String, u32>> {
    if formula.is_empty() {
        return Err(ReactabError::Resolution(
            "empty formula string".to_string(),
        ));
    }

    let mut stack: Vec<BTreeMap<String, u32>> = vec![BTreeMap::new()];
    let mut consumed = 0usize;

    for caps in TOKEN.captures_iter(formula) {
        let whole = caps.get(0).unwrap();
        if whole.start() != consumed {
            return Err(ReactabError::Resolution(format!(
                "'{formula}' is not a valid chemical formula"
            )));
        }
        consumed = whole.end();

        if let Some(symbol) = caps.get(1) {
            let symbol = symbol.as_str();
            if !is_element(symbol) {
                return Err(ReactabError::Resolution(format!(
                    "unknown element '{symbol}' in formula '{formula}'"
                )));
            }
            let count: u32 = match caps.get(2).map(|m| m.as_str()) {
                Some("") | None => 1,
                Some(digits) => digits.parse().map_err(|_| {
                    ReactabError::Resolution(format!(
                        "bad count for '{symbol}' in formula '{formula}'"
                    ))
                })?,
            };
            *stack
                .last_mut()
                .unwrap()
                .entry(symbol.to_string())
                .or_insert(0) += count;
        } else if caps.get(3).is_some() {
            stack.push(BTreeMap::new());
        } else if caps.get(4).is_some() {
            let group = stack.pop().ok_or_else(|| {
                ReactabError::Resolution(format!(
                    "unbalanced parentheses in formula '{formula}'"
                ))
            })?;
            if stack.is_empty() {
                return Err(ReactabError::Resolution(format!(
                    "unbalanced parentheses in formula '{formula}'"
                )));
            }
            let mult: u32 = match caps.get(5).map(|m| m.as_str()) {
                Some("") | None => 1,
                Some(digits) => digits.parse().map_err(|_| {
                    ReactabError::Resolution(format!(
                        "bad group count in formula '{formula}'"
                    ))
                })?,
            };
            for (symbol, count) in group {
                *stack.last_mut().unwrap().entry(symbol).or_insert(0) += count * mult;
            }
        }
    }

    if consumed != formula.len() || stack.len() != 1 {
        return Err(ReactabError::Resolution(format!(
            "'{formula}' is not a valid chemical formula"
        )));
    }

    let composition = stack.pop().unwrap();
    if composition.is_empty() {
        return Err(ReactabError::Resolution(format!(
            "'{formula}' is not a valid chemical formula"
        )));
    }
    Ok(composition)
}

/// Stoichiometric count of `element` in `formula`.
///
/// Fails when the formula does not parse or does not contain the element.
pub fn element_count(formula: &str, element: &str) -> ReactabResult<u32> {
    let composition = parse_formula(formula)?;
    composition.get(element).copied().ok_or_else(|| {
        ReactabError::Resolution(format!(
            "formula '{formula}' does not contain element '{element}'"
        ))
    })
}
