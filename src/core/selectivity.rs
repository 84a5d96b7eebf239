//! Elemental selectivity and yield.
//!
//! Both transforms relate the amount of an element appearing in one product
//! to a feedstock conversion previously computed on the same table: a
//! reactant-mode elemental `conversion` call must precede them, since they
//! consume the accumulator columns it registers (`n_<el>-><feedstock>` and
//! `nin_<el>`).

use crate::core::conversion::{resolve_fraction, resolve_rate};
use crate::core::kernels;
use crate::error::{ReactabError, ReactabResult};
use crate::formula::element_count;
use crate::types::{group_key, ColumnValue, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters shared by `selectivity` and `catalytic_yield`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selectivity {
    /// Feedstock whose converted element amount is the reference
    pub feedstock: String,
    /// Product species the element ends up in (must be a valid formula)
    pub product: String,
    /// Element symbol the balance is computed for
    pub element: String,
    /// Column group holding inlet mole fractions
    pub xin: Option<String>,
    /// Column group holding outlet mole fractions
    pub xout: Option<String>,
    /// Column group holding inlet molar rates
    pub rin: Option<String>,
    /// Column group holding outlet molar rates
    pub rout: Option<String>,
    /// Internal-standard species for normalizing fractions (fraction mode)
    pub standard: Option<String>,
    /// Output column prefix; defaults to `S_<element>` / `Y_<element>`
    pub output: Option<String>,
}

impl Selectivity {
    pub fn new(feedstock: &str, product: &str, element: &str) -> Self {
        Self {
            feedstock: feedstock.to_string(),
            product: product.to_string(),
            element: element.to_string(),
            ..Default::default()
        }
    }

    pub fn xin(mut self, group: &str) -> Self {
        self.xin = Some(group.to_string());
        self
    }

    pub fn xout(mut self, group: &str) -> Self {
        self.xout = Some(group.to_string());
        self
    }

    pub fn rin(mut self, group: &str) -> Self {
        self.rin = Some(group.to_string());
        self
    }

    pub fn rout(mut self, group: &str) -> Self {
        self.rout = Some(group.to_string());
        self
    }

    pub fn standard(mut self, species: &str) -> Self {
        self.standard = Some(species.to_string());
        self
    }

    pub fn output(mut self, prefix: &str) -> Self {
        self.output = Some(prefix.to_string());
        self
    }
}

/// Moles of `element` formed in the product species per row
fn element_formed(table: &Table, spec: &Selectivity) -> ReactabResult<ColumnValue> {
    if spec.feedstock.is_empty() || spec.product.is_empty() {
        return Err(ReactabError::Config(
            "feedstock and product must not be empty".to_string(),
        ));
    }
    let nu = f64::from(element_count(&spec.product, &spec.element)?);

    let has_frac = spec.xin.is_some() || spec.xout.is_some();
    let has_rate = spec.rin.is_some() || spec.rout.is_some();
    if has_frac && has_rate {
        return Err(ReactabError::Config(
            "supply either mole-fraction columns or molar-rate columns, not both".to_string(),
        ));
    }

    let net = if has_frac {
        let (in_name, inlet, out_name, outlet) = resolve_fraction(
            table,
            spec.xin.as_deref(),
            spec.xout.as_deref(),
            spec.standard.as_deref(),
            &spec.product,
        )?;
        if in_name == out_name {
            kernels::constant_like(&inlet, 0.0)
        } else {
            kernels::check_pair(&in_name, &inlet, &out_name, &outlet)?;
            kernels::net_rate(&inlet, &outlet)?
        }
    } else if has_rate {
        let pair = resolve_rate(table, spec.rin.as_deref(), spec.rout.as_deref(), &spec.product)?;
        pair.intermediates()?.0
    } else {
        return Err(ReactabError::Config("no input columns given".to_string()));
    };

    // net is consumption-signed; formation is its negation
    Ok(kernels::scale(&net, -nu))
}

fn reference_column(table: &Table, name: &str, what: &str) -> ReactabResult<ColumnValue> {
    table
        .column(name)
        .map(|col| col.values.clone())
        .ok_or_else(|| {
            ReactabError::Lookup(format!(
                "no {what} registered in column '{name}'; run a reactant-mode \
                 elemental conversion for the feedstock first"
            ))
        })
}

/// Selectivity of `product` for `element`: the fraction of converted element
/// that ends up in this product. Writes `"S_<element>-><product>"`.
pub fn selectivity<'t>(table: &'t mut Table, spec: &Selectivity) -> ReactabResult<&'t mut Table> {
    debug!(
        feedstock = %spec.feedstock,
        product = %spec.product,
        element = %spec.element,
        "computing selectivity"
    );

    let formed = element_formed(table, spec)?;
    let converted_name = group_key(&format!("n_{}", spec.element), &spec.feedstock);
    let converted = reference_column(table, &converted_name, "converted element amount")?;
    kernels::check_pair("formed", &formed, &converted_name, &converted)?;
    kernels::check_nonzero(&converted_name, &converted, "converted amount")?;
    let result = kernels::ratio(&formed, &converted)?;

    let prefix = spec
        .output
        .clone()
        .unwrap_or_else(|| format!("S_{}", spec.element));
    table.insert(&group_key(&prefix, &spec.product), result);
    Ok(table)
}

/// Yield of `product` for `element`, referenced to the feedstock's inlet
/// element content: conversion times selectivity. Writes
/// `"Y_<element>-><product>"`.
pub fn catalytic_yield<'t>(
    table: &'t mut Table,
    spec: &Selectivity,
) -> ReactabResult<&'t mut Table> {
    debug!(
        feedstock = %spec.feedstock,
        product = %spec.product,
        element = %spec.element,
        "computing yield"
    );

    let formed = element_formed(table, spec)?;
    let basis_name = format!("nin_{}", spec.element);
    let basis = reference_column(table, &basis_name, "reactant element basis")?;
    kernels::check_pair("formed", &formed, &basis_name, &basis)?;
    kernels::check_nonzero(&basis_name, &basis, "inlet")?;
    let result = kernels::ratio(&formed, &basis)?;

    let prefix = spec
        .output
        .clone()
        .unwrap_or_else(|| format!("Y_{}", spec.element));
    table.insert(&group_key(&prefix, &spec.product), result);
    Ok(table)
}
