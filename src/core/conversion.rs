//! Feedstock conversion.
//!
//! `conversion` reads inlet/outlet columns for one feedstock from a table,
//! computes a conversion fraction column, and writes it (plus intermediate
//! accumulator columns) back into the same table. Columns follow the
//! `"group->species"` naming convention: `xin = "xin"` for feedstock `CH4`
//! reads `"xin->CH4"`.
//!
//! Not atomic: a data error (zero inlet, missing cached intermediate) can
//! surface after intermediate columns of the same call were already
//! written; configuration and resolution errors fail before any write.

use crate::core::kernels;
use crate::error::{ReactabError, ReactabResult};
use crate::formula::element_count;
use crate::types::{group_key, ColumnValue, Table};
use crate::units::Dimension;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Reaction role of the species the conversion is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Depletion of a feed species: `X = (in - out)/in`
    Reactant,
    /// Appearance in a product species: whole-molecule yield `out/in`, or
    /// elemental conversion against a registered reactant basis
    Product,
    /// Net signed conversion of a species that may be both consumed and
    /// produced; rate inputs only, cached intermediates substitute for a
    /// missing side
    Mixed,
}

impl Role {
    fn prefix(&self) -> &'static str {
        match self {
            Role::Reactant => "Xr",
            Role::Product => "Xp",
            Role::Mixed => "Xm",
        }
    }
}

/// Parameters of one conversion calculation.
///
/// Deserializable so that an external dispatcher can drive the calculator
/// from declarative job entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversion {
    /// Chemical formula or opaque alias of the tracked species
    pub feedstock: String,
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
    /// Element symbol restricting the basis to that element's molar content
    pub element: Option<String>,
    /// Explicit role; takes priority over `product`
    #[serde(rename = "type")]
    pub kind: Option<Role>,
    /// Role shorthand: `true` for product, `false` for reactant
    pub product: Option<bool>,
    /// Output column prefix; defaults to `Xr`/`Xp`/`Xm` plus `_<element>`
    pub output: Option<String>,
}

impl Conversion {
    pub fn new(feedstock: &str) -> Self {
        Self {
            feedstock: feedstock.to_string(),
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

    pub fn element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn kind(mut self, role: Role) -> Self {
        self.kind = Some(role);
        self
    }

    pub fn product(mut self, product: bool) -> Self {
        self.product = Some(product);
        self
    }

    pub fn output(mut self, prefix: &str) -> Self {
        self.output = Some(prefix.to_string());
        self
    }

    /// Role resolution: explicit `type`, else the `product` flag, else
    /// reactant.
    fn role(&self) -> Role {
        if let Some(kind) = self.kind {
            kind
        } else if let Some(product) = self.product {
            if product {
                Role::Product
            } else {
                Role::Reactant
            }
        } else {
            Role::Reactant
        }
    }
}

/// Compute a conversion column and write it into `table`.
///
/// Returns the mutated table reference for chaining. See the module docs
/// for the column naming convention and the non-atomicity caveat.
pub fn conversion<'t>(table: &'t mut Table, spec: &Conversion) -> ReactabResult<&'t mut Table> {
    if spec.feedstock.is_empty() {
        return Err(ReactabError::Config("feedstock must not be empty".to_string()));
    }

    let has_frac = spec.xin.is_some() || spec.xout.is_some();
    let has_rate = spec.rin.is_some() || spec.rout.is_some();
    if has_frac && has_rate {
        return Err(ReactabError::Config(
            "supply either mole-fraction columns or molar-rate columns, not both".to_string(),
        ));
    }
    if spec.standard.is_some() && !has_frac {
        return Err(ReactabError::Config(
            "standard normalization applies to fraction inputs only".to_string(),
        ));
    }

    let role = spec.role();
    let elemental = match &spec.element {
        Some(el) => Some((el.clone(), f64::from(element_count(&spec.feedstock, el)?))),
        None => None,
    };

    debug!(
        feedstock = %spec.feedstock,
        ?role,
        element = spec.element.as_deref(),
        "computing conversion"
    );

    match role {
        Role::Reactant => reactant(table, spec, has_frac, has_rate, &elemental),
        Role::Product => product(table, spec, has_frac, has_rate, &elemental),
        Role::Mixed => mixed(table, spec, &elemental),
    }?;

    Ok(table)
}

//==============================================================================
// Input resolution
//==============================================================================

fn fetch(table: &Table, group: &str, species: &str) -> Option<(String, ColumnValue)> {
    let name = group_key(group, species);
    table.column(&name).map(|col| (name, col.values.clone()))
}

fn require(table: &Table, group: &str, species: &str) -> ReactabResult<(String, ColumnValue)> {
    fetch(table, group, species).ok_or_else(|| {
        ReactabError::Lookup(format!("column '{}' not found", group_key(group, species)))
    })
}

fn check_dimension(name: &str, v: &ColumnValue, expected: Dimension) -> ReactabResult<()> {
    if let ColumnValue::Quantity(_, unit) = v {
        if unit.dimension() != expected {
            return Err(ReactabError::Config(format!(
                "column '{}' has unit '{}', expected {:?}",
                name,
                unit.symbol(),
                expected
            )));
        }
    }
    Ok(())
}

/// Inlet/outlet mole fractions, optionally normalized by the internal
/// standard of the same stream.
pub(crate) fn resolve_fraction(
    table: &Table,
    xin: Option<&str>,
    xout: Option<&str>,
    standard: Option<&str>,
    species: &str,
) -> ReactabResult<(String, ColumnValue, String, ColumnValue)> {
    let (xin_g, xout_g) = match (xin, xout) {
        (Some(i), Some(o)) => (i, o),
        _ => {
            return Err(ReactabError::Config(
                "fraction mode requires both xin and xout".to_string(),
            ))
        }
    };

    let (in_name, mut inlet) = require(table, xin_g, species)?;
    let (out_name, mut outlet) = require(table, xout_g, species)?;
    check_dimension(&in_name, &inlet, Dimension::Dimensionless)?;
    check_dimension(&out_name, &outlet, Dimension::Dimensionless)?;

    if let Some(standard) = standard {
        let (sin_name, sin) = require(table, xin_g, standard)?;
        let (sout_name, sout) = require(table, xout_g, standard)?;
        kernels::check_pair(&in_name, &inlet, &sin_name, &sin)?;
        kernels::check_pair(&out_name, &outlet, &sout_name, &sout)?;
        kernels::check_nonzero(&sin_name, &sin, "internal standard")?;
        kernels::check_nonzero(&sout_name, &sout, "internal standard")?;
        inlet = kernels::ratio(&inlet, &sin)?;
        outlet = kernels::ratio(&outlet, &sout)?;
        trace!(standard, "normalized fractions by internal standard");
    }

    Ok((in_name, inlet, out_name, outlet))
}

/// Resolved molar-rate inputs. A missing side falls back to the cached
/// net-rate intermediate from an earlier call on the same table.
pub(crate) enum RatePair {
    Fresh {
        in_name: String,
        inlet: ColumnValue,
        out_name: String,
        outlet: ColumnValue,
    },
    /// fresh inlet, cached net rate: `X = net/in` (correlated)
    NetOverIn { inlet: ColumnValue, net: ColumnValue },
    /// fresh outlet, cached net rate: inlet reconstructed as `out + net`
    NetOverSum { outlet: ColumnValue, net: ColumnValue },
}

pub(crate) fn resolve_rate(
    table: &Table,
    rin: Option<&str>,
    rout: Option<&str>,
    species: &str,
) -> ReactabResult<RatePair> {
    let fresh_in = rin.and_then(|g| fetch(table, g, species));
    let fresh_out = rout.and_then(|g| fetch(table, g, species));

    let inlet = match fresh_in {
        Some(found) => Some(found),
        None => {
            let cached = fetch(table, "nin", species);
            if cached.is_some() {
                trace!(species, "using cached inlet rate column");
            }
            cached
        }
    };
    let net = fetch(table, "n", species);

    for (name, col) in inlet.iter().chain(fresh_out.iter()) {
        check_dimension(name, col, Dimension::MolarFlow)?;
    }

    match (inlet, fresh_out, net) {
        (Some((in_name, inlet)), Some((out_name, outlet)), _) => Ok(RatePair::Fresh {
            in_name,
            inlet,
            out_name,
            outlet,
        }),
        (Some((_, inlet)), None, Some((_, net))) => {
            trace!(species, "substituting cached net rate for missing outlet");
            Ok(RatePair::NetOverIn { inlet, net })
        }
        (None, Some((_, outlet)), Some((_, net))) => {
            trace!(species, "reconstructing inlet from cached net rate");
            Ok(RatePair::NetOverSum { outlet, net })
        }
        (None, _, _) => Err(ReactabError::Lookup(format!(
            "no inlet data available for feedstock '{species}'"
        ))),
        (Some(_), None, None) => Err(ReactabError::Lookup(format!(
            "no outlet data available for feedstock '{species}'"
        ))),
    }
}

impl RatePair {
    /// Depletion fraction `(in - out)/in` with exact correlation handling
    pub(crate) fn depletion(&self) -> ReactabResult<ColumnValue> {
        match self {
            RatePair::Fresh {
                in_name,
                inlet,
                out_name,
                outlet,
            } => depletion_pair(in_name, inlet, out_name, outlet),
            RatePair::NetOverIn { inlet, net } => {
                kernels::check_pair("n", net, "nin", inlet)?;
                kernels::check_nonzero("nin", inlet, "inlet")?;
                kernels::ratio_correlated(net, inlet)
            }
            RatePair::NetOverSum { outlet, net } => {
                kernels::check_pair("n", net, "nout", outlet)?;
                let inlet = kernels::sum(outlet, net)?;
                kernels::check_nonzero("nin", &inlet, "inlet")?;
                kernels::ratio_over_sum(net, outlet)
            }
        }
    }

    /// `(net, inlet)` for the accumulator columns
    pub(crate) fn intermediates(&self) -> ReactabResult<(ColumnValue, ColumnValue)> {
        match self {
            RatePair::Fresh {
                in_name,
                inlet,
                out_name,
                outlet,
            } => {
                kernels::check_pair(in_name, inlet, out_name, outlet)?;
                Ok((kernels::net_rate(inlet, outlet)?, inlet.clone()))
            }
            RatePair::NetOverIn { inlet, net } => {
                kernels::check_pair("n", net, "nin", inlet)?;
                Ok((net.clone(), inlet.clone()))
            }
            RatePair::NetOverSum { outlet, net } => {
                kernels::check_pair("n", net, "nout", outlet)?;
                Ok((net.clone(), kernels::sum(outlet, net)?))
            }
        }
    }
}

pub(crate) fn depletion_pair(
    in_name: &str,
    inlet: &ColumnValue,
    out_name: &str,
    outlet: &ColumnValue,
) -> ReactabResult<ColumnValue> {
    if in_name == out_name {
        // literally the same stored variable; fully correlated
        return Ok(kernels::constant_like(inlet, 0.0));
    }
    kernels::check_pair(in_name, inlet, out_name, outlet)?;
    kernels::check_nonzero(in_name, inlet, "inlet")?;
    kernels::depletion(inlet, outlet)
}

//==============================================================================
// Roles
//==============================================================================

fn output_name(spec: &Conversion, role: Role) -> String {
    let prefix = match (&spec.output, &spec.element) {
        (Some(output), _) => output.clone(),
        (None, Some(el)) => format!("{}_{el}", role.prefix()),
        (None, None) => role.prefix().to_string(),
    };
    group_key(&prefix, &spec.feedstock)
}

fn write_rate_cache(
    table: &mut Table,
    species: &str,
    net: &ColumnValue,
    inlet: &ColumnValue,
    elemental: &Option<(String, f64)>,
) {
    table.insert(&group_key("n", species), net.clone());
    table.insert(&group_key("nin", species), inlet.clone());
    if let Some((el, nu)) = elemental {
        table.insert(&group_key(&format!("n_{el}"), species), kernels::scale(net, *nu));
    }
    trace!(species, "updated net-rate accumulator columns");
}

fn register_element_basis(
    table: &mut Table,
    species: &str,
    inlet: &ColumnValue,
    el: &str,
    nu: f64,
) {
    table.insert(&format!("nin_{el}"), kernels::scale(inlet, nu));
    trace!(species, element = el, "registered reactant element basis");
}

fn reactant(
    table: &mut Table,
    spec: &Conversion,
    has_frac: bool,
    has_rate: bool,
    elemental: &Option<(String, f64)>,
) -> ReactabResult<()> {
    let feedstock = &spec.feedstock;
    let result = if has_frac {
        let (in_name, inlet, out_name, outlet) = resolve_fraction(
            table,
            spec.xin.as_deref(),
            spec.xout.as_deref(),
            spec.standard.as_deref(),
            feedstock,
        )?;
        let dep = depletion_pair(&in_name, &inlet, &out_name, &outlet)?;
        if let Some((el, nu)) = elemental {
            let net = if in_name == out_name {
                kernels::constant_like(&inlet, 0.0)
            } else {
                kernels::net_rate(&inlet, &outlet)?
            };
            table.insert(&group_key(&format!("n_{el}"), feedstock), kernels::scale(&net, *nu));
            register_element_basis(table, feedstock, &inlet, el, *nu);
        }
        dep
    } else if has_rate {
        let pair = resolve_rate(table, spec.rin.as_deref(), spec.rout.as_deref(), feedstock)?;
        let dep = pair.depletion()?;
        let (net, inlet) = pair.intermediates()?;
        write_rate_cache(table, feedstock, &net, &inlet, elemental);
        if let Some((el, nu)) = elemental {
            register_element_basis(table, feedstock, &inlet, el, *nu);
        }
        dep
    } else {
        return Err(ReactabError::Config("no input columns given".to_string()));
    };

    table.insert(&output_name(spec, Role::Reactant), result);
    Ok(())
}

fn product(
    table: &mut Table,
    spec: &Conversion,
    has_frac: bool,
    has_rate: bool,
    elemental: &Option<(String, f64)>,
) -> ReactabResult<()> {
    let feedstock = &spec.feedstock;

    // net rate of the product species; the zero-inlet rule applies only to
    // the whole-molecule basis, since products commonly have zero inlet
    let (net, dep) = if has_frac {
        let (in_name, inlet, out_name, outlet) = resolve_fraction(
            table,
            spec.xin.as_deref(),
            spec.xout.as_deref(),
            spec.standard.as_deref(),
            feedstock,
        )?;
        let net = if in_name == out_name {
            kernels::constant_like(&inlet, 0.0)
        } else {
            kernels::check_pair(&in_name, &inlet, &out_name, &outlet)?;
            kernels::net_rate(&inlet, &outlet)?
        };
        let dep = if elemental.is_none() {
            Some(depletion_pair(&in_name, &inlet, &out_name, &outlet)?)
        } else {
            None
        };
        (net, dep)
    } else if has_rate {
        let pair = resolve_rate(table, spec.rin.as_deref(), spec.rout.as_deref(), feedstock)?;
        let dep = if elemental.is_none() {
            Some(pair.depletion()?)
        } else {
            None
        };
        let (net, inlet) = pair.intermediates()?;
        write_rate_cache(table, feedstock, &net, &inlet, elemental);
        (net, dep)
    } else {
        return Err(ReactabError::Config("no input columns given".to_string()));
    };

    let result = match (elemental, dep) {
        (Some((el, nu)), _) => {
            // moles of element formed, against the registered reactant basis
            let basis_name = format!("nin_{el}");
            let basis = table
                .column(&basis_name)
                .map(|col| col.values.clone())
                .ok_or_else(|| {
                    ReactabError::Lookup(format!(
                        "no reactant basis registered for element '{el}'"
                    ))
                })?;
            let formed = kernels::scale(&net, -*nu);
            kernels::check_pair("formed", &formed, &basis_name, &basis)?;
            kernels::check_nonzero(&basis_name, &basis, "inlet")?;
            kernels::ratio(&formed, &basis)?
        }
        // whole-molecule yield out/in; shares the zero-inlet rule
        (None, Some(dep)) => kernels::one_minus(&dep),
        (None, None) => unreachable!("depletion computed for whole-molecule basis"),
    };

    table.insert(&output_name(spec, Role::Product), result);
    Ok(())
}

fn mixed(
    table: &mut Table,
    spec: &Conversion,
    elemental: &Option<(String, f64)>,
) -> ReactabResult<()> {
    let feedstock = &spec.feedstock;

    // mixed conversion is rate-based; fraction inputs contribute nothing,
    // but cached intermediates from an earlier rate-mode call still apply
    let pair = resolve_rate(table, spec.rin.as_deref(), spec.rout.as_deref(), feedstock)?;
    let dep = pair.depletion()?;
    let (net, inlet) = pair.intermediates()?;
    write_rate_cache(table, feedstock, &net, &inlet, elemental);

    table.insert(&output_name(spec, Role::Mixed), dep);
    Ok(())
}
