//! Vectorized per-family arithmetic kernels.
//!
//! Every kernel dispatches once on the column family (plain float,
//! unit-bearing, uncertainty-bearing) and then runs a tight loop over the
//! rows. Mixing families between the two operands of one call is a config
//! error; unit-bearing operands are converted to the left operand's unit
//! before the loop.
//!
//! Uncertainty propagation is first-order. The depletion kernel
//! `(in - out)/in` propagates analytically so the shared inlet appears as
//! one variable, and the cache-reuse kernels carry the covariance between
//! the stored net rate and the fresh operand. Both reproduce the standard
//! deviation of the fully fresh computation.

use crate::error::{ReactabError, ReactabResult};
use crate::measure::Measure;
use crate::types::ColumnValue;
use crate::units::Unit;

/// Family and length compatibility for a two-operand kernel
pub(crate) fn check_pair(
    a_name: &str,
    a: &ColumnValue,
    b_name: &str,
    b: &ColumnValue,
) -> ReactabResult<()> {
    if std::mem::discriminant(a) != std::mem::discriminant(b) {
        return Err(ReactabError::Config(format!(
            "mixed element types: column '{}' is {} but column '{}' is {}",
            a_name,
            a.family_name(),
            b_name,
            b.family_name()
        )));
    }
    if a.len() != b.len() {
        return Err(ReactabError::Config(format!(
            "column '{}' has {} rows but column '{}' has {}",
            a_name,
            a.len(),
            b_name,
            b.len()
        )));
    }
    Ok(())
}

/// Conversion is undefined for a zero denominator; fail before writing.
pub(crate) fn check_nonzero(name: &str, v: &ColumnValue, what: &str) -> ReactabResult<()> {
    if v.nominal().iter().any(|&x| x == 0.0) {
        return Err(ReactabError::Value(format!("zero {what} in column '{name}'")));
    }
    Ok(())
}

fn unit_factor(from: &Unit, to: &Unit) -> ReactabResult<f64> {
    from.factor_to(to).ok_or_else(|| {
        ReactabError::Config(format!(
            "incompatible units: '{}' cannot be converted to '{}'",
            from.symbol(),
            to.symbol()
        ))
    })
}

/// A column of one constant value, matching the family of `like`
pub(crate) fn constant_like(like: &ColumnValue, value: f64) -> ColumnValue {
    match like {
        ColumnValue::Float(v) => ColumnValue::Float(vec![value; v.len()]),
        ColumnValue::Quantity(v, _) => {
            ColumnValue::Quantity(vec![value; v.len()], Unit::dimensionless())
        }
        ColumnValue::Uncertain(v) => {
            ColumnValue::Uncertain(vec![Measure::exact(value); v.len()])
        }
    }
}

/// Depletion fraction `(in - out)/in`, dimensionless.
///
/// The inlet is a single variable shared between numerator and denominator:
/// `sigma^2 = (out*s_in/in^2)^2 + (s_out/in)^2`.
pub(crate) fn depletion(inlet: &ColumnValue, outlet: &ColumnValue) -> ReactabResult<ColumnValue> {
    Ok(match (inlet, outlet) {
        (ColumnValue::Float(a), ColumnValue::Float(b)) => {
            ColumnValue::Float(a.iter().zip(b).map(|(x, y)| (x - y) / x).collect())
        }
        (ColumnValue::Quantity(a, ua), ColumnValue::Quantity(b, ub)) => {
            let f = unit_factor(ub, ua)?;
            ColumnValue::Quantity(
                a.iter().zip(b).map(|(x, y)| (x - y * f) / x).collect(),
                Unit::dimensionless(),
            )
        }
        (ColumnValue::Uncertain(a), ColumnValue::Uncertain(b)) => ColumnValue::Uncertain(
            a.iter()
                .zip(b)
                .map(|(x, y)| {
                    Measure::new(
                        (x.value - y.value) / x.value,
                        (y.value * x.stddev / (x.value * x.value)).hypot(y.stddev / x.value),
                    )
                })
                .collect(),
        ),
        _ => unreachable!("family checked by caller"),
    })
}

/// Signed net rate `in - out`, keeping the inlet's unit
pub(crate) fn net_rate(inlet: &ColumnValue, outlet: &ColumnValue) -> ReactabResult<ColumnValue> {
    Ok(match (inlet, outlet) {
        (ColumnValue::Float(a), ColumnValue::Float(b)) => {
            ColumnValue::Float(a.iter().zip(b).map(|(x, y)| x - y).collect())
        }
        (ColumnValue::Quantity(a, ua), ColumnValue::Quantity(b, ub)) => {
            let f = unit_factor(ub, ua)?;
            ColumnValue::Quantity(a.iter().zip(b).map(|(x, y)| x - y * f).collect(), ua.clone())
        }
        (ColumnValue::Uncertain(a), ColumnValue::Uncertain(b)) => {
            ColumnValue::Uncertain(a.iter().zip(b).map(|(x, y)| *x - *y).collect())
        }
        _ => unreachable!("family checked by caller"),
    })
}

/// Elementwise sum, keeping the left operand's unit
pub(crate) fn sum(a: &ColumnValue, b: &ColumnValue) -> ReactabResult<ColumnValue> {
    Ok(match (a, b) {
        (ColumnValue::Float(a), ColumnValue::Float(b)) => {
            ColumnValue::Float(a.iter().zip(b).map(|(x, y)| x + y).collect())
        }
        (ColumnValue::Quantity(a, ua), ColumnValue::Quantity(b, ub)) => {
            let f = unit_factor(ub, ua)?;
            ColumnValue::Quantity(a.iter().zip(b).map(|(x, y)| x + y * f).collect(), ua.clone())
        }
        (ColumnValue::Uncertain(a), ColumnValue::Uncertain(b)) => {
            ColumnValue::Uncertain(a.iter().zip(b).map(|(x, y)| *x + *y).collect())
        }
        _ => unreachable!("family checked by caller"),
    })
}

/// Multiply by an exact scalar (stoichiometric counts), unit unchanged
pub(crate) fn scale(v: &ColumnValue, k: f64) -> ColumnValue {
    match v {
        ColumnValue::Float(a) => ColumnValue::Float(a.iter().map(|x| x * k).collect()),
        ColumnValue::Quantity(a, u) => {
            ColumnValue::Quantity(a.iter().map(|x| x * k).collect(), u.clone())
        }
        ColumnValue::Uncertain(a) => {
            ColumnValue::Uncertain(a.iter().map(|m| m.scale(k)).collect())
        }
    }
}

/// `1 - v` for a dimensionless column
pub(crate) fn one_minus(v: &ColumnValue) -> ColumnValue {
    match v {
        ColumnValue::Float(a) => ColumnValue::Float(a.iter().map(|x| 1.0 - x).collect()),
        ColumnValue::Quantity(a, _) => ColumnValue::Quantity(
            a.iter().map(|x| 1.0 - x).collect(),
            Unit::dimensionless(),
        ),
        ColumnValue::Uncertain(a) => ColumnValue::Uncertain(
            a.iter()
                .map(|m| Measure::new(1.0 - m.value, m.stddev))
                .collect(),
        ),
    }
}

/// Independent ratio `num/den`, dimensionless
pub(crate) fn ratio(num: &ColumnValue, den: &ColumnValue) -> ReactabResult<ColumnValue> {
    Ok(match (num, den) {
        (ColumnValue::Float(a), ColumnValue::Float(b)) => {
            ColumnValue::Float(a.iter().zip(b).map(|(x, y)| x / y).collect())
        }
        (ColumnValue::Quantity(a, ua), ColumnValue::Quantity(b, ub)) => {
            let f = unit_factor(ua, ub)?;
            ColumnValue::Quantity(
                a.iter().zip(b).map(|(x, y)| x * f / y).collect(),
                Unit::dimensionless(),
            )
        }
        (ColumnValue::Uncertain(a), ColumnValue::Uncertain(b)) => {
            ColumnValue::Uncertain(a.iter().zip(b).map(|(x, y)| *x / *y).collect())
        }
        _ => unreachable!("family checked by caller"),
    })
}

/// Ratio of a cached net rate over a fresh inlet, `net/in`, where
/// `net = in - out` was derived from the same inlet variable:
/// `cov(net, in) = s_in^2`. Reproduces the fresh-path standard deviation.
pub(crate) fn ratio_correlated(
    net: &ColumnValue,
    inlet: &ColumnValue,
) -> ReactabResult<ColumnValue> {
    Ok(match (net, inlet) {
        (ColumnValue::Uncertain(n), ColumnValue::Uncertain(a)) => ColumnValue::Uncertain(
            n.iter()
                .zip(a)
                .map(|(d, x)| {
                    let value = d.value / x.value;
                    let a2 = x.value * x.value;
                    let var = d.stddev * d.stddev / a2
                        + d.value * d.value * x.stddev * x.stddev / (a2 * a2)
                        - 2.0 * d.value * x.stddev * x.stddev / (a2 * x.value);
                    Measure::new(value, var.max(0.0).sqrt())
                })
                .collect(),
        ),
        _ => ratio(net, inlet)?,
    })
}

/// Ratio of a cached net rate over a reconstructed inlet, `net/(out + net)`,
/// where `net = in - out` was derived from the same outlet variable:
/// `cov(net, out) = -s_out^2`. Reproduces the fresh-path standard deviation.
pub(crate) fn ratio_over_sum(
    net: &ColumnValue,
    outlet: &ColumnValue,
) -> ReactabResult<ColumnValue> {
    Ok(match (net, outlet) {
        (ColumnValue::Uncertain(n), ColumnValue::Uncertain(b)) => ColumnValue::Uncertain(
            n.iter()
                .zip(b)
                .map(|(d, y)| {
                    let a = y.value + d.value;
                    let a2 = a * a;
                    let var = (y.value * d.stddev) * (y.value * d.stddev)
                        + (d.value * y.stddev) * (d.value * y.stddev)
                        + 2.0 * y.value * d.value * y.stddev * y.stddev;
                    Measure::new(d.value / a, var.max(0.0).sqrt() / a2)
                })
                .collect(),
        ),
        _ => {
            let inlet = sum(outlet, net)?;
            ratio(net, &inlet)?
        }
    })
}
