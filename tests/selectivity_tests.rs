//! Selectivity and yield tests

use approx::assert_relative_eq;
use reactab::{
    catalytic_yield, conversion, selectivity, ColumnValue, Conversion, ReactabError, Selectivity,
    Table,
};

fn floats(table: &Table, name: &str) -> Vec<f64> {
    match &table.column(name).unwrap_or_else(|| panic!("missing column '{name}'")).values {
        ColumnValue::Float(v) => v.clone(),
        other => panic!("column '{name}' is {}, expected Float", other.family_name()),
    }
}

/// CH4 partial oxidation, carbon balanced: 100 mol/s of carbon converted,
/// 60 into CO2 and 40 into C2H6 (20 mol/s of molecules, two carbons each).
fn oxidation_table() -> Table {
    let mut table = Table::new();
    table.insert("nin->CH4", ColumnValue::Float(vec![1000.0]));
    table.insert("nout->CH4", ColumnValue::Float(vec![900.0]));
    table.insert("nin->CO2", ColumnValue::Float(vec![0.0]));
    table.insert("nout->CO2", ColumnValue::Float(vec![60.0]));
    table.insert("nin->C2H6", ColumnValue::Float(vec![0.0]));
    table.insert("nout->C2H6", ColumnValue::Float(vec![20.0]));
    table
}

fn register_feedstock(table: &mut Table) {
    let spec = Conversion::new("CH4").rin("nin").rout("nout").element("C");
    conversion(table, &spec).unwrap();
}

#[test]
fn test_carbon_selectivities_sum_to_one() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);

    let spec = Selectivity::new("CH4", "CO2", "C").rin("nin").rout("nout");
    selectivity(&mut table, &spec).unwrap();
    let spec = Selectivity::new("CH4", "C2H6", "C").rin("nin").rout("nout");
    selectivity(&mut table, &spec).unwrap();

    let s_co2 = floats(&table, "S_C->CO2");
    let s_c2h6 = floats(&table, "S_C->C2H6");
    assert_relative_eq!(s_co2[0], 0.6, max_relative = 1e-12);
    assert_relative_eq!(s_c2h6[0], 0.4, max_relative = 1e-12);
    assert_relative_eq!(s_co2[0] + s_c2h6[0], 1.0, max_relative = 1e-12);
}

#[test]
fn test_yield_is_conversion_times_selectivity() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);

    let spec = Selectivity::new("CH4", "CO2", "C").rin("nin").rout("nout");
    catalytic_yield(&mut table, &spec).unwrap();

    // X = 0.1, S = 0.6
    let y = floats(&table, "Y_C->CO2");
    assert_relative_eq!(y[0], 0.06, max_relative = 1e-12);
}

#[test]
fn test_fraction_mode_agrees_with_rate_mode() {
    // the same experiment as mole fractions at constant total flow 10000
    let mut table = Table::new();
    table.insert("xin->CH4", ColumnValue::Float(vec![0.1]));
    table.insert("xout->CH4", ColumnValue::Float(vec![0.09]));
    table.insert("xin->CO2", ColumnValue::Float(vec![0.0]));
    table.insert("xout->CO2", ColumnValue::Float(vec![0.006]));

    let spec = Conversion::new("CH4").xin("xin").xout("xout").element("C");
    conversion(&mut table, &spec).unwrap();
    let spec = Selectivity::new("CH4", "CO2", "C").xin("xin").xout("xout");
    selectivity(&mut table, &spec).unwrap();
    catalytic_yield(&mut table, &spec).unwrap();

    assert_relative_eq!(floats(&table, "S_C->CO2")[0], 0.6, max_relative = 1e-12);
    assert_relative_eq!(floats(&table, "Y_C->CO2")[0], 0.06, max_relative = 1e-12);
}

#[test]
fn test_output_prefix_override() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);

    let spec = Selectivity::new("CH4", "CO2", "C")
        .rin("nin")
        .rout("nout")
        .output("Sel");
    selectivity(&mut table, &spec).unwrap();
    assert!(table.contains("Sel->CO2"));
    assert!(!table.contains("S_C->CO2"));
}

#[test]
fn test_missing_feedstock_registration_is_lookup_error() {
    let mut table = oxidation_table();
    let spec = Selectivity::new("CH4", "CO2", "C").rin("nin").rout("nout");
    let err = selectivity(&mut table, &spec).unwrap_err();
    match err {
        ReactabError::Lookup(msg) => {
            assert!(msg.contains("run a reactant-mode"), "{msg}")
        }
        other => panic!("expected Lookup error, got {other}"),
    }
}

#[test]
fn test_yield_requires_registered_element_basis() {
    let mut table = oxidation_table();
    let spec = Selectivity::new("CH4", "CO2", "C").rin("nin").rout("nout");
    let err = catalytic_yield(&mut table, &spec).unwrap_err();
    assert!(matches!(err, ReactabError::Lookup(_)), "{err}");
}

#[test]
fn test_product_alias_is_resolution_error() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);
    let spec = Selectivity::new("CH4", "carbon dioxide", "C").rin("nin").rout("nout");
    let err = selectivity(&mut table, &spec).unwrap_err();
    assert!(matches!(err, ReactabError::Resolution(_)), "{err}");
}

#[test]
fn test_fraction_and_rate_inputs_together_is_config_error() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);
    let spec = Selectivity::new("CH4", "CO2", "C")
        .rin("nin")
        .rout("nout")
        .xin("xin")
        .xout("xout");
    let err = selectivity(&mut table, &spec).unwrap_err();
    assert!(matches!(err, ReactabError::Config(_)), "{err}");
}

#[test]
fn test_empty_product_is_config_error() {
    let mut table = oxidation_table();
    register_feedstock(&mut table);
    let spec = Selectivity::new("CH4", "", "C").rin("nin").rout("nout");
    let err = selectivity(&mut table, &spec).unwrap_err();
    assert!(matches!(err, ReactabError::Config(_)), "{err}");
}
