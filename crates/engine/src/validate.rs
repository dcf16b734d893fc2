use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::enrich::{average_material_cost, PRICE_FRACTION};
use crate::model::{EnrichedRecord, OptionRecord};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-rule mismatch counts plus the null census. Validation only reports;
/// it never mutates or rejects data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub invalid_zero_costs: usize,
    pub invalid_exact_matches: usize,
    pub invalid_average_costs: usize,
    pub invalid_fallback_costs: usize,
    pub invalid_profits: usize,
    pub invalid_production_costs: usize,
    pub missing_values: BTreeMap<String, usize>,
}

impl ValidationSummary {
    /// True when any rule count is non-zero. The null census is
    /// informational and does not count as a finding.
    pub fn has_findings(&self) -> bool {
        self.invalid_zero_costs > 0
            || self.invalid_exact_matches > 0
            || self.invalid_average_costs > 0
            || self.invalid_fallback_costs > 0
            || self.invalid_profits > 0
            || self.invalid_production_costs > 0
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Re-derive the expected production cost per the same four tiers and
/// count non-conforming rows. The per-code averages are recomputed from
/// the options table independently of the enrichment pass.
///
/// Comparisons are exact: validation runs the same arithmetic as
/// enrichment, so conforming rows compare bit-equal. A row whose average
/// is undefined (null code, or code absent from the catalog) counts as
/// differing from it.
pub fn validate(enriched: &[EnrichedRecord], options: &[OptionRecord]) -> ValidationSummary {
    let _span = tracing::info_span!("validation").entered();
    let averages = average_material_cost(options);

    let mut summary = ValidationSummary::default();
    for row in enriched {
        let average = row
            .options_code
            .as_ref()
            .and_then(|code| averages.get(code))
            .copied();

        if row.sales_price <= 0.0 && row.production_cost != 0.0 {
            summary.invalid_zero_costs += 1;
        }

        if row.sales_price > 0.0 {
            if let Some(material) = row.material_cost {
                if row.production_cost != material {
                    summary.invalid_exact_matches += 1;
                }
            } else if average.map_or(true, |avg| row.production_cost != avg) {
                summary.invalid_average_costs += 1;
            }

            if row.options_code.is_none()
                && row.production_cost != row.sales_price * PRICE_FRACTION
            {
                summary.invalid_fallback_costs += 1;
            }
        }

        if row.profit != row.sales_price - row.production_cost {
            summary.invalid_profits += 1;
        }

        let zero_ok = row.sales_price <= 0.0 && row.production_cost == 0.0;
        let exact_ok = row.material_cost.is_some_and(|m| row.production_cost == m);
        let average_ok = average.is_some_and(|avg| row.production_cost == avg);
        let fraction_ok = row.production_cost == row.sales_price * PRICE_FRACTION;
        if !(zero_ok || exact_ok || average_ok || fraction_ok) {
            summary.invalid_production_costs += 1;
        }
    }

    summary.missing_values = null_census(enriched);

    warn!(count = summary.invalid_zero_costs, "invalid zero costs");
    warn!(count = summary.invalid_exact_matches, "invalid exact matches");
    warn!(count = summary.invalid_average_costs, "invalid average costs");
    warn!(count = summary.invalid_fallback_costs, "invalid fallback costs");
    warn!(count = summary.invalid_profits, "invalid profits");
    info!(
        count = summary.invalid_production_costs,
        "invalid production costs"
    );
    info!(missing = ?summary.missing_values, "missing value census");

    summary
}

/// Per-column null counts over the seven output columns. An empty VIN and
/// a NaN in a derived column both count as missing.
fn null_census(enriched: &[EnrichedRecord]) -> BTreeMap<String, usize> {
    let mut vin = 0;
    let mut code = 0;
    let mut model = 0;
    let mut price = 0;
    let mut material = 0;
    let mut cost = 0;
    let mut profit = 0;

    for row in enriched {
        if row.vin.is_empty() {
            vin += 1;
        }
        if row.options_code.is_none() {
            code += 1;
        }
        if row.model_text.is_none() {
            model += 1;
        }
        if row.sales_price.is_nan() {
            price += 1;
        }
        if row.material_cost.is_none() {
            material += 1;
        }
        if row.production_cost.is_nan() {
            cost += 1;
        }
        if row.profit.is_nan() {
            profit += 1;
        }
    }

    BTreeMap::from([
        ("VIN".to_string(), vin),
        ("Options_Code".to_string(), code),
        ("Model_Text".to_string(), model),
        ("Sales_Price".to_string(), price),
        ("Material_Cost".to_string(), material),
        ("production_cost".to_string(), cost),
        ("profit".to_string(), profit),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(
        vin: &str,
        code: Option<&str>,
        price: f64,
        material: Option<f64>,
        cost: f64,
        profit: f64,
    ) -> EnrichedRecord {
        EnrichedRecord {
            vin: vin.into(),
            options_code: code.map(Into::into),
            model_text: Some("ModelX".into()),
            sales_price: price,
            material_cost: material,
            production_cost: cost,
            profit,
        }
    }

    fn catalog(entries: &[(&str, f64)]) -> Vec<OptionRecord> {
        entries
            .iter()
            .map(|&(code, cost)| OptionRecord {
                option_code: code.into(),
                model: "ModelX".into(),
                material_cost: Some(cost),
            })
            .collect()
    }

    #[test]
    fn conforming_table_with_known_average_gaps() {
        // Five rows spanning all four tiers. Row 4 took the price fraction
        // though its code has an average, and row 5 has no code at all;
        // both land in the average-cost count, the second because an
        // undefined average never compares equal.
        let rows = vec![
            enriched("1", Some("A"), 100.0, Some(50.0), 50.0, 50.0),
            enriched("2", Some("B"), 200.0, Some(90.0), 90.0, 110.0),
            enriched("3", None, 0.0, None, 0.0, 0.0),
            enriched("4", Some("C"), 150.0, None, 67.5, 82.5),
            enriched("5", None, 50.0, None, 22.5, 27.5),
        ];
        let options = catalog(&[("A", 50.0), ("B", 90.0), ("C", 70.0)]);

        let summary = validate(&rows, &options);

        assert_eq!(summary.invalid_zero_costs, 0);
        assert_eq!(summary.invalid_exact_matches, 0);
        assert_eq!(summary.invalid_average_costs, 2);
        assert_eq!(summary.invalid_fallback_costs, 0);
        assert_eq!(summary.invalid_profits, 0);
        assert_eq!(summary.invalid_production_costs, 0);
        assert_eq!(summary.missing_values["Options_Code"], 2);
        assert_eq!(summary.missing_values["Material_Cost"], 3);
        assert_eq!(summary.missing_values["VIN"], 0);
        assert_eq!(summary.missing_values["production_cost"], 0);
    }

    #[test]
    fn zero_price_with_nonzero_cost_is_flagged() {
        let rows = vec![enriched("1", Some("A"), 0.0, Some(50.0), 50.0, -50.0)];
        let options = catalog(&[("A", 50.0)]);

        let summary = validate(&rows, &options);

        assert_eq!(summary.invalid_zero_costs, 1);
        // cost == material, so the overall check still passes.
        assert_eq!(summary.invalid_production_costs, 0);
        assert!(summary.has_findings());
    }

    #[test]
    fn exact_match_mismatch_is_flagged() {
        let rows = vec![enriched("1", Some("A"), 100.0, Some(50.0), 55.0, 45.0)];
        let options = catalog(&[("A", 50.0)]);

        let summary = validate(&rows, &options);

        assert_eq!(summary.invalid_exact_matches, 1);
        assert_eq!(summary.invalid_production_costs, 1);
    }

    #[test]
    fn fallback_mismatch_is_flagged() {
        let rows = vec![enriched("1", None, 100.0, None, 50.0, 50.0)];

        let summary = validate(&rows, &[]);

        assert_eq!(summary.invalid_fallback_costs, 1);
        assert_eq!(summary.invalid_average_costs, 1);
        assert_eq!(summary.invalid_production_costs, 1);
    }

    #[test]
    fn profit_mismatch_is_flagged() {
        let rows = vec![enriched("1", Some("A"), 100.0, Some(50.0), 50.0, 49.0)];
        let options = catalog(&[("A", 50.0)]);

        let summary = validate(&rows, &options);

        assert_eq!(summary.invalid_profits, 1);
        assert_eq!(summary.invalid_production_costs, 0);
    }

    #[test]
    fn empty_vin_counts_as_missing() {
        let rows = vec![enriched("", None, 10.0, None, 4.5, 5.5)];

        let summary = validate(&rows, &[]);

        assert_eq!(summary.missing_values["VIN"], 1);
    }

    #[test]
    fn no_findings_on_empty_table() {
        let summary = validate(&[], &[]);
        assert!(!summary.has_findings());
        assert_eq!(summary.missing_values["profit"], 0);
    }
}
