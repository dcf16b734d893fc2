use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::config::DuplicatePolicy;
use crate::error::EngineError;
use crate::model::{BaseRecord, EnrichedRecord, OptionRecord};

/// Fraction of the sales price used as production cost when no catalog
/// match of any kind exists.
pub const PRICE_FRACTION: f64 = 0.45;

// ---------------------------------------------------------------------------
// Option catalog index
// ---------------------------------------------------------------------------

/// Exact-match and per-code-average lookups over the options table.
struct OptionIndex {
    exact: BTreeMap<(String, String), Vec<Option<f64>>>,
    avg_by_code: HashMap<String, f64>,
}

impl OptionIndex {
    fn build(options: &[OptionRecord], policy: DuplicatePolicy) -> Result<Self, EngineError> {
        let mut exact: BTreeMap<(String, String), Vec<Option<f64>>> = BTreeMap::new();
        for opt in options {
            exact
                .entry((opt.option_code.clone(), opt.model.clone()))
                .or_default()
                .push(opt.material_cost);
        }

        if policy == DuplicatePolicy::Error {
            // First duplicate key in (code, model) order.
            if let Some(((code, model), costs)) = exact.iter().find(|(_, costs)| costs.len() > 1) {
                return Err(EngineError::DuplicateOptionKey {
                    option_code: code.clone(),
                    model: model.clone(),
                    count: costs.len(),
                });
            }
        }

        Ok(Self {
            exact,
            avg_by_code: average_material_cost(options),
        })
    }

    /// Material costs of the catalog rows matching (code, model) exactly.
    /// `None` when either key half is null or no row matches.
    fn exact_matches(&self, record: &BaseRecord) -> Option<&[Option<f64>]> {
        match (&record.options_code, &record.model_text) {
            (Some(code), Some(model)) => self
                .exact
                .get(&(code.clone(), model.clone()))
                .map(|costs| costs.as_slice()),
            _ => None,
        }
    }

    fn average(&self, record: &BaseRecord) -> Option<f64> {
        record
            .options_code
            .as_ref()
            .and_then(|code| self.avg_by_code.get(code))
            .copied()
    }
}

/// Mean material cost per option code across the whole options table,
/// nulls excluded. Codes carrying only null costs have no average.
pub(crate) fn average_material_cost(options: &[OptionRecord]) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for opt in options {
        if let Some(cost) = opt.material_cost {
            let entry = sums.entry(opt.option_code.clone()).or_insert((0.0, 0));
            entry.0 += cost;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(code, (sum, count))| (code, sum / count as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Derive `production_cost` and `profit` for every base record.
///
/// One output row per base row, in input order — except under the
/// `Fanout` policy, where a record whose (code, model) key matches several
/// catalog rows yields one row per match, in catalog order.
pub fn enrich(
    base: &[BaseRecord],
    options: &[OptionRecord],
    policy: DuplicatePolicy,
) -> Result<Vec<EnrichedRecord>, EngineError> {
    let _span = tracing::info_span!("enrichment").entered();
    let index = OptionIndex::build(options, policy)?;

    let mut out = Vec::with_capacity(base.len());
    for record in base {
        let matches: &[Option<f64>] = index.exact_matches(record).unwrap_or(&[None]);
        for &material_cost in matches {
            let production_cost = derive_cost(record, material_cost, &index);
            out.push(EnrichedRecord {
                vin: record.vin.clone(),
                options_code: record.options_code.clone(),
                model_text: record.model_text.clone(),
                sales_price: record.sales_price,
                material_cost,
                production_cost,
                profit: record.sales_price - production_cost,
            });
        }
    }

    info!(
        base_rows = base.len(),
        enriched_rows = out.len(),
        "data enrichment complete"
    );
    Ok(out)
}

/// The four-tier fallback, in fixed priority order. The zero-price rule
/// wins even when an exact match exists; a matched row with a null cost
/// falls through to the per-code average.
fn derive_cost(record: &BaseRecord, material_cost: Option<f64>, index: &OptionIndex) -> f64 {
    if record.sales_price <= 0.0 {
        debug!(vin = %record.vin, "zero-price rule, production cost 0");
        return 0.0;
    }
    if let Some(cost) = material_cost {
        debug!(vin = %record.vin, cost, "exact catalog match");
        return cost;
    }
    if let Some(avg) = index.average(record) {
        debug!(vin = %record.vin, avg, "average material cost fallback");
        return avg;
    }
    debug!(vin = %record.vin, "price-fraction fallback");
    record.sales_price * PRICE_FRACTION
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base(vin: &str, code: Option<&str>, model: Option<&str>, price: f64) -> BaseRecord {
        BaseRecord {
            vin: vin.into(),
            options_code: code.map(Into::into),
            model_text: model.map(Into::into),
            sales_price: price,
        }
    }

    fn opt(code: &str, model: &str, cost: f64) -> OptionRecord {
        OptionRecord {
            option_code: code.into(),
            model: model.into(),
            material_cost: Some(cost),
        }
    }

    #[test]
    fn exact_match_assigns_material_cost() {
        let rows = enrich(
            &[
                base("1", Some("A"), Some("ModelX"), 100.0),
                base("2", Some("B"), Some("ModelY"), 200.0),
            ],
            &[opt("A", "ModelX", 50.0), opt("B", "ModelY", 80.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 50.0);
        assert_eq!(rows[0].material_cost, Some(50.0));
        assert_eq!(rows[0].profit, 50.0);
        assert_eq!(rows[1].production_cost, 80.0);
        assert_eq!(rows[1].profit, 120.0);
    }

    #[test]
    fn average_fallback_when_model_differs() {
        // Code C exists only for another model; the per-code average applies.
        let rows = enrich(
            &[base("1", Some("C"), Some("ModelZ"), 150.0)],
            &[opt("C", "ModelQ", 70.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 70.0);
        assert_eq!(rows[0].material_cost, None);
        assert_eq!(rows[0].profit, 80.0);
    }

    #[test]
    fn average_spans_all_models_of_a_code() {
        let rows = enrich(
            &[base("1", Some("C"), Some("ModelZ"), 100.0)],
            &[opt("C", "ModelQ", 60.0), opt("C", "ModelR", 80.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 70.0);
    }

    #[test]
    fn zero_price_wins_over_exact_match() {
        let rows = enrich(
            &[base("1", Some("A"), Some("ModelX"), 0.0)],
            &[opt("A", "ModelX", 50.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 0.0);
        assert_eq!(rows[0].profit, 0.0);
        // The join still ran: the matched cost is retained in the column.
        assert_eq!(rows[0].material_cost, Some(50.0));
    }

    #[test]
    fn negative_price_also_zeroes_cost() {
        let rows = enrich(
            &[base("1", None, None, -500.0)],
            &[],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 0.0);
        assert_eq!(rows[0].profit, -500.0);
    }

    #[test]
    fn price_fraction_when_code_unknown() {
        let rows = enrich(
            &[base("1", Some("X"), Some("ModelY"), 100.0)],
            &[opt("A", "ModelX", 50.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 45.0);
        assert_eq!(rows[0].material_cost, None);
        assert_eq!(rows[0].profit, 55.0);
    }

    #[test]
    fn price_fraction_when_code_null() {
        let rows = enrich(
            &[base("1", None, Some("ModelY"), 250.0)],
            &[opt("A", "ModelX", 50.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].production_cost, 112.5);
        assert_eq!(rows[0].profit, 137.5);
    }

    #[test]
    fn exact_and_fraction_mix_preserves_order() {
        let rows = enrich(
            &[
                base("1", Some("C"), Some("ModelZ"), 150.0),
                base("2", Some("D"), Some("ModelW"), 250.0),
            ],
            &[opt("C", "ModelZ", 70.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        assert_eq!(rows[0].vin, "1");
        assert_eq!(rows[0].production_cost, 70.0);
        assert_eq!(rows[1].vin, "2");
        assert_eq!(rows[1].production_cost, 112.5);
    }

    #[test]
    fn null_material_cost_falls_through_to_average() {
        let options = vec![
            OptionRecord {
                option_code: "A".into(),
                model: "ModelX".into(),
                material_cost: None,
            },
            opt("A", "ModelY", 60.0),
        ];
        let rows = enrich(
            &[base("1", Some("A"), Some("ModelX"), 100.0)],
            &options,
            DuplicatePolicy::Error,
        )
        .unwrap();

        // Matched row carried no cost: the column stays null and the
        // per-code average (over non-null rows) applies instead.
        assert_eq!(rows[0].material_cost, None);
        assert_eq!(rows[0].production_cost, 60.0);
    }

    #[test]
    fn duplicate_key_rejected_by_default() {
        let err = enrich(
            &[base("1", Some("A"), Some("ModelX"), 100.0)],
            &[opt("A", "ModelX", 50.0), opt("A", "ModelX", 70.0)],
            DuplicatePolicy::Error,
        )
        .unwrap_err();

        match err {
            EngineError::DuplicateOptionKey {
                option_code,
                model,
                count,
            } => {
                assert_eq!(option_code, "A");
                assert_eq!(model, "ModelX");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_key_fans_out_when_configured() {
        let rows = enrich(
            &[
                base("1", Some("A"), Some("ModelX"), 100.0),
                base("2", None, None, 10.0),
            ],
            &[opt("A", "ModelX", 50.0), opt("A", "ModelX", 70.0)],
            DuplicatePolicy::Fanout,
        )
        .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].vin, "1");
        assert_eq!(rows[0].production_cost, 50.0);
        assert_eq!(rows[1].vin, "1");
        assert_eq!(rows[1].production_cost, 70.0);
        assert_eq!(rows[2].vin, "2");
        assert_eq!(rows[2].production_cost, 4.5);
    }

    #[test]
    fn profit_is_price_minus_cost_everywhere() {
        let rows = enrich(
            &[
                base("1", Some("A"), Some("ModelX"), 100.0),
                base("2", Some("C"), Some("ModelZ"), 150.0),
                base("3", None, None, 80.0),
                base("4", Some("A"), Some("ModelX"), -1.0),
            ],
            &[opt("A", "ModelX", 50.0), opt("C", "ModelQ", 70.0)],
            DuplicatePolicy::Error,
        )
        .unwrap();

        for row in &rows {
            assert_eq!(row.profit, row.sales_price - row.production_cost);
        }
    }
}
