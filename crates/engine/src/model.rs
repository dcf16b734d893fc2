// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One vehicle/sale entry. Empty code and model fields load as `None`.
#[derive(Debug, Clone)]
pub struct BaseRecord {
    pub vin: String,
    pub options_code: Option<String>,
    pub model_text: Option<String>,
    pub sales_price: f64,
}

/// One (option code, model) → material cost catalog entry.
///
/// A null `material_cost` never matches anything and is excluded from the
/// per-code averages.
#[derive(Debug, Clone)]
pub struct OptionRecord {
    pub option_code: String,
    pub model: String,
    pub material_cost: Option<f64>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Base record extended with the derived cost columns.
///
/// `material_cost` is retained from the exact-match join; it stays `None`
/// when no match existed or the matched catalog row carried a null cost.
/// `production_cost` is always defined after enrichment.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    pub vin: String,
    pub options_code: Option<String>,
    pub model_text: Option<String>,
    pub sales_price: f64,
    pub material_cost: Option<f64>,
    pub production_cost: f64,
    pub profit: f64,
}

/// Output column names, in file order.
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "VIN",
    "Options_Code",
    "Model_Text",
    "Sales_Price",
    "Material_Cost",
    "production_cost",
    "profit",
];
