// Parquet export — the default columnar output format.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use costline_engine::model::EnrichedRecord;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::IoError;

/// Arrow schema of the enriched table. The join-derived columns are
/// nullable; the price and the derived costs are not.
fn enriched_schema() -> Schema {
    Schema::new(vec![
        Field::new("VIN", DataType::Utf8, false),
        Field::new("Options_Code", DataType::Utf8, true),
        Field::new("Model_Text", DataType::Utf8, true),
        Field::new("Sales_Price", DataType::Float64, false),
        Field::new("Material_Cost", DataType::Float64, true),
        Field::new("production_cost", DataType::Float64, false),
        Field::new("profit", DataType::Float64, false),
    ])
}

/// Write the enriched table as a single-row-group parquet file.
pub fn write_enriched_parquet(rows: &[EnrichedRecord], path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };

    let schema = Arc::new(enriched_schema());

    let vins: StringArray = rows.iter().map(|r| Some(r.vin.as_str())).collect();
    let codes: StringArray = rows.iter().map(|r| r.options_code.as_deref()).collect();
    let models: StringArray = rows.iter().map(|r| r.model_text.as_deref()).collect();
    let prices = Float64Array::from_iter_values(rows.iter().map(|r| r.sales_price));
    let materials: Float64Array = rows.iter().map(|r| r.material_cost).collect();
    let costs = Float64Array::from_iter_values(rows.iter().map(|r| r.production_cost));
    let profits = Float64Array::from_iter_values(rows.iter().map(|r| r.profit));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(vins),
        Arc::new(codes),
        Arc::new(models),
        Arc::new(prices),
        Arc::new(materials),
        Arc::new(costs),
        Arc::new(profits),
    ];
    let batch =
        RecordBatch::try_new(schema.clone(), columns).map_err(|e| write_err(e.to_string()))?;

    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).map_err(|e| write_err(e.to_string()))?;
    writer.write(&batch).map_err(|e| write_err(e.to_string()))?;
    writer.close().map_err(|e| write_err(e.to_string()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
