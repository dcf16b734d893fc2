// CSV import/export for the pipeline tables.

use std::io::Read;
use std::path::Path;

use costline_engine::model::{BaseRecord, EnrichedRecord, OptionRecord, OUTPUT_COLUMNS};

use crate::error::IoError;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Load the base table. Empty `Options_Code`/`Model_Text` fields become
/// nulls; an empty or unparseable `Sales_Price` is an error.
pub fn read_base_records(path: &Path, delimiter: Option<char>) -> Result<Vec<BaseRecord>, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = resolve_delimiter(&content, delimiter);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = read_headers(&mut reader, "base")?;
    let vin_idx = column_index(&headers, "base", "VIN")?;
    let code_idx = column_index(&headers, "base", "Options_Code")?;
    let model_idx = column_index(&headers, "base", "Model_Text")?;
    let price_idx = column_index(&headers, "base", "Sales_Price")?;

    let mut rows = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IoError::Csv {
            table: "base".into(),
            message: e.to_string(),
        })?;

        let raw_price = record.get(price_idx).unwrap_or("").trim();
        let sales_price = parse_f64(raw_price, "base", row_no + 1, "Sales_Price")?
            .ok_or_else(|| IoError::NumberParse {
                table: "base".into(),
                row: row_no + 1,
                column: "Sales_Price".into(),
                value: raw_price.into(),
            })?;

        rows.push(BaseRecord {
            vin: field(&record, vin_idx),
            options_code: optional_field(&record, code_idx),
            model_text: optional_field(&record, model_idx),
            sales_price,
        });
    }

    Ok(rows)
}

/// Load the options catalog. An empty `Material_Cost` field is a null.
pub fn read_option_records(
    path: &Path,
    delimiter: Option<char>,
) -> Result<Vec<OptionRecord>, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = resolve_delimiter(&content, delimiter);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = read_headers(&mut reader, "options")?;
    let code_idx = column_index(&headers, "options", "Option_Code")?;
    let model_idx = column_index(&headers, "options", "Model")?;
    let cost_idx = column_index(&headers, "options", "Material_Cost")?;

    let mut rows = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IoError::Csv {
            table: "options".into(),
            message: e.to_string(),
        })?;

        let raw_cost = record.get(cost_idx).unwrap_or("").trim();
        rows.push(OptionRecord {
            option_code: field(&record, code_idx),
            model: field(&record, model_idx),
            material_cost: parse_f64(raw_cost, "options", row_no + 1, "Material_Cost")?,
        });
    }

    Ok(rows)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>, table: &str) -> Result<Vec<String>, IoError> {
    Ok(reader
        .headers()
        .map_err(|e| IoError::Csv {
            table: table.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn column_index(headers: &[String], table: &str, name: &str) -> Result<usize, IoError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| IoError::MissingColumn {
            table: table.into(),
            column: name.into(),
        })
}

fn field(record: &csv::StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

fn optional_field(record: &csv::StringRecord, idx: usize) -> Option<String> {
    let value = field(record, idx);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Empty fields parse to `None`; anything else must be a number.
fn parse_f64(raw: &str, table: &str, row: usize, column: &str) -> Result<Option<f64>, IoError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| IoError::NumberParse {
            table: table.into(),
            row,
            column: column.into(),
            value: raw.into(),
        })
}

// ---------------------------------------------------------------------------
// Delimiter sniffing + encoding
// ---------------------------------------------------------------------------

fn resolve_delimiter(content: &str, configured: Option<char>) -> u8 {
    match configured {
        Some(c) => c as u8,
        None => sniff_delimiter(content),
    }
}

/// Detect the most likely field delimiter by field-count consistency over
/// the first lines. Candidates: tab, semicolon, comma, pipe; comma when
/// nothing scores.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0u64;
    for &candidate in &[b'\t', b';', b',', b'|'] {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| field_count(line, candidate))
            .collect();
        let Some(&first) = counts.first() else {
            break;
        };
        // Must produce more than one field on the header line to be viable.
        if first <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == first).count() as u64;
        let score = consistent * first as u64;
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }

    best
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read a file as UTF-8, falling back to Windows-1252 for Excel-exported
/// CSVs.
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |e: std::io::Error| IoError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write the enriched table as CSV. Nulls are empty fields.
pub fn write_enriched_csv(rows: &[EnrichedRecord], path: &Path) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    writer
        .write_record(OUTPUT_COLUMNS)
        .map_err(|e| write_err(e.to_string()))?;

    for row in rows {
        writer
            .write_record(&[
                row.vin.clone(),
                row.options_code.clone().unwrap_or_default(),
                row.model_text.clone().unwrap_or_default(),
                row.sales_price.to_string(),
                row.material_cost.map(|c| c.to_string()).unwrap_or_default(),
                row.production_cost.to_string(),
                row.profit.to_string(),
            ])
            .map_err(|e| write_err(e.to_string()))?;
    }

    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
