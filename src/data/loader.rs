use std::path::Path;
use crate::data::parser;
use crate::data::record::{Dataset, Record, Value};
use crate::data::schema::{FieldId, Schema};
use crate::error::{Error, Result};

const HEADER_SCAN_LINES: usize = 50;

/// Load a survey CSV file into a dataset, detecting header row and schema.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let content = std::fs::read(path)?;
    let text = parser::decode_text(content);
    let dataset = load_csv_text(&text)?;
    tracing::info!(
        "Loaded {} records ({} schema) from {:?}",
        dataset.len(),
        dataset.schema,
        path
    );
    if dataset.is_empty() {
        tracing::warn!("{:?} has a header but no data rows", path);
    }
    Ok(dataset)
}

/// Parse CSV text into a dataset.
pub fn load_csv_text(text: &str) -> Result<Dataset> {
    let header_row = parser::detect_csv_header(text, b',', HEADER_SCAN_LINES)?;
    let all_rows = parser::read_rows(text, b',', None);

    if all_rows.is_empty() || header_row >= all_rows.len() {
        return Err(Error::NoHeader);
    }

    let columns: Vec<String> = all_rows[header_row].iter()
        .map(|s| s.trim().to_string())
        .collect();

    let schema = Schema::detect(&columns)
        .ok_or_else(|| Error::UnknownSchema(columns.join(", ")))?;

    // Column index in the file for each schema field
    let mapping: Vec<(FieldId, Option<usize>)> = schema.fields().iter()
        .map(|f| (*f, columns.iter().position(|c| c == f.column_name())))
        .collect();

    let data_rows = &all_rows[header_row + 1..];
    let mut records = Vec::with_capacity(data_rows.len());
    let mut missing_cells = 0usize;

    for row in data_rows {
        let values: Vec<Value> = mapping.iter()
            .map(|(field, col)| {
                let value = col
                    .and_then(|c| row.get(c))
                    .map(|raw| Value::coerce(raw, field.kind()))
                    .unwrap_or(Value::Missing);
                if value == Value::Missing {
                    missing_cells += 1;
                }
                value
            })
            .collect();
        records.push(Record::new(schema, values));
    }

    if missing_cells > 0 {
        tracing::debug!("{missing_cells} cells were empty or failed numeric coercion");
    }

    Ok(Dataset::new(schema, records))
}
