use std::collections::HashMap;
use crate::error::{Error, Result};

/// Decode file bytes as UTF-8, falling back to latin1 (each byte maps to the same code point).
pub fn decode_text(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Read up to `max_lines` raw rows, skipping malformed ones.
pub fn read_rows(text: &str, delimiter: u8, max_lines: Option<usize>) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, result) in reader.records().enumerate() {
        if max_lines.is_some_and(|max| i >= max) { break; }
        match result {
            Ok(record) => {
                let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                if !row.is_empty() {
                    rows.push(row);
                }
            }
            Err(e) => {
                tracing::debug!("Skipping malformed CSV row {i}: {e}");
                continue;
            }
        }
    }
    rows
}

/// Detect the header row index in CSV text.
/// Returns the 0-based index among the non-empty rows.
pub fn detect_csv_header(text: &str, delimiter: u8, max_lines: usize) -> Result<usize> {
    let rows = read_rows(text, delimiter, Some(max_lines));
    if rows.is_empty() {
        return Err(Error::NoHeader);
    }

    // Find most common column count
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in &rows {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
        .unwrap_or(0);

    // Scan from bottom up for an all-text row
    for i in (0..rows.len()).rev() {
        let row = &rows[i];
        if row.len() != most_common { continue; }

        let all_text = row.iter().all(|cell| {
            let trimmed = cell.trim();
            !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
        });

        if all_text {
            return Ok(i);
        }
    }

    Ok(0)
}

fn is_date_like(s: &str) -> bool {
    let has_separators = s.contains('/') || s.contains(':');
    let lower = s.to_lowercase();
    let has_date_words = lower.contains("am") || lower.contains("pm");

    if !has_separators && !has_date_words {
        return false;
    }

    use chrono::{NaiveDate, NaiveDateTime};
    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d",
        "%m/%d/%Y",
    ];
    formats.iter().any(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt).is_ok() || NaiveDate::parse_from_str(s, fmt).is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_on_first_line() {
        let text = "Gender,Sleep_Quality\nMale,3\nFemale,7\n";
        assert_eq!(detect_csv_header(text, b',', 50).unwrap(), 0);
    }

    #[test]
    fn header_after_preamble() {
        let text = "Survey export\nGenerated 2024\nGender,Sleep_Quality\nMale,3\nFemale,7\n";
        assert_eq!(detect_csv_header(text, b',', 50).unwrap(), 2);
    }

    #[test]
    fn date_cells_are_not_header_text() {
        let text = "When,Who\n01/02/2024,Ann\n01/03/2024,Bob\n";
        assert_eq!(detect_csv_header(text, b',', 50).unwrap(), 0);
        assert!(is_date_like("01/02/2024"));
        assert!(!is_date_like("Sleep_Quality"));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(detect_csv_header("", b',', 50), Err(Error::NoHeader)));
    }

    #[test]
    fn latin1_fallback() {
        let bytes = vec![b'G', 0xE9, b'n'];
        assert_eq!(decode_text(bytes), "G\u{e9}n");
    }
}
