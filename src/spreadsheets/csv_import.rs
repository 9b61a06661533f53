use crate::domain::lead::{non_blank, split_tags, LeadFields, LeadPatch};
use crate::domain::validation::validate_new;
use crate::errors::ServerError;
use crate::spreadsheets::LEAD_COLUMNS;
use csv::StringRecord;
use serde::Serialize;
use std::collections::HashMap;

const REQUIRED_COLUMNS: [&str; 7] = [
    "fullName",
    "phone",
    "city",
    "propertyType",
    "purpose",
    "timeline",
    "source",
];

/// Why one data row was skipped. `row` is the line number in the file,
/// counting the header as line 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ParsedImport {
    pub valid: Vec<LeadFields>,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub errors: Vec<RowError>,
}

/// Reads and validates an uploaded CSV.
///
/// A missing required column or too many rows rejects the whole file;
/// anything wrong inside a row only rejects that row.
pub fn parse_import(data: &[u8], max_rows: usize) -> Result<ParsedImport, ServerError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| LEAD_COLUMNS.contains(h))
        .map(|(i, h)| (h, i))
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !index.contains_key(c))
        .collect();
    if !missing.is_empty() {
        return Err(ServerError::BadRequest(format!(
            "CSV is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        // A quoted cell may span lines, so the record's own start line is used.
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(records.len() + 2);
        records.push((line, record));
        if records.len() > max_rows {
            return Err(ServerError::BadRequest(format!(
                "CSV has more than {max_rows} rows"
            )));
        }
    }

    let mut parsed = ParsedImport::default();
    for (row, record) in records {
        match row_to_fields(&index, &record) {
            Ok(fields) => parsed.valid.push(fields),
            Err(errors) => parsed.errors.push(RowError { row, errors }),
        }
    }

    Ok(parsed)
}

fn cell_at<'r>(index: &HashMap<&str, usize>, record: &'r StringRecord, name: &str) -> &'r str {
    index
        .get(name)
        .and_then(|&col| record.get(col))
        .unwrap_or("")
}

fn row_to_fields(
    index: &HashMap<&str, usize>,
    record: &StringRecord,
) -> Result<LeadFields, Vec<String>> {
    let cell = |name: &str| cell_at(index, record, name);
    let mut errors = Vec::new();
    let mut number = |name: &str| -> Option<i64> {
        let raw = cell(name);
        if raw.is_empty() {
            return None;
        }
        match raw.replace(',', "").parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(format!("{name}: '{raw}' is not a whole number"));
                None
            }
        }
    };
    let budget_min = number("budgetMin");
    let budget_max = number("budgetMax");

    let patch = LeadPatch {
        full_name: Some(cell("fullName").to_string()),
        email: Some(non_blank(cell("email"))),
        phone: Some(cell("phone").to_string()),
        city: Some(cell("city").to_string()),
        property_type: Some(cell("propertyType").to_string()),
        bhk: Some(non_blank(cell("bhk"))),
        purpose: Some(cell("purpose").to_string()),
        budget_min: Some(budget_min),
        budget_max: Some(budget_max),
        timeline: Some(cell("timeline").to_string()),
        source: Some(cell("source").to_string()),
        status: non_blank(cell("status")),
        notes: Some(non_blank(cell("notes"))),
        tags: Some(split_tags(cell("tags"))),
    };

    match validate_new(&patch) {
        Ok(fields) if errors.is_empty() => Ok(fields),
        Ok(_) => Err(errors),
        Err(invalid) => {
            errors.extend(invalid.iter().map(|e| format!("{}: {}", e.field, e.message)));
            Err(errors)
        }
    }
}
