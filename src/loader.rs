use crate::error::{CashflowError, Result};
use crate::schema::{normalize_field, CostItem};
use crate::utils::normalize_header;
use chrono::NaiveDate;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names every budget file must carry, after header normalization.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "cost_category",
    "cost_type",
    "supplier",
    "amount",
    "start_date",
    "end_date",
];

/// Date formats accepted in budget files, tried in order.
const DATE_FORMATS: [&str; 4] = ["%d-%b-%y", "%d-%b-%Y", "%d/%m/%y", "%d/%m/%Y"];

/// Markers treated as missing data in text columns.
const NA_MARKERS: [&str; 3] = ["NA", "null", "-"];

/// Reads a budget CSV file into validated cost items.
pub fn load_cost_items<P: AsRef<Path>>(path: P) -> Result<Vec<CostItem>> {
    let file = File::open(path.as_ref())?;
    let items = parse_cost_items(file)?;
    info!(
        "Loaded {} cost items from {}",
        items.len(),
        path.as_ref().display()
    );
    Ok(items)
}

/// Parses budget rows from any reader. Headers are case-insensitive and
/// whitespace-normalized; all required columns must be present; every row is
/// validated before it is returned.
pub fn parse_cost_items<R: Read>(reader: R) -> Result<Vec<CostItem>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CashflowError::MissingColumns(missing));
    }

    let position =
        |name: &str| headers.iter().position(|h| h == name).expect("checked above");
    let category_col = position("cost_category");
    let type_col = position("cost_type");
    let supplier_col = position("supplier");
    let amount_col = position("amount");
    let start_col = position("start_date");
    let end_col = position("end_date");

    let mut items = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |col: usize| record.get(col).unwrap_or("");

        let amount = parse_amount(field(amount_col), row)?;
        let start_date = parse_date(field(start_col), "start_date", row)?;
        let end_date = parse_date(field(end_col), "end_date", row)?;

        let item = CostItem::new(
            &clear_na_markers(field(category_col)),
            &clear_na_markers(field(type_col)),
            &clear_na_markers(field(supplier_col)),
            amount,
            start_date,
            end_date,
        )
        .map_err(|e| CashflowError::InvalidCostItem(format!("row {}: {e}", row + 1)))?;
        items.push(item);
    }

    Ok(items)
}

/// Text cells holding an NA marker are emptied so that [`CostItem::new`]
/// replaces them with the sentinel.
fn clear_na_markers(value: &str) -> String {
    if NA_MARKERS.contains(&value.trim()) {
        String::new()
    } else {
        normalize_field(value)
    }
}

/// Parses a monetary amount, tolerating thousands separators and spaces.
fn parse_amount(raw: &str, row: usize) -> Result<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    cleaned.parse::<f64>().map_err(|_| {
        CashflowError::InvalidCostItem(format!(
            "row {}: amount '{}' is not numeric",
            row + 1,
            raw
        ))
    })
}

fn parse_date(raw: &str, column: &str, row: usize) -> Result<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), format) {
            return Ok(date);
        }
    }
    Err(CashflowError::DateError(format!(
        "row {}: {column} '{}' does not match any accepted format \
         (dd-MMM-yy, dd-MMM-yyyy, dd/mm/yy, dd/mm/yyyy)",
        row + 1,
        raw
    )))
}
