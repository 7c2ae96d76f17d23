use crate::aggregate::AggregatedView;
use crate::error::{CashflowError, Result};
use crate::matrix::CashFlowMatrix;
use crate::schema::ColumnKey;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Serializes a matrix in the persisted cashflow layout: three header records
/// naming each column's category, cost type and supplier, then one record per
/// date with cent-precision cells.
pub fn matrix_to_csv(matrix: &CashFlowMatrix) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut categories = vec!["cost_category".to_string()];
    categories.extend(matrix.columns().iter().map(|k| k.category.clone()));
    writer.write_record(&categories)?;

    let mut cost_types = vec!["cost_type".to_string()];
    cost_types.extend(matrix.columns().iter().map(|k| k.cost_type.clone()));
    writer.write_record(&cost_types)?;

    let mut suppliers = vec!["supplier".to_string()];
    suppliers.extend(matrix.columns().iter().map(|k| k.supplier.clone()));
    writer.write_record(&suppliers)?;

    for (row, date) in matrix.dates().iter().enumerate() {
        let mut record = vec![date.format(DATE_FORMAT).to_string()];
        for col in 0..matrix.columns().len() {
            record.push(format!("{:.2}", matrix.cells[row][col]));
        }
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_matrix<P: AsRef<Path>>(matrix: &CashFlowMatrix, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(matrix_to_csv(matrix)?.as_bytes())?;
    Ok(())
}

/// Reads a matrix back from the persisted cashflow layout. Thousands
/// separators in the cells are tolerated.
pub fn read_matrix<R: Read>(reader: R) -> Result<CashFlowMatrix> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let header_rows: Vec<csv::StringRecord> = records
        .by_ref()
        .take(3)
        .collect::<std::result::Result<_, _>>()?;
    if header_rows.len() < 3 {
        return Err(CashflowError::InvalidCostItem(
            "cashflow file must start with cost_category, cost_type and supplier records"
                .to_string(),
        ));
    }

    let column_count = header_rows[0].len().saturating_sub(1);
    let columns: Vec<ColumnKey> = (0..column_count)
        .map(|i| ColumnKey {
            category: header_rows[0].get(i + 1).unwrap_or("").to_string(),
            cost_type: header_rows[1].get(i + 1).unwrap_or("").to_string(),
            supplier: header_rows[2].get(i + 1).unwrap_or("").to_string(),
        })
        .collect();

    let mut dates = Vec::new();
    let mut cells = Vec::new();
    for record in records {
        let record = record?;
        let label = record.get(0).unwrap_or("");
        let date = NaiveDate::parse_from_str(label, DATE_FORMAT).map_err(|_| {
            CashflowError::DateError(format!("invalid cashflow row label '{label}'"))
        })?;
        let row: Vec<f64> = (0..column_count)
            .map(|i| {
                let raw = record.get(i + 1).unwrap_or("0");
                let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
                cleaned.parse::<f64>().map_err(|_| {
                    CashflowError::InvalidCostItem(format!(
                        "non-numeric cashflow cell '{raw}' on {date}"
                    ))
                })
            })
            .collect::<Result<_>>()?;
        dates.push(date);
        cells.push(row);
    }

    CashFlowMatrix::from_parts(dates, columns, cells)
}

pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<CashFlowMatrix> {
    read_matrix(File::open(path)?)
}

/// Serializes an aggregated view: a `date` header, one column per group, and
/// the synthetic `total` column last.
pub fn view_to_csv(view: &AggregatedView) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date".to_string()];
    header.extend(view.group_names().iter().map(|n| n.to_string()));
    header.push("total".to_string());
    writer.write_record(&header)?;

    for (row, date) in view.dates().iter().enumerate() {
        let mut record = vec![date.format(DATE_FORMAT).to_string()];
        for (_, series) in view.groups() {
            record.push(format!("{:.2}", series[row]));
        }
        record.push(format!("{:.2}", view.total_series()[row]));
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_view<P: AsRef<Path>>(view: &AggregatedView, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(view_to_csv(view)?.as_bytes())?;
    Ok(())
}
