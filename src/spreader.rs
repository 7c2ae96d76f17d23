use crate::error::{CashflowError, Result};
use crate::matrix::CashFlowMatrix;
use crate::schema::{ColumnKey, CostItem};
use crate::utils::{days_inclusive, round2};
use chrono::{Days, NaiveDate};
use log::{debug, info};

/// Spreads each item's amount evenly across its inclusive day range and
/// accumulates the allocations into a daily [`CashFlowMatrix`].
///
/// The daily allocation is rounded to cent precision and the rounding residual
/// is folded into the item's last day, so each item's column sums back to its
/// exact amount. Items sharing a composite key add into the same column.
pub fn spread_costs(items: &[CostItem]) -> Result<CashFlowMatrix> {
    if items.is_empty() {
        return Err(CashflowError::EmptyInput);
    }

    // The loader already validated these, but a violated precondition here
    // would silently break total conservation downstream.
    for item in items {
        item.validate()?;
    }

    let axis_start = items.iter().map(|i| i.start_date).min().unwrap();
    let axis_end = items.iter().map(|i| i.end_date).max().unwrap();
    let dates = daily_axis(axis_start, axis_end);

    let mut columns: Vec<ColumnKey> = Vec::new();
    for item in items {
        let key = item.key();
        if !columns.contains(&key) {
            columns.push(key);
        }
    }

    info!(
        "Spreading {} cost items over {} days and {} columns ({} to {})",
        items.len(),
        dates.len(),
        columns.len(),
        axis_start,
        axis_end
    );

    let mut matrix = CashFlowMatrix::zeroed(dates, columns);

    for item in items {
        let col = matrix
            .column_index(&item.key())
            .expect("column registered above");
        let num_days = days_inclusive(item.start_date, item.end_date);
        let daily = round2(item.amount / num_days as f64);
        let residual = item.amount - daily * num_days as f64;

        debug!(
            "Item '{}' ({}): {} over {} days, {}/day, residual {:.4}",
            item.category, item.supplier, item.amount, num_days, daily, residual
        );

        let first_row = days_inclusive(axis_start, item.start_date) as usize - 1;
        for offset in 0..num_days as usize {
            matrix.add(first_row + offset, col, daily);
        }
        matrix.add(first_row + num_days as usize - 1, col, residual);
    }

    Ok(matrix)
}

fn daily_axis(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(days_inclusive(start, end) as usize);
    let mut current = start;
    while current <= end {
        dates.push(current);
        current = current.checked_add_days(Days::new(1)).unwrap();
    }
    dates
}
