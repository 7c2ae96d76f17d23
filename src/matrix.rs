use crate::error::{CashflowError, Result};
use crate::schema::ColumnKey;
use crate::utils::{month_end, round2};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Dense table of monetary amounts keyed by date × composite column key.
///
/// The date axis is contiguous: daily from the earliest start date to the
/// latest end date when built by the spreader, or month-end billing period
/// labels after [`resample_monthly`](Self::resample_monthly). Columns keep the
/// order in which their keys were first seen, which drives the deterministic
/// group ordering of the aggregated views.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowMatrix {
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) columns: Vec<ColumnKey>,
    pub(crate) index: HashMap<ColumnKey, usize>,
    /// cells[row][col], row parallel to `dates`, col parallel to `columns`.
    pub(crate) cells: Vec<Vec<f64>>,
}

impl CashFlowMatrix {
    /// Zero-filled matrix over the given axes. Column order is preserved.
    pub(crate) fn zeroed(dates: Vec<NaiveDate>, columns: Vec<ColumnKey>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), i))
            .collect();
        let cells = vec![vec![0.0; columns.len()]; dates.len()];
        Self {
            dates,
            columns,
            index,
            cells,
        }
    }

    /// Rebuilds a matrix from persisted parts, e.g. a cashflow file read back
    /// from disk. Fails on ragged rows or duplicate column keys.
    pub fn from_parts(
        dates: Vec<NaiveDate>,
        columns: Vec<ColumnKey>,
        cells: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if cells.len() != dates.len() || cells.iter().any(|row| row.len() != columns.len()) {
            return Err(CashflowError::InvalidCostItem(format!(
                "cell grid shape does not match {} dates x {} columns",
                dates.len(),
                columns.len()
            )));
        }
        let mut index = HashMap::new();
        for (i, key) in columns.iter().enumerate() {
            if index.insert(key.clone(), i).is_some() {
                return Err(CashflowError::InvalidCostItem(format!(
                    "duplicate column key {key}"
                )));
            }
        }
        Ok(Self {
            dates,
            columns,
            index,
            cells,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.dates.is_empty()
    }

    pub(crate) fn column_index(&self, key: &ColumnKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Amount in the cell for `date` and `key`, if both exist in the axes.
    pub fn get(&self, date: NaiveDate, key: &ColumnKey) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        let col = self.column_index(key)?;
        Some(self.cells[row][col])
    }

    /// One column's full series, parallel to [`dates`](Self::dates).
    pub fn column_series(&self, key: &ColumnKey) -> Option<Vec<f64>> {
        let col = self.column_index(key)?;
        Some(self.cells.iter().map(|row| row[col]).collect())
    }

    pub(crate) fn add(&mut self, row: usize, col: usize, amount: f64) {
        self.cells[row][col] += amount;
    }

    /// Grand total of every cell. For a spreader-built matrix this equals the
    /// sum of the input item amounts.
    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    /// Collapses the daily matrix into calendar-month billing periods: every
    /// day is assigned to the month containing it and the output row label is
    /// that month's end date. A pure grouped sum per column, so the grand
    /// total is preserved; cells are rounded back to cent precision.
    pub fn resample_monthly(&self) -> CashFlowMatrix {
        let mut period_labels: Vec<NaiveDate> = Vec::new();
        let mut row_of_period: HashMap<NaiveDate, usize> = HashMap::new();

        for date in &self.dates {
            let label = month_end(*date);
            if !row_of_period.contains_key(&label) {
                row_of_period.insert(label, period_labels.len());
                period_labels.push(label);
            }
        }

        let mut resampled = CashFlowMatrix::zeroed(period_labels, self.columns.clone());
        for (row, date) in self.dates.iter().enumerate() {
            let target = row_of_period[&month_end(*date)];
            for col in 0..self.columns.len() {
                resampled.cells[target][col] += self.cells[row][col];
            }
        }

        for row in resampled.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = round2(*cell);
            }
        }

        resampled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key(category: &str) -> ColumnKey {
        ColumnKey {
            category: category.to_string(),
            cost_type: "T".to_string(),
            supplier: "S".to_string(),
        }
    }

    #[test]
    fn test_zeroed_shape() {
        let matrix = CashFlowMatrix::zeroed(
            vec![date(2020, 1, 1), date(2020, 1, 2)],
            vec![key("A"), key("B")],
        );
        assert_eq!(matrix.dates().len(), 2);
        assert_eq!(matrix.columns().len(), 2);
        assert_eq!(matrix.total(), 0.0);
        assert_eq!(matrix.get(date(2020, 1, 1), &key("A")), Some(0.0));
        assert_eq!(matrix.get(date(2020, 1, 3), &key("A")), None);
    }

    #[test]
    fn test_resample_monthly_groups_by_calendar_month() {
        // Daily axis straddling a month boundary
        let dates: Vec<NaiveDate> = (29..=31)
            .map(|d| date(2020, 1, d))
            .chain((1..=2).map(|d| date(2020, 2, d)))
            .collect();
        let mut matrix = CashFlowMatrix::zeroed(dates, vec![key("A")]);
        for row in 0..5 {
            matrix.add(row, 0, 10.0);
        }

        let monthly = matrix.resample_monthly();
        assert_eq!(
            monthly.dates(),
            &[date(2020, 1, 31), date(2020, 2, 29)]
        );
        assert_eq!(monthly.get(date(2020, 1, 31), &key("A")), Some(30.0));
        assert_eq!(monthly.get(date(2020, 2, 29), &key("A")), Some(20.0));
        assert!((monthly.total() - matrix.total()).abs() < 1e-9);
    }

    #[test]
    fn test_resample_is_stable_on_monthly_axis() {
        let mut matrix =
            CashFlowMatrix::zeroed(vec![date(2020, 1, 31), date(2020, 2, 29)], vec![key("A")]);
        matrix.add(0, 0, 12.5);
        matrix.add(1, 0, 7.5);

        let resampled = matrix.resample_monthly();
        assert_eq!(resampled, matrix);
    }

    #[test]
    fn test_from_parts_rejects_bad_shapes() {
        let result = CashFlowMatrix::from_parts(
            vec![date(2020, 1, 1)],
            vec![key("A")],
            vec![vec![1.0, 2.0]],
        );
        assert!(result.is_err());

        let result = CashFlowMatrix::from_parts(
            vec![date(2020, 1, 1)],
            vec![key("A"), key("A")],
            vec![vec![1.0, 2.0]],
        );
        assert!(result.is_err());
    }
}
