use crate::matrix::CashFlowMatrix;
use crate::schema::GroupLevel;
use chrono::NaiveDate;
use serde::Serialize;

/// Default number of individually reported categories in the top-N summary;
/// everything beyond them folds into `other`.
pub const DEFAULT_TOP_N: usize = 4;

/// A grouped, read-only view derived from a [`CashFlowMatrix`]: the same
/// date/period axis, one summed series per group in first-seen order, and a
/// synthetic `total` series equal to the row-wise sum of the groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedView {
    dates: Vec<NaiveDate>,
    groups: Vec<(String, Vec<f64>)>,
    total: Vec<f64>,
}

impl AggregatedView {
    fn new(dates: Vec<NaiveDate>, groups: Vec<(String, Vec<f64>)>) -> Self {
        let total = (0..dates.len())
            .map(|row| groups.iter().map(|(_, series)| series[row]).sum())
            .collect();
        Self {
            dates,
            groups,
            total,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn groups(&self) -> &[(String, Vec<f64>)] {
        &self.groups
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, series)| series.as_slice())
    }

    /// The synthetic `total` series, row-parallel to [`dates`](Self::dates).
    pub fn total_series(&self) -> &[f64] {
        &self.total
    }

    pub fn grand_total(&self) -> f64 {
        self.total.iter().sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CashFlowMatrix {
    /// Collapses the column hierarchy to one level, summing all columns that
    /// share the same value at that level. Groups appear in the first-seen
    /// order of the level's values in the column ordering.
    pub fn grouped_by_level(&self, level: GroupLevel) -> AggregatedView {
        let groups = self.collapse(|key| level.of(key).to_string());
        AggregatedView::new(self.dates.clone(), groups)
    }

    /// Top-N + other summary at the category level: the `n` categories with
    /// the largest whole-axis totals are kept as individual columns in their
    /// original relative order, any remaining categories are summed into a
    /// single `other` column, and a `total` column closes the view. Ties rank
    /// by first-seen order; with `n` or fewer categories no `other` appears.
    pub fn grouped_by_largest(&self, n: usize) -> AggregatedView {
        let categories = self.collapse(|key| key.category.clone());

        let mut ranked: Vec<usize> = (0..categories.len()).collect();
        ranked.sort_by(|&a, &b| {
            let total_a: f64 = categories[a].1.iter().sum();
            let total_b: f64 = categories[b].1.iter().sum();
            total_b.partial_cmp(&total_a).unwrap_or(std::cmp::Ordering::Equal)
        });
        let top: Vec<usize> = ranked.into_iter().take(n).collect();

        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
        let mut other: Option<Vec<f64>> = None;

        for (idx, (name, series)) in categories.iter().enumerate() {
            if top.contains(&idx) {
                groups.push((name.clone(), series.clone()));
            } else {
                let bucket = other.get_or_insert_with(|| vec![0.0; self.dates.len()]);
                for (cell, value) in bucket.iter_mut().zip(series) {
                    *cell += value;
                }
            }
        }

        if let Some(bucket) = other {
            groups.push(("other".to_string(), bucket));
        }

        AggregatedView::new(self.dates.clone(), groups)
    }

    /// Row-preserving grouped sum of the columns under an arbitrary key
    /// extraction, in first-seen key order.
    fn collapse(&self, group_key: impl Fn(&crate::schema::ColumnKey) -> String) -> Vec<(String, Vec<f64>)> {
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

        for (col, key) in self.columns.iter().enumerate() {
            let name = group_key(key);
            let pos = match groups.iter().position(|(n, _)| *n == name) {
                Some(pos) => pos,
                None => {
                    groups.push((name, vec![0.0; self.dates.len()]));
                    groups.len() - 1
                }
            };
            for (row, cell) in groups[pos].1.iter_mut().enumerate() {
                *cell += self.cells[row][col];
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CostItem;
    use crate::spreader::spread_costs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(category: &str, cost_type: &str, supplier: &str, amount: f64) -> CostItem {
        CostItem::new(
            category,
            cost_type,
            supplier,
            amount,
            date(2020, 1, 1),
            date(2020, 1, 10),
        )
        .unwrap()
    }

    #[test]
    fn test_grouped_by_level_sums_shared_values() {
        let items = vec![
            item("Construction", "Build", "builder1", 100.0),
            item("Construction", "Contingency", "builder1", 50.0),
            item("Fees", "Consultants", "consultant1", 30.0),
        ];
        let matrix = spread_costs(&items).unwrap();

        let by_category = matrix.grouped_by_level(GroupLevel::Category);
        assert_eq!(by_category.group_names(), vec!["Construction", "Fees"]);

        let construction: f64 = by_category.series("Construction").unwrap().iter().sum();
        assert!((construction - 150.0).abs() < 1e-9);

        let by_supplier = matrix.grouped_by_level(GroupLevel::Supplier);
        assert_eq!(by_supplier.group_names(), vec!["builder1", "consultant1"]);
    }

    #[test]
    fn test_total_column_matches_matrix_row_wise() {
        let items = vec![
            item("A", "T1", "S1", 120.0),
            item("B", "T2", "S2", 80.0),
        ];
        let matrix = spread_costs(&items).unwrap();
        let view = matrix.grouped_by_level(GroupLevel::CostType);

        for (row, total) in view.total_series().iter().enumerate() {
            let row_sum: f64 = matrix
                .columns()
                .iter()
                .map(|key| matrix.get(matrix.dates()[row], key).unwrap())
                .sum();
            assert!((total - row_sum).abs() < 1e-9);
        }
        assert!((view.grand_total() - matrix.total()).abs() < 1e-9);
    }

    #[test]
    fn test_grouped_by_largest_with_six_categories() {
        let items = vec![
            item("A", "T", "S", 600.0),
            item("B", "T", "S", 500.0),
            item("C", "T", "S", 400.0),
            item("D", "T", "S", 300.0),
            item("E", "T", "S", 200.0),
            item("F", "T", "S", 100.0),
        ];
        let matrix = spread_costs(&items).unwrap();
        let view = matrix.grouped_by_largest(4);

        assert_eq!(view.group_names(), vec!["A", "B", "C", "D", "other"]);

        let other: f64 = view.series("other").unwrap().iter().sum();
        assert!((other - 300.0).abs() < 1e-9);
        assert!((view.grand_total() - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn test_grouped_by_largest_keeps_first_seen_order() {
        // "B" is largest but "A" was seen first; the top-4 keep column order
        let items = vec![
            item("A", "T", "S", 100.0),
            item("B", "T", "S", 900.0),
            item("C", "T", "S", 50.0),
        ];
        let matrix = spread_costs(&items).unwrap();
        let view = matrix.grouped_by_largest(4);

        assert_eq!(view.group_names(), vec!["A", "B", "C"]);
        assert!(view.series("other").is_none());
    }

    #[test]
    fn test_grouped_by_largest_tie_breaks_by_first_seen() {
        let items = vec![
            item("A", "T", "S", 100.0),
            item("B", "T", "S", 100.0),
            item("C", "T", "S", 100.0),
        ];
        let matrix = spread_costs(&items).unwrap();
        let view = matrix.grouped_by_largest(2);

        assert_eq!(view.group_names(), vec!["A", "B", "other"]);
    }

    #[test]
    fn test_empty_matrix_yields_total_only() {
        let matrix = CashFlowMatrix::zeroed(vec![date(2020, 1, 1), date(2020, 1, 2)], vec![]);
        let view = matrix.grouped_by_level(GroupLevel::Category);

        assert!(view.groups().is_empty());
        assert_eq!(view.total_series(), &[0.0, 0.0]);

        let summary = matrix.grouped_by_largest(DEFAULT_TOP_N);
        assert!(summary.groups().is_empty());
        assert_eq!(summary.total_series(), &[0.0, 0.0]);
    }
}
