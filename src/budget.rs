use crate::error::Result;
use crate::loader::load_cost_items;
use crate::matrix::CashFlowMatrix;
use crate::schema::{CostItem, GroupLevel};
use crate::spreader::spread_costs;
use crate::utils::round2;
use std::path::Path;

/// The validated budget: the full list of cost items for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    items: Vec<CostItem>,
}

impl Budget {
    pub fn new(items: Vec<CostItem>) -> Self {
        Self { items }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(load_cost_items(path)?))
    }

    pub fn items(&self) -> &[CostItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item amounts, before any spreading.
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|item| item.amount).sum()
    }

    /// Item-level totals summed per value of one hierarchy level, in
    /// first-seen order.
    pub fn costs_by_level(&self, level: GroupLevel) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for item in &self.items {
            let name = level.of(&item.key()).to_string();
            match totals.iter().position(|(n, _)| *n == name) {
                Some(pos) => totals[pos].1 += item.amount,
                None => totals.push((name, item.amount)),
            }
        }
        for (_, total) in totals.iter_mut() {
            *total = round2(*total);
        }
        totals
    }

    /// Spreads the budget into a daily cash flow matrix.
    pub fn to_cashflow(&self) -> Result<CashFlowMatrix> {
        spread_costs(&self.items)
    }

    /// Spreads the budget and collapses it into calendar-month billing
    /// periods, the shape used for loan sizing reports.
    pub fn to_monthly_cashflow(&self) -> Result<CashFlowMatrix> {
        Ok(self.to_cashflow()?.resample_monthly())
    }
}
