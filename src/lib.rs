//! # Construction Cashflow
//!
//! A library for turning a construction project budget (discrete cost line
//! items, each with an amount and a date range) into a time-phased cash flow
//! for loan sizing and reporting.
//!
//! ## Core Concepts
//!
//! - **Cost Item**: one validated budget line, identified by the
//!   (cost category, cost type, supplier) hierarchy
//! - **Cost Spreading**: each item's amount is allocated evenly across its
//!   inclusive day range, with the rounding residual folded into the last day
//!   so every column sums back to its exact amount
//! - **Cash Flow Matrix**: the dense date × composite-key table of amounts,
//!   resampleable into calendar-month billing periods
//! - **Aggregated Views**: per-level groupings and a top-N + "other" category
//!   summary, all derived without mutating the matrix
//!
//! ## Example
//!
//! ```rust,ignore
//! use construction_cashflow::*;
//! use chrono::NaiveDate;
//!
//! let items = vec![
//!     CostItem::new(
//!         "Construction costs",
//!         "Build costs",
//!         "builder1",
//!         2_000_000.0,
//!         NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
//!     )?,
//! ];
//!
//! let daily = spread_costs(&items)?;
//! let monthly = daily.resample_monthly();
//! let summary = monthly.grouped_by_largest(DEFAULT_TOP_N);
//! ```

pub mod aggregate;
pub mod budget;
pub mod error;
pub mod loader;
pub mod loan;
pub mod matrix;
pub mod schema;
pub mod spreader;
pub mod utils;
pub mod writer;

pub use aggregate::{AggregatedView, DEFAULT_TOP_N};
pub use budget::Budget;
pub use error::{CashflowError, Result};
pub use loader::{load_cost_items, parse_cost_items, REQUIRED_COLUMNS};
pub use loan::{appraise_loan, LoanSizing, LoanTerms};
pub use matrix::CashFlowMatrix;
pub use schema::{ColumnKey, CostItem, GroupLevel, NO_DATA};
pub use spreader::spread_costs;
pub use writer::{load_matrix, matrix_to_csv, read_matrix, view_to_csv, write_matrix, write_view};

use log::info;
use std::path::Path;

/// Full pipeline for one project: load and validate the budget file, spread
/// the costs daily, and collapse into calendar-month billing periods.
pub fn monthly_cashflow_from_csv<P: AsRef<Path>>(path: P) -> Result<CashFlowMatrix> {
    let budget = Budget::from_csv(path)?;
    let monthly = budget.to_monthly_cashflow()?;
    info!(
        "Monthly cashflow: {} billing periods, {} columns, total {:.2}",
        monthly.dates().len(),
        monthly.columns().len(),
        monthly.total()
    );
    Ok(monthly)
}
