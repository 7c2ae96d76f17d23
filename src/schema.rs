use crate::error::{CashflowError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel used for empty category/type/supplier fields so that every matrix
/// column carries a complete composite key.
pub const NO_DATA: &str = "NoData";

/// One validated budget line: an amount spread evenly over an inclusive date
/// range, identified by the (category, type, supplier) hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub category: String,
    pub cost_type: String,
    pub supplier: String,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CostItem {
    /// Builds a validated item. Empty text fields become [`NO_DATA`]; a
    /// non-finite or non-positive amount, or a start date after the end date,
    /// is rejected.
    pub fn new(
        category: &str,
        cost_type: &str,
        supplier: &str,
        amount: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self> {
        let item = Self {
            category: normalize_field(category),
            cost_type: normalize_field(cost_type),
            supplier: normalize_field(supplier),
            amount,
            start_date,
            end_date,
        };
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CashflowError::InvalidCostItem(format!(
                "amount must be a positive number, got {} for '{}'",
                self.amount, self.category
            )));
        }
        if self.start_date > self.end_date {
            return Err(CashflowError::InvalidCostItem(format!(
                "start_date {} is after end_date {} for '{}'",
                self.start_date, self.end_date, self.category
            )));
        }
        Ok(())
    }

    pub fn key(&self) -> ColumnKey {
        ColumnKey {
            category: self.category.clone(),
            cost_type: self.cost_type.clone(),
            supplier: self.supplier.clone(),
        }
    }
}

/// Normalizes a free-text hierarchy field: trimmed, empty replaced by the
/// [`NO_DATA`] sentinel.
pub fn normalize_field(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NO_DATA.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Composite key identifying one column of the cash flow matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub category: String,
    pub cost_type: String,
    pub supplier: String,
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.cost_type, self.supplier)
    }
}

/// The three levels of the column hierarchy, with explicit key extraction
/// rather than reflection over column labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLevel {
    Category,
    CostType,
    Supplier,
}

impl GroupLevel {
    /// The value a column takes at this hierarchy level.
    pub fn of<'a>(&self, key: &'a ColumnKey) -> &'a str {
        match self {
            GroupLevel::Category => &key.category,
            GroupLevel::CostType => &key.cost_type,
            GroupLevel::Supplier => &key.supplier,
        }
    }

}

impl FromStr for GroupLevel {
    type Err = CashflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cost_category" | "category" => Ok(GroupLevel::Category),
            "cost_type" | "type" => Ok(GroupLevel::CostType),
            "supplier" => Ok(GroupLevel::Supplier),
            other => Err(CashflowError::UnknownGroupLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_item() {
        let item = CostItem::new(
            "Construction costs",
            "Build costs",
            "builder1",
            2_000_000.0,
            date(2020, 4, 1),
            date(2022, 5, 1),
        )
        .unwrap();
        assert_eq!(item.category, "Construction costs");
        assert_eq!(item.key().supplier, "builder1");
    }

    #[test]
    fn test_empty_supplier_becomes_sentinel() {
        let item = CostItem::new(
            "Acquisition costs",
            "Land acquisition costs",
            "  ",
            1_000_000.0,
            date(2020, 1, 1),
            date(2020, 1, 1),
        )
        .unwrap();
        assert_eq!(item.supplier, NO_DATA);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let err = CostItem::new("A", "T", "S", -10.0, date(2020, 1, 1), date(2020, 1, 2));
        assert!(matches!(err, Err(CashflowError::InvalidCostItem(_))));

        let err = CostItem::new("A", "T", "S", 0.0, date(2020, 1, 1), date(2020, 1, 2));
        assert!(matches!(err, Err(CashflowError::InvalidCostItem(_))));

        let err = CostItem::new("A", "T", "S", f64::NAN, date(2020, 1, 1), date(2020, 1, 2));
        assert!(matches!(err, Err(CashflowError::InvalidCostItem(_))));
    }

    #[test]
    fn test_rejects_inverted_date_range() {
        let err = CostItem::new("A", "T", "S", 10.0, date(2020, 1, 2), date(2020, 1, 1));
        assert!(matches!(err, Err(CashflowError::InvalidCostItem(_))));
    }

    #[test]
    fn test_group_level_parsing() {
        assert_eq!(
            "cost_category".parse::<GroupLevel>().unwrap(),
            GroupLevel::Category
        );
        assert_eq!("Supplier".parse::<GroupLevel>().unwrap(), GroupLevel::Supplier);
        assert!(matches!(
            "region".parse::<GroupLevel>(),
            Err(CashflowError::UnknownGroupLevel(_))
        ));
    }

    #[test]
    fn test_level_extraction() {
        let key = ColumnKey {
            category: "Professional fees".to_string(),
            cost_type: "Consultants".to_string(),
            supplier: "consultant1".to_string(),
        };
        assert_eq!(GroupLevel::Category.of(&key), "Professional fees");
        assert_eq!(GroupLevel::CostType.of(&key), "Consultants");
        assert_eq!(GroupLevel::Supplier.of(&key), "consultant1");
    }
}
