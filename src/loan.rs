use crate::utils::round2;
use serde::{Deserialize, Serialize};

/// Commercial terms of a construction loan facility. Pure reference data for
/// reporting; none of the cash flow arithmetic depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub total_commitment: f64,
    pub capital_commitment: f64,
    pub ltc_covenant: f64,
    pub ltv_covenant: f64,
    pub duration_months: u32,
    pub arrangement_fee_pct: f64,
    pub margin_pct: f64,
    pub non_utilisation_fee_pct: f64,
    pub exit_fee_pct: f64,
}

impl LoanTerms {
    pub fn arrangement_fee(&self) -> f64 {
        round2(self.total_commitment * self.arrangement_fee_pct / 100.0)
    }

    pub fn exit_fee(&self) -> f64 {
        round2(self.total_commitment * self.exit_fee_pct / 100.0)
    }
}

/// Outcome of sizing a loan against a project's total costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSizing {
    pub loan_amount: f64,
    pub interest: f64,
    pub equity: f64,
}

impl LoanSizing {
    /// Costs plus rolled-up interest: the funding the project must raise.
    pub fn total_funding_needed(&self, total_costs: f64) -> f64 {
        round2(total_costs + self.interest)
    }
}

/// Sizes a loan as a percentage of total project costs with simple interest
/// over the facility duration; the balance of costs is funded by equity.
pub fn appraise_loan(
    total_costs: f64,
    funding_pct: f64,
    annual_rate: f64,
    duration_years: f64,
) -> LoanSizing {
    let loan_amount = round2(total_costs * funding_pct / 100.0);
    let interest = round2(loan_amount * annual_rate * duration_years);
    let equity = round2(total_costs - loan_amount);
    LoanSizing {
        loan_amount,
        interest,
        equity,
    }
}
