use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of a ledger entry: an account and a signed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,
    pub amount: Decimal,
    pub currency: String,
}

impl Posting {
    pub fn new(account: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        Posting {
            account: account.into(),
            amount,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {} {}", self.account, self.amount, self.currency)
    }
}

/// Sum of posting amounts. A balanced entry totals zero once the primary
/// posting is included.
pub fn total(postings: &[Posting]) -> Decimal {
    postings.iter().map(|p| p.amount).sum()
}
