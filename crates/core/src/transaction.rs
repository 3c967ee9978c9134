use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized statement transaction, ready for classification.
///
/// The amount is signed exactly as the statement reported it (negative for
/// outflows on credit-card exports); classification compares it as given and
/// never infers sign intent. `fields` is an open-ended metadata bag: raw
/// transaction type, FITID, memo and whatever else the statement carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub narration: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        narration: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Transaction {
            date,
            narration: narration.into(),
            amount,
            currency: currency.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a metadata field. Absent keys are an expected outcome, not an
    /// error.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}
