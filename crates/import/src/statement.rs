use std::str::FromStr;

use chrono::NaiveDate;
use kontering_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw transaction fields handed over by the statement extractor, before any
/// normalization. Everything is optional; whatever the export carried is
/// passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub id: Option<String>,
    pub trntype: Option<String>,
}

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("transaction has no posted date")]
    MissingDate,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Parse an OFX timestamp into a date. Banks emit `YYYYMMDD`,
/// `YYYYMMDDHHMMSS`, and variants with a timezone suffix like
/// `20250320120000[-5:EST]`; only the first eight characters matter.
pub fn parse_ofx_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let y: i32 = s.get(0..4)?.parse().ok()?;
    let m: u32 = s.get(4..6)?.parse().ok()?;
    let d: u32 = s.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Parse a statement amount as an exact decimal. Thousands separators are
/// tolerated; the sign is kept as reported.
pub fn parse_ofx_amount(s: &str) -> Option<Decimal> {
    let s = s.trim().replace(',', "");
    Decimal::from_str(&s).ok()
}

/// The statement's own currency wins when it declares one; otherwise the
/// configured account currency applies.
pub fn resolve_currency<'a>(file_currency: Option<&'a str>, configured: &'a str) -> &'a str {
    match file_currency {
        Some(c) if !c.trim().is_empty() => c,
        _ => configured,
    }
}

impl RawTransaction {
    /// Normalize into a typed transaction. The payee is the narration, with
    /// the memo standing in when the payee is missing; the memo only lands in
    /// the field bag when the payee supplied the narration. Id and type go
    /// into the field bag when present.
    pub fn normalize(&self, currency: &str) -> Result<Transaction, StatementError> {
        let date_str = self.date.as_deref().ok_or(StatementError::MissingDate)?;
        let date = parse_ofx_date(date_str)
            .ok_or_else(|| StatementError::InvalidDate(date_str.to_string()))?;

        let amount_str = self.amount.as_deref().unwrap_or("0.00");
        let amount = parse_ofx_amount(amount_str)
            .ok_or_else(|| StatementError::InvalidAmount(amount_str.to_string()))?;

        let payee = self.payee.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let memo = self.memo.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let narration = payee.or(memo).unwrap_or("");

        let mut tx = Transaction::new(date, narration, amount, currency);
        if let Some(id) = self.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            tx = tx.with_field("id", id);
        }
        if let Some(trntype) = self.trntype.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            tx = tx.with_field("type", trntype);
        }
        if payee.is_some() {
            if let Some(memo) = memo {
                tx = tx.with_field("memo", memo);
            }
        }
        Ok(tx)
    }
}

/// Normalize a batch, skipping malformed records the way the importer does:
/// one bad record must not sink the statement.
pub fn normalize_batch(raws: &[RawTransaction], currency: &str) -> Vec<Transaction> {
    raws.iter()
        .enumerate()
        .filter_map(|(idx, raw)| match raw.normalize(currency) {
            Ok(tx) => Some(tx),
            Err(err) => {
                tracing::warn!(index = idx, %err, "skipping malformed statement transaction");
                None
            }
        })
        .collect()
}
