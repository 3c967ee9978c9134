use std::collections::HashSet;

use kontering_core::Transaction;

/// Field-bag key carrying the statement's unique transaction id (FITID).
pub const ID_FIELD: &str = "id";

/// Bookkeeping for already-recorded statement transaction ids. Seeded from
/// the existing ledger's metadata so re-importing a statement does not
/// duplicate entries. Purely in-memory; persistence belongs to the caller.
#[derive(Debug, Clone, Default)]
pub struct FitidIndex {
    seen: HashSet<String>,
}

impl FitidIndex {
    pub fn new() -> Self {
        FitidIndex::default()
    }

    pub fn from_existing<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FitidIndex {
            seen: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record an id; returns false when it was already present.
    pub fn record(&mut self, id: impl Into<String>) -> bool {
        self.seen.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drop transactions whose id was already recorded and record the new
    /// ones. Transactions without an id always pass through; there is
    /// nothing to deduplicate on.
    pub fn retain_new(&mut self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter(|tx| match tx.field(ID_FIELD) {
                Some(id) => {
                    if self.seen.contains(id) {
                        tracing::debug!(id, "skipping duplicate transaction");
                        false
                    } else {
                        self.seen.insert(id.to_string());
                        true
                    }
                }
                None => true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(narration: &str, id: Option<&str>) -> Transaction {
        let tx = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            narration,
            Decimal::from(-100),
            "NOK",
        );
        match id {
            Some(id) => tx.with_field(ID_FIELD, id),
            None => tx,
        }
    }

    #[test]
    fn seeded_ids_are_filtered_out() {
        let mut index = FitidIndex::from_existing(["FITID001"]);
        let kept = index.retain_new(vec![
            tx("MERCHANT ONE", Some("FITID001")),
            tx("MERCHANT TWO", Some("FITID002")),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].narration, "MERCHANT TWO");
    }

    #[test]
    fn repeated_id_within_a_batch_is_dropped() {
        let mut index = FitidIndex::new();
        let kept = index.retain_new(vec![
            tx("MERCHANT", Some("FITID001")),
            tx("MERCHANT AGAIN", Some("FITID001")),
        ]);
        assert_eq!(kept.len(), 1);
        assert!(index.contains("FITID001"));
    }

    #[test]
    fn idless_transactions_always_pass_through() {
        let mut index = FitidIndex::from_existing(["FITID001"]);
        let kept = index.retain_new(vec![tx("NO ID", None), tx("ALSO NO ID", None)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn record_reports_prior_presence() {
        let mut index = FitidIndex::new();
        assert!(index.record("FITID001"));
        assert!(!index.record("FITID001"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn fresh_index_keeps_everything() {
        let mut index = FitidIndex::new();
        assert!(index.is_empty());
        let kept = index.retain_new(vec![
            tx("A", Some("F1")),
            tx("B", Some("F2")),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(index.len(), 2);
    }
}
