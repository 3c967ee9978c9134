use kontering_core::{Posting, Transaction};
use rust_decimal::Decimal;

use crate::rule::{AccountSplit, Classification};

/// Builds the balancing side of a ledger entry from a classification outcome.
///
/// The primary posting (the card/bank account, carrying the statement amount)
/// is the caller's; this produces the opposing postings. Split percentages
/// are applied as configured: a sum under 100 leaves part of the amount
/// unallocated for the caller to balance, a sum over 100 shows up as a
/// downstream balancing error.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    default_account: Option<String>,
    review_split: Option<Decimal>,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler::default()
    }

    /// Route unmatched transactions to a fallback account in full.
    pub fn with_default_account(mut self, account: impl Into<String>) -> Self {
        self.default_account = Some(account.into());
        self
    }

    /// Review workflow: keep `percentage` of every matched amount in the
    /// fallback account and scale the matched splits down accordingly. A
    /// review split requires a fallback account; both are set in one call.
    pub fn with_review_split(mut self, account: impl Into<String>, percentage: Decimal) -> Self {
        self.default_account = Some(account.into());
        self.review_split = Some(percentage);
        self
    }

    pub fn postings(&self, classification: Classification<'_>, tx: &Transaction) -> Vec<Posting> {
        let balancing = -tx.amount;
        match classification {
            Classification::Matched(rule) => {
                let mut splits = rule.action().splits();
                if let (Some(account), Some(review)) = (&self.default_account, self.review_split) {
                    let scale = (Decimal::ONE_HUNDRED - review) / Decimal::ONE_HUNDRED;
                    for split in &mut splits {
                        split.percentage *= scale;
                    }
                    splits.push(AccountSplit::new(account.clone(), review));
                }

                let mut postings: Vec<Posting> = splits
                    .iter()
                    .map(|split| {
                        Posting::new(
                            split.account.clone(),
                            balancing * split.percentage / Decimal::ONE_HUNDRED,
                            tx.currency.clone(),
                        )
                    })
                    .collect();

                for shared in rule.shared_with() {
                    let portion = balancing * shared.percentage / Decimal::ONE_HUNDRED;
                    postings.push(Posting::new(
                        shared.receivable_account.clone(),
                        portion,
                        tx.currency.clone(),
                    ));
                    postings.push(Posting::new(
                        shared.offset_account.clone(),
                        -portion,
                        tx.currency.clone(),
                    ));
                }

                postings
            }
            Classification::Unmatched => match &self.default_account {
                Some(account) => vec![Posting::new(account.clone(), balancing, tx.currency.clone())],
                None => Vec::new(),
            },
        }
    }
}
