use std::collections::BTreeMap;

use kontering_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::condition::{AmountCondition, Condition, TextMatcher};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid split: {0}")]
    InvalidSplit(String),
    #[error("failed to parse rule config: {0}")]
    Config(#[from] toml::de::Error),
}

/// One destination of a split, as a percentage of the transaction amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSplit {
    pub account: String,
    pub percentage: Decimal,
}

impl AccountSplit {
    pub fn new(account: impl Into<String>, percentage: Decimal) -> Self {
        AccountSplit {
            account: account.into(),
            percentage,
        }
    }
}

/// Share of an expense owed back by someone else. The assembler emits a
/// receivable posting and an equal-and-opposite offset posting per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedExpense {
    pub receivable_account: String,
    #[serde(default = "default_offset_account")]
    pub offset_account: String,
    pub percentage: Decimal,
}

pub const DEFAULT_OFFSET_ACCOUNT: &str = "Income:Reimbursements";

fn default_offset_account() -> String {
    DEFAULT_OFFSET_ACCOUNT.to_string()
}

impl SharedExpense {
    pub fn new(receivable_account: impl Into<String>, percentage: Decimal) -> Self {
        SharedExpense {
            receivable_account: receivable_account.into(),
            offset_account: default_offset_account(),
            percentage,
        }
    }

    pub fn with_offset(
        receivable_account: impl Into<String>,
        offset_account: impl Into<String>,
        percentage: Decimal,
    ) -> Self {
        SharedExpense {
            receivable_account: receivable_account.into(),
            offset_account: offset_account.into(),
            percentage,
        }
    }
}

/// Routing decision attached to a rule. Account names are opaque ledger
/// identifiers; no naming rules are enforced here.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Route(String),
    Split(Vec<AccountSplit>),
}

impl Action {
    pub fn route(account: impl Into<String>) -> Self {
        Action::Route(account.into())
    }

    /// Splits must be non-empty with strictly positive percentages. Sums
    /// under or over 100 are accepted: the remainder stays unallocated, or
    /// surfaces as a downstream balancing error.
    pub fn split(entries: Vec<AccountSplit>) -> Result<Self, RuleError> {
        if entries.is_empty() {
            return Err(RuleError::InvalidSplit("split has no entries".to_string()));
        }
        if let Some(bad) = entries.iter().find(|s| s.percentage <= Decimal::ZERO) {
            return Err(RuleError::InvalidSplit(format!(
                "non-positive percentage {} for {}",
                bad.percentage, bad.account
            )));
        }
        Ok(Action::Split(entries))
    }

    /// The action as a split list; a single account is 100% to that account.
    pub fn splits(&self) -> Vec<AccountSplit> {
        match self {
            Action::Route(account) => vec![AccountSplit::new(account.clone(), Decimal::ONE_HUNDRED)],
            Action::Split(entries) => entries.clone(),
        }
    }
}

/// An immutable condition/action pair. Priority is positional: rules are
/// evaluated in the order they were configured.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    condition: Condition,
    action: Action,
    shared_with: Vec<SharedExpense>,
}

impl Rule {
    pub fn new(condition: Condition, action: Action) -> Self {
        Rule {
            condition,
            action,
            shared_with: Vec::new(),
        }
    }

    pub fn with_shared(mut self, shared_with: Vec<SharedExpense>) -> Self {
        self.shared_with = shared_with;
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.condition.matches(tx)
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn shared_with(&self) -> &[SharedExpense] {
        &self.shared_with
    }
}

/// Outcome of classifying one transaction: the first rule that held, or
/// nothing. `Unmatched` is an expected result, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification<'a> {
    Matched(&'a Rule),
    Unmatched,
}

impl<'a> Classification<'a> {
    pub fn action(&self) -> Option<&'a Action> {
        match *self {
            Classification::Matched(rule) => Some(rule.action()),
            Classification::Unmatched => None,
        }
    }
}

/// Flat, serializable rule record, the configuration-file counterpart of the
/// fluent builder. Both compile to identical [`Rule`] values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSpec {
    pub narration: Option<String>,
    pub regex: bool,
    pub case_insensitive: bool,
    pub amount: Option<AmountCondition>,
    pub fields: BTreeMap<String, String>,
    pub fields_regex: bool,
    pub account: Option<String>,
    pub splits: Vec<AccountSplit>,
    pub shared_with: Vec<SharedExpense>,
}

impl RuleSpec {
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let mut conditions = Vec::new();
        if let Some(pattern) = &self.narration {
            conditions.push(Condition::Narration(self.matcher(pattern, self.regex)?));
        }
        if let Some(condition) = self.amount {
            conditions.push(Condition::Amount(condition));
        }
        for (name, pattern) in &self.fields {
            conditions.push(Condition::Field {
                name: name.clone(),
                matcher: self.matcher(pattern, self.fields_regex)?,
            });
        }
        // A spec with no conditions compiles to a catch-all.
        let condition = if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::All(conditions)
        };

        let action = match (&self.account, self.splits.is_empty()) {
            (Some(account), true) => Action::route(account.clone()),
            (None, false) => Action::split(self.splits.clone())?,
            (Some(_), false) => {
                return Err(RuleError::InvalidSplit(
                    "rule specifies both account and splits".to_string(),
                ))
            }
            (None, true) => {
                return Err(RuleError::InvalidSplit(
                    "rule has no target account or splits".to_string(),
                ))
            }
        };

        Ok(Rule::new(condition, action).with_shared(self.shared_with.clone()))
    }

    fn matcher(&self, pattern: &str, is_regex: bool) -> Result<TextMatcher, RuleError> {
        if is_regex {
            TextMatcher::regex(pattern, self.case_insensitive)
        } else {
            Ok(TextMatcher::literal(pattern, self.case_insensitive))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleSpec>,
}

/// An ordered, immutable rule list. First match wins: order is the only
/// specificity mechanism, so narrow rules go before broad ones. Shadowed or
/// overlapping rules are accepted silently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    /// Compiles an ordered list of flat specs. A single malformed rule aborts
    /// the whole configuration rather than silently dropping out.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, RuleError> {
        specs
            .iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>, _>>()
            .map(RuleSet::new)
    }

    /// Loads a `[[rules]]` list from TOML and compiles it.
    pub fn from_toml(content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(content)?;
        RuleSet::compile(&file.rules)
    }

    pub fn classify(&self, tx: &Transaction) -> Classification<'_> {
        match self.rules.iter().find(|rule| rule.matches(tx)) {
            Some(rule) => {
                tracing::debug!(narration = %tx.narration, action = ?rule.action(), "rule matched");
                Classification::Matched(rule)
            }
            None => {
                tracing::debug!(narration = %tx.narration, "no rule matched");
                Classification::Unmatched
            }
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
