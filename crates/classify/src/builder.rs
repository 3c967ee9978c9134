//! Fluent rule construction.
//!
//! ```
//! use kontering_classify::{amount, matching, when, RuleSet};
//! use rust_decimal::Decimal;
//!
//! let rules = RuleSet::new(vec![
//!     matching("VINMONOPOLET")
//!         .when(amount::above(500))
//!         .route_to("Expenses:Alcohol:Expensive")?,
//!     matching("VINMONOPOLET").route_to("Expenses:Groceries")?,
//!     matching("COSTCO").split([
//!         ("Expenses:Groceries", Decimal::from(80)),
//!         ("Expenses:Household", Decimal::from(20)),
//!     ])?,
//!     when(amount::below(50)).route_to("Expenses:PettyCash")?,
//! ]);
//! # Ok::<(), kontering_classify::RuleError>(())
//! ```
//!
//! The builder is sugar over [`RuleSpec`]: chained calls fill in the same flat
//! record a configuration file would, and the terminal call compiles it
//! through the same path, so both construction forms yield identical rules.

use rust_decimal::Decimal;

use crate::rule::{AccountSplit, Rule, RuleError, RuleSpec, SharedExpense};

/// Start a rule from a narration pattern (literal containment until
/// [`RuleBuilder::regex`] is chained).
pub fn matching(pattern: impl Into<String>) -> RuleBuilder {
    RuleBuilder {
        spec: RuleSpec {
            narration: Some(pattern.into()),
            ..RuleSpec::default()
        },
    }
}

/// Start a rule from an amount condition alone.
pub fn when(condition: crate::condition::AmountCondition) -> RuleBuilder {
    RuleBuilder {
        spec: RuleSpec {
            amount: Some(condition),
            ..RuleSpec::default()
        },
    }
}

/// Start a rule from a metadata field test.
pub fn field(name: impl Into<String>, pattern: impl Into<String>) -> RuleBuilder {
    RuleBuilder::default().field(name, pattern)
}

/// Amount condition constructors for the fluent form.
pub mod amount {
    use rust_decimal::Decimal;

    use crate::condition::AmountCondition;

    pub fn below(value: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::Below {
            value: value.into(),
        }
    }

    pub fn at_most(value: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::AtMost {
            value: value.into(),
        }
    }

    pub fn above(value: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::Above {
            value: value.into(),
        }
    }

    pub fn at_least(value: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::AtLeast {
            value: value.into(),
        }
    }

    pub fn exactly(value: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::Exactly {
            value: value.into(),
        }
    }

    /// Inclusive on both bounds.
    pub fn between(low: impl Into<Decimal>, high: impl Into<Decimal>) -> AmountCondition {
        AmountCondition::Between {
            low: low.into(),
            high: high.into(),
        }
    }
}

/// Chainable rule configuration; [`RuleBuilder::route_to`] or
/// [`RuleBuilder::split`] finalizes into an immutable [`Rule`]. Pattern
/// compilation happens at finalization, so a bad regex fails there: still
/// configuration time, never classification time.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    spec: RuleSpec,
}

impl RuleBuilder {
    /// Treat the narration pattern as a regex.
    pub fn regex(mut self) -> Self {
        self.spec.regex = true;
        self
    }

    /// Case-insensitive narration and field matching.
    pub fn ignorecase(mut self) -> Self {
        self.spec.case_insensitive = true;
        self
    }

    /// Additionally require an amount condition.
    pub fn when(mut self, condition: crate::condition::AmountCondition) -> Self {
        self.spec.amount = Some(condition);
        self
    }

    /// Additionally require a metadata field to match.
    pub fn field(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.spec.fields.insert(name.into(), pattern.into());
        self
    }

    /// Treat field patterns as regexes.
    pub fn fields_regex(mut self) -> Self {
        self.spec.fields_regex = true;
        self
    }

    /// Mark a share of the expense as owed back, offset against the default
    /// reimbursements account.
    pub fn shared_with(mut self, receivable_account: impl Into<String>, percentage: Decimal) -> Self {
        self.spec
            .shared_with
            .push(SharedExpense::new(receivable_account, percentage));
        self
    }

    /// Like [`RuleBuilder::shared_with`] with an explicit offset account.
    pub fn shared_with_offset(
        mut self,
        receivable_account: impl Into<String>,
        offset_account: impl Into<String>,
        percentage: Decimal,
    ) -> Self {
        self.spec.shared_with.push(SharedExpense::with_offset(
            receivable_account,
            offset_account,
            percentage,
        ));
        self
    }

    pub fn route_to(mut self, account: impl Into<String>) -> Result<Rule, RuleError> {
        self.spec.account = Some(account.into());
        self.spec.compile()
    }

    pub fn split<S, I>(mut self, entries: I) -> Result<Rule, RuleError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Decimal)>,
    {
        self.spec.splits = entries
            .into_iter()
            .map(|(account, percentage)| AccountSplit::new(account, percentage))
            .collect();
        self.spec.compile()
    }
}
