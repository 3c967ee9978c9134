pub mod assemble;
pub mod builder;
pub mod condition;
pub mod rule;

pub use assemble::Assembler;
pub use builder::{amount, field, matching, when, RuleBuilder};
pub use condition::{AmountCondition, Condition, TextMatcher};
pub use rule::{
    AccountSplit, Action, Classification, Rule, RuleError, RuleSet, RuleSpec, SharedExpense,
};
