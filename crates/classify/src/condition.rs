use kontering_core::Transaction;
use regex::RegexBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rule::RuleError;

/// Text matching over narrations and metadata fields.
///
/// Literal matching is plain containment; the case-insensitive variant folds
/// both sides to uppercase (the pattern is stored pre-folded). Regex matching
/// uses search semantics, so the pattern may hit anywhere unless it anchors
/// itself, and case-insensitivity is a compile flag rather than runtime
/// folding to keep metacharacter semantics intact.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    Literal { pattern: String, fold_case: bool },
    Regex { regex: regex::Regex, case_insensitive: bool },
}

impl TextMatcher {
    pub fn literal(pattern: &str, case_insensitive: bool) -> Self {
        let pattern = if case_insensitive {
            pattern.to_uppercase()
        } else {
            pattern.to_string()
        };
        TextMatcher::Literal {
            pattern,
            fold_case: case_insensitive,
        }
    }

    /// Compiles the pattern up front; a pattern that does not compile is a
    /// configuration error, never an evaluation-time one.
    pub fn regex(pattern: &str, case_insensitive: bool) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(TextMatcher::Regex {
            regex,
            case_insensitive,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatcher::Literal {
                pattern,
                fold_case: false,
            } => text.contains(pattern.as_str()),
            TextMatcher::Literal {
                pattern,
                fold_case: true,
            } => text.to_uppercase().contains(pattern.as_str()),
            TextMatcher::Regex { regex, .. } => regex.is_match(text),
        }
    }
}

impl PartialEq for TextMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                TextMatcher::Literal {
                    pattern: a,
                    fold_case: fa,
                },
                TextMatcher::Literal {
                    pattern: b,
                    fold_case: fb,
                },
            ) => a == b && fa == fb,
            (
                TextMatcher::Regex {
                    regex: a,
                    case_insensitive: ia,
                },
                TextMatcher::Regex {
                    regex: b,
                    case_insensitive: ib,
                },
            ) => a.as_str() == b.as_str() && ia == ib,
            _ => false,
        }
    }
}

/// Amount comparison over exact decimals. The transaction amount is compared
/// as given; callers wanting magnitude-only comparisons transform the sign
/// before classification. `Between` is inclusive on both bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AmountCondition {
    Below { value: Decimal },
    AtMost { value: Decimal },
    Above { value: Decimal },
    AtLeast { value: Decimal },
    Exactly { value: Decimal },
    Between { low: Decimal, high: Decimal },
}

impl AmountCondition {
    pub fn matches(&self, amount: Decimal) -> bool {
        match *self {
            AmountCondition::Below { value } => amount < value,
            AmountCondition::AtMost { value } => amount <= value,
            AmountCondition::Above { value } => amount > value,
            AmountCondition::AtLeast { value } => amount >= value,
            AmountCondition::Exactly { value } => amount == value,
            AmountCondition::Between { low, high } => low <= amount && amount <= high,
        }
    }
}

/// A pure predicate over a transaction. Evaluation is deterministic and
/// total: an absent metadata field is a non-match, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Narration(TextMatcher),
    Amount(AmountCondition),
    Field { name: String, matcher: TextMatcher },
    /// Logical AND, short-circuiting left to right. Empty is vacuously true.
    All(Vec<Condition>),
}

impl Condition {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Condition::Narration(matcher) => matcher.is_match(&tx.narration),
            Condition::Amount(condition) => condition.matches(tx.amount),
            Condition::Field { name, matcher } => {
                tx.field(name).is_some_and(|value| matcher.is_match(value))
            }
            Condition::All(conditions) => conditions.iter().all(|c| c.matches(tx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(narration: &str, amount: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            narration,
            dec(amount),
            "NOK",
        )
    }

    // ── literal matching ──────────────────────────────────────────────────────

    #[test]
    fn literal_is_case_sensitive_by_default() {
        let m = TextMatcher::literal("spotify", false);
        assert!(!m.is_match("SPOTIFY PREMIUM"));
        assert!(m.is_match("Premium spotify Subscription"));
    }

    #[test]
    fn literal_ignorecase_folds_both_sides() {
        let m = TextMatcher::literal("spotify", true);
        assert!(m.is_match("SPOTIFY PREMIUM"));
        assert!(m.is_match("Spotify"));
        assert!(m.is_match("spotify"));
    }

    #[test]
    fn empty_literal_matches_every_narration() {
        let m = TextMatcher::literal("", false);
        assert!(m.is_match("ANYTHING"));
        assert!(m.is_match(""));
    }

    #[test]
    fn literal_metacharacters_are_not_regex() {
        let m = TextMatcher::literal("STORE (NYC)", false);
        assert!(m.is_match("STORE (NYC) Purchase"));
        assert!(!m.is_match("STORE NYC"));
    }

    // ── regex matching ────────────────────────────────────────────────────────

    #[test]
    fn regex_search_is_unanchored() {
        let m = TextMatcher::regex(r"REMA\s*1000", false).unwrap();
        assert!(m.is_match("REMA 1000 OSLO"));
        assert!(m.is_match("REMA1000"));
        assert!(m.is_match("REMA  1000"));
        assert!(!m.is_match("REMA 2000"));
        // \s* allows whitespace only, not arbitrary characters
        assert!(!m.is_match("REMAX1000"));
    }

    #[test]
    fn regex_case_insensitive_compile_flag() {
        let m = TextMatcher::regex(r"rema\s*1000", true).unwrap();
        assert!(m.is_match("REMA 1000"));
        assert!(m.is_match("rema  1000"));
        assert!(!m.is_match("REMAX 1000"));
    }

    #[test]
    fn regex_anchors_when_pattern_anchors() {
        let m = TextMatcher::regex(r"^AMZN|AMAZON", false).unwrap();
        assert!(m.is_match("AMZN*PRIME"));
        assert!(m.is_match("WWW AMAZON MARKETPLACE"));
        assert!(!m.is_match("SHOP AMZN"));
    }

    #[test]
    fn invalid_regex_fails_at_construction() {
        let err = TextMatcher::regex("REMA (1000", false).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    // ── amount conditions ─────────────────────────────────────────────────────

    #[test]
    fn below_is_strict() {
        let c = AmountCondition::Below { value: dec("50") };
        assert!(c.matches(dec("49.99")));
        assert!(!c.matches(dec("50.00")));
    }

    #[test]
    fn exact_decimals_avoid_float_rounding() {
        let c = AmountCondition::Below { value: dec("50") };
        assert!(c.matches(dec("49.999999")));
    }

    #[test]
    fn between_is_inclusive_on_both_bounds() {
        let c = AmountCondition::Between {
            low: dec("50"),
            high: dec("200"),
        };
        assert!(c.matches(dec("50.00")));
        assert!(c.matches(dec("125")));
        assert!(c.matches(dec("200.00")));
        assert!(!c.matches(dec("49.99")));
        assert!(!c.matches(dec("200.01")));
    }

    #[test]
    fn at_most_and_at_least_include_the_bound() {
        assert!(AmountCondition::AtMost { value: dec("100") }.matches(dec("100")));
        assert!(AmountCondition::AtLeast { value: dec("100") }.matches(dec("100")));
        assert!(!AmountCondition::AtMost { value: dec("100") }.matches(dec("100.01")));
        assert!(!AmountCondition::AtLeast { value: dec("100") }.matches(dec("99.99")));
    }

    #[test]
    fn exactly_compares_values_not_representations() {
        let c = AmountCondition::Exactly { value: dec("100") };
        assert!(c.matches(dec("100.00")));
        assert!(!c.matches(dec("99.99")));
    }

    #[test]
    fn amount_is_compared_as_signed() {
        // No magnitude folding: -50 is below 50.
        let c = AmountCondition::Below { value: dec("50") };
        assert!(c.matches(dec("-742.18")));
        let c = AmountCondition::Above { value: dec("500") };
        assert!(!c.matches(dec("-742.18")));
    }

    // ── field and conjunction ─────────────────────────────────────────────────

    #[test]
    fn absent_field_is_a_non_match() {
        let c = Condition::Field {
            name: "to_account".to_string(),
            matcher: TextMatcher::literal("98712345678", false),
        };
        assert!(!c.matches(&tx("Any narration", "100")));
        assert!(!c.matches(&tx("Any narration", "100").with_field("other", "98712345678")));
    }

    #[test]
    fn present_field_uses_text_matching() {
        let c = Condition::Field {
            name: "to_account".to_string(),
            matcher: TextMatcher::literal("98712345678", false),
        };
        let hit = tx("Any", "100").with_field("to_account", "Transfer to 98712345678");
        let miss = tx("Any", "100").with_field("to_account", "12345678");
        assert!(c.matches(&hit));
        assert!(!c.matches(&miss));
    }

    #[test]
    fn all_requires_every_condition() {
        let c = Condition::All(vec![
            Condition::Narration(TextMatcher::literal("VINMONOPOLET", false)),
            Condition::Amount(AmountCondition::Above { value: dec("500") }),
        ]);
        assert!(c.matches(&tx("VINMONOPOLET GRUNERLOKKA", "742.18")));
        assert!(!c.matches(&tx("VINMONOPOLET GRUNERLOKKA", "50.00")));
        assert!(!c.matches(&tx("OTHER STORE", "742.18")));
    }

    #[test]
    fn empty_conjunction_is_vacuously_true() {
        assert!(Condition::All(Vec::new()).matches(&tx("ANY", "1")));
    }
}
