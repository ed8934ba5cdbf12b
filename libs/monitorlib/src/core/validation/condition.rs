// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::marker::{Comparison, Condition};
use crate::core::values::{Literal, MonitorValue, Probe, ValueCategory, ValueShape};
use std::cmp::Ordering;
use std::fmt;

/// Built-in predicate over a monitored value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCheck {
    Condition(Condition),
    Compare(Comparison, Literal),
}

impl ValueCheck {
    /// Whether the check means anything for values of `shape`.
    pub fn supports(&self, shape: &ValueShape) -> bool {
        match self {
            ValueCheck::Condition(condition) => condition_supports(*condition, shape),
            ValueCheck::Compare(op, operand) => compare_supports(*op, operand, shape),
        }
    }

    pub fn test<V: MonitorValue>(&self, value: Option<&V>) -> bool {
        let probe = match value {
            Some(v) if !v.is_null() => v.probe(),
            _ => Probe::Null,
        };
        self.evaluate(probe)
    }

    pub fn evaluate(&self, probe: Probe<'_>) -> bool {
        match self {
            ValueCheck::Condition(condition) => evaluate_condition(*condition, probe),
            ValueCheck::Compare(op, operand) => evaluate_comparison(*op, operand, probe),
        }
    }
}

impl fmt::Display for ValueCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCheck::Condition(condition) => write!(f, "{condition:?}"),
            ValueCheck::Compare(op, operand) => write!(f, "value {} {}", op.symbol(), operand),
        }
    }
}

fn condition_supports(condition: Condition, shape: &ValueShape) -> bool {
    use Condition::*;
    match condition {
        IsNull | NotNull => true,
        True | False => shape.category == ValueCategory::Boolean,
        Positive | Negative | Zero | NonZero => shape.is_numeric(),
        NullOrEmpty | NotNullOrEmpty => shape.is_text() || shape.is_collection(),
        NullOrWhitespace | NotNullOrWhitespace => shape.is_text(),
        CollectionEmpty | CollectionNotEmpty => shape.is_collection(),
    }
}

fn compare_supports(op: Comparison, operand: &Literal, shape: &ValueShape) -> bool {
    let equality = matches!(op, Comparison::Equal | Comparison::NotEqual);
    match operand {
        Literal::Null => equality,
        Literal::Bool(_) => equality && shape.category == ValueCategory::Boolean,
        Literal::Int(_) | Literal::Float(_) => shape.is_numeric(),
        Literal::Text(_) => shape.is_text(),
    }
}

fn evaluate_condition(condition: Condition, probe: Probe<'_>) -> bool {
    use Condition::*;
    match condition {
        IsNull => probe == Probe::Null,
        NotNull => probe != Probe::Null,
        True => probe == Probe::Bool(true),
        False => probe == Probe::Bool(false),
        Positive => sign(probe) == Some(Ordering::Greater),
        Negative => sign(probe) == Some(Ordering::Less),
        Zero => sign(probe) == Some(Ordering::Equal),
        NonZero => matches!(probe, Probe::Int(_) | Probe::Number(_)) && sign(probe) != Some(Ordering::Equal),
        NullOrEmpty => match probe {
            Probe::Null => true,
            Probe::Text(text) => text.is_empty(),
            Probe::Collection(len) => len == 0,
            _ => false,
        },
        NotNullOrEmpty => !evaluate_condition(NullOrEmpty, probe),
        NullOrWhitespace => match probe {
            Probe::Null => true,
            Probe::Text(text) => text.trim().is_empty(),
            _ => false,
        },
        NotNullOrWhitespace => !evaluate_condition(NullOrWhitespace, probe),
        // A missing collection is neither empty nor non-empty.
        CollectionEmpty => probe == Probe::Collection(0),
        CollectionNotEmpty => matches!(probe, Probe::Collection(len) if len > 0),
    }
}

/// Sign of a numeric value; `None` for NaN and non-numbers.
fn sign(probe: Probe<'_>) -> Option<Ordering> {
    match probe {
        Probe::Int(n) => Some(n.cmp(&0)),
        Probe::Number(n) => n.partial_cmp(&0.0),
        _ => None,
    }
}

fn evaluate_comparison(op: Comparison, operand: &Literal, probe: Probe<'_>) -> bool {
    let ordering = match (probe, operand) {
        (Probe::Null, Literal::Null) => Some(Ordering::Equal),
        (Probe::Null, _) | (_, Literal::Null) => None,
        (Probe::Bool(v), Literal::Bool(o)) => Some(v.cmp(o)),
        (Probe::Int(v), Literal::Int(o)) => Some(v.cmp(&i128::from(*o))),
        (Probe::Int(v), Literal::Float(o)) => (v as f64).partial_cmp(o),
        (Probe::Number(v), operand) => operand.as_f64().and_then(|o| v.partial_cmp(&o)),
        (Probe::Text(v), Literal::Text(o)) => Some(v.cmp(o.as_str())),
        _ => None,
    };
    match (op, ordering) {
        (Comparison::NotEqual, None) => true,
        (_, None) => false,
        (Comparison::Equal, Some(o)) => o == Ordering::Equal,
        (Comparison::NotEqual, Some(o)) => o != Ordering::Equal,
        (Comparison::Greater, Some(o)) => o == Ordering::Greater,
        (Comparison::GreaterOrEqual, Some(o)) => o != Ordering::Less,
        (Comparison::Less, Some(o)) => o == Ordering::Less,
        (Comparison::LessOrEqual, Some(o)) => o != Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_conditions_only_apply_to_numbers() {
        let positive = ValueCheck::Condition(Condition::Positive);
        assert!(positive.supports(&f32::SHAPE));
        assert!(positive.supports(&Option::<i32>::SHAPE));
        assert!(!positive.supports(&String::SHAPE));
        assert!(!positive.supports(&bool::SHAPE));

        assert!(positive.test(Some(&3i32)));
        assert!(!positive.test(Some(&-3i32)));
        assert!(!positive.test::<i32>(None));
    }

    #[test]
    fn test_null_and_empty_conditions() {
        let empty = ValueCheck::Condition(Condition::NullOrEmpty);
        assert!(empty.test::<String>(None));
        assert!(empty.test(Some(&String::new())));
        assert!(!empty.test(Some(&"x".to_string())));
        assert!(empty.test(Some(&Vec::<u8>::new())));
        assert!(empty.test(Some(&Option::<String>::None)));

        let blank = ValueCheck::Condition(Condition::NullOrWhitespace);
        assert!(blank.test(Some(&"  ".to_string())));
        assert!(!ValueCheck::Condition(Condition::NotNullOrWhitespace).test(Some(&" ".to_string())));
    }

    #[test]
    fn test_collection_conditions_ignore_missing_values() {
        let empty = ValueCheck::Condition(Condition::CollectionEmpty);
        let not_empty = ValueCheck::Condition(Condition::CollectionNotEmpty);
        assert!(empty.test(Some(&Vec::<u8>::new())));
        assert!(not_empty.test(Some(&vec![1u8])));
        assert!(!empty.test::<Vec<u8>>(None));
        assert!(!not_empty.test::<Vec<u8>>(None));
    }

    #[test]
    fn test_comparisons_use_natural_ordering() {
        let greater = ValueCheck::Compare(Comparison::Greater, Literal::Int(10));
        assert!(greater.test(Some(&10.5f64)));
        assert!(!greater.test(Some(&10u8)));
        assert!(!greater.test::<Option<u8>>(Some(&None)));

        let before = ValueCheck::Compare(Comparison::Less, Literal::Text("m".into()));
        assert!(before.test(Some(&"alpha".to_string())));
        assert!(!before.test(Some(&"zulu".to_string())));

        let not_null = ValueCheck::Compare(Comparison::NotEqual, Literal::Null);
        assert!(not_null.test(Some(&Some(1u8))));
        assert!(!not_null.test::<Option<u8>>(Some(&None)));
    }

    #[test]
    fn test_integer_comparisons_are_exact() {
        let equal = ValueCheck::Compare(Comparison::Equal, Literal::Int(9_007_199_254_740_992));
        assert!(!equal.test(Some(&9_007_199_254_740_993i64)));
        assert!(equal.test(Some(&9_007_199_254_740_992u64)));

        let greater = ValueCheck::Compare(Comparison::Greater, Literal::Int(i64::MAX - 1));
        assert!(greater.test(Some(&i64::MAX)));
        assert!(greater.test(Some(&u64::MAX)));
        assert!(!greater.test(Some(&(i64::MAX - 1))));

        let below_half = ValueCheck::Compare(Comparison::Less, Literal::Float(0.5));
        assert!(below_half.test(Some(&0u8)));
        assert!(!below_half.test(Some(&1u8)));

        assert!(ValueCheck::Condition(Condition::Positive).test(Some(&u64::MAX)));
        assert!(ValueCheck::Condition(Condition::Zero).test(Some(&0i64)));
        assert!(ValueCheck::Condition(Condition::NonZero).test(Some(&-3i64)));
    }

    #[test]
    fn test_comparison_support_matches_operand_type() {
        let text = ValueCheck::Compare(Comparison::Equal, Literal::Text("a".into()));
        assert!(text.supports(&String::SHAPE));
        assert!(!text.supports(&u32::SHAPE));
        let flag = ValueCheck::Compare(Comparison::Greater, Literal::Bool(true));
        assert!(!flag.supports(&bool::SHAPE));
    }
}
