//! 표현식 분류기
//!
//! Decides whether a filter-body expression may be evaluated by the storage
//! engine. Pure functions; "not pushable" is an answer, never an error.

use crate::plan::expr::{
    BinaryOperator, Expression, FIELD_VALUE_PROPERTY, Literal, UnaryOperator,
};

/// The member expression's property, if `expr` is `param.<property>`.
fn member_property<'a>(param: &str, expr: &'a Expression) -> Option<&'a str> {
    match expr {
        Expression::Member { object, property } => match &**object {
            Expression::Identifier(name) if name == param => Some(property.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// `param.<anything but _value>`
pub fn is_tag(param: &str, expr: &Expression) -> bool {
    member_property(param, expr).is_some_and(|p| p != FIELD_VALUE_PROPERTY)
}

/// `param._value`
pub fn is_field(param: &str, expr: &Expression) -> bool {
    member_property(param, expr).is_some_and(|p| p == FIELD_VALUE_PROPERTY)
}

pub fn is_pushable_tag_operator(op: BinaryOperator) -> bool {
    matches!(
        op,
        BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::RegexMatch
            | BinaryOperator::NotRegexMatch
    )
}

/// Fields take everything tags take, plus ordering comparisons.
pub fn is_pushable_field_operator(op: BinaryOperator) -> bool {
    is_pushable_tag_operator(op)
        || matches!(
            op,
            BinaryOperator::LessThan
                | BinaryOperator::LessThanEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterThanEqual
        )
}

pub fn is_pushable(param: &str, expr: &Expression) -> bool {
    match expr {
        // No partial push inside a logical node.
        Expression::Logical { left, right, .. } => {
            is_pushable(param, left) && is_pushable(param, right)
        }
        Expression::Unary { .. } => is_pushable_unary(param, expr),
        Expression::Binary { op, left, right } => is_pushable_binary(param, *op, left, right),
        _ => false,
    }
}

fn is_pushable_unary(param: &str, expr: &Expression) -> bool {
    match expr {
        Expression::Unary {
            op: UnaryOperator::Not,
            argument,
        } => is_pushable_unary(param, argument),
        Expression::Unary {
            op: UnaryOperator::Exists,
            argument,
        } => is_tag(param, argument),
        _ => false,
    }
}

fn is_pushable_binary(
    param: &str,
    op: BinaryOperator,
    left: &Expression,
    right: &Expression,
) -> bool {
    if !right.is_literal() {
        return false;
    }

    // Storage cannot tell an empty tag value from a missing tag, so
    // `tag == ""` would change results. `tag != ""` stays pushable.
    if op == BinaryOperator::Equal
        && is_tag(param, left)
        && matches!(right, Expression::Literal(Literal::String(s)) if s.is_empty())
    {
        return false;
    }

    (is_field(param, left) && is_pushable_field_operator(op))
        || (is_tag(param, left) && is_pushable_tag_operator(op))
}
