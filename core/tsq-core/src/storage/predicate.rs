//! Storage predicate wire form
//!
//! The scan request carries a predicate restricted to literal-right
//! comparisons joined by and/or. [`to_storage_predicate`] translates an
//! already rewritten pushable expression; [`merge_predicates`] joins two
//! predicates that were pushed separately.

use serde::{Deserialize, Serialize};

use crate::error::{TsqError, TsqResult};
use crate::plan::expr::{
    BinaryOperator, Expression, FIELD_VALUE_PROPERTY, Literal, LogicalOperator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateLogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    RegexMatch,
    NotRegexMatch,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl TryFrom<BinaryOperator> for ComparisonOp {
    type Error = TsqError;

    fn try_from(op: BinaryOperator) -> TsqResult<Self> {
        match op {
            BinaryOperator::Equal => Ok(ComparisonOp::Equal),
            BinaryOperator::NotEqual => Ok(ComparisonOp::NotEqual),
            BinaryOperator::RegexMatch => Ok(ComparisonOp::RegexMatch),
            BinaryOperator::NotRegexMatch => Ok(ComparisonOp::NotRegexMatch),
            BinaryOperator::LessThan => Ok(ComparisonOp::Less),
            BinaryOperator::LessThanEqual => Ok(ComparisonOp::LessEqual),
            BinaryOperator::GreaterThan => Ok(ComparisonOp::Greater),
            BinaryOperator::GreaterThanEqual => Ok(ComparisonOp::GreaterEqual),
            other => Err(TsqError::PredicateTranslation(format!(
                "operator {} is not a storage comparison",
                other.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredicateNode {
    Logical {
        op: PredicateLogicalOp,
        children: Vec<PredicateNode>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<PredicateNode>,
        right: Box<PredicateNode>,
    },
    TagRef(String),
    FieldRef(String),
    StringValue(String),
    IntegerValue(i64),
    FloatValue(f64),
    BooleanValue(bool),
    RegexValue(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Predicate {
    pub root: Option<PredicateNode>,
}

impl Predicate {
    pub fn new(root: PredicateNode) -> Self {
        Self { root: Some(root) }
    }
}

/// Converts a rewritten pushable expression over `param` to wire form.
pub fn to_storage_predicate(expr: &Expression, param: &str) -> TsqResult<Predicate> {
    Ok(Predicate::new(to_storage_node(expr, param)?))
}

fn to_storage_node(expr: &Expression, param: &str) -> TsqResult<PredicateNode> {
    match expr {
        Expression::Logical { op, left, right } => {
            let op = match op {
                LogicalOperator::And => PredicateLogicalOp::And,
                LogicalOperator::Or => PredicateLogicalOp::Or,
            };
            Ok(PredicateNode::Logical {
                op,
                children: vec![to_storage_node(left, param)?, to_storage_node(right, param)?],
            })
        }
        Expression::Binary { op, left, right } => Ok(PredicateNode::Comparison {
            op: ComparisonOp::try_from(*op)?,
            left: Box::new(to_storage_node(left, param)?),
            right: Box::new(to_storage_node(right, param)?),
        }),
        Expression::Member { object, property } => match &**object {
            Expression::Identifier(name) if name == param => {
                if property == FIELD_VALUE_PROPERTY {
                    Ok(PredicateNode::FieldRef(property.clone()))
                } else {
                    Ok(PredicateNode::TagRef(property.clone()))
                }
            }
            other => Err(TsqError::PredicateTranslation(format!(
                "member .{} is not rooted at parameter {}: {:?}",
                property, param, other
            ))),
        },
        Expression::Literal(lit) => match lit {
            Literal::String(v) => Ok(PredicateNode::StringValue(v.clone())),
            Literal::Integer(v) => Ok(PredicateNode::IntegerValue(*v)),
            Literal::Float(v) => Ok(PredicateNode::FloatValue(*v)),
            Literal::Boolean(v) => Ok(PredicateNode::BooleanValue(*v)),
            Literal::Regexp(v) => Ok(PredicateNode::RegexValue(v.clone())),
            Literal::DateTime(_) => Err(TsqError::PredicateTranslation(
                "datetime literals cannot be compared by storage".to_string(),
            )),
        },
        Expression::Identifier(name) => Err(TsqError::PredicateTranslation(format!(
            "bare identifier {} in predicate",
            name
        ))),
        Expression::Unary { op, .. } => Err(TsqError::PredicateTranslation(format!(
            "unary {:?} must be rewritten before translation",
            op
        ))),
    }
}

/// Joins two pushed predicates with `op`. Neither side may be empty.
pub fn merge_predicates(
    op: PredicateLogicalOp,
    left: &Predicate,
    right: &Predicate,
) -> TsqResult<Predicate> {
    match (&left.root, &right.root) {
        (Some(l), Some(r)) => Ok(Predicate::new(PredicateNode::Logical {
            op,
            children: vec![l.clone(), r.clone()],
        })),
        _ => Err(TsqError::PredicateTranslation(
            "predicate root cannot be empty".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_eq(v: &str) -> Expression {
        Expression::binary(
            BinaryOperator::Equal,
            Expression::member("r", "host"),
            Expression::string(v),
        )
    }

    #[test]
    fn test_tag_and_field_refs() {
        let expr = Expression::and(
            host_eq("a"),
            Expression::binary(
                BinaryOperator::GreaterThan,
                Expression::member("r", "_value"),
                Expression::float(1.5),
            ),
        );
        let pred = to_storage_predicate(&expr, "r").unwrap();
        let expected = PredicateNode::Logical {
            op: PredicateLogicalOp::And,
            children: vec![
                PredicateNode::Comparison {
                    op: ComparisonOp::Equal,
                    left: Box::new(PredicateNode::TagRef("host".to_string())),
                    right: Box::new(PredicateNode::StringValue("a".to_string())),
                },
                PredicateNode::Comparison {
                    op: ComparisonOp::Greater,
                    left: Box::new(PredicateNode::FieldRef("_value".to_string())),
                    right: Box::new(PredicateNode::FloatValue(1.5)),
                },
            ],
        };
        assert_eq!(pred.root, Some(expected));
    }

    #[test]
    fn test_unrewritten_unary_fails() {
        let expr = Expression::exists(Expression::member("r", "host"));
        let err = to_storage_predicate(&expr, "r").unwrap_err();
        assert!(matches!(err, TsqError::PredicateTranslation(_)));
    }

    #[test]
    fn test_foreign_member_fails() {
        let expr = Expression::binary(
            BinaryOperator::Equal,
            Expression::member("other", "host"),
            Expression::string("a"),
        );
        assert!(to_storage_predicate(&expr, "r").is_err());
    }

    #[test]
    fn test_arithmetic_operator_fails() {
        let expr = Expression::binary(
            BinaryOperator::Add,
            Expression::member("r", "_value"),
            Expression::integer(1),
        );
        assert!(to_storage_predicate(&expr, "r").is_err());
    }

    #[test]
    fn test_merge_predicates() {
        let a = to_storage_predicate(&host_eq("a"), "r").unwrap();
        let b = to_storage_predicate(&host_eq("b"), "r").unwrap();
        let merged = merge_predicates(PredicateLogicalOp::And, &a, &b).unwrap();
        match merged.root {
            Some(PredicateNode::Logical { op, children }) => {
                assert_eq!(op, PredicateLogicalOp::And);
                assert_eq!(children.len(), 2);
                assert_eq!(Some(children[0].clone()), a.root);
                assert_eq!(Some(children[1].clone()), b.root);
            }
            other => panic!("Expected logical root, got: {:?}", other),
        }
    }

    #[test]
    fn test_merge_rejects_empty_root() {
        let a = to_storage_predicate(&host_eq("a"), "r").unwrap();
        let err = merge_predicates(PredicateLogicalOp::And, &a, &Predicate::default()).unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_predicate_json_round_trip() {
        let pred = to_storage_predicate(&host_eq("a"), "r").unwrap();
        let json = serde_json::to_string(&pred).unwrap();
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pred);
    }
}
