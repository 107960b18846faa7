//! 술어 분할
//!
//! Splits a filter body at its top-level conjunction into the part storage
//! can evaluate and the part that must stay in the filter.
//! `pushable AND remainder` is always equivalent to the input.

use crate::plan::expr::{Expression, LogicalOperator};

use super::classify::is_pushable;

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub pushable: Option<Expression>,
    pub remainder: Option<Expression>,
}

impl Partition {
    pub fn is_fully_pushable(&self) -> bool {
        self.pushable.is_some() && self.remainder.is_none()
    }
}

/// Partitions `expr` for the filter parameter `param`. Conjunct order is
/// kept within each side.
pub fn partition_predicates(param: &str, expr: &Expression) -> Partition {
    let mut conjuncts = Vec::new();
    flatten_conjunction(expr, &mut conjuncts);

    let (pushable, remainder): (Vec<&Expression>, Vec<&Expression>) = conjuncts
        .into_iter()
        .partition(|conjunct| is_pushable(param, conjunct));

    // 한쪽이 비면 입력 구조를 그대로 유지
    if pushable.is_empty() {
        return Partition {
            pushable: None,
            remainder: Some(expr.clone()),
        };
    }
    if remainder.is_empty() {
        return Partition {
            pushable: Some(expr.clone()),
            remainder: None,
        };
    }
    Partition {
        pushable: conjoin(pushable),
        remainder: conjoin(remainder),
    }
}

fn flatten_conjunction<'a>(expr: &'a Expression, out: &mut Vec<&'a Expression>) {
    match expr {
        Expression::Logical {
            op: LogicalOperator::And,
            left,
            right,
        } => {
            flatten_conjunction(left, out);
            flatten_conjunction(right, out);
        }
        other => out.push(other),
    }
}

/// Left-deep `and` chain; `None` for no terms.
fn conjoin(terms: Vec<&Expression>) -> Option<Expression> {
    terms
        .into_iter()
        .cloned()
        .reduce(|acc, next| Expression::and(acc, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::expr::BinaryOperator;

    fn tag_eq(tag: &str, v: &str) -> Expression {
        Expression::binary(
            BinaryOperator::Equal,
            Expression::member("r", tag),
            Expression::string(v),
        )
    }

    fn not_pushable() -> Expression {
        Expression::binary(
            BinaryOperator::GreaterThan,
            Expression::member("r", "host"),
            Expression::string("m"),
        )
    }

    #[test]
    fn test_fully_pushable() {
        let expr = Expression::and(tag_eq("host", "a"), tag_eq("region", "b"));
        let part = partition_predicates("r", &expr);
        assert!(part.is_fully_pushable());
        assert_eq!(part.pushable, Some(expr));
    }

    #[test]
    fn test_nothing_pushable() {
        let expr = not_pushable();
        let part = partition_predicates("r", &expr);
        assert_eq!(part.pushable, None);
        assert_eq!(part.remainder, Some(expr));
    }

    #[test]
    fn test_one_sided_split_keeps_input_shape() {
        let right_deep = |a: Expression, b: Expression, c: Expression| {
            Expression::and(a, Expression::and(b, c))
        };

        let blocked = right_deep(not_pushable(), not_pushable(), not_pushable());
        let part = partition_predicates("r", &blocked);
        assert_eq!(part.pushable, None);
        assert_eq!(part.remainder, Some(blocked));

        let pushed = right_deep(tag_eq("host", "a"), tag_eq("region", "b"), tag_eq("dc", "c"));
        let part = partition_predicates("r", &pushed);
        assert_eq!(part.pushable, Some(pushed));
        assert_eq!(part.remainder, None);
    }

    #[test]
    fn test_partial_split_keeps_order() {
        let expr = Expression::and(
            Expression::and(tag_eq("host", "a"), not_pushable()),
            tag_eq("region", "b"),
        );
        let part = partition_predicates("r", &expr);
        assert_eq!(
            part.pushable,
            Some(Expression::and(tag_eq("host", "a"), tag_eq("region", "b")))
        );
        assert_eq!(part.remainder, Some(not_pushable()));
        assert!(!part.is_fully_pushable());
    }

    #[test]
    fn test_disjunction_is_all_or_nothing() {
        let expr = Expression::or(tag_eq("host", "a"), not_pushable());
        let part = partition_predicates("r", &expr);
        assert_eq!(part.pushable, None);
        assert_eq!(part.remainder, Some(expr));
    }
}
