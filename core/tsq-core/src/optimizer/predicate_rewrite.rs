//! 술어 정규화
//!
//! Brings a pushable expression into the operator set storage accepts:
//! `not (a == b)` → `a != b`, `not (a != b)` → `a == b`,
//! `exists tag` → `tag != ""`. Nodes are copied only when a child changed.

use crate::plan::expr::{BinaryOperator, Expression, UnaryOperator};

/// Returns the rewritten expression and whether anything changed.
pub fn rewrite_pushable_expr(expr: &Expression) -> (Expression, bool) {
    match rewrite(expr) {
        Some(rewritten) => (rewritten, true),
        None => (expr.clone(), false),
    }
}

/// `None` when `expr` needs no rewrite.
fn rewrite(expr: &Expression) -> Option<Expression> {
    match expr {
        Expression::Unary { op, argument } => {
            let rewritten_arg = rewrite(argument);
            let changed = rewritten_arg.is_some();
            let argument = rewritten_arg.unwrap_or_else(|| (**argument).clone());

            match op {
                UnaryOperator::Not => {
                    if let Expression::Binary { op, left, right } = &argument {
                        let flipped = match op {
                            BinaryOperator::Equal => Some(BinaryOperator::NotEqual),
                            BinaryOperator::NotEqual => Some(BinaryOperator::Equal),
                            _ => None,
                        };
                        if let Some(flipped) = flipped {
                            return Some(Expression::Binary {
                                op: flipped,
                                left: left.clone(),
                                right: right.clone(),
                            });
                        }
                    }
                }
                UnaryOperator::Exists => {
                    return Some(Expression::binary(
                        BinaryOperator::NotEqual,
                        argument,
                        Expression::string(""),
                    ));
                }
                UnaryOperator::Negate => {}
            }

            changed.then(|| Expression::unary(*op, argument))
        }
        Expression::Binary { op, left, right } => {
            rewrite_children(left, right).map(|(left, right)| Expression::binary(*op, left, right))
        }
        Expression::Logical { op, left, right } => {
            rewrite_children(left, right).map(|(left, right)| Expression::logical(*op, left, right))
        }
        _ => None,
    }
}

fn rewrite_children(left: &Expression, right: &Expression) -> Option<(Expression, Expression)> {
    let new_left = rewrite(left);
    let new_right = rewrite(right);
    if new_left.is_none() && new_right.is_none() {
        return None;
    }
    Some((
        new_left.unwrap_or_else(|| left.clone()),
        new_right.unwrap_or_else(|| right.clone()),
    ))
}
