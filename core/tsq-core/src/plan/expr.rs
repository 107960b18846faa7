//! 필터 함수 본문 표현식
//!
//! Immutable expression tree produced by the semantic front end for the body
//! of a `filter(fn: (r) => ...)` call. Rewrites always build new nodes.

use serde::{Deserialize, Serialize};

/// Reserved property naming the measured value of a row.
pub const FIELD_VALUE_PROPERTY: &str = "_value";

/// 리터럴 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Regular expression source, without delimiters
    Regexp(String),
    /// Unix nanoseconds
    DateTime(i64),
}

impl Literal {
    /// Literal kinds the storage engine can compare against.
    pub fn is_storage_comparable(&self) -> bool {
        !matches!(self, Literal::DateTime(_))
    }
}

/// 단항 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Exists,
    Negate,
}

/// 이항 연산자 (비교, 정규식, 산술)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    RegexMatch,
    NotRegexMatch,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::RegexMatch => "=~",
            BinaryOperator::NotRegexMatch => "!~",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }
}

/// 논리 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

/// 표현식 트리
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal),
    /// Bare identifier, e.g. the filter parameter `r`
    Identifier(String),
    /// `object.property`
    Member {
        object: Box<Expression>,
        property: String,
    },
    Unary {
        op: UnaryOperator,
        argument: Box<Expression>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Logical {
        op: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expression::Literal(Literal::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Literal::Boolean(value))
    }

    pub fn regexp(pattern: impl Into<String>) -> Self {
        Expression::Literal(Literal::Regexp(pattern.into()))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// `param.property`
    pub fn member(param: impl Into<String>, property: impl Into<String>) -> Self {
        Expression::Member {
            object: Box::new(Expression::Identifier(param.into())),
            property: property.into(),
        }
    }

    pub fn unary(op: UnaryOperator, argument: Expression) -> Self {
        Expression::Unary {
            op,
            argument: Box::new(argument),
        }
    }

    pub fn not(argument: Expression) -> Self {
        Self::unary(UnaryOperator::Not, argument)
    }

    pub fn exists(argument: Expression) -> Self {
        Self::unary(UnaryOperator::Exists, argument)
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(op: LogicalOperator, left: Expression, right: Expression) -> Self {
        Expression::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::Or, left, right)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(lit) if lit.is_storage_comparable())
    }
}
