//! 플랜 모듈 — 연산 사양, 표현식, 그래프, 패턴

pub mod expr;
pub mod graph;
pub mod pattern;
pub mod types;

pub use expr::{BinaryOperator, Expression, Literal, LogicalOperator, UnaryOperator};
pub use graph::{NodeId, PlanGraph, PlanNode};
pub use pattern::Pattern;
pub use types::*;
