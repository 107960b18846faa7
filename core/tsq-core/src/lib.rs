//! # TSQ — Time-Series Query Storage Push-Down
//!
//! TSQ는 시계열 쿼리 플래너의 물리 최적화 단계입니다.
//! 논리 플랜(`from |> range |> filter |> ...`)을 재작성하여 storage 엔진이 직접
//! 평가할 수 있는 연산을 `Read*` 노드로 내려 보냅니다.
//!
//! ## 주요 특징
//!
//! - **Predicate push-down**: 태그/필드 비교를 storage 스캔 술어로 이동
//! - **구조 push-down**: range, group, tag keys, tag values
//! - **Capability 기반 집계**: 윈도우 집계와 그룹 count는 storage 지원 + feature flag 필요
//! - **고정점 스케줄러**: 규칙이 더 이상 구조를 바꾸지 않을 때까지 반복
//!
//! ## 빠른 시작
//!
//! ```rust
//! use tsq_core::engine::RewriteContext;
//! use tsq_core::optimizer::PhysicalOptimizer;
//! use tsq_core::plan::{
//!     BinaryOperator, Bounds, BucketRef, Expression, FilterSpec, FromSpec, FunctionExpr,
//!     PlanGraph, ProcedureKind, ProcedureSpec, RangeSpec,
//! };
//!
//! # fn main() -> tsq_core::TsqResult<()> {
//! let mut plan = PlanGraph::new();
//! let from = plan.add_node(
//!     ProcedureSpec::From(FromSpec { bucket: BucketRef::named("telegraf"), org: None, host: None }),
//!     &[],
//! )?;
//! let range = plan.add_node(
//!     ProcedureSpec::Range(RangeSpec { bounds: Bounds::absolute(0, 3_600_000_000_000) }),
//!     &[from],
//! )?;
//! let filter = plan.add_node(
//!     ProcedureSpec::Filter(FilterSpec {
//!         func: FunctionExpr::new(
//!             "r",
//!             Expression::binary(
//!                 BinaryOperator::Equal,
//!                 Expression::member("r", "host"),
//!                 Expression::string("server01"),
//!             ),
//!         ),
//!         keep_empty_tables: false,
//!     }),
//!     &[range],
//! )?;
//!
//! PhysicalOptimizer::default().optimize(&RewriteContext::default(), &mut plan)?;
//!
//! // from + range + filter → 하나의 ReadRange
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan.kind(filter)?, ProcedureKind::ReadRange);
//! # Ok(())
//! # }
//! ```
//!
//! ## 최적화 파이프라인
//!
//! ```text
//! LogicalPlan → [FromStorage → Range → Filter → Group → TagKeys → TagValues
//!               → SortedPivot → WindowAggregate → GroupAggregate]* → PhysicalPlan
//! ```
//!
//! ## 모듈 구조
//!
//! - [`plan`] — 연산 사양, 표현식, 플랜 그래프, 패턴
//! - [`optimizer`] — 재작성 규칙과 고정점 스케줄러 ([`PhysicalOptimizer`])
//! - [`storage`] — storage 술어 형식, capability
//! - [`engine`] — 설정, feature flag, 패스 컨텍스트

pub mod engine;
pub mod error;
pub mod optimizer;
pub mod plan;
pub mod storage;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use engine::{Feature, FeatureFlags, OptimizerConfig, RewriteContext};
pub use error::{TsqError, TsqResult};
pub use optimizer::{PhysicalOptimizer, Rewrite, Rule, RuleRegistry};
pub use plan::{NodeId, PlanGraph};
