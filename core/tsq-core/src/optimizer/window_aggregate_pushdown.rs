//! Rule 8: Window Aggregate Pushdown
//!
//! `window() |> {min,max,mean,count,sum}()`를 storage 윈도우 집계로 변환
//!
//! 세 가지 게이트를 모두 통과해야 합니다:
//! 1. storage 연결의 capability (집계 종류별)
//! 2. feature flag (count 전용 / 나머지)
//! 3. 윈도우 정렬 조건 (every == period, offset 0, 기본 컬럼, createEmpty off)

use tracing::trace;

use crate::engine::{Feature, RewriteContext};
use crate::error::{TsqError, TsqResult};
use crate::plan::{
    DEFAULT_START_COLUMN, DEFAULT_STOP_COLUMN, DEFAULT_TIME_COLUMN, DEFAULT_VALUE_COLUMN,
    NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec, ReadWindowAggregateSpec,
    WindowSpec,
};

use super::{Rewrite, Rule};

/// `{min,max,mean,count,sum} ∘ window ∘ ReadRange` → `ReadWindowAggregate`
pub struct PushDownWindowAggregateRule;

impl PushDownWindowAggregateRule {
    fn feature_for(kind: ProcedureKind) -> Feature {
        match kind {
            ProcedureKind::Count => Feature::PushDownWindowAggregateCount,
            _ => Feature::PushDownWindowAggregateRest,
        }
    }

    /// Storage aggregates `_value` only.
    fn targets_value_column(&self, spec: &ProcedureSpec) -> TsqResult<bool> {
        match spec {
            ProcedureSpec::Min(s) | ProcedureSpec::Max(s) => Ok(s.column == DEFAULT_VALUE_COLUMN),
            ProcedureSpec::Mean(s) | ProcedureSpec::Count(s) | ProcedureSpec::Sum(s) => {
                Ok(matches!(s.columns.as_slice(), [c] if c == DEFAULT_VALUE_COLUMN))
            }
            other => Err(TsqError::malformed(
                format!("expected window aggregate spec, found {}", other.kind()),
                self.name(),
            )),
        }
    }

    /// Windows storage can produce: tumbling, fixed-length, unshifted, on
    /// the default columns, without synthesized empty windows.
    fn is_aligned(window: &WindowSpec) -> bool {
        window.every == window.period
            && window.every.months() == 0
            && !window.every.is_negative()
            && !window.every.is_zero()
            && window.offset.is_zero()
            && window.time_column == DEFAULT_TIME_COLUMN
            && window.start_column == DEFAULT_START_COLUMN
            && window.stop_column == DEFAULT_STOP_COLUMN
            && !window.create_empty
    }
}

impl Rule for PushDownWindowAggregateRule {
    fn name(&self) -> &str {
        "PushDownWindowAggregateRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::one_of(ProcedureKind::WINDOW_AGGREGATES).with_predecessor(
            Pattern::kind(ProcedureKind::Window)
                .with_predecessor(Pattern::kind(ProcedureKind::ReadRange)),
        )
    }

    fn rewrite(
        &self,
        ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let Some(capability) = ctx.window_aggregate_capability() else {
            return Ok(Rewrite::Declined);
        };

        let aggregate = graph.spec(node)?;
        let kind = aggregate.kind();
        if !ctx.is_enabled(Self::feature_for(kind)) || !capability.supports(kind) {
            trace!(target: "optimizer", %kind, "window aggregate not enabled or not supported");
            return Ok(Rewrite::Declined);
        }
        if !self.targets_value_column(aggregate)? {
            return Ok(Rewrite::Declined);
        }

        let window_node = graph.single_predecessor(node)?;
        let read_node = graph.single_predecessor(window_node)?;
        let window = graph.spec(window_node)?.expect_window(self.name())?;
        let read = graph.spec(read_node)?.expect_read_range(self.name())?;

        if !Self::is_aligned(window) {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::ReadWindowAggregate(ReadWindowAggregateSpec {
            range: read.clone(),
            aggregates: vec![kind],
            window_every_nanos: window.every.nanoseconds(),
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Duration;

    #[test]
    fn test_alignment_gate() {
        let aligned = WindowSpec::every(Duration::from_mins(5));
        assert!(PushDownWindowAggregateRule::is_aligned(&aligned));

        let sliding = WindowSpec {
            period: Duration::from_mins(10),
            ..aligned.clone()
        };
        assert!(!PushDownWindowAggregateRule::is_aligned(&sliding));

        let monthly = WindowSpec::every(Duration::from_months(1));
        assert!(!PushDownWindowAggregateRule::is_aligned(&monthly));

        let negative = WindowSpec::every(Duration::from_nanos(-5));
        assert!(!PushDownWindowAggregateRule::is_aligned(&negative));

        let zero = WindowSpec::every(Duration::default());
        assert!(!PushDownWindowAggregateRule::is_aligned(&zero));

        let shifted = WindowSpec {
            offset: Duration::from_secs(30),
            ..aligned.clone()
        };
        assert!(!PushDownWindowAggregateRule::is_aligned(&shifted));

        let renamed = WindowSpec {
            time_column: "ts".to_string(),
            ..aligned.clone()
        };
        assert!(!PushDownWindowAggregateRule::is_aligned(&renamed));

        let empty = WindowSpec {
            create_empty: true,
            ..aligned
        };
        assert!(!PushDownWindowAggregateRule::is_aligned(&empty));
    }

    #[test]
    fn test_feature_per_kind() {
        assert_eq!(
            PushDownWindowAggregateRule::feature_for(ProcedureKind::Count),
            Feature::PushDownWindowAggregateCount
        );
        for kind in [
            ProcedureKind::Min,
            ProcedureKind::Max,
            ProcedureKind::Mean,
            ProcedureKind::Sum,
        ] {
            assert_eq!(
                PushDownWindowAggregateRule::feature_for(kind),
                Feature::PushDownWindowAggregateRest
            );
        }
    }
}
