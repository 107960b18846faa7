//! Rule 9: Group Aggregate Pushdown
//!
//! `ReadGroup |> count()` → 집계 방식이 설정된 `ReadGroup`

use crate::engine::{Feature, RewriteContext};
use crate::error::{TsqError, TsqResult};
use crate::plan::{
    DEFAULT_VALUE_COLUMN, NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec,
    ReadGroupSpec,
};
use crate::storage::AGGREGATE_METHOD_COUNT;

use super::{Rewrite, Rule};

/// `count ∘ ReadGroup` → `ReadGroup{aggregate_method: COUNT}`
pub struct PushDownGroupAggregateRule;

impl Rule for PushDownGroupAggregateRule {
    fn name(&self) -> &str {
        "PushDownGroupAggregateRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Count).with_predecessor(Pattern::kind(ProcedureKind::ReadGroup))
    }

    fn rewrite(
        &self,
        ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        if !ctx.is_enabled(Feature::PushDownGroupAggregateCount) {
            return Ok(Rewrite::Declined);
        }

        let columns = match graph.spec(node)? {
            ProcedureSpec::Count(count) => &count.columns,
            other => {
                return Err(TsqError::malformed(
                    format!("expected count spec, found {}", other.kind()),
                    self.name(),
                ));
            }
        };
        if !matches!(columns.as_slice(), [c] if c == DEFAULT_VALUE_COLUMN) {
            return Ok(Rewrite::Declined);
        }

        let group_node = graph.single_predecessor(node)?;
        let group = graph.spec(group_node)?.expect_read_group(self.name())?;
        // One aggregate per group read.
        if group.aggregate_method.is_some() {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::ReadGroup(ReadGroupSpec {
            aggregate_method: Some(AGGREGATE_METHOD_COUNT.to_string()),
            ..group.clone()
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}
