//! Rule 3: Filter Pushdown
//!
//! 필터 본문에서 storage가 평가할 수 있는 부분을 `ReadRange` 술어로 이동
//!
//! - 전부 push 가능: filter 노드를 `ReadRange`에 병합 (filter 제거)
//! - 일부만 가능: `ReadRange.predicate` 설정 + filter 본문을 나머지로 축소

use tracing::trace;

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{
    FilterSpec, FunctionExpr, NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec,
    ReadRangeSpec,
};
use crate::storage::{PredicateLogicalOp, merge_predicates, to_storage_predicate};

use super::partition::partition_predicates;
use super::predicate_rewrite::rewrite_pushable_expr;
use super::{Rewrite, Rule};

/// `filter ∘ ReadRange` → `ReadRange{predicate}` (+ residual `filter`)
pub struct PushDownFilterRule;

impl Rule for PushDownFilterRule {
    fn name(&self) -> &str {
        "PushDownFilterRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Filter).with_predecessor(Pattern::kind(ProcedureKind::ReadRange))
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let read_node = graph.single_predecessor(node)?;
        let filter = graph.spec(node)?.expect_filter(self.name())?;
        let read = graph.spec(read_node)?.expect_read_range(self.name())?;

        if filter.keep_empty_tables {
            return Ok(Rewrite::Declined);
        }
        let (param, body) = match (filter.func.parameters.as_slice(), filter.func.body_expression()) {
            ([param], Some(body)) => (param.as_str(), body),
            _ => return Ok(Rewrite::Declined),
        };
        // Rewriting the read would change what its other consumers see.
        if graph.successors(read_node)?.len() != 1 {
            trace!(target: "optimizer", node = %read_node, "ReadRange is shared, filter stays");
            return Ok(Rewrite::Declined);
        }

        let partition = partition_predicates(param, body);
        let Some(pushable) = partition.pushable else {
            return Ok(Rewrite::Declined);
        };
        let (pushable, _) = rewrite_pushable_expr(&pushable);

        let mut predicate = to_storage_predicate(&pushable, param)?;
        if let Some(existing) = &read.predicate {
            predicate = merge_predicates(PredicateLogicalOp::And, existing, &predicate)?;
        }
        let new_read = ProcedureSpec::ReadRange(ReadRangeSpec {
            predicate: Some(predicate),
            ..read.clone()
        });

        match partition.remainder {
            None => {
                let merged = graph.merge_to_physical(node, read_node, new_read)?;
                Ok(Rewrite::Replaced(merged))
            }
            Some(remainder) => {
                let new_filter = ProcedureSpec::Filter(FilterSpec {
                    func: FunctionExpr {
                        parameters: filter.func.parameters.clone(),
                        body: Some(remainder),
                    },
                    keep_empty_tables: filter.keep_empty_tables,
                });
                graph.replace_spec(read_node, new_read)?;
                graph.replace_spec(node, new_filter)?;
                Ok(Rewrite::Replaced(node))
            }
        }
    }
}
