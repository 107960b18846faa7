//! Rule 4: Group Pushdown
//!
//! `group(columns:)`을 storage 그룹 읽기로 변환

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{
    DEFAULT_TIME_COLUMN, DEFAULT_VALUE_COLUMN, GroupMode, NodeId, Pattern, PlanGraph,
    ProcedureKind, ProcedureSpec, ReadGroupSpec,
};

use super::{Rewrite, Rule};

/// `group(by) ∘ ReadRange` → `ReadGroup`
pub struct PushDownGroupRule;

impl Rule for PushDownGroupRule {
    fn name(&self) -> &str {
        "PushDownGroupRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Group).with_predecessor(Pattern::kind(ProcedureKind::ReadRange))
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let read_node = graph.single_predecessor(node)?;
        let group = graph.spec(node)?.expect_group(self.name())?;
        let read = graph.spec(read_node)?.expect_read_range(self.name())?;

        if group.mode != GroupMode::By {
            return Ok(Rewrite::Declined);
        }
        // Every storage series carries _time and _value, grouping on them
        // cannot be served by the storage group read.
        if group
            .keys
            .iter()
            .any(|k| k == DEFAULT_TIME_COLUMN || k == DEFAULT_VALUE_COLUMN)
        {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::ReadGroup(ReadGroupSpec {
            range: read.clone(),
            group_mode: group.mode,
            group_keys: group.keys.clone(),
            aggregate_method: None,
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}
