//! Rule 6: Tag Values Pushdown
//!
//! `keep() |> group() |> distinct(column:)` 체인을 storage 태그 값 조회로 변환

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{
    DEFAULT_START_COLUMN, DEFAULT_STOP_COLUMN, DEFAULT_TIME_COLUMN, DEFAULT_VALUE_COLUMN,
    GroupMode, NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec, ReadTagValuesSpec,
};

use super::{Rewrite, Rule};

/// `distinct ∘ group ∘ keep ∘ ReadRange` → `ReadTagValues`
pub struct PushDownReadTagValuesRule;

/// Reserved labels are columns, not tags.
fn is_valid_tag_key(key: &str) -> bool {
    ![
        DEFAULT_TIME_COLUMN,
        DEFAULT_VALUE_COLUMN,
        DEFAULT_START_COLUMN,
        DEFAULT_STOP_COLUMN,
    ]
    .contains(&key)
}

impl Rule for PushDownReadTagValuesRule {
    fn name(&self) -> &str {
        "PushDownReadTagValuesRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Distinct).with_predecessor(
            Pattern::kind(ProcedureKind::Group).with_predecessor(
                Pattern::kind(ProcedureKind::SchemaMutation)
                    .with_predecessor(Pattern::kind(ProcedureKind::ReadRange)),
            ),
        )
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let group_node = graph.single_predecessor(node)?;
        let keep_node = graph.single_predecessor(group_node)?;
        let read_node = graph.single_predecessor(keep_node)?;

        let distinct = graph.spec(node)?.expect_distinct(self.name())?;
        let group = graph.spec(group_node)?.expect_group(self.name())?;
        let keep = graph.spec(keep_node)?.expect_schema_mutation(self.name())?;
        let read = graph.spec(read_node)?.expect_read_range(self.name())?;

        // All values must land in one table.
        if group.mode != GroupMode::By || !group.keys.is_empty() {
            return Ok(Rewrite::Declined);
        }

        let tag_key = distinct.column.as_str();
        if !is_valid_tag_key(tag_key) {
            return Ok(Rewrite::Declined);
        }
        if keep.single_kept_column() != Some(tag_key) {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::ReadTagValues(ReadTagValuesSpec {
            range: read.clone(),
            tag_key: tag_key.to_string(),
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}
