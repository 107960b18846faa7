//! Rule 5: Tag Keys Pushdown
//!
//! `keys() |> keep() |> distinct()` 체인을 storage 태그 키 조회로 변환

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec, ReadTagKeysSpec};

use super::{Rewrite, Rule};

/// `distinct ∘ keep ∘ keys ∘ ReadRange` → `ReadTagKeys`
pub struct PushDownReadTagKeysRule;

impl Rule for PushDownReadTagKeysRule {
    fn name(&self) -> &str {
        "PushDownReadTagKeysRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Distinct).with_predecessor(
            Pattern::kind(ProcedureKind::SchemaMutation).with_predecessor(
                Pattern::kind(ProcedureKind::Keys)
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
        let keep_node = graph.single_predecessor(node)?;
        let keys_node = graph.single_predecessor(keep_node)?;
        let read_node = graph.single_predecessor(keys_node)?;

        let distinct = graph.spec(node)?.expect_distinct(self.name())?;
        let keep = graph.spec(keep_node)?.expect_schema_mutation(self.name())?;
        let keys = graph.spec(keys_node)?.expect_keys(self.name())?;
        let read = graph.spec(read_node)?.expect_read_range(self.name())?;

        // keep() must retain exactly the column keys() writes.
        if keep.single_kept_column() != Some(keys.column.as_str()) {
            return Ok(Rewrite::Declined);
        }
        if distinct.column != keys.column {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::ReadTagKeys(ReadTagKeysSpec {
            range: read.clone(),
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}
