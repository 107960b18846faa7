//! Rule 2: Range Pushdown
//!
//! `range()`를 storage 소스와 합쳐 `ReadRange` 생성

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec, ReadRangeSpec};

use super::{Rewrite, Rule};

/// `range ∘ fromStorage` → `ReadRange`
pub struct PushDownRangeRule;

impl Rule for PushDownRangeRule {
    fn name(&self) -> &str {
        "PushDownRangeRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Range).with_predecessor(Pattern::kind(ProcedureKind::FromStorage))
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let source = graph.single_predecessor(node)?;
        let bucket = &graph.spec(source)?.expect_from_storage(self.name())?.bucket;
        let range = graph.spec(node)?.expect_range(self.name())?;

        let spec = ProcedureSpec::ReadRange(ReadRangeSpec {
            bucket: bucket.name.clone(),
            bucket_id: bucket.id.clone(),
            bounds: range.bounds,
            predicate: None,
        });
        Ok(Rewrite::Replaced(graph.replace_with_leaf(node, spec)?))
    }
}
