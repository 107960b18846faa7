//! Rule 7: Sorted Pivot
//!
//! storage 읽기 바로 위의 pivot에 정렬 힌트를 부착 (노드 구조는 유지)

use crate::engine::RewriteContext;
use crate::error::TsqResult;
use crate::plan::{NodeId, Pattern, PivotSpec, PlanGraph, ProcedureKind, ProcedureSpec, SortHints};

use super::{Rewrite, Rule};

/// `pivot ∘ ReadRange`: storage reads arrive in tag-key order, so the pivot
/// can skip its own sort.
pub struct SortedPivotRule;

impl Rule for SortedPivotRule {
    fn name(&self) -> &str {
        "SortedPivotRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::Pivot).with_predecessor(Pattern::kind(ProcedureKind::ReadRange))
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let pivot = graph.spec(node)?.expect_pivot(self.name())?;
        if pivot.sort_hints.is_some() {
            return Ok(Rewrite::Declined);
        }

        let spec = ProcedureSpec::Pivot(PivotSpec {
            sort_hints: Some(SortHints),
            ..pivot.clone()
        });
        graph.replace_spec(node, spec)?;
        Ok(Rewrite::Annotated)
    }
}
