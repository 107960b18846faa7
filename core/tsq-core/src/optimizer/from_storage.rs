//! Rule 1: From → Storage
//!
//! 호스트가 지정되지 않은 `from()`을 로컬 storage 소스로 바인딩

use crate::engine::RewriteContext;
use crate::error::{TsqError, TsqResult};
use crate::plan::{FromStorageSpec, NodeId, Pattern, PlanGraph, ProcedureKind, ProcedureSpec};

use super::{Rewrite, Rule};

/// `from(bucket:)` → `fromStorage(bucket:)`
pub struct FromStorageRule;

impl Rule for FromStorageRule {
    fn name(&self) -> &str {
        "FromStorageRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::kind(ProcedureKind::From)
    }

    fn rewrite(
        &self,
        _ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite> {
        let from = graph.spec(node)?.expect_from(self.name())?;

        // Remote reads are served by another source.
        if from.host.is_some() {
            return Ok(Rewrite::Declined);
        }
        if from.org.is_some() {
            return Err(TsqError::Unimplemented(
                "reads from the storage engine cannot read from a separate organization; \
                 please specify a host or remove the organization"
                    .to_string(),
            ));
        }

        let spec = ProcedureSpec::FromStorage(FromStorageSpec {
            bucket: from.bucket.clone(),
        });
        graph.replace_spec(node, spec)?;
        Ok(Rewrite::Replaced(node))
    }
}
