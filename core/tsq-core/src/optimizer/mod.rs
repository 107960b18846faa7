//! 물리 플랜 옵티마이저 — 규칙 기반 storage push-down
//!
//! 논리 플랜 그래프를 재작성하여 storage 엔진이 직접 평가하는 Read* 노드로 바꿉니다.
//! Rules are local: each one matches a small subgraph, checks preconditions,
//! and either declines or rewrites through the [`PlanGraph`] API.

mod classify;
mod filter_pushdown;
mod from_storage;
mod group_aggregate_pushdown;
mod group_pushdown;
mod partition;
mod predicate_rewrite;
mod range_pushdown;
mod sorted_pivot;
mod tag_keys_pushdown;
mod tag_values_pushdown;
mod window_aggregate_pushdown;


use std::collections::HashSet;

use tracing::{debug, info, instrument, trace, warn};

use crate::engine::{OptimizerConfig, RewriteContext};
use crate::error::{TsqError, TsqResult};
use crate::plan::{NodeId, Pattern, PlanGraph};

pub use classify::{is_field, is_pushable, is_tag};
pub use filter_pushdown::PushDownFilterRule;
pub use from_storage::FromStorageRule;
pub use group_aggregate_pushdown::PushDownGroupAggregateRule;
pub use group_pushdown::PushDownGroupRule;
pub use partition::{Partition, partition_predicates};
pub use predicate_rewrite::rewrite_pushable_expr;
pub use range_pushdown::PushDownRangeRule;
pub use sorted_pivot::SortedPivotRule;
pub use tag_keys_pushdown::PushDownReadTagKeysRule;
pub use tag_values_pushdown::PushDownReadTagValuesRule;
pub use window_aggregate_pushdown::PushDownWindowAggregateRule;

/// Outcome of offering a matching node to a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Preconditions did not hold; the graph is untouched.
    Declined,
    /// Structural rewrite. The id names the node that now stands where the
    /// matched node was.
    Replaced(NodeId),
    /// The node's spec was updated in place; the plan shape is unchanged and
    /// the scheduler must not count this as progress.
    Annotated,
}

impl Rewrite {
    pub fn is_structural(&self) -> bool {
        matches!(self, Rewrite::Replaced(_))
    }
}

/// 물리 재작성 규칙 트레이트
pub trait Rule: Send + Sync {
    /// 규칙 이름
    fn name(&self) -> &str;

    /// 매칭 패턴
    fn pattern(&self) -> Pattern;

    /// Called only for nodes matching [`Rule::pattern`].
    fn rewrite(
        &self,
        ctx: &RewriteContext,
        graph: &mut PlanGraph,
        node: NodeId,
    ) -> TsqResult<Rewrite>;
}

/// 규칙 레지스트리 — 고정된 규칙 목록
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Storage push-down rules, in scheduling order.
    pub fn physical_rules() -> Self {
        Self {
            rules: vec![
                Box::new(FromStorageRule),
                Box::new(PushDownRangeRule),
                Box::new(PushDownFilterRule),
                Box::new(PushDownGroupRule),
                Box::new(PushDownReadTagKeysRule),
                Box::new(PushDownReadTagValuesRule),
                Box::new(SortedPivotRule),
                // Fires only with a capability snapshot and enabled toggles.
                Box::new(PushDownWindowAggregateRule),
                // Fires only when its toggle is enabled.
                Box::new(PushDownGroupAggregateRule),
            ],
        }
    }

    /// [`RuleRegistry::physical_rules`] minus the rules `config` disables.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        let mut registry = Self::physical_rules();
        registry.rules.retain(|rule| config.is_rule_enabled(rule.name()));
        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::physical_rules()
    }
}

/// 한 번의 최적화 패스 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    pub iterations: usize,
    /// Structural rewrites, by rule name, in application order.
    pub applied: Vec<String>,
    pub annotations: usize,
}

/// 고정점까지 규칙을 반복 적용하는 옵티마이저
pub struct PhysicalOptimizer {
    registry: RuleRegistry,
    max_iterations: usize,
}

impl PhysicalOptimizer {
    pub fn new(registry: RuleRegistry, config: &OptimizerConfig) -> Self {
        Self {
            registry,
            // 구조체 리터럴로 만든 설정은 validate()를 거치지 않음
            max_iterations: config.max_iterations.max(1),
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(RuleRegistry::from_config(config), config)
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Rewrites `graph` until no rule makes a structural change.
    ///
    /// The first rule error aborts the pass and is returned unchanged.
    #[instrument(level = "debug", skip_all, fields(nodes = graph.len()))]
    pub fn optimize(&self, ctx: &RewriteContext, graph: &mut PlanGraph) -> TsqResult<PassStats> {
        let mut stats = PassStats::default();

        loop {
            if stats.iterations >= self.max_iterations {
                warn!(
                    target: "optimizer",
                    iterations = stats.iterations,
                    "rule set did not converge"
                );
                return Err(TsqError::NoFixedPoint {
                    iterations: stats.iterations,
                });
            }
            stats.iterations += 1;

            if !self.run_iteration(ctx, graph, &mut stats)? {
                break;
            }
        }

        info!(
            target: "optimizer",
            iterations = stats.iterations,
            rewrites = stats.applied.len(),
            "physical optimization complete"
        );
        Ok(stats)
    }

    /// One root-to-leaf walk. Returns whether anything changed structurally.
    fn run_iteration(
        &self,
        ctx: &RewriteContext,
        graph: &mut PlanGraph,
        stats: &mut PassStats,
    ) -> TsqResult<bool> {
        let mut changed = false;
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = graph.roots().into_iter().rev().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) || !graph.contains(id) {
                continue;
            }

            let id = self.apply_rules(ctx, graph, id, stats, &mut changed)?;

            for pred in graph.predecessors(id)?.iter().rev() {
                if !visited.contains(pred) {
                    stack.push(*pred);
                }
            }
        }
        Ok(changed)
    }

    /// Offers `id` to every rule in order. Returns the id standing in the
    /// node's place afterwards.
    fn apply_rules(
        &self,
        ctx: &RewriteContext,
        graph: &mut PlanGraph,
        mut id: NodeId,
        stats: &mut PassStats,
        changed: &mut bool,
    ) -> TsqResult<NodeId> {
        for rule in self.registry.iter() {
            if !rule.pattern().matches(graph, id) {
                continue;
            }
            match rule.rewrite(ctx, graph, id)? {
                Rewrite::Declined => {
                    trace!(target: "optimizer", rule = rule.name(), node = %id, "declined");
                }
                Rewrite::Annotated => {
                    trace!(target: "optimizer", rule = rule.name(), node = %id, "annotated");
                    stats.annotations += 1;
                }
                Rewrite::Replaced(new_id) => {
                    debug!(
                        target: "optimizer",
                        rule = rule.name(),
                        node = %id,
                        kind = %graph.kind(new_id)?,
                        "rewrote"
                    );
                    stats.applied.push(rule.name().to_string());
                    *changed = true;
                    id = new_id;
                }
            }
        }
        Ok(id)
    }
}

impl Default for PhysicalOptimizer {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}
