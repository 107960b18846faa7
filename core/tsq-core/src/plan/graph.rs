//! 플랜 그래프 — 인덱스 기반 노드 arena
//!
//! Nodes are addressed by stable [`NodeId`]s. Removing a node tombstones its
//! slot so ids held elsewhere never alias a different node.

use serde::{Deserialize, Serialize};

use crate::error::{TsqError, TsqResult};
use crate::plan::types::{ProcedureKind, ProcedureSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub id: NodeId,
    pub spec: ProcedureSpec,
    pub predecessors: Vec<NodeId>,
    pub successors: Vec<NodeId>,
}

impl PlanNode {
    pub fn kind(&self) -> ProcedureKind {
        self.spec.kind()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanGraph {
    nodes: Vec<Option<PlanNode>>,
}

impl PlanGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node consuming `predecessors` in order.
    pub fn add_node(&mut self, spec: ProcedureSpec, predecessors: &[NodeId]) -> TsqResult<NodeId> {
        for pred in predecessors {
            self.node(*pred)?;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(PlanNode {
            id,
            spec,
            predecessors: predecessors.to_vec(),
            successors: Vec::new(),
        }));
        for pred in predecessors {
            self.node_mut(*pred)?.successors.push(id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> TsqResult<&PlanNode> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TsqError::NodeNotFound(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> TsqResult<&mut PlanNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TsqError::NodeNotFound(id.0))
    }

    pub fn spec(&self, id: NodeId) -> TsqResult<&ProcedureSpec> {
        Ok(&self.node(id)?.spec)
    }

    pub fn kind(&self, id: NodeId) -> TsqResult<ProcedureKind> {
        Ok(self.node(id)?.kind())
    }

    pub fn predecessors(&self, id: NodeId) -> TsqResult<&[NodeId]> {
        Ok(&self.node(id)?.predecessors)
    }

    pub fn successors(&self, id: NodeId) -> TsqResult<&[NodeId]> {
        Ok(&self.node(id)?.successors)
    }

    /// The sole predecessor a single-child pattern guarantees.
    pub fn single_predecessor(&self, id: NodeId) -> TsqResult<NodeId> {
        match self.predecessors(id)? {
            [pred] => Ok(*pred),
            preds => Err(TsqError::malformed(
                format!("expected one predecessor, found {}", preds.len()),
                format!("node {}", id),
            )),
        }
    }

    /// Live nodes without successors (plan outputs), in id order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|node| node.successors.is_empty())
            .map(|node| node.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanNode> {
        self.nodes.iter().flatten()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// In-place spec replacement; node identity and edges are unchanged.
    pub fn replace_spec(&mut self, id: NodeId, spec: ProcedureSpec) -> TsqResult<()> {
        self.node_mut(id)?.spec = spec;
        Ok(())
    }

    /// Turns `id` into a leaf carrying `spec`. Former predecessors that are
    /// left without successors are removed transitively.
    pub fn replace_with_leaf(&mut self, id: NodeId, spec: ProcedureSpec) -> TsqResult<NodeId> {
        let node = self.node_mut(id)?;
        node.spec = spec;
        let detached = std::mem::take(&mut node.predecessors);
        for pred in detached {
            self.detach_successor(pred, id)?;
            self.remove_if_orphaned(pred)?;
        }
        Ok(id)
    }

    /// Fuses `bottom` into `top`. The merged node keeps `top`'s id and
    /// successors, inherits `bottom`'s predecessors, and carries `spec`.
    pub fn merge_to_physical(
        &mut self,
        top: NodeId,
        bottom: NodeId,
        spec: ProcedureSpec,
    ) -> TsqResult<NodeId> {
        if self.predecessors(top)? != [bottom] {
            return Err(TsqError::invalid(
                format!("node {} is not the sole predecessor of {}", bottom, top),
                "merge_to_physical",
            ));
        }
        if self.successors(bottom)? != [top] {
            return Err(TsqError::invalid(
                format!("node {} has successors other than {}", bottom, top),
                "merge_to_physical",
            ));
        }

        let removed = self.nodes[bottom.0].take().ok_or(TsqError::NodeNotFound(bottom.0))?;
        for pred in &removed.predecessors {
            for succ in self.node_mut(*pred)?.successors.iter_mut() {
                if *succ == bottom {
                    *succ = top;
                }
            }
        }
        let merged = self.node_mut(top)?;
        merged.predecessors = removed.predecessors;
        merged.spec = spec;
        Ok(top)
    }

    fn detach_successor(&mut self, id: NodeId, successor: NodeId) -> TsqResult<()> {
        let node = self.node_mut(id)?;
        if let Some(pos) = node.successors.iter().position(|s| *s == successor) {
            node.successors.remove(pos);
        }
        Ok(())
    }

    fn remove_if_orphaned(&mut self, id: NodeId) -> TsqResult<()> {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            // 공유 predecessor는 이미 제거되었을 수 있음
            match self.node(next) {
                Ok(node) if node.successors.is_empty() => {}
                _ => continue,
            }
            let removed = self.nodes[next.0].take().ok_or(TsqError::NodeNotFound(next.0))?;
            for pred in removed.predecessors {
                self.detach_successor(pred, next)?;
                pending.push(pred);
            }
        }
        Ok(())
    }

    /// Specs along the single-predecessor chain from `id` down to a leaf.
    pub fn chain(&self, id: NodeId) -> TsqResult<Vec<&ProcedureSpec>> {
        let mut specs = Vec::new();
        let mut current = Some(id);
        while let Some(next) = current {
            let node = self.node(next)?;
            specs.push(&node.spec);
            current = node.predecessors.first().copied();
        }
        Ok(specs)
    }
}
