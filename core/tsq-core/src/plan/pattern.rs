//! Rule patterns
//!
//! A pattern names the kinds a node may have and, optionally, the pattern
//! its single predecessor must match.

use crate::plan::graph::{NodeId, PlanGraph};
use crate::plan::types::ProcedureKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Matches a node of any kind.
    Any {
        predecessor: Option<Box<Pattern>>,
    },
    Kinds {
        kinds: Vec<ProcedureKind>,
        predecessor: Option<Box<Pattern>>,
    },
}

impl Pattern {
    pub fn any() -> Self {
        Pattern::Any { predecessor: None }
    }

    pub fn kind(kind: ProcedureKind) -> Self {
        Pattern::Kinds {
            kinds: vec![kind],
            predecessor: None,
        }
    }

    pub fn one_of(kinds: impl IntoIterator<Item = ProcedureKind>) -> Self {
        Pattern::Kinds {
            kinds: kinds.into_iter().collect(),
            predecessor: None,
        }
    }

    /// Requires exactly one predecessor, matching `child`.
    pub fn with_predecessor(self, child: Pattern) -> Self {
        let predecessor = Some(Box::new(child));
        match self {
            Pattern::Any { .. } => Pattern::Any { predecessor },
            Pattern::Kinds { kinds, .. } => Pattern::Kinds { kinds, predecessor },
        }
    }

    pub fn matches(&self, graph: &PlanGraph, id: NodeId) -> bool {
        let Ok(node) = graph.node(id) else {
            return false;
        };
        let predecessor = match self {
            Pattern::Any { predecessor } => predecessor,
            Pattern::Kinds { kinds, predecessor } => {
                if !kinds.contains(&node.kind()) {
                    return false;
                }
                predecessor
            }
        };
        match (predecessor, node.predecessors.as_slice()) {
            (None, _) => true,
            (Some(child), [pred]) => child.matches(graph, *pred),
            (Some(_), _) => false,
        }
    }
}
