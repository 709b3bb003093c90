//! Fine-grained graph operations with inverse support and atomic batches.

use serde::{Deserialize, Serialize};

use crate::graph::CodeGraph;
use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeId};

/// Field updates applied by [`GraphOp::UpdateNode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_span: Option<(u32, u32)>,
}

impl NodeUpdates {
    pub fn signature(hash: impl Into<String>) -> Self {
        NodeUpdates {
            signature_hash: Some(hash.into()),
            line_span: None,
        }
    }
}

/// A reversible graph mutation. Applying an op captures whatever prior state
/// its inverse needs, so `op.apply(g)` followed by `op.inverse().apply(g)`
/// is the identity on the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphOp {
    AddNode {
        node: GraphNode,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        edges: Vec<GraphEdge>,
    },
    RemoveNode {
        node_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        captured_node: Option<GraphNode>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        captured_edges: Vec<GraphEdge>,
    },
    UpdateNode {
        node_id: NodeId,
        updates: NodeUpdates,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        previous: Option<NodeUpdates>,
    },
    AddEdge {
        edge: GraphEdge,
    },
    RemoveEdge {
        source_id: NodeId,
        target_id: NodeId,
        kind: EdgeKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        captured_edge: Option<GraphEdge>,
    },
}

impl GraphOp {
    /// Apply this operation to the graph. Returns true on success; a false
    /// return leaves the graph untouched.
    pub fn apply(&mut self, graph: &mut CodeGraph) -> bool {
        match self {
            GraphOp::AddNode { node, edges } => {
                if graph.get_node(&node.id).is_some() {
                    return false;
                }
                graph.add_node(node.clone());
                for edge in edges.iter() {
                    graph.add_edge(edge.clone());
                }
                true
            }
            GraphOp::RemoveNode {
                node_id,
                captured_node,
                captured_edges,
            } => {
                if graph.get_node(node_id).is_none() {
                    return false;
                }
                *captured_edges = graph.edges_from(node_id).cloned().collect();
                captured_edges.extend(graph.edges_to(node_id).cloned());
                *captured_node = graph.remove_node(node_id);
                true
            }
            GraphOp::UpdateNode {
                node_id,
                updates,
                previous,
            } => {
                let Some(node) = graph.get_node_mut(node_id) else {
                    return false;
                };
                let mut prior = NodeUpdates::default();
                if let Some(hash) = &updates.signature_hash {
                    prior.signature_hash = Some(node.signature_hash.clone());
                    node.signature_hash = hash.clone();
                }
                if let Some((start, end)) = updates.line_span {
                    prior.line_span = Some((node.line_start, node.line_end));
                    node.line_start = start;
                    node.line_end = end;
                }
                *previous = Some(prior);
                true
            }
            GraphOp::AddEdge { edge } => graph.add_edge(edge.clone()),
            GraphOp::RemoveEdge {
                source_id,
                target_id,
                kind,
                captured_edge,
            } => match graph.remove_edge(source_id, target_id, *kind) {
                Some(edge) => {
                    *captured_edge = Some(edge);
                    true
                }
                None => false,
            },
        }
    }

    /// The operation that undoes this one, using state captured by `apply`.
    pub fn inverse(&self) -> GraphOp {
        match self {
            GraphOp::AddNode { node, edges } => GraphOp::RemoveNode {
                node_id: node.id.clone(),
                captured_node: Some(node.clone()),
                captured_edges: edges.clone(),
            },
            GraphOp::RemoveNode {
                node_id,
                captured_node,
                captured_edges,
            } => match captured_node {
                Some(node) => GraphOp::AddNode {
                    node: node.clone(),
                    edges: captured_edges.clone(),
                },
                None => GraphOp::RemoveNode {
                    node_id: node_id.clone(),
                    captured_node: None,
                    captured_edges: Vec::new(),
                },
            },
            GraphOp::UpdateNode {
                node_id, previous, ..
            } => GraphOp::UpdateNode {
                node_id: node_id.clone(),
                updates: previous.clone().unwrap_or_default(),
                previous: None,
            },
            GraphOp::AddEdge { edge } => GraphOp::RemoveEdge {
                source_id: edge.source_id.clone(),
                target_id: edge.target_id.clone(),
                kind: edge.kind,
                captured_edge: None,
            },
            GraphOp::RemoveEdge { captured_edge, .. } => match captured_edge {
                Some(edge) => GraphOp::AddEdge { edge: edge.clone() },
                None => GraphOp::AddEdge {
                    edge: GraphEdge::new(
                        NodeId(String::new()),
                        NodeId(String::new()),
                        EdgeKind::Calls,
                    ),
                },
            },
        }
    }
}

/// Atomic transaction: applies all ops in order or rolls back on the first
/// failure. Rollback runs the inverses of the already-applied prefix in
/// reverse order, best-effort.
#[derive(Debug, Default)]
pub struct OperationBatch {
    operations: Vec<GraphOp>,
}

impl OperationBatch {
    pub fn new(operations: Vec<GraphOp>) -> Self {
        OperationBatch { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Apply all operations. Returns false after rolling back if any fail.
    pub fn apply(&mut self, graph: &mut CodeGraph) -> bool {
        let mut applied: Vec<GraphOp> = Vec::with_capacity(self.operations.len());
        for op in self.operations.iter_mut() {
            if op.apply(graph) {
                applied.push(op.clone());
            } else {
                tracing::warn!(batch_len = self.operations.len(), "batch apply failed, rolling back");
                Self::rollback(graph, &applied);
                return false;
            }
        }
        true
    }

    fn rollback(graph: &mut CodeGraph, applied: &[GraphOp]) {
        for op in applied.iter().rev() {
            op.inverse().apply(graph);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityKind};

    fn node(file: &str, name: &str) -> GraphNode {
        let entity = Entity::new(EntityKind::Function, name, 1, 3, "sig-v1", "st");
        GraphNode::from_entity(&entity, file)
    }

    #[test]
    fn add_node_inverse_is_identity() {
        let mut graph = CodeGraph::new();
        let baseline = graph.compute_hash();

        let mut op = GraphOp::AddNode {
            node: node("a.py", "f"),
            edges: Vec::new(),
        };
        assert!(op.apply(&mut graph));
        assert_eq!(graph.node_count(), 1);

        assert!(op.inverse().apply(&mut graph));
        assert_eq!(graph.compute_hash(), baseline);
    }

    #[test]
    fn remove_node_inverse_restores_edges() {
        let mut graph = CodeGraph::new();
        let a = node("a.py", "a");
        let b = node("b.py", "b");
        let (ia, ib) = (a.id.clone(), b.id.clone());
        graph.add_node(a);
        graph.add_node(b);
        graph.add_edge(GraphEdge::new(ia.clone(), ib.clone(), EdgeKind::Calls));
        let before = graph.compute_hash();

        let mut op = GraphOp::RemoveNode {
            node_id: ib.clone(),
            captured_node: None,
            captured_edges: Vec::new(),
        };
        assert!(op.apply(&mut graph));
        assert_eq!(graph.edge_count(), 0);

        assert!(op.inverse().apply(&mut graph));
        assert_eq!(graph.compute_hash(), before);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn update_node_inverse_restores_signature() {
        let mut graph = CodeGraph::new();
        let n = node("a.py", "f");
        let id = n.id.clone();
        graph.add_node(n);

        let mut op = GraphOp::UpdateNode {
            node_id: id.clone(),
            updates: NodeUpdates::signature("sig-v2"),
            previous: None,
        };
        assert!(op.apply(&mut graph));
        assert_eq!(graph.get_node(&id).unwrap().signature_hash, "sig-v2");

        assert!(op.inverse().apply(&mut graph));
        assert_eq!(graph.get_node(&id).unwrap().signature_hash, "sig-v1");
    }

    #[test]
    fn batch_rolls_back_on_failure() {
        let mut graph = CodeGraph::new();
        let a = node("a.py", "a");
        let duplicate = a.clone();
        let before = graph.compute_hash();

        let mut batch = OperationBatch::new(vec![
            GraphOp::AddNode {
                node: a,
                edges: Vec::new(),
            },
            // Fails: same node added twice.
            GraphOp::AddNode {
                node: duplicate,
                edges: Vec::new(),
            },
        ]);
        assert!(!batch.apply(&mut graph));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.compute_hash(), before);
    }

    #[test]
    fn batch_applies_all_on_success() {
        let mut graph = CodeGraph::new();
        let a = node("a.py", "a");
        let b = node("b.py", "b");
        let edge = GraphEdge::new(a.id.clone(), b.id.clone(), EdgeKind::Calls);

        let mut batch = OperationBatch::new(vec![
            GraphOp::AddNode {
                node: a,
                edges: Vec::new(),
            },
            GraphOp::AddNode {
                node: b,
                edges: Vec::new(),
            },
            GraphOp::AddEdge { edge },
        ]);
        assert!(batch.apply(&mut graph));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
