use nemgate_common::{NetworkType, NodeDescriptor, ServerConfig};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin pool of interchangeable nodes.
///
/// The pool is never empty. Rotation goes through an atomic index, so one
/// pool can be shared (behind an `Arc`) by dispatchers running concurrently;
/// they interleave but never skip past the end of the list.
#[derive(Debug)]
pub struct EndpointPool {
    nodes: Vec<NodeDescriptor>,
    index: AtomicUsize,
}

impl EndpointPool {
    /// Builds a pool from configured servers, falling back to the network's
    /// default node when `servers` is empty.
    pub fn new(servers: Vec<ServerConfig>, network: NetworkType) -> Self {
        let nodes: Vec<NodeDescriptor> = servers.into_iter().map(NodeDescriptor::from).collect();
        if nodes.is_empty() {
            Self::single(network.default_node())
        } else {
            Self::from_nodes(nodes)
        }
    }

    /// Pool with exactly one node.
    pub fn single(node: NodeDescriptor) -> Self {
        Self::from_nodes(vec![node])
    }

    fn from_nodes(nodes: Vec<NodeDescriptor>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self {
            nodes,
            index: AtomicUsize::new(0),
        }
    }

    /// Returns the node at the rotation index and advances the index.
    pub fn next(&self) -> NodeDescriptor {
        let len = self.nodes.len();
        let current = self
            .index
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |i| Some((i + 1) % len))
            .unwrap_or_default();
        self.nodes[current % len].clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }
}
