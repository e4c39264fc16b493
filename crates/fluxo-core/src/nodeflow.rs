//! The layered subgraph a sampler produces.

use std::sync::Arc;

use fluxo_common::IdArray;

use crate::graph::Bipartite;

/// Edge-mapping entry recorded for a synthetic self-loop that has no
/// backing edge in the source graph (the unsigned rendering of `-1`).
pub const MISSING_EDGE_ID: u64 = u64::MAX;

/// A layered message-passing subgraph ("node flow").
///
/// Flow vertices are numbered densely and partitioned into layers: layer 0
/// holds the deepest-hop input vertices and the last layer holds the seeds.
/// The graph is a square CSR over flow vertices whose own edge ids are
/// `0..M`; the mapping arrays carry everything back to the source graph.
pub struct NodeFlow {
    /// The flow structure, oriented the same way the sampler walked.
    pub graph: Arc<Bipartite>,
    /// Original vertex id per flow vertex.
    pub node_mapping: IdArray,
    /// Original edge id per flow edge ([`MISSING_EDGE_ID`] for synthetic
    /// self-loops).
    pub edge_mapping: IdArray,
    /// Layer boundaries over flow vertices, length `num_layers + 1`.
    pub layer_offsets: IdArray,
    /// Cumulative edge counts per layer-to-layer flow, length `num_layers`.
    pub flow_offsets: IdArray,
}

impl NodeFlow {
    /// Number of layers.
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.layer_offsets.len() - 1
    }

    /// The flow-vertex positions of layer `h` (0 is the deepest layer).
    #[must_use]
    pub fn layer_range(&self, h: usize) -> std::ops::Range<usize> {
        self.layer_offsets.get(h) as usize..self.layer_offsets.get(h + 1) as usize
    }
}
