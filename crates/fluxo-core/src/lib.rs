//! fluxo-core: a read-only heterogeneous graph engine.
//!
//! The engine serves graph-learning pipelines that repeatedly issue
//! structural queries (neighbors, degrees, edge lookups, subgraph
//! extraction) and run stochastic samplers that turn a batch of seed
//! vertices into layered message-passing subgraphs ([`NodeFlow`]s).
//!
//! Three layers build on each other:
//!
//! - [`graph::Bipartite`] - a two-vertex-type relation graph holding one
//!   edge set in up to three adjacency formats (COO, out-CSR, in-CSR),
//!   materialized lazily and shared read-only.
//! - [`graph::Heterograph`] - many bipartite relations composed under a
//!   [`graph::MetaGraph`] schema, with subgraph extraction that keeps
//!   cross-relation vertex identity intact.
//! - [`sampling`] - multi-hop neighbor expansion and layer-wise samplers,
//!   plus a batched driver that fans seed batches out over a thread pool.
//!
//! Graphs are immutable once constructed; every mutation entry point fails
//! with [`GraphError::Immutable`].

pub mod graph;
pub mod nodeflow;
pub mod sampling;

pub use fluxo_common::{
    CooMatrix, CsrMatrix, DeviceContext, GraphError, IdArray, IdBits, Result,
};
pub use graph::{
    AdjFormat, Bipartite, BipartiteSubgraph, EdgeArray, EdgeDir, EdgeOrder, Heterograph,
    HeteroSubgraph, MetaGraph, DST_VTYPE, SRC_VTYPE,
};
pub use nodeflow::{NodeFlow, MISSING_EDGE_ID};
