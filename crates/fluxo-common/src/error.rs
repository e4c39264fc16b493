//! Error types shared across the fluxo workspace.

use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by graph construction, structural queries, and sampling.
///
/// Every error is fatal to the calling operation; the engine never retries
/// or recovers internally, it only propagates to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Mutation attempted on a read-only graph.
    #[error("graph is read-only")]
    Immutable,

    /// An operation was invoked on an adjacency format that cannot serve it.
    #[error("{op} is not supported on the {format} format")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        op: &'static str,
        /// The format that cannot serve it.
        format: &'static str,
    },

    /// Vertex type tag outside the graph's vertex-type range.
    #[error("invalid vertex type: {0}")]
    BadVertexType(u64),

    /// Edge type tag outside the meta-graph's edge-type range.
    #[error("invalid edge type: {0}")]
    BadEdgeType(u64),

    /// Edge enumeration order other than `""`, `"eid"`, or `"srcdst"`.
    #[error("unsupported edge order {0:?}")]
    BadOrder(String),

    /// Adjacency format tag other than `"coo"` or `"csr"`.
    #[error("unsupported adjacency format {0:?}")]
    BadFormat(String),

    /// Neighbor direction tag other than `"in"` or `"out"`.
    #[error("unsupported neighbor direction {0:?}")]
    BadDirection(String),

    /// Id array malformed where a valid array is required (mixed widths,
    /// values that do not fit the declared width, out-of-range gather).
    #[error("invalid id array: {0}")]
    InvalidIdArray(String),

    /// Inconsistent shapes between related inputs.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A 32-bit graph reached a path that requires 64-bit ids.
    #[error("operation requires a 64-bit graph, got {0}-bit ids")]
    BadWidth(u8),

    /// Vertex id out of range for its vertex type.
    #[error("vertex id {id} out of range for vertex type {vtype}")]
    NoSuchVertex {
        /// Vertex type the id was checked against.
        vtype: u64,
        /// The offending id.
        id: u64,
    },

    /// Edge id out of range.
    #[error("edge id {0} out of range")]
    NoSuchEdge(u64),
}
