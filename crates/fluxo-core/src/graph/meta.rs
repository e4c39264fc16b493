//! The meta-graph: a heterograph's type schema.

use fluxo_common::{GraphError, Result};

/// A small immutable directed graph over vertex types.
///
/// Meta-graph vertices are vertex-type ids and meta-graph edges are
/// edge-type ids: edge `t` names the `(src_type, dst_type)` pair that
/// relation `t` connects. Parallel meta-edges are allowed (two relations may
/// connect the same pair of types).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaGraph {
    num_vertex_types: u64,
    edges: Vec<(u64, u64)>,
    out_etypes: Vec<Vec<u64>>,
}

impl MetaGraph {
    /// Builds a meta-graph from `(src_type, dst_type)` pairs; the position
    /// of a pair is its edge-type id.
    ///
    /// # Errors
    ///
    /// `BadVertexType` if a pair names a type outside
    /// `0..num_vertex_types`.
    pub fn new(num_vertex_types: u64, edges: Vec<(u64, u64)>) -> Result<Self> {
        let mut out_etypes = vec![Vec::new(); num_vertex_types as usize];
        for (etype, &(src, dst)) in edges.iter().enumerate() {
            if src >= num_vertex_types {
                return Err(GraphError::BadVertexType(src));
            }
            if dst >= num_vertex_types {
                return Err(GraphError::BadVertexType(dst));
            }
            out_etypes[src as usize].push(etype as u64);
        }
        Ok(Self {
            num_vertex_types,
            edges,
            out_etypes,
        })
    }

    /// Number of vertex types.
    #[must_use]
    pub fn num_vertex_types(&self) -> u64 {
        self.num_vertex_types
    }

    /// Number of edge types.
    #[must_use]
    pub fn num_edge_types(&self) -> u64 {
        self.edges.len() as u64
    }

    /// The `(src_type, dst_type)` pair of edge type `etype`.
    ///
    /// # Errors
    ///
    /// `BadEdgeType` if `etype` is out of range.
    pub fn find_edge(&self, etype: u64) -> Result<(u64, u64)> {
        self.edges
            .get(etype as usize)
            .copied()
            .ok_or(GraphError::BadEdgeType(etype))
    }

    /// Edge types whose source is `vtype`.
    ///
    /// # Errors
    ///
    /// `BadVertexType` if `vtype` is out of range.
    pub fn out_edge_types(&self, vtype: u64) -> Result<&[u64]> {
        self.out_etypes
            .get(vtype as usize)
            .map(Vec::as_slice)
            .ok_or(GraphError::BadVertexType(vtype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lookup() {
        // A -> B -> C
        let meta = MetaGraph::new(3, vec![(0, 1), (1, 2)]).unwrap();
        assert_eq!(meta.num_vertex_types(), 3);
        assert_eq!(meta.num_edge_types(), 2);
        assert_eq!(meta.find_edge(0).unwrap(), (0, 1));
        assert_eq!(meta.find_edge(1).unwrap(), (1, 2));
        assert!(matches!(meta.find_edge(2), Err(GraphError::BadEdgeType(2))));
        assert_eq!(meta.out_edge_types(1).unwrap(), &[1]);
        assert!(meta.out_edge_types(2).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_types() {
        assert!(matches!(
            MetaGraph::new(2, vec![(0, 2)]),
            Err(GraphError::BadVertexType(2))
        ));
    }
}
