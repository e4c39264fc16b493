//! Graph structures: bipartite relations, meta-graphs, heterographs.

mod bipartite;
mod hetero;
mod meta;

pub use bipartite::{Bipartite, BipartiteSubgraph};
pub use hetero::{Heterograph, HeteroSubgraph};
pub use meta::MetaGraph;

use std::str::FromStr;

use fluxo_common::{GraphError, IdArray};

/// Vertex type id of the source side of a bipartite relation.
pub const SRC_VTYPE: u64 = 0;

/// Vertex type id of the destination side of a bipartite relation.
pub const DST_VTYPE: u64 = 1;

/// A batch of edges as parallel `(src, dst, eid)` arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeArray {
    /// Source vertex per edge.
    pub src: IdArray,
    /// Destination vertex per edge.
    pub dst: IdArray,
    /// Edge id per edge.
    pub eid: IdArray,
}

/// Which CSR a traversal or sampling query runs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeDir {
    /// Walk edges backwards: neighbors are predecessors.
    In,
    /// Walk edges forwards: neighbors are successors.
    Out,
}

impl FromStr for EdgeDir {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(EdgeDir::In),
            "out" => Ok(EdgeDir::Out),
            other => Err(GraphError::BadDirection(other.to_owned())),
        }
    }
}

/// Requested ordering for edge enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeOrder {
    /// Whatever order the cheapest available format yields.
    Any,
    /// Canonical edge-id order.
    Eid,
    /// Sorted by source vertex (destinations within a source stay in
    /// storage order).
    SrcDst,
}

impl FromStr for EdgeOrder {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(EdgeOrder::Any),
            "eid" => Ok(EdgeOrder::Eid),
            "srcdst" => Ok(EdgeOrder::SrcDst),
            other => Err(GraphError::BadOrder(other.to_owned())),
        }
    }
}

/// Adjacency export format for [`Bipartite::get_adj`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjFormat {
    /// Stacked `(row, col)` pair.
    Coo,
    /// `(indptr, indices, data)` triple.
    Csr,
}

impl FromStr for AdjFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coo" => Ok(AdjFormat::Coo),
            "csr" => Ok(AdjFormat::Csr),
            other => Err(GraphError::BadFormat(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_vocabularies_are_closed() {
        assert_eq!("in".parse::<EdgeDir>().unwrap(), EdgeDir::In);
        assert_eq!("out".parse::<EdgeDir>().unwrap(), EdgeDir::Out);
        assert!(matches!(
            "both".parse::<EdgeDir>(),
            Err(GraphError::BadDirection(_))
        ));

        assert_eq!("".parse::<EdgeOrder>().unwrap(), EdgeOrder::Any);
        assert_eq!("eid".parse::<EdgeOrder>().unwrap(), EdgeOrder::Eid);
        assert_eq!("srcdst".parse::<EdgeOrder>().unwrap(), EdgeOrder::SrcDst);
        assert!(matches!(
            "dsteid".parse::<EdgeOrder>(),
            Err(GraphError::BadOrder(_))
        ));

        assert_eq!("coo".parse::<AdjFormat>().unwrap(), AdjFormat::Coo);
        assert_eq!("csr".parse::<AdjFormat>().unwrap(), AdjFormat::Csr);
        assert!(matches!(
            "csc".parse::<AdjFormat>(),
            Err(GraphError::BadFormat(_))
        ));
    }
}
