//! The heterograph: bipartite relations composed under a meta-graph.

use std::sync::{Arc, OnceLock};

use fluxo_common::{relabel_inplace, DeviceContext, GraphError, IdArray, Result};

use super::{AdjFormat, Bipartite, EdgeArray, EdgeOrder, MetaGraph};

/// A collection of bipartite relation graphs sharing a vertex-type id
/// space.
///
/// Relation `t` connects the vertex types `meta.find_edge(t)` names. Every
/// relation that touches a vertex type must agree on that type's vertex
/// count; the shared counts are what subgraph extraction preserves across
/// relations.
pub struct Heterograph {
    meta: Arc<MetaGraph>,
    relations: Vec<Arc<Bipartite>>,
    num_verts_per_type: Vec<u64>,
    multigraph: OnceLock<bool>,
}

/// A heterograph subgraph together with its provenance arrays.
#[derive(Clone)]
pub struct HeteroSubgraph {
    /// The extracted heterograph.
    pub graph: Arc<Heterograph>,
    /// Original vertex id per subgraph vertex, one array per vertex type.
    pub induced_vertices: Vec<IdArray>,
    /// Original edge id per subgraph edge, one array per edge type.
    pub induced_edges: Vec<IdArray>,
}

impl Heterograph {
    /// Composes relations under a meta-graph.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the relation count differs from the meta-graph's
    /// edge count, the list is empty, or two relations disagree on a shared
    /// vertex type's count (checked on both the src and dst side).
    pub fn new(meta: Arc<MetaGraph>, relations: Vec<Arc<Bipartite>>) -> Result<Self> {
        if relations.len() as u64 != meta.num_edge_types() {
            return Err(GraphError::ShapeMismatch(format!(
                "meta-graph names {} edge types but {} relation graphs were given",
                meta.num_edge_types(),
                relations.len()
            )));
        }
        if relations.is_empty() {
            return Err(GraphError::ShapeMismatch(
                "a heterograph needs at least one relation".into(),
            ));
        }
        let num_types = meta.num_vertex_types() as usize;
        let mut num_verts_per_type: Vec<Option<u64>> = vec![None; num_types];
        for (etype, rel) in relations.iter().enumerate() {
            let (src_type, dst_type) = meta.find_edge(etype as u64)?;
            for (vtype, count) in [
                (src_type, rel.num_vertices(super::SRC_VTYPE)?),
                (dst_type, rel.num_vertices(super::DST_VTYPE)?),
            ] {
                match num_verts_per_type[vtype as usize] {
                    None => num_verts_per_type[vtype as usize] = Some(count),
                    Some(existing) if existing != count => {
                        return Err(GraphError::ShapeMismatch(format!(
                            "vertex type {vtype} has {existing} vertices in one relation \
                             but {count} in relation {etype}"
                        )));
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(Self {
            meta,
            relations,
            num_verts_per_type: num_verts_per_type
                .into_iter()
                .map(|c| c.unwrap_or(0))
                .collect(),
            multigraph: OnceLock::new(),
        })
    }

    /// The type schema.
    #[must_use]
    pub fn meta_graph(&self) -> &Arc<MetaGraph> {
        &self.meta
    }

    /// The relation graph of edge type `etype`.
    ///
    /// # Errors
    ///
    /// `BadEdgeType` if `etype` is out of range.
    pub fn relation(&self, etype: u64) -> Result<&Arc<Bipartite>> {
        self.relations
            .get(etype as usize)
            .ok_or(GraphError::BadEdgeType(etype))
    }

    /// Vertex count of the given type.
    ///
    /// # Errors
    ///
    /// `BadVertexType` if `vtype` is out of range.
    pub fn num_vertices(&self, vtype: u64) -> Result<u64> {
        self.num_verts_per_type
            .get(vtype as usize)
            .copied()
            .ok_or(GraphError::BadVertexType(vtype))
    }

    /// Edge count of the given edge type.
    pub fn num_edges(&self, etype: u64) -> Result<usize> {
        Ok(self.relation(etype)?.num_edges())
    }

    /// Width of the graph's ids in bits.
    #[must_use]
    pub fn num_bits(&self) -> u8 {
        self.relations[0].num_bits()
    }

    /// Device the graph's arrays live on.
    #[must_use]
    pub fn context(&self) -> DeviceContext {
        self.relations[0].context()
    }

    /// Whether any relation holds parallel edges. Memoized.
    pub fn is_multigraph(&self) -> bool {
        *self
            .multigraph
            .get_or_init(|| self.relations.iter().any(|rel| rel.is_multigraph()))
    }

    /// Always true; the graph cannot be mutated after construction.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        true
    }

    /// Fails: the graph is read-only.
    pub fn add_vertices(&self, _vtype: u64, _num: u64) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn add_edge(&self, _etype: u64, _src: u64, _dst: u64) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn add_edges(&self, _etype: u64, _src: &IdArray, _dst: &IdArray) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn clear(&self) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Whether `id` is a valid vertex of type `vtype`.
    pub fn has_vertex(&self, vtype: u64, id: u64) -> Result<bool> {
        Ok(id < self.num_vertices(vtype)?)
    }

    /// [`has_vertex`](Self::has_vertex) over a batch of ids.
    pub fn has_vertices(&self, vtype: u64, ids: &IdArray) -> Result<Vec<bool>> {
        Ok(ids.lt(self.num_vertices(vtype)?))
    }

    // ------------------------------------------------------------------
    // Per-edge-type forwards
    // ------------------------------------------------------------------

    /// Whether at least one `src -> dst` edge of type `etype` exists.
    pub fn has_edge_between(&self, etype: u64, src: u64, dst: u64) -> Result<bool> {
        self.relation(etype)?.has_edge_between(src, dst)
    }

    /// [`has_edge_between`](Self::has_edge_between) over paired batches.
    pub fn has_edges_between(
        &self,
        etype: u64,
        src: &IdArray,
        dst: &IdArray,
    ) -> Result<Vec<bool>> {
        self.relation(etype)?.has_edges_between(src, dst)
    }

    /// Sources with an `etype` edge into `dst`.
    pub fn predecessors(&self, etype: u64, dst: u64) -> Result<IdArray> {
        self.relation(etype)?.predecessors(dst)
    }

    /// Destinations reachable from `src` over `etype` edges.
    pub fn successors(&self, etype: u64, src: u64) -> Result<IdArray> {
        self.relation(etype)?.successors(src)
    }

    /// Edge ids of every `src -> dst` edge of type `etype`.
    pub fn edge_id(&self, etype: u64, src: u64, dst: u64) -> Result<IdArray> {
        self.relation(etype)?.edge_id(src, dst)
    }

    /// Matching `(src, dst, eid)` triples for each pair in the batch.
    pub fn edge_ids(&self, etype: u64, src: &IdArray, dst: &IdArray) -> Result<EdgeArray> {
        self.relation(etype)?.edge_ids(src, dst)
    }

    /// The endpoints of edge `eid` of type `etype`.
    pub fn find_edge(&self, etype: u64, eid: u64) -> Result<(u64, u64)> {
        self.relation(etype)?.find_edge(eid)
    }

    /// The endpoints of every edge in `eids` of type `etype`.
    pub fn find_edges(&self, etype: u64, eids: &IdArray) -> Result<EdgeArray> {
        self.relation(etype)?.find_edges(eids)
    }

    /// All `etype` edges ending at `vid`.
    pub fn in_edges(&self, etype: u64, vid: u64) -> Result<EdgeArray> {
        self.relation(etype)?.in_edges(vid)
    }

    /// All `etype` edges ending at any of `vids`.
    pub fn in_edges_many(&self, etype: u64, vids: &IdArray) -> Result<EdgeArray> {
        self.relation(etype)?.in_edges_many(vids)
    }

    /// All `etype` edges starting at `vid`.
    pub fn out_edges(&self, etype: u64, vid: u64) -> Result<EdgeArray> {
        self.relation(etype)?.out_edges(vid)
    }

    /// All `etype` edges starting at any of `vids`.
    pub fn out_edges_many(&self, etype: u64, vids: &IdArray) -> Result<EdgeArray> {
        self.relation(etype)?.out_edges_many(vids)
    }

    /// Enumerates the `etype` edges in the requested order.
    pub fn edges(&self, etype: u64, order: EdgeOrder) -> Result<EdgeArray> {
        self.relation(etype)?.edges(order)
    }

    /// Number of `etype` edges ending at `vid`.
    pub fn in_degree(&self, etype: u64, vid: u64) -> Result<u64> {
        self.relation(etype)?.in_degree(vid)
    }

    /// [`in_degree`](Self::in_degree) over a batch.
    pub fn in_degrees(&self, etype: u64, vids: &IdArray) -> Result<IdArray> {
        self.relation(etype)?.in_degrees(vids)
    }

    /// Number of `etype` edges starting at `vid`.
    pub fn out_degree(&self, etype: u64, vid: u64) -> Result<u64> {
        self.relation(etype)?.out_degree(vid)
    }

    /// [`out_degree`](Self::out_degree) over a batch.
    pub fn out_degrees(&self, etype: u64, vids: &IdArray) -> Result<IdArray> {
        self.relation(etype)?.out_degrees(vids)
    }

    /// Exports the adjacency of relation `etype`; see
    /// [`Bipartite::get_adj`] for the format conventions.
    pub fn get_adj(&self, etype: u64, transpose: bool, fmt: AdjFormat) -> Result<Vec<IdArray>> {
        self.relation(etype)?.get_adj(transpose, fmt)
    }

    // ------------------------------------------------------------------
    // Subgraphs
    // ------------------------------------------------------------------

    /// The subgraph induced by keeping `vids[v]` for each vertex type `v`.
    ///
    /// Every relation is sliced against its own two types' id lists, so a
    /// vertex type shared by several relations is restricted consistently.
    pub fn vertex_subgraph(&self, vids: &[IdArray]) -> Result<HeteroSubgraph> {
        if vids.len() as u64 != self.meta.num_vertex_types() {
            return Err(GraphError::ShapeMismatch(format!(
                "expected one id array per vertex type ({}), got {}",
                self.meta.num_vertex_types(),
                vids.len()
            )));
        }
        let mut subrels = Vec::with_capacity(self.relations.len());
        let mut induced_edges = Vec::with_capacity(self.relations.len());
        for etype in 0..self.relations.len() as u64 {
            let (src_type, dst_type) = self.meta.find_edge(etype)?;
            let sub = self.relation(etype)?.vertex_subgraph(
                &vids[src_type as usize],
                &vids[dst_type as usize],
            )?;
            subrels.push(sub.graph);
            induced_edges.push(sub.induced_edges[0].clone());
        }
        Ok(HeteroSubgraph {
            graph: Arc::new(Heterograph::new(Arc::clone(&self.meta), subrels)?),
            induced_vertices: vids.to_vec(),
            induced_edges,
        })
    }

    /// The subgraph induced by keeping `eids[t]` for each edge type `t`.
    ///
    /// With `preserve_nodes` every vertex type keeps its full range and the
    /// per-relation extraction is independent. Without it, relations that
    /// share a vertex type must land in one common densified id space: the
    /// kept endpoints of all relations touching a type are relabeled
    /// together, and the joint mapping becomes that type's induced vertex
    /// set.
    pub fn edge_subgraph(&self, eids: &[IdArray], preserve_nodes: bool) -> Result<HeteroSubgraph> {
        if eids.len() != self.relations.len() {
            return Err(GraphError::ShapeMismatch(format!(
                "expected one edge id array per edge type ({}), got {}",
                self.relations.len(),
                eids.len()
            )));
        }
        if preserve_nodes {
            self.edge_subgraph_preserve(eids)
        } else {
            self.edge_subgraph_densify(eids)
        }
    }

    fn edge_subgraph_preserve(&self, eids: &[IdArray]) -> Result<HeteroSubgraph> {
        let num_types = self.meta.num_vertex_types() as usize;
        let mut induced_vertices = vec![IdArray::from_vec(Vec::new()); num_types];
        let mut subrels = Vec::with_capacity(self.relations.len());
        for (etype, rel_eids) in eids.iter().enumerate() {
            let (src_type, dst_type) = self.meta.find_edge(etype as u64)?;
            let sub = self.relation(etype as u64)?.edge_subgraph(rel_eids, true)?;
            // Several relations may write the same type; under
            // preserve_nodes every writer produces the identical
            // full-range array, so last-writer-wins is sound.
            induced_vertices[src_type as usize] = sub.induced_vertices[0].clone();
            induced_vertices[dst_type as usize] = sub.induced_vertices[1].clone();
            subrels.push(sub.graph);
        }
        Ok(HeteroSubgraph {
            graph: Arc::new(Heterograph::new(Arc::clone(&self.meta), subrels)?),
            induced_vertices,
            induced_edges: eids.to_vec(),
        })
    }

    fn edge_subgraph_densify(&self, eids: &[IdArray]) -> Result<HeteroSubgraph> {
        let num_types = self.meta.num_vertex_types() as usize;
        let pairs: Vec<(u64, u64)> = (0..self.relations.len() as u64)
            .map(|etype| self.meta.find_edge(etype))
            .collect::<Result<_>>()?;

        // Gather the kept endpoints of every relation, then relabel all
        // arrays that feed one vertex type together so the type ends up
        // with a single dense id space.
        let mut subedges: Vec<EdgeArray> = eids
            .iter()
            .enumerate()
            .map(|(etype, rel_eids)| self.relation(etype as u64)?.find_edges(rel_eids))
            .collect::<Result<_>>()?;

        let mut induced_vertices = Vec::with_capacity(num_types);
        for vtype in 0..num_types as u64 {
            let mut bucket: Vec<&mut IdArray> = Vec::new();
            for (etype, edge_array) in subedges.iter_mut().enumerate() {
                let (src_type, dst_type) = pairs[etype];
                if src_type == vtype {
                    bucket.push(&mut edge_array.src);
                }
                if dst_type == vtype {
                    bucket.push(&mut edge_array.dst);
                }
            }
            induced_vertices.push(relabel_inplace(&mut bucket));
        }

        let mut subrels = Vec::with_capacity(self.relations.len());
        for (etype, edge_array) in subedges.into_iter().enumerate() {
            let (src_type, dst_type) = pairs[etype];
            let rel = Bipartite::from_coo(
                induced_vertices[src_type as usize].len() as u64,
                induced_vertices[dst_type as usize].len() as u64,
                edge_array.src,
                edge_array.dst,
            )?;
            subrels.push(Arc::new(rel));
        }
        Ok(HeteroSubgraph {
            graph: Arc::new(Heterograph::new(Arc::clone(&self.meta), subrels)?),
            induced_vertices,
            induced_edges: eids.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Heterograph {
        // A -> B -> C with 2 vertices of each type
        let meta = Arc::new(MetaGraph::new(3, vec![(0, 1), (1, 2)]).unwrap());
        let ab = Bipartite::from_coo(
            2,
            2,
            IdArray::from_vec(vec![0, 0]),
            IdArray::from_vec(vec![0, 1]),
        )
        .unwrap();
        let bc = Bipartite::from_coo(
            2,
            2,
            IdArray::from_vec(vec![1, 1]),
            IdArray::from_vec(vec![0, 1]),
        )
        .unwrap();
        Heterograph::new(meta, vec![Arc::new(ab), Arc::new(bc)]).unwrap()
    }

    #[test]
    fn shared_types_must_agree_on_vertex_counts() {
        let meta = Arc::new(MetaGraph::new(3, vec![(0, 1), (1, 2)]).unwrap());
        let ab = Bipartite::from_coo(
            2,
            2,
            IdArray::from_vec(vec![0]),
            IdArray::from_vec(vec![0]),
        )
        .unwrap();
        // B has 2 vertices as a dst type but 3 as a src type
        let bc = Bipartite::from_coo(
            3,
            2,
            IdArray::from_vec(vec![2]),
            IdArray::from_vec(vec![1]),
        )
        .unwrap();
        let err = Heterograph::new(meta, vec![Arc::new(ab), Arc::new(bc)]);
        assert!(matches!(err, Err(GraphError::ShapeMismatch(_))));
    }

    #[test]
    fn forwards_reach_the_named_relation() {
        let g = chain();
        assert_eq!(g.num_vertices(1).unwrap(), 2);
        assert_eq!(g.num_edges(0).unwrap(), 2);
        assert_eq!(g.successors(0, 0).unwrap().as_slice(), &[0, 1]);
        assert_eq!(g.predecessors(1, 0).unwrap().as_slice(), &[1]);
        assert!(matches!(
            g.num_edges(5),
            Err(GraphError::BadEdgeType(5))
        ));
        assert!(g.has_vertex(2, 1).unwrap());
        assert!(!g.is_multigraph());
    }

    #[test]
    fn vertex_subgraph_slices_every_relation() {
        let g = chain();
        let sub = g
            .vertex_subgraph(&[
                IdArray::from_vec(vec![0]),
                IdArray::from_vec(vec![1]),
                IdArray::from_vec(vec![0, 1]),
            ])
            .unwrap();
        assert_eq!(sub.graph.num_vertices(0).unwrap(), 1);
        assert_eq!(sub.graph.num_vertices(1).unwrap(), 1);
        assert_eq!(sub.graph.num_vertices(2).unwrap(), 2);
        // A->B keeps only (0, 1); both B->C edges start at the kept b=1
        assert_eq!(sub.induced_edges[0].as_slice(), &[1]);
        assert_eq!(sub.induced_edges[1].as_slice(), &[0, 1]);
        assert_eq!(sub.graph.num_edges(1).unwrap(), 2);
    }
}
