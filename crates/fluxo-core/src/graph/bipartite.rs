//! The bipartite relation graph: one edge set, up to three adjacency views.

use std::sync::{Arc, OnceLock};

use fluxo_common::{
    relabel_inplace, CooMatrix, CsrMatrix, DeviceContext, GraphError, IdArray, IdBits, Result,
};
use tracing::debug;

use super::{AdjFormat, EdgeArray, EdgeOrder, DST_VTYPE, SRC_VTYPE};

/// A read-only graph with two vertex types (src and dst) and one edge type.
///
/// The same edge multiset is held in any subset of {COO, out-CSR, in-CSR};
/// missing views are materialized on demand, at most once, behind write-once
/// slots, so shared handles stay safe under concurrent readers. Edge ids are
/// canonical COO positions and agree across all views.
///
/// Queries pick the cheapest view that can answer them: symmetric CSR
/// operations prefer an already-present in-CSR (with swapped arguments) over
/// forcing out-CSR materialization.
pub struct Bipartite {
    num_src: u64,
    num_dst: u64,
    num_edges: usize,
    bits: IdBits,
    in_csr: OnceLock<CsrMatrix>,
    out_csr: OnceLock<CsrMatrix>,
    coo: OnceLock<CooMatrix>,
    multigraph: OnceLock<bool>,
}

/// A bipartite subgraph together with its provenance arrays.
///
/// `induced_vertices[0]`/`[1]` map subgraph src/dst ids back to the parent
/// graph; `induced_edges[0]` does the same for edge ids.
#[derive(Clone)]
pub struct BipartiteSubgraph {
    /// The extracted graph.
    pub graph: Arc<Bipartite>,
    /// Original vertex id per subgraph vertex, one array per side.
    pub induced_vertices: Vec<IdArray>,
    /// Original edge id per subgraph edge.
    pub induced_edges: Vec<IdArray>,
}

fn seeded<T>(value: Option<T>) -> OnceLock<T> {
    let slot = OnceLock::new();
    if let Some(v) = value {
        let _ = slot.set(v);
    }
    slot
}

impl Bipartite {
    /// Builds a graph from COO edge arrays. Edge `i` is
    /// `row[i] -> col[i]` and `i` is its edge id.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if the arrays disagree in length or width or hold
    /// ids outside the declared shape.
    pub fn from_coo(num_src: u64, num_dst: u64, row: IdArray, col: IdArray) -> Result<Self> {
        let coo = CooMatrix::new(num_src, num_dst, row, col)?;
        Ok(Self {
            num_src,
            num_dst,
            num_edges: coo.num_edges(),
            bits: coo.bits(),
            in_csr: OnceLock::new(),
            out_csr: OnceLock::new(),
            coo: seeded(Some(coo)),
            multigraph: OnceLock::new(),
        })
    }

    /// Builds a graph from an out-CSR. `edge_ids` assigns the canonical
    /// edge id of each stored entry and must be a permutation of
    /// `0..num_edges` (the COO view is reconstructed from it).
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if the arrays are inconsistent or `edge_ids` is not
    /// a permutation.
    pub fn from_csr(
        num_src: u64,
        num_dst: u64,
        indptr: IdArray,
        indices: IdArray,
        edge_ids: IdArray,
    ) -> Result<Self> {
        let csr = CsrMatrix::new(num_src, num_dst, indptr, indices, edge_ids)?;
        let num_edges = csr.num_edges();
        let mut seen = vec![false; num_edges];
        for eid in csr.data.iter() {
            if eid as usize >= num_edges || seen[eid as usize] {
                return Err(GraphError::InvalidIdArray(format!(
                    "edge_ids must be a permutation of 0..{num_edges}"
                )));
            }
            seen[eid as usize] = true;
        }
        Ok(Self {
            num_src,
            num_dst,
            num_edges,
            bits: csr.bits(),
            in_csr: OnceLock::new(),
            out_csr: seeded(Some(csr)),
            coo: OnceLock::new(),
            multigraph: OnceLock::new(),
        })
    }

    /// Assembles a graph from already-validated views. At least one view
    /// must be present; a pre-computed multigraph flag may be carried over
    /// so derived graphs skip re-detection.
    pub(crate) fn from_parts(
        in_csr: Option<CsrMatrix>,
        out_csr: Option<CsrMatrix>,
        coo: Option<CooMatrix>,
        multigraph: Option<bool>,
    ) -> Self {
        let (num_src, num_dst, num_edges, bits) = if let Some(csr) = &out_csr {
            (csr.num_rows, csr.num_cols, csr.num_edges(), csr.bits())
        } else if let Some(csr) = &in_csr {
            (csr.num_cols, csr.num_rows, csr.num_edges(), csr.bits())
        } else {
            let coo = coo
                .as_ref()
                .expect("bipartite requires at least one adjacency view");
            (coo.num_rows, coo.num_cols, coo.num_edges(), coo.bits())
        };
        Self {
            num_src,
            num_dst,
            num_edges,
            bits,
            in_csr: seeded(in_csr),
            out_csr: seeded(out_csr),
            coo: seeded(coo),
            multigraph: seeded(multigraph),
        }
    }

    // ------------------------------------------------------------------
    // Lazy view materialization
    // ------------------------------------------------------------------

    /// The out-CSR view (rows are src vertices), materializing it if
    /// absent: transpose the in-CSR when present, otherwise convert the
    /// COO.
    pub fn out_csr(&self) -> &CsrMatrix {
        self.out_csr.get_or_init(|| {
            if let Some(in_csr) = self.in_csr.get() {
                debug!(num_edges = self.num_edges, "graph.materialize.out_csr.transpose");
                in_csr.transpose()
            } else {
                let coo = self
                    .coo
                    .get()
                    .expect("bipartite holds at least one adjacency view");
                debug!(num_edges = self.num_edges, "graph.materialize.out_csr.from_coo");
                coo.to_csr()
            }
        })
    }

    /// The in-CSR view (rows are dst vertices), materializing it if
    /// absent: transpose the out-CSR when present, otherwise convert the
    /// swapped COO.
    pub fn in_csr(&self) -> &CsrMatrix {
        self.in_csr.get_or_init(|| {
            if let Some(out_csr) = self.out_csr.get() {
                debug!(num_edges = self.num_edges, "graph.materialize.in_csr.transpose");
                out_csr.transpose()
            } else {
                let coo = self
                    .coo
                    .get()
                    .expect("bipartite holds at least one adjacency view");
                debug!(num_edges = self.num_edges, "graph.materialize.in_csr.from_coo");
                CooMatrix {
                    num_rows: coo.num_cols,
                    num_cols: coo.num_rows,
                    row: coo.col.clone(),
                    col: coo.row.clone(),
                }
                .to_csr()
            }
        })
    }

    /// The COO view, materializing it from a CSR if absent (swapping sides
    /// back when it comes from the in-CSR).
    pub fn coo(&self) -> &CooMatrix {
        self.coo.get_or_init(|| {
            if let Some(in_csr) = self.in_csr.get() {
                debug!(num_edges = self.num_edges, "graph.materialize.coo.from_in_csr");
                let swapped = in_csr.to_coo();
                CooMatrix {
                    num_rows: swapped.num_cols,
                    num_cols: swapped.num_rows,
                    row: swapped.col,
                    col: swapped.row,
                }
            } else {
                let out_csr = self
                    .out_csr
                    .get()
                    .expect("bipartite holds at least one adjacency view");
                debug!(num_edges = self.num_edges, "graph.materialize.coo.from_out_csr");
                out_csr.to_coo()
            }
        })
    }

    // ------------------------------------------------------------------
    // Shape and metadata
    // ------------------------------------------------------------------

    /// Vertex count of the given side (`0` = src, `1` = dst).
    ///
    /// # Errors
    ///
    /// `BadVertexType` for any other tag.
    pub fn num_vertices(&self, vtype: u64) -> Result<u64> {
        match vtype {
            SRC_VTYPE => Ok(self.num_src),
            DST_VTYPE => Ok(self.num_dst),
            other => Err(GraphError::BadVertexType(other)),
        }
    }

    /// Number of edges; identical across all materialized views.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Width of the graph's ids in bits.
    #[must_use]
    pub fn num_bits(&self) -> u8 {
        self.bits.width()
    }

    /// Width tag of the graph's ids.
    #[must_use]
    pub fn bits(&self) -> IdBits {
        self.bits
    }

    /// Device the graph's arrays live on.
    #[must_use]
    pub fn context(&self) -> DeviceContext {
        DeviceContext::Cpu
    }

    /// Whether parallel edges exist. Computed on first use from whichever
    /// view is present, then memoized.
    pub fn is_multigraph(&self) -> bool {
        *self.multigraph.get_or_init(|| {
            if let Some(csr) = self.in_csr.get() {
                csr.has_duplicate()
            } else if let Some(csr) = self.out_csr.get() {
                csr.has_duplicate()
            } else {
                self.coo()
                    .has_duplicate()
            }
        })
    }

    /// Always true; the graph cannot be mutated after construction.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        true
    }

    // ------------------------------------------------------------------
    // Rejected mutations
    // ------------------------------------------------------------------

    /// Fails: the graph is read-only.
    pub fn add_vertices(&self, _vtype: u64, _num: u64) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn add_edge(&self, _src: u64, _dst: u64) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn add_edges(&self, _src: &IdArray, _dst: &IdArray) -> Result<()> {
        Err(GraphError::Immutable)
    }

    /// Fails: the graph is read-only.
    pub fn clear(&self) -> Result<()> {
        Err(GraphError::Immutable)
    }

    // ------------------------------------------------------------------
    // Existence
    // ------------------------------------------------------------------

    /// Whether `id` is a valid vertex of the given side.
    ///
    /// # Errors
    ///
    /// `BadVertexType` for an unknown side tag.
    pub fn has_vertex(&self, vtype: u64, id: u64) -> Result<bool> {
        Ok(id < self.num_vertices(vtype)?)
    }

    /// [`has_vertex`](Self::has_vertex) over a batch of ids.
    pub fn has_vertices(&self, vtype: u64, ids: &IdArray) -> Result<Vec<bool>> {
        Ok(ids.lt(self.num_vertices(vtype)?))
    }

    fn check_src(&self, id: u64) -> Result<()> {
        if id < self.num_src {
            Ok(())
        } else {
            Err(GraphError::NoSuchVertex {
                vtype: SRC_VTYPE,
                id,
            })
        }
    }

    fn check_dst(&self, id: u64) -> Result<()> {
        if id < self.num_dst {
            Ok(())
        } else {
            Err(GraphError::NoSuchVertex {
                vtype: DST_VTYPE,
                id,
            })
        }
    }

    /// Whether at least one `src -> dst` edge exists. Served from the
    /// in-CSR (arguments swapped) when it is already present, otherwise
    /// from the out-CSR.
    pub fn has_edge_between(&self, src: u64, dst: u64) -> Result<bool> {
        self.check_src(src)?;
        self.check_dst(dst)?;
        if let Some(in_csr) = self.in_csr.get() {
            Ok(in_csr.is_nonzero(dst, src))
        } else {
            Ok(self.out_csr().is_nonzero(src, dst))
        }
    }

    /// [`has_edge_between`](Self::has_edge_between) over paired batches.
    pub fn has_edges_between(&self, src: &IdArray, dst: &IdArray) -> Result<Vec<bool>> {
        for id in src.iter() {
            self.check_src(id)?;
        }
        for id in dst.iter() {
            self.check_dst(id)?;
        }
        if let Some(in_csr) = self.in_csr.get() {
            in_csr.is_nonzero_many(dst, src)
        } else {
            self.out_csr().is_nonzero_many(src, dst)
        }
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Source vertices with an edge into `dst`.
    pub fn predecessors(&self, dst: u64) -> Result<IdArray> {
        self.check_dst(dst)?;
        Ok(self.in_csr().row_col_indices(dst))
    }

    /// Destination vertices reachable from `src`.
    pub fn successors(&self, src: u64) -> Result<IdArray> {
        self.check_src(src)?;
        Ok(self.out_csr().row_col_indices(src))
    }

    /// All edges ending at `vid`.
    pub fn in_edges(&self, vid: u64) -> Result<EdgeArray> {
        self.check_dst(vid)?;
        let in_csr = self.in_csr();
        Ok(EdgeArray {
            src: in_csr.row_col_indices(vid),
            dst: IdArray::full(vid, in_csr.row_nnz(vid) as usize, self.bits),
            eid: in_csr.row_data(vid),
        })
    }

    /// All edges ending at any of `vids`, grouped by destination.
    pub fn in_edges_many(&self, vids: &IdArray) -> Result<EdgeArray> {
        for id in vids.iter() {
            self.check_dst(id)?;
        }
        let (dst, src, eid) = Self::edges_from_rows(self.in_csr(), vids)?;
        Ok(EdgeArray { src, dst, eid })
    }

    /// All edges starting at `vid`.
    pub fn out_edges(&self, vid: u64) -> Result<EdgeArray> {
        self.check_src(vid)?;
        let out_csr = self.out_csr();
        Ok(EdgeArray {
            src: IdArray::full(vid, out_csr.row_nnz(vid) as usize, self.bits),
            dst: out_csr.row_col_indices(vid),
            eid: out_csr.row_data(vid),
        })
    }

    /// All edges starting at any of `vids`, grouped by source.
    pub fn out_edges_many(&self, vids: &IdArray) -> Result<EdgeArray> {
        for id in vids.iter() {
            self.check_src(id)?;
        }
        let (src, dst, eid) = Self::edges_from_rows(self.out_csr(), vids)?;
        Ok(EdgeArray { src, dst, eid })
    }

    /// Flattens the rows `vids` of `csr` into `(row, col, eid)` triples,
    /// recovering original row ids from the slice positions.
    fn edges_from_rows(csr: &CsrMatrix, vids: &IdArray) -> Result<(IdArray, IdArray, IdArray)> {
        let sub = csr.slice_rows(vids)?;
        let (row_pos, col, eid) = sub.to_sorted_triples();
        let row = vids.index_select(&row_pos)?;
        Ok((row, col, eid))
    }

    // ------------------------------------------------------------------
    // Edge lookup and enumeration
    // ------------------------------------------------------------------

    /// Edge ids of every `src -> dst` edge (more than one for parallel
    /// edges). Served from the in-CSR with swapped arguments when present.
    pub fn edge_id(&self, src: u64, dst: u64) -> Result<IdArray> {
        self.check_src(src)?;
        self.check_dst(dst)?;
        if let Some(in_csr) = self.in_csr.get() {
            Ok(in_csr.get_data(dst, src))
        } else {
            Ok(self.out_csr().get_data(src, dst))
        }
    }

    /// One `(src, dst, eid)` triple per matching edge for each pair in the
    /// batch.
    pub fn edge_ids(&self, src: &IdArray, dst: &IdArray) -> Result<EdgeArray> {
        for id in src.iter() {
            self.check_src(id)?;
        }
        for id in dst.iter() {
            self.check_dst(id)?;
        }
        if let Some(in_csr) = self.in_csr.get() {
            let (rows, cols, eids) = in_csr.get_data_and_indices(dst, src)?;
            Ok(EdgeArray {
                src: cols,
                dst: rows,
                eid: eids,
            })
        } else {
            let (rows, cols, eids) = self.out_csr().get_data_and_indices(src, dst)?;
            Ok(EdgeArray {
                src: rows,
                dst: cols,
                eid: eids,
            })
        }
    }

    /// The endpoints of edge `eid`. Requires the COO view.
    pub fn find_edge(&self, eid: u64) -> Result<(u64, u64)> {
        if eid as usize >= self.num_edges {
            return Err(GraphError::NoSuchEdge(eid));
        }
        let coo = self.coo();
        Ok((coo.row.get(eid as usize), coo.col.get(eid as usize)))
    }

    /// The endpoints of every edge in `eids`, as an edge batch.
    pub fn find_edges(&self, eids: &IdArray) -> Result<EdgeArray> {
        if let Some(eid) = eids.iter().find(|&e| e as usize >= self.num_edges) {
            return Err(GraphError::NoSuchEdge(eid));
        }
        let coo = self.coo();
        Ok(EdgeArray {
            src: coo.row.index_select(eids)?,
            dst: coo.col.index_select(eids)?,
            eid: eids.clone(),
        })
    }

    /// Enumerates all edges in the requested order.
    ///
    /// `Any` uses whichever view is present (an in-CSR answer is swapped
    /// back), `Eid` uses the COO view, and `SrcDst` sorts by source via the
    /// out-CSR.
    pub fn edges(&self, order: EdgeOrder) -> Result<EdgeArray> {
        match order {
            EdgeOrder::Any => {
                if let Some(in_csr) = self.in_csr.get() {
                    let (dst, src, eid) = in_csr.to_sorted_triples();
                    Ok(EdgeArray { src, dst, eid })
                } else if let Some(out_csr) = self.out_csr.get() {
                    let (src, dst, eid) = out_csr.to_sorted_triples();
                    Ok(EdgeArray { src, dst, eid })
                } else {
                    self.edges(EdgeOrder::Eid)
                }
            }
            EdgeOrder::Eid => {
                let coo = self.coo();
                Ok(EdgeArray {
                    src: coo.row.clone(),
                    dst: coo.col.clone(),
                    eid: IdArray::range(0, self.num_edges as u64, self.bits),
                })
            }
            EdgeOrder::SrcDst => {
                let (src, dst, eid) = self.out_csr().to_sorted_triples();
                Ok(EdgeArray { src, dst, eid })
            }
        }
    }

    // ------------------------------------------------------------------
    // Degrees
    // ------------------------------------------------------------------

    /// Number of edges ending at `vid`.
    pub fn in_degree(&self, vid: u64) -> Result<u64> {
        self.check_dst(vid)?;
        Ok(self.in_csr().row_nnz(vid))
    }

    /// [`in_degree`](Self::in_degree) over a batch.
    pub fn in_degrees(&self, vids: &IdArray) -> Result<IdArray> {
        for id in vids.iter() {
            self.check_dst(id)?;
        }
        Ok(self.in_csr().row_nnz_many(vids))
    }

    /// Number of edges starting at `vid`.
    pub fn out_degree(&self, vid: u64) -> Result<u64> {
        self.check_src(vid)?;
        Ok(self.out_csr().row_nnz(vid))
    }

    /// [`out_degree`](Self::out_degree) over a batch.
    pub fn out_degrees(&self, vids: &IdArray) -> Result<IdArray> {
        for id in vids.iter() {
            self.check_src(id)?;
        }
        Ok(self.out_csr().row_nnz_many(vids))
    }

    // ------------------------------------------------------------------
    // Adjacency export
    // ------------------------------------------------------------------

    /// Exports the adjacency matrix.
    ///
    /// For `Coo`, returns one array: `row` and `col` stacked (swapped when
    /// `transpose`). For `Csr`, returns the `(indptr, indices, data)`
    /// triple - with the historical quirk that `transpose == false` yields
    /// the **in**-CSR and `transpose == true` the out-CSR, matching the
    /// external rows-are-destinations convention.
    pub fn get_adj(&self, transpose: bool, fmt: AdjFormat) -> Result<Vec<IdArray>> {
        match fmt {
            AdjFormat::Csr => {
                let csr = if transpose {
                    self.out_csr()
                } else {
                    self.in_csr()
                };
                Ok(vec![
                    csr.indptr.clone(),
                    csr.indices.clone(),
                    csr.data.clone(),
                ])
            }
            AdjFormat::Coo => {
                let coo = self.coo();
                let stacked = if transpose {
                    coo.col.hstack(&coo.row)?
                } else {
                    coo.row.hstack(&coo.col)?
                };
                Ok(vec![stacked])
            }
        }
    }

    // ------------------------------------------------------------------
    // Subgraphs
    // ------------------------------------------------------------------

    /// The subgraph induced by keeping `src_vids` on the source side and
    /// `dst_vids` on the destination side, both relabeled to positions in
    /// the given arrays. Extracted from the out-CSR.
    pub fn vertex_subgraph(
        &self,
        src_vids: &IdArray,
        dst_vids: &IdArray,
    ) -> Result<BipartiteSubgraph> {
        for id in src_vids.iter() {
            self.check_src(id)?;
        }
        for id in dst_vids.iter() {
            self.check_dst(id)?;
        }
        let submat = self.out_csr().slice_matrix(src_vids, dst_vids)?;
        let induced_eids = submat.data.clone();
        let fresh_eids = IdArray::range(0, submat.num_edges() as u64, self.bits);
        let graph = Bipartite::from_parts(
            None,
            Some(CsrMatrix {
                data: fresh_eids,
                ..submat
            }),
            None,
            None,
        );
        Ok(BipartiteSubgraph {
            graph: Arc::new(graph),
            induced_vertices: vec![src_vids.clone(), dst_vids.clone()],
            induced_edges: vec![induced_eids],
        })
    }

    /// The subgraph induced by keeping exactly the edges in `eids`.
    ///
    /// With `preserve_nodes` the full vertex ranges survive; otherwise each
    /// side is densified independently to the vertices the kept edges
    /// touch. Extracted from the COO view.
    pub fn edge_subgraph(&self, eids: &IdArray, preserve_nodes: bool) -> Result<BipartiteSubgraph> {
        if let Some(eid) = eids.iter().find(|&e| e as usize >= self.num_edges) {
            return Err(GraphError::NoSuchEdge(eid));
        }
        let coo = self.coo();
        let mut new_src = coo.row.index_select(eids)?;
        let mut new_dst = coo.col.index_select(eids)?;
        if preserve_nodes {
            let graph = Bipartite::from_coo(self.num_src, self.num_dst, new_src, new_dst)?;
            Ok(BipartiteSubgraph {
                graph: Arc::new(graph),
                induced_vertices: vec![
                    IdArray::range(0, self.num_src, self.bits),
                    IdArray::range(0, self.num_dst, self.bits),
                ],
                induced_edges: vec![eids.clone()],
            })
        } else {
            let induced_src = relabel_inplace(&mut [&mut new_src]);
            let induced_dst = relabel_inplace(&mut [&mut new_dst]);
            let graph = Bipartite::from_coo(
                induced_src.len() as u64,
                induced_dst.len() as u64,
                new_src,
                new_dst,
            )?;
            Ok(BipartiteSubgraph {
                graph: Arc::new(graph),
                induced_vertices: vec![induced_src, induced_dst],
                induced_edges: vec![eids.clone()],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bipartite {
        Bipartite::from_coo(
            3,
            4,
            IdArray::from_vec(vec![0, 0, 1, 2]),
            IdArray::from_vec(vec![1, 2, 0, 3]),
        )
        .unwrap()
    }

    #[test]
    fn all_views_agree_on_the_edge_multiset() {
        let g = sample();
        let by_eid = g.edges(EdgeOrder::Eid).unwrap();
        // materialize both CSRs, then re-derive the COO from each
        let from_out = g.out_csr().to_coo();
        let from_in = {
            let swapped = g.in_csr().to_coo();
            (swapped.col, swapped.row)
        };
        assert_eq!(by_eid.src, from_out.row);
        assert_eq!(by_eid.dst, from_out.col);
        assert_eq!(by_eid.src, from_in.0);
        assert_eq!(by_eid.dst, from_in.1);
    }

    #[test]
    fn transposing_out_csr_equals_in_csr_from_coo() {
        let g = sample();
        let transposed = g.out_csr().transpose();
        assert_eq!(&transposed, g.in_csr());
    }

    #[test]
    fn num_edges_is_format_independent() {
        let g = sample();
        assert_eq!(g.num_edges(), 4);
        g.in_csr();
        g.out_csr();
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.out_csr().num_edges(), 4);
        assert_eq!(g.in_csr().num_edges(), 4);
    }

    #[test]
    fn from_csr_requires_an_edge_id_permutation() {
        let bad = Bipartite::from_csr(
            2,
            2,
            IdArray::from_vec(vec![0, 1, 2]),
            IdArray::from_vec(vec![0, 1]),
            IdArray::from_vec(vec![0, 0]),
        );
        assert!(matches!(bad, Err(GraphError::InvalidIdArray(_))));
    }

    #[test]
    fn mutations_are_rejected() {
        let g = sample();
        assert!(g.is_readonly());
        assert_eq!(g.add_vertices(0, 5), Err(GraphError::Immutable));
        assert_eq!(g.add_edge(0, 0), Err(GraphError::Immutable));
        assert_eq!(
            g.add_edges(&IdArray::from_vec(vec![0]), &IdArray::from_vec(vec![0])),
            Err(GraphError::Immutable)
        );
        assert_eq!(g.clear(), Err(GraphError::Immutable));
    }

    #[test]
    fn vertex_type_tags_are_checked() {
        let g = sample();
        assert_eq!(g.num_vertices(SRC_VTYPE).unwrap(), 3);
        assert_eq!(g.num_vertices(DST_VTYPE).unwrap(), 4);
        assert!(matches!(
            g.num_vertices(2),
            Err(GraphError::BadVertexType(2))
        ));
    }

    #[test]
    fn multigraph_flag_is_memoized() {
        let g = Bipartite::from_coo(
            2,
            2,
            IdArray::from_vec(vec![0, 0]),
            IdArray::from_vec(vec![1, 1]),
        )
        .unwrap();
        assert!(g.is_multigraph());
        assert!(g.is_multigraph());
        assert!(!sample().is_multigraph());
    }
}
