//! Multi-hop neighbor expansion ("neighbor sampling").

use std::sync::Arc;

use fluxo_common::collections::{FxHashMap, FxHashSet};
use fluxo_common::{CsrMatrix, GraphError, IdArray, IdBits, Result};
use rand::Rng;

use crate::graph::{Bipartite, EdgeDir, DST_VTYPE, SRC_VTYPE};
use crate::nodeflow::{NodeFlow, MISSING_EDGE_ID};

use super::heap::ArrayHeap;

/// Parameters of a neighbor-sampling run.
#[derive(Clone, Debug)]
pub struct NeighborSamplerOptions {
    /// Number of expansion hops; the flow ends up with `num_hops + 1`
    /// layers (seeds plus one layer per hop).
    pub num_hops: usize,
    /// Upper bound on sampled neighbors per destination vertex.
    pub expand_factor: usize,
    /// Which adjacency the expansion walks.
    pub dir: EdgeDir,
    /// Whether every destination also flows from itself, synthesizing a
    /// [`MISSING_EDGE_ID`] edge when the graph has no such self-edge.
    pub add_self_loop: bool,
}

/// A destination's slice of the flat sampled-neighbor arrays.
struct NeighborPos {
    id: u64,
    pos: usize,
    num_edges: usize,
}

/// Runs one neighbor-sampling pass over `seeds` and builds the node flow.
///
/// Expansion walks `num_hops` levels outward from the deduplicated seeds,
/// bounding each vertex's sampled neighborhood by `expand_factor` -
/// uniformly, or weighted by `probability` (indexed by edge id) when given.
///
/// # Errors
///
/// `BadWidth` for a 32-bit graph, `ShapeMismatch` for a non-square graph or
/// a probability vector whose length differs from the edge count,
/// `NoSuchVertex` for out-of-range seeds.
pub fn neighbor_sample<R: Rng>(
    graph: &Bipartite,
    seeds: &[u64],
    opts: &NeighborSamplerOptions,
    probability: Option<&[f64]>,
    rng: &mut R,
) -> Result<NodeFlow> {
    if graph.num_bits() != 64 {
        return Err(GraphError::BadWidth(graph.num_bits()));
    }
    let num_vertices = graph.num_vertices(SRC_VTYPE)?;
    if num_vertices != graph.num_vertices(DST_VTYPE)? {
        return Err(GraphError::ShapeMismatch(
            "neighbor sampling needs equal src and dst vertex counts".into(),
        ));
    }
    let probability = probability.filter(|p| !p.is_empty());
    if let Some(p) = probability {
        if p.len() != graph.num_edges() {
            return Err(GraphError::ShapeMismatch(format!(
                "probability vector has {} entries for {} edges",
                p.len(),
                graph.num_edges()
            )));
        }
    }
    for &seed in seeds {
        if seed >= num_vertices {
            return Err(GraphError::NoSuchVertex {
                vtype: SRC_VTYPE,
                id: seed,
            });
        }
    }

    let csr = match opts.dir {
        EdgeDir::In => graph.in_csr(),
        EdgeDir::Out => graph.out_csr(),
    };
    let indptr = csr.indptr.as_slice();
    let neighbors = csr.indices.as_slice();
    let edge_ids = csr.data.as_slice();

    let num_layers = opts.num_hops + 1;

    // `sub_vers` is both the vertex collection and the BFS queue; layer
    // membership rides along so flow construction can re-check it.
    let mut layer_seen: FxHashSet<u64> = FxHashSet::default();
    let mut sub_vers: Vec<(u64, usize)> = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        if layer_seen.insert(seed) {
            sub_vers.push((seed, 0));
        }
    }

    let mut neigh_pos: Vec<NeighborPos> = Vec::with_capacity(sub_vers.len());
    let mut neighbor_list: Vec<u64> = Vec::new();
    let mut edge_list: Vec<u64> = Vec::new();
    let mut layer_offsets = vec![0usize; num_layers + 1];
    let mut num_edges = 0usize;
    layer_offsets[1] = sub_vers.len();

    for layer in 1..num_layers {
        // A vertex may recur across layers but not within one; the set
        // tracks the current layer only.
        layer_seen.clear();
        for idx in layer_offsets[layer - 1]..layer_offsets[layer] {
            let (dst, level) = sub_vers[idx];
            let start = indptr[dst as usize] as usize;
            let end = indptr[dst as usize + 1] as usize;
            let cand_vids = &neighbors[start..end];
            let cand_eids = &edge_ids[start..end];

            let (mut sampled_vids, mut sampled_eids) = match probability {
                None => uniform_sample(cand_vids, cand_eids, opts.expand_factor, rng),
                Some(p) => weighted_sample(p, cand_vids, cand_eids, opts.expand_factor, rng),
            };

            if opts.add_self_loop && !sampled_vids.contains(&dst) {
                sampled_vids.push(dst);
                match cand_vids.iter().position(|&v| v == dst) {
                    Some(k) => sampled_eids.push(cand_eids[k]),
                    None => sampled_eids.push(MISSING_EDGE_ID),
                }
            }
            debug_assert_eq!(sampled_vids.len(), sampled_eids.len());

            neigh_pos.push(NeighborPos {
                id: dst,
                pos: neighbor_list.len(),
                num_edges: sampled_vids.len(),
            });
            num_edges += sampled_vids.len();
            for &v in &sampled_vids {
                if layer_seen.insert(v) {
                    sub_vers.push((v, level + 1));
                }
            }
            neighbor_list.extend_from_slice(&sampled_vids);
            edge_list.extend_from_slice(&sampled_eids);
        }
        layer_offsets[layer + 1] = layer_offsets[layer] + layer_seen.len();
        debug_assert_eq!(layer_offsets[layer + 1], sub_vers.len());
    }

    Ok(construct_node_flow(
        &neighbor_list,
        &edge_list,
        &layer_offsets,
        &mut sub_vers,
        &mut neigh_pos,
        opts.dir,
        num_edges,
        num_layers,
        graph.is_multigraph(),
    ))
}

/// Samples up to `k` of a neighbor list uniformly without replacement.
///
/// Small requests draw indices directly; once the request exceeds half the
/// list it is cheaper to draw the complement and negate.
fn uniform_sample<R: Rng>(
    vids: &[u64],
    eids: &[u64],
    k: usize,
    rng: &mut R,
) -> (Vec<u64>, Vec<u64>) {
    let n = vids.len();
    if n <= k {
        return (vids.to_vec(), eids.to_vec());
    }
    let picked = if n > 2 * k {
        let mut idxs = random_indices(n, k, rng);
        idxs.sort_unstable();
        idxs
    } else {
        let mut dropped = random_indices(n, n - k, rng);
        dropped.sort_unstable();
        negate_indices(&dropped, n)
    };
    debug_assert_eq!(picked.len(), k);
    (
        picked.iter().map(|&i| vids[i]).collect(),
        picked.iter().map(|&i| eids[i]).collect(),
    )
}

/// Samples up to `k` of a neighbor list without replacement, weighted by
/// the per-edge probabilities. The drawn pairs are sorted by vertex id with
/// each edge id staying attached to its vertex.
fn weighted_sample<R: Rng>(
    probability: &[f64],
    vids: &[u64],
    eids: &[u64],
    k: usize,
    rng: &mut R,
) -> (Vec<u64>, Vec<u64>) {
    let n = vids.len();
    if n <= k {
        return (vids.to_vec(), eids.to_vec());
    }
    let weights: Vec<f64> = eids.iter().map(|&e| probability[e as usize]).collect();
    let mut heap = ArrayHeap::new(&weights);
    let mut pairs: Vec<(u64, u64)> = heap
        .sample_without_replacement(k, rng)
        .into_iter()
        .map(|i| (vids[i], eids[i]))
        .collect();
    pairs.sort_unstable();
    pairs.into_iter().unzip()
}

/// Draws `num` distinct indices from `0..set_size`, unordered.
fn random_indices<R: Rng>(set_size: usize, num: usize, rng: &mut R) -> Vec<usize> {
    let mut drawn: FxHashSet<usize> = FxHashSet::default();
    while drawn.len() < num {
        drawn.insert(rng.gen_range(0..set_size));
    }
    drawn.into_iter().collect()
}

/// The complement of a sorted index set within `0..n`.
fn negate_indices(sorted: &[usize], n: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(n - sorted.len());
    let mut it = sorted.iter().peekable();
    for i in 0..n {
        if it.peek() == Some(&&i) {
            it.next();
        } else {
            out.push(i);
        }
    }
    out
}

/// Flattens the sampled layers into a [`NodeFlow`].
///
/// The flow CSR is oriented from the deepest layer toward the seeds, so
/// layers are written in reverse. Every layer except the seed layer is
/// sorted by original vertex id before dense flow ids are assigned - the
/// seed layer keeps the caller-given order.
#[allow(clippy::too_many_arguments)]
fn construct_node_flow(
    neighbor_list: &[u64],
    edge_list: &[u64],
    layer_offsets: &[usize],
    sub_vers: &mut [(u64, usize)],
    neigh_pos: &mut [NeighborPos],
    dir: EdgeDir,
    num_edges: usize,
    num_layers: usize,
    multigraph: bool,
) -> NodeFlow {
    let num_vertices = sub_vers.len();
    let mut node_mapping = Vec::with_capacity(num_vertices);
    let mut layer_maps: Vec<FxHashMap<u64, u64>> = vec![FxHashMap::default(); num_layers];

    let mut flow_id = 0u64;
    for layer in (0..num_layers).rev() {
        let slice = &mut sub_vers[layer_offsets[layer]..layer_offsets[layer + 1]];
        if layer > 0 {
            slice.sort_unstable_by_key(|&(vid, _)| vid);
        }
        for &(vid, level) in slice.iter() {
            debug_assert_eq!(level, layer);
            node_mapping.push(vid);
            layer_maps[layer].insert(vid, flow_id);
            flow_id += 1;
        }
    }
    debug_assert_eq!(node_mapping.len(), num_vertices);

    let mut indptr = vec![0u64; num_vertices + 1];
    let mut flow_indices = vec![0u64; num_edges];
    let mut edge_mapping = vec![0u64; num_edges];
    let mut layer_off = vec![0u64; num_layers + 1];
    layer_off[1] = (layer_offsets[num_layers] - layer_offsets[num_layers - 1]) as u64;

    let mut row = layer_offsets[num_layers] - layer_offsets[num_layers - 1];
    let mut out_layer = 1;
    let mut collected = 0usize;
    for layer in (0..num_layers.saturating_sub(1)).rev() {
        let slice = &mut neigh_pos[layer_offsets[layer]..layer_offsets[layer + 1]];
        if layer > 0 {
            slice.sort_unstable_by_key(|p| p.id);
        }
        for (i, pos_entry) in slice.iter().enumerate() {
            debug_assert_eq!(sub_vers[layer_offsets[layer] + i].0, pos_entry.id);
            for k in 0..pos_entry.num_edges {
                let neigh = neighbor_list[pos_entry.pos + k];
                flow_indices[collected + k] = layer_maps[layer + 1][&neigh];
            }
            edge_mapping[collected..collected + pos_entry.num_edges]
                .copy_from_slice(&edge_list[pos_entry.pos..pos_entry.pos + pos_entry.num_edges]);
            collected += pos_entry.num_edges;
            indptr[row + 1] = indptr[row] + pos_entry.num_edges as u64;
            row += 1;
        }
        layer_off[out_layer + 1] =
            layer_off[out_layer] + (layer_offsets[layer + 1] - layer_offsets[layer]) as u64;
        out_layer += 1;
    }
    debug_assert_eq!(row, num_vertices);
    debug_assert_eq!(indptr[num_vertices], num_edges as u64);

    let mut flow_off = vec![0u64; num_layers];
    for i in 0..num_layers.saturating_sub(1) {
        let flow_edges =
            indptr[layer_off[i + 2] as usize] - indptr[layer_off[i + 1] as usize];
        flow_off[i + 1] = flow_off[i] + flow_edges;
    }
    debug_assert!(num_layers < 2 || flow_off[num_layers - 1] == num_edges as u64);

    let flow_csr = CsrMatrix {
        num_rows: num_vertices as u64,
        num_cols: num_vertices as u64,
        indptr: IdArray::from_vec(indptr),
        indices: IdArray::from_vec(flow_indices),
        data: IdArray::range(0, num_edges as u64, IdBits::B64),
    };
    let graph = match dir {
        EdgeDir::In => Bipartite::from_parts(Some(flow_csr), None, None, Some(multigraph)),
        EdgeDir::Out => Bipartite::from_parts(None, Some(flow_csr), None, Some(multigraph)),
    };

    NodeFlow {
        graph: Arc::new(graph),
        node_mapping: IdArray::from_vec(node_mapping),
        edge_mapping: IdArray::from_vec(edge_mapping),
        layer_offsets: IdArray::from_vec(layer_off),
        flow_offsets: IdArray::from_vec(flow_off),
    }
}
