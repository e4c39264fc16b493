//! Layer-wise importance sampling.

use std::sync::Arc;

use fluxo_common::collections::{FxHashMap, FxHashSet};
use fluxo_common::{CsrMatrix, GraphError, IdArray, IdBits, Result};
use rand::Rng;

use crate::graph::{Bipartite, EdgeDir, DST_VTYPE, SRC_VTYPE};
use crate::nodeflow::NodeFlow;

/// One sampled layer stack: the reversed node mapping plus per-layer
/// bookkeeping.
struct Layers {
    node_mapping: Vec<u64>,
    layer_sizes: Vec<usize>,
    probabilities: Vec<f64>,
}

/// Runs one layer-wise sampling pass over `seeds` and builds the node flow.
///
/// Each requested layer is drawn jointly: `layer_size` draws with
/// replacement from the union of the previous layer's neighbors, keeping
/// each distinct drawn vertex once with importance
/// `count * |candidates| / layer_size`. Flows between adjacent layers are
/// then densified against the original adjacency.
///
/// `layer_sizes` is ordered from the deepest layer back toward the seeds.
///
/// # Errors
///
/// `BadWidth` for a 32-bit graph, `ShapeMismatch` for a non-square graph,
/// `NoSuchVertex` for out-of-range seeds.
pub fn layer_sample<R: Rng>(
    graph: &Bipartite,
    seeds: &[u64],
    layer_sizes: &[u64],
    dir: EdgeDir,
    rng: &mut R,
) -> Result<NodeFlow> {
    if graph.num_bits() != 64 {
        return Err(GraphError::BadWidth(graph.num_bits()));
    }
    let num_vertices = graph.num_vertices(SRC_VTYPE)?;
    if num_vertices != graph.num_vertices(DST_VTYPE)? {
        return Err(GraphError::ShapeMismatch(
            "layer sampling needs equal src and dst vertex counts".into(),
        ));
    }
    for &seed in seeds {
        if seed >= num_vertices {
            return Err(GraphError::NoSuchVertex {
                vtype: SRC_VTYPE,
                id: seed,
            });
        }
    }

    let csr = match dir {
        EdgeDir::In => graph.in_csr(),
        EdgeDir::Out => graph.out_csr(),
    };

    let layers = construct_layers(csr, seeds, layer_sizes, rng);
    debug_assert_eq!(layers.probabilities.len(), layers.node_mapping.len());
    Ok(construct_flows(csr, layers, dir))
}

/// Builds the layer stack by repeated joint draws.
fn construct_layers<R: Rng>(
    csr: &CsrMatrix,
    seeds: &[u64],
    layer_sizes: &[u64],
    rng: &mut R,
) -> Layers {
    let indptr = csr.indptr.as_slice();
    let indices = csr.indices.as_slice();

    let mut node_mapping: Vec<u64> = seeds.to_vec();
    let mut layer_sizes_actual = vec![node_mapping.len()];
    let mut probabilities = vec![1.0f64; node_mapping.len()];

    let mut curr = 0usize;
    let mut next = node_mapping.len();
    for &layer_size in layer_sizes.iter().rev() {
        let mut candidate_set: FxHashSet<u64> = FxHashSet::default();
        for &src in &node_mapping[curr..next] {
            let (start, end) = (indptr[src as usize] as usize, indptr[src as usize + 1] as usize);
            candidate_set.extend(indices[start..end].iter().copied());
        }
        let candidates: Vec<u64> = candidate_set.into_iter().collect();

        let mut occurrences: FxHashMap<u64, usize> = FxHashMap::default();
        if !candidates.is_empty() {
            for _ in 0..layer_size {
                let drawn = candidates[rng.gen_range(0..candidates.len())];
                *occurrences.entry(drawn).or_insert(0) += 1;
            }
        }
        for (&vid, &count) in &occurrences {
            node_mapping.push(vid);
            probabilities.push(count as f64 * candidates.len() as f64 / layer_size as f64);
        }

        layer_sizes_actual.push(node_mapping.len() - next);
        curr = next;
        next = node_mapping.len();
    }
    node_mapping.reverse();
    layer_sizes_actual.reverse();
    // the importance weights were appended seed-layer-first; flip them to
    // match the reversed mapping
    probabilities.reverse();

    Layers {
        node_mapping,
        layer_sizes: layer_sizes_actual,
        probabilities,
    }
}

/// Densifies the flows between adjacent layers against the original
/// adjacency and assembles the [`NodeFlow`].
fn construct_flows(csr: &CsrMatrix, layers: Layers, dir: EdgeDir) -> NodeFlow {
    let indptr = csr.indptr.as_slice();
    let indices = csr.indices.as_slice();
    let eids = csr.data.as_slice();
    let Layers {
        node_mapping,
        layer_sizes,
        ..
    } = layers;

    let num_flows = layer_sizes.len() - 1;
    let mut sub_indptr: Vec<u64> = vec![0; layer_sizes[0] + 1];
    let mut sub_indices: Vec<u64> = Vec::new();
    let mut edge_mapping: Vec<u64> = Vec::new();
    let mut flow_offsets: Vec<u64> = vec![0];

    let mut first = 0usize;
    for flow in 0..num_flows {
        let src_size = layer_sizes[flow];
        let source_pos: FxHashMap<u64, u64> = node_mapping[first..first + src_size]
            .iter()
            .enumerate()
            .map(|(j, &vid)| (vid, (first + j) as u64))
            .collect();

        let dst_size = layer_sizes[flow + 1];
        for j in 0..dst_size {
            let dst = node_mapping[first + src_size + j];
            let mut flow_edges: Vec<(u64, u64)> = Vec::new();
            let (start, end) = (indptr[dst as usize] as usize, indptr[dst as usize + 1] as usize);
            for k in start..end {
                if let Some(&pos) = source_pos.get(&indices[k]) {
                    flow_edges.push((pos, eids[k]));
                }
            }
            flow_edges.sort_unstable();
            for (pos, eid) in flow_edges {
                sub_indices.push(pos);
                edge_mapping.push(eid);
            }
            sub_indptr.push(sub_indices.len() as u64);
        }
        flow_offsets.push(sub_indices.len() as u64);
        first += src_size;
    }

    let num_edges = sub_indices.len();
    let num_vertices = node_mapping.len();
    debug_assert_eq!(sub_indptr.len(), num_vertices + 1);

    let mut layer_offsets = vec![0u64; layer_sizes.len() + 1];
    for (i, &size) in layer_sizes.iter().enumerate() {
        layer_offsets[i + 1] = layer_offsets[i] + size as u64;
    }

    let flow_csr = CsrMatrix {
        num_rows: num_vertices as u64,
        num_cols: num_vertices as u64,
        indptr: IdArray::from_vec(sub_indptr),
        indices: IdArray::from_vec(sub_indices),
        data: IdArray::range(0, num_edges as u64, IdBits::B64),
    };
    let graph = match dir {
        EdgeDir::In => Bipartite::from_parts(Some(flow_csr), None, None, None),
        EdgeDir::Out => Bipartite::from_parts(None, Some(flow_csr), None, None),
    };

    NodeFlow {
        graph: Arc::new(graph),
        node_mapping: IdArray::from_vec(node_mapping),
        edge_mapping: IdArray::from_vec(edge_mapping),
        layer_offsets: IdArray::from_vec(layer_offsets),
        flow_offsets: IdArray::from_vec(flow_offsets),
    }
}
