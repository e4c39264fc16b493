//! Batched parallel execution of the samplers.

use fluxo_common::{GraphError, IdArray, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::graph::{Bipartite, EdgeDir};
use crate::nodeflow::NodeFlow;

use super::layer::layer_sample;
use super::neighbor::{neighbor_sample, NeighborSamplerOptions};

/// How a seed array is split across workers.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Index of the first batch to process.
    pub batch_start_id: usize,
    /// Seeds per batch (one batch per worker).
    pub batch_size: usize,
    /// Upper bound on worker threads.
    pub max_num_workers: usize,
    /// Base RNG seed; worker `i` derives its engine from `seed + i`, so a
    /// fixed seed and worker count reproduce a run exactly.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_start_id: 0,
            batch_size: 1024,
            max_num_workers: rayon::current_num_threads().max(1),
            seed: 42,
        }
    }
}

impl BatchConfig {
    /// Number of workers a seed array of `num_seeds` ids will occupy:
    /// one per remaining batch, capped by `max_num_workers` and clamped at
    /// zero when `batch_start_id` is past the end.
    fn num_workers(&self, num_seeds: usize) -> usize {
        let total_batches = num_seeds.div_ceil(self.batch_size);
        self.max_num_workers
            .min(total_batches.saturating_sub(self.batch_start_id))
    }

    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(GraphError::ShapeMismatch(
                "batch size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Uniform multi-hop neighbor sampling over a batched seed array.
///
/// Equivalent to [`neighbor_sampling`] with no probability vector.
pub fn uniform_sampling(
    graph: &Bipartite,
    seeds: &IdArray,
    batch: &BatchConfig,
    opts: &NeighborSamplerOptions,
) -> Result<Vec<NodeFlow>> {
    neighbor_sampling(graph, seeds, batch, opts, None)
}

/// Multi-hop neighbor sampling over a batched seed array, optionally
/// weighted by a per-edge probability vector.
///
/// Worker `i` samples the seeds of batch `batch_start_id + i`; results are
/// indexed by worker id. The CSR the expansion needs is materialized
/// serially before the pool forks.
///
/// # Errors
///
/// `ShapeMismatch` if the probability vector is non-empty but its length
/// differs from the edge count (empty means uniform), plus everything
/// [`neighbor_sample`] rejects.
pub fn neighbor_sampling(
    graph: &Bipartite,
    seeds: &IdArray,
    batch: &BatchConfig,
    opts: &NeighborSamplerOptions,
    probability: Option<&[f64]>,
) -> Result<Vec<NodeFlow>> {
    batch.validate()?;
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
    run_batches(graph, seeds, batch, opts.dir, |worker_seeds, rng| {
        neighbor_sample(graph, worker_seeds, opts, probability, rng)
    })
}

/// Layer-wise sampling over a batched seed array.
///
/// `layer_sizes` is ordered from the deepest layer back toward the seeds.
pub fn layer_sampling(
    graph: &Bipartite,
    seeds: &IdArray,
    batch: &BatchConfig,
    layer_sizes: &[u64],
    dir: EdgeDir,
) -> Result<Vec<NodeFlow>> {
    batch.validate()?;
    run_batches(graph, seeds, batch, dir, |worker_seeds, rng| {
        layer_sample(graph, worker_seeds, layer_sizes, dir, rng)
    })
}

/// Splits `seeds` into batches and runs `sample` once per batch on a
/// scoped thread pool.
fn run_batches<F>(
    graph: &Bipartite,
    seeds: &IdArray,
    batch: &BatchConfig,
    dir: EdgeDir,
    sample: F,
) -> Result<Vec<NodeFlow>>
where
    F: Fn(&[u64], &mut ChaCha8Rng) -> Result<NodeFlow> + Sync,
{
    let num_seeds = seeds.len();
    let num_workers = batch.num_workers(num_seeds);
    if num_workers == 0 {
        return Ok(Vec::new());
    }

    // Trigger lazy materialization before forking so workers only ever
    // read an already-built view.
    match dir {
        EdgeDir::In => {
            graph.in_csr();
        }
        EdgeDir::Out => {
            graph.out_csr();
        }
    }

    debug!(
        num_workers,
        num_seeds,
        batch_size = batch.batch_size,
        "sampling.batch.dispatch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .build()
        .expect("failed to build sampling thread pool");
    pool.install(|| {
        (0..num_workers)
            .into_par_iter()
            .map(|worker| {
                let start = (batch.batch_start_id + worker) * batch.batch_size;
                let end = (start + batch.batch_size).min(num_seeds);
                let worker_seeds = &seeds.as_slice()[start..end];
                let mut rng = ChaCha8Rng::seed_from_u64(batch.seed.wrapping_add(worker as u64));
                sample(worker_seeds, &mut rng)
            })
            .collect()
    })
}
