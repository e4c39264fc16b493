//! Stochastic samplers that turn seed batches into [`NodeFlow`]s.
//!
//! [`neighbor_sample`] expands a bounded random neighborhood per vertex for
//! a fixed number of hops; [`layer_sample`] draws whole layers jointly from
//! the candidate union with importance weighting. Both have batched
//! drivers ([`uniform_sampling`], [`neighbor_sampling`],
//! [`layer_sampling`]) that fan seed batches out over a thread pool.
//!
//! [`NodeFlow`]: crate::nodeflow::NodeFlow

mod batch;
mod heap;
mod layer;
mod neighbor;

pub use batch::{layer_sampling, neighbor_sampling, uniform_sampling, BatchConfig};
pub use heap::ArrayHeap;
pub use layer::layer_sample;
pub use neighbor::{neighbor_sample, NeighborSamplerOptions};
