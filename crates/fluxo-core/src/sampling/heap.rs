//! Weighted draw-and-remove over a fixed set of indices.

use rand::Rng;

/// A perfect-binary-tree segment sum over weights ("array heap").
///
/// Leaves hold the weights of indices `0..n`; each internal node holds the
/// sum of its children, so a weighted draw walks one root-to-leaf path and
/// removing an index subtracts its weight along the same path. Both cost
/// O(log n); building costs O(n).
pub struct ArrayHeap {
    limit: usize,
    heap: Vec<f64>,
}

impl ArrayHeap {
    /// Builds the tree over the given weights.
    #[must_use]
    pub fn new(weights: &[f64]) -> Self {
        let n = weights.len();
        let bit_len = n.next_power_of_two().trailing_zeros() as usize;
        let limit = 1usize << bit_len;
        let mut heap = vec![0.0; limit << 1];
        heap[limit..limit + n].copy_from_slice(weights);
        for level in (0..bit_len).rev() {
            for node in (1 << level)..(1 << (level + 1)) {
                heap[node] = heap[node << 1] + heap[(node << 1) + 1];
            }
        }
        Self { limit, heap }
    }

    /// Total remaining weight.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.heap[1]
    }

    /// Zeroes out `index` so later draws skip it, subtracting its weight
    /// along the root path.
    pub fn delete(&mut self, index: usize) {
        let mut node = index + self.limit;
        let weight = self.heap[node];
        while node >= 1 {
            self.heap[node] -= weight;
            node >>= 1;
        }
    }

    /// Draws one index with probability proportional to its weight.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let mut xi = self.heap[1] * rng.gen::<f64>();
        let mut node = 1;
        while node < self.limit {
            node <<= 1;
            if xi >= self.heap[node] {
                xi -= self.heap[node];
                node += 1;
            }
        }
        node - self.limit
    }

    /// Draws `n` distinct indices, removing each as it is drawn.
    pub fn sample_without_replacement<R: Rng>(&mut self, n: usize, rng: &mut R) -> Vec<usize> {
        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            let index = self.sample(rng);
            self.delete(index);
            samples.push(index);
        }
        samples
    }
}
