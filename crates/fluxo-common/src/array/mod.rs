//! Dense 1-D id arrays and the sparse adjacency matrices built from them.
//!
//! [`IdArray`] is the currency of the whole engine: every vertex list, edge
//! list, offset array, and mapping is one. Arrays carry a logical width tag
//! ([`IdBits`]) that survives every producing operation; storage is a single
//! `u64` lane regardless of the tag, so kernels are written once.

mod coo;
mod csr;

pub use coo::CooMatrix;
pub use csr::CsrMatrix;

use crate::collections::FxHashMap;
use crate::error::{GraphError, Result};

/// Logical width of the ids in an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdBits {
    /// Ids fit in 32 bits.
    B32,
    /// Ids fit in 64 bits.
    B64,
}

impl IdBits {
    /// Returns the width in bits.
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            IdBits::B32 => 32,
            IdBits::B64 => 64,
        }
    }
}

/// Device placement tag for arrays and graphs.
///
/// The engine is CPU-only; the tag exists so graph handles can report
/// placement uniformly to hosts that track it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceContext {
    /// Host memory.
    #[default]
    Cpu,
}

/// A dense, contiguous, 1-D buffer of unsigned vertex or edge ids.
///
/// All operations are pure: they return new arrays and never mutate their
/// inputs (the one exception, [`relabel_inplace`], is named for it).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdArray {
    bits: IdBits,
    data: Vec<u64>,
}

impl IdArray {
    /// Wraps a vector of 64-bit ids.
    #[must_use]
    pub fn from_vec(data: Vec<u64>) -> Self {
        Self {
            bits: IdBits::B64,
            data,
        }
    }

    /// Wraps a vector of ids under an explicit width tag.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if any value does not fit the declared width.
    pub fn with_bits(bits: IdBits, data: Vec<u64>) -> Result<Self> {
        if bits == IdBits::B32 {
            if let Some(v) = data.iter().find(|&&v| v > u64::from(u32::MAX)) {
                return Err(GraphError::InvalidIdArray(format!(
                    "value {v} does not fit 32 bits"
                )));
            }
        }
        Ok(Self { bits, data })
    }

    /// The consecutive ids `lo..hi` under the given width tag.
    ///
    /// `hi` must fit the tag; id arrays large enough to violate that cannot
    /// be produced by a validly-constructed graph.
    #[must_use]
    pub fn range(lo: u64, hi: u64, bits: IdBits) -> Self {
        debug_assert!(bits == IdBits::B64 || hi <= u64::from(u32::MAX) + 1);
        Self {
            bits,
            data: (lo..hi).collect(),
        }
    }

    /// An array of `len` copies of `value`.
    #[must_use]
    pub fn full(value: u64, len: usize, bits: IdBits) -> Self {
        debug_assert!(bits == IdBits::B64 || value <= u64::from(u32::MAX));
        Self {
            bits,
            data: vec![value; len],
        }
    }

    /// Number of ids in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The width tag.
    #[must_use]
    pub fn bits(&self) -> IdBits {
        self.bits
    }

    /// The ids as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }

    /// The id at position `i`. Panics if out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> u64 {
        self.data[i]
    }

    /// Iterates over the ids by value.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.data.iter().copied()
    }

    /// Copies the ids into a fresh vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u64> {
        self.data.clone()
    }

    /// Gathers `self[idx[0]], self[idx[1]], ...` into a new array.
    ///
    /// The result keeps `self`'s width tag.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if any index is out of range.
    pub fn index_select(&self, idx: &IdArray) -> Result<IdArray> {
        let mut out = Vec::with_capacity(idx.len());
        for i in idx.iter() {
            let i = i as usize;
            if i >= self.data.len() {
                return Err(GraphError::InvalidIdArray(format!(
                    "gather index {i} out of range for array of length {}",
                    self.data.len()
                )));
            }
            out.push(self.data[i]);
        }
        Ok(IdArray {
            bits: self.bits,
            data: out,
        })
    }

    /// Concatenates `self` followed by `other`.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if the width tags differ.
    pub fn hstack(&self, other: &IdArray) -> Result<IdArray> {
        if self.bits != other.bits {
            return Err(GraphError::InvalidIdArray(
                "cannot stack arrays of different widths".into(),
            ));
        }
        let mut data = Vec::with_capacity(self.len() + other.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Ok(IdArray {
            bits: self.bits,
            data,
        })
    }

    /// Element-wise `id < scalar`.
    #[must_use]
    pub fn lt(&self, scalar: u64) -> Vec<bool> {
        self.data.iter().map(|&v| v < scalar).collect()
    }
}

/// Densifies a group of id arrays into one shared id space.
///
/// Computes the union of all ids in first-seen order, rewrites every input
/// array in place to the dense indices, and returns the ordered union (the
/// mapping from dense index back to original id). Arrays that share ids end
/// up sharing dense indices, which is what lets relations that touch the
/// same vertex type agree on a common subgraph id space.
pub fn relabel_inplace(arrays: &mut [&mut IdArray]) -> IdArray {
    let bits = arrays.first().map_or(IdBits::B64, |a| a.bits);
    debug_assert!(arrays.iter().all(|a| a.bits == bits));
    let mut mapping: Vec<u64> = Vec::new();
    let mut dense: FxHashMap<u64, u64> = FxHashMap::default();
    for arr in arrays.iter_mut() {
        for v in arr.data.iter_mut() {
            let orig = *v;
            let idx = match dense.get(&orig) {
                Some(&idx) => idx,
                None => {
                    let idx = mapping.len() as u64;
                    dense.insert(orig, idx);
                    mapping.push(orig);
                    idx
                }
            };
            *v = idx;
        }
    }
    IdArray {
        bits,
        data: mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_and_full() {
        let r = IdArray::range(2, 6, IdBits::B64);
        assert_eq!(r.as_slice(), &[2, 3, 4, 5]);
        let f = IdArray::full(7, 3, IdBits::B64);
        assert_eq!(f.as_slice(), &[7, 7, 7]);
        assert_eq!(f.bits().width(), 64);
    }

    #[test]
    fn with_bits_rejects_oversized_values() {
        let err = IdArray::with_bits(IdBits::B32, vec![1, u64::from(u32::MAX) + 1]);
        assert!(matches!(err, Err(GraphError::InvalidIdArray(_))));
        assert!(IdArray::with_bits(IdBits::B32, vec![0, u64::from(u32::MAX)]).is_ok());
    }

    #[test]
    fn index_select_gathers_and_checks_bounds() {
        let a = IdArray::from_vec(vec![10, 20, 30]);
        let picked = a.index_select(&IdArray::from_vec(vec![2, 0, 2])).unwrap();
        assert_eq!(picked.as_slice(), &[30, 10, 30]);
        assert!(a.index_select(&IdArray::from_vec(vec![3])).is_err());
    }

    #[test]
    fn hstack_requires_matching_widths() {
        let a = IdArray::from_vec(vec![1, 2]);
        let b = IdArray::with_bits(IdBits::B32, vec![3]).unwrap();
        assert!(a.hstack(&b).is_err());
        let c = IdArray::from_vec(vec![3, 4]);
        assert_eq!(a.hstack(&c).unwrap().as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn lt_is_elementwise() {
        let a = IdArray::from_vec(vec![0, 5, 3]);
        assert_eq!(a.lt(4), vec![true, false, true]);
    }

    #[test]
    fn relabel_unions_in_first_seen_order() {
        let mut a = IdArray::from_vec(vec![7, 3, 7]);
        let mut b = IdArray::from_vec(vec![3, 9]);
        let mapping = relabel_inplace(&mut [&mut a, &mut b]);
        assert_eq!(mapping.as_slice(), &[7, 3, 9]);
        assert_eq!(a.as_slice(), &[0, 1, 0]);
        assert_eq!(b.as_slice(), &[1, 2]);
    }

    #[test]
    fn relabel_of_nothing_is_empty() {
        let mapping = relabel_inplace(&mut []);
        assert!(mapping.is_empty());
    }
}
