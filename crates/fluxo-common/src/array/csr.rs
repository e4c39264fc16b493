//! Compressed-sparse-row adjacency and its query kernels.

use crate::collections::{FxHashMap, FxHashSet};
use crate::error::{GraphError, Result};

use super::coo::CooMatrix;
use super::{IdArray, IdBits};

/// A sparse matrix in compressed-sparse-row form.
///
/// Row `r`'s entries are `indices[indptr[r]..indptr[r + 1]]`; `data[k]` is
/// the canonical (COO-order) edge id of entry `k`. Keeping edge ids in
/// `data` is what lets every derived view refer back to the same edge
/// multiset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrMatrix {
    /// Number of rows.
    pub num_rows: u64,
    /// Number of columns.
    pub num_cols: u64,
    /// Row offsets, length `num_rows + 1`, monotonic, `indptr[0] == 0`.
    pub indptr: IdArray,
    /// Column index per entry.
    pub indices: IdArray,
    /// Edge id per entry.
    pub data: IdArray,
}

impl CsrMatrix {
    /// Builds a CSR matrix, validating the arrays against the shape.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if the offsets are not a monotonic cover of the
    /// entries, the arrays disagree in length or width, or a column index
    /// falls outside the shape.
    pub fn new(
        num_rows: u64,
        num_cols: u64,
        indptr: IdArray,
        indices: IdArray,
        data: IdArray,
    ) -> Result<Self> {
        if indptr.len() != num_rows as usize + 1 {
            return Err(GraphError::InvalidIdArray(format!(
                "indptr length {} does not match {num_rows} rows",
                indptr.len()
            )));
        }
        if indptr.get(0) != 0 || indptr.as_slice().windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphError::InvalidIdArray(
                "indptr must start at zero and be non-decreasing".into(),
            ));
        }
        if indptr.get(indptr.len() - 1) != indices.len() as u64 || indices.len() != data.len() {
            return Err(GraphError::InvalidIdArray(format!(
                "offsets cover {} entries but indices/data hold {}/{}",
                indptr.get(indptr.len() - 1),
                indices.len(),
                data.len()
            )));
        }
        if indptr.bits() != indices.bits() || indices.bits() != data.bits() {
            return Err(GraphError::InvalidIdArray(
                "indptr, indices and data widths differ".into(),
            ));
        }
        if let Some(c) = indices.iter().find(|&c| c >= num_cols) {
            return Err(GraphError::InvalidIdArray(format!(
                "col id {c} out of range for {num_cols} cols"
            )));
        }
        Ok(Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            data,
        })
    }

    /// Number of stored entries (edges).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.indices.len()
    }

    /// Width tag of the id arrays.
    #[must_use]
    pub fn bits(&self) -> IdBits {
        self.indices.bits()
    }

    fn row_bounds(&self, r: u64) -> (usize, usize) {
        let indptr = self.indptr.as_slice();
        (indptr[r as usize] as usize, indptr[r as usize + 1] as usize)
    }

    /// Number of entries in row `r`. `r` must be in range.
    #[must_use]
    pub fn row_nnz(&self, r: u64) -> u64 {
        let (start, end) = self.row_bounds(r);
        (end - start) as u64
    }

    /// [`row_nnz`](Self::row_nnz) over a batch of rows.
    #[must_use]
    pub fn row_nnz_many(&self, rows: &IdArray) -> IdArray {
        IdArray {
            bits: self.bits(),
            data: rows.iter().map(|r| self.row_nnz(r)).collect(),
        }
    }

    /// Column indices of row `r`.
    #[must_use]
    pub fn row_col_indices(&self, r: u64) -> IdArray {
        let (start, end) = self.row_bounds(r);
        IdArray {
            bits: self.bits(),
            data: self.indices.as_slice()[start..end].to_vec(),
        }
    }

    /// Edge ids of row `r`.
    #[must_use]
    pub fn row_data(&self, r: u64) -> IdArray {
        let (start, end) = self.row_bounds(r);
        IdArray {
            bits: self.bits(),
            data: self.data.as_slice()[start..end].to_vec(),
        }
    }

    /// Whether entry `(r, c)` exists.
    #[must_use]
    pub fn is_nonzero(&self, r: u64, c: u64) -> bool {
        let (start, end) = self.row_bounds(r);
        self.indices.as_slice()[start..end].contains(&c)
    }

    /// [`is_nonzero`](Self::is_nonzero) over paired batches of rows and
    /// columns.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the batches differ in length.
    pub fn is_nonzero_many(&self, rows: &IdArray, cols: &IdArray) -> Result<Vec<bool>> {
        if rows.len() != cols.len() {
            return Err(GraphError::ShapeMismatch(format!(
                "row batch has {} ids but col batch has {}",
                rows.len(),
                cols.len()
            )));
        }
        Ok(rows
            .iter()
            .zip(cols.iter())
            .map(|(r, c)| self.is_nonzero(r, c))
            .collect())
    }

    /// Edge ids of every `(r, c)` entry, in row storage order. More than one
    /// id comes back when parallel edges exist.
    #[must_use]
    pub fn get_data(&self, r: u64, c: u64) -> IdArray {
        let (start, end) = self.row_bounds(r);
        let data = self.data.as_slice();
        IdArray {
            bits: self.bits(),
            data: self.indices.as_slice()[start..end]
                .iter()
                .enumerate()
                .filter(|&(_, &col)| col == c)
                .map(|(k, _)| data[start + k])
                .collect(),
        }
    }

    /// For each `(rows[i], cols[i])` pair, emits one `(row, col, eid)`
    /// triple per matching entry, concatenated over the batch.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the batches differ in length.
    pub fn get_data_and_indices(
        &self,
        rows: &IdArray,
        cols: &IdArray,
    ) -> Result<(IdArray, IdArray, IdArray)> {
        if rows.len() != cols.len() {
            return Err(GraphError::ShapeMismatch(format!(
                "row batch has {} ids but col batch has {}",
                rows.len(),
                cols.len()
            )));
        }
        let data = self.data.as_slice();
        let mut out_rows = Vec::new();
        let mut out_cols = Vec::new();
        let mut out_eids = Vec::new();
        for (r, c) in rows.iter().zip(cols.iter()) {
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                if self.indices.get(k) == c {
                    out_rows.push(r);
                    out_cols.push(c);
                    out_eids.push(data[k]);
                }
            }
        }
        let bits = self.bits();
        Ok((
            IdArray {
                bits,
                data: out_rows,
            },
            IdArray {
                bits,
                data: out_cols,
            },
            IdArray {
                bits,
                data: out_eids,
            },
        ))
    }

    /// Transposes the matrix. Edge ids travel with their entries, so the
    /// transpose still describes the same edge multiset.
    #[must_use]
    pub fn transpose(&self) -> CsrMatrix {
        let n_new = self.num_cols as usize;
        let e = self.num_edges();
        let bits = self.bits();
        let indices = self.indices.as_slice();
        let data = self.data.as_slice();

        let mut indptr_t = vec![0u64; n_new + 1];
        for &c in indices {
            indptr_t[c as usize + 1] += 1;
        }
        for i in 0..n_new {
            indptr_t[i + 1] += indptr_t[i];
        }

        let mut cursor: Vec<u64> = indptr_t[..n_new].to_vec();
        let mut indices_t = vec![0u64; e];
        let mut data_t = vec![0u64; e];
        for r in 0..self.num_rows {
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                let c = indices[k] as usize;
                let slot = cursor[c] as usize;
                indices_t[slot] = r;
                data_t[slot] = data[k];
                cursor[c] += 1;
            }
        }

        CsrMatrix {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            indptr: IdArray {
                bits,
                data: indptr_t,
            },
            indices: IdArray {
                bits,
                data: indices_t,
            },
            data: IdArray { bits, data: data_t },
        }
    }

    /// Converts back to COO in canonical edge-id order: entry `k` with edge
    /// id `data[k]` lands at COO position `data[k]`.
    ///
    /// Requires `data` to be a permutation of `0..num_edges`, which holds
    /// for every matrix the engine constructs.
    #[must_use]
    pub fn to_coo(&self) -> CooMatrix {
        let e = self.num_edges();
        let bits = self.bits();
        let indices = self.indices.as_slice();
        let data = self.data.as_slice();
        let mut row = vec![0u64; e];
        let mut col = vec![0u64; e];
        for r in 0..self.num_rows {
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                let eid = data[k] as usize;
                debug_assert!(eid < e, "edge id {eid} outside 0..{e}");
                row[eid] = r;
                col[eid] = indices[k];
            }
        }
        CooMatrix {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            row: IdArray { bits, data: row },
            col: IdArray { bits, data: col },
        }
    }

    /// Flattens to `(row, col, eid)` triples in row-major storage order,
    /// i.e. sorted by row.
    #[must_use]
    pub fn to_sorted_triples(&self) -> (IdArray, IdArray, IdArray) {
        let bits = self.bits();
        let mut row = Vec::with_capacity(self.num_edges());
        for r in 0..self.num_rows {
            let nnz = self.row_nnz(r);
            row.extend(std::iter::repeat(r).take(nnz as usize));
        }
        (
            IdArray { bits, data: row },
            self.indices.clone(),
            self.data.clone(),
        )
    }

    /// Restricts to the given rows, in the given order. Row `i` of the
    /// result is row `rows[i]` of `self`; `data` keeps the original edge
    /// ids.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if a row id is out of range.
    pub fn slice_rows(&self, rows: &IdArray) -> Result<CsrMatrix> {
        let bits = self.bits();
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        indptr.push(0u64);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        for r in rows.iter() {
            if r >= self.num_rows {
                return Err(GraphError::InvalidIdArray(format!(
                    "row id {r} out of range for {} rows",
                    self.num_rows
                )));
            }
            let (start, end) = self.row_bounds(r);
            indices.extend_from_slice(&self.indices.as_slice()[start..end]);
            data.extend_from_slice(&self.data.as_slice()[start..end]);
            indptr.push(indices.len() as u64);
        }
        Ok(CsrMatrix {
            num_rows: rows.len() as u64,
            num_cols: self.num_cols,
            indptr: IdArray { bits, data: indptr },
            indices: IdArray {
                bits,
                data: indices,
            },
            data: IdArray { bits, data },
        })
    }

    /// Restricts to the submatrix induced by `rows` and `cols`, relabeling
    /// both sides to positions in the given arrays. `data` keeps the
    /// original edge ids of the surviving entries.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if a row or column id is out of range.
    pub fn slice_matrix(&self, rows: &IdArray, cols: &IdArray) -> Result<CsrMatrix> {
        if let Some(c) = cols.iter().find(|&c| c >= self.num_cols) {
            return Err(GraphError::InvalidIdArray(format!(
                "col id {c} out of range for {} cols",
                self.num_cols
            )));
        }
        let col_pos: FxHashMap<u64, u64> = cols
            .iter()
            .enumerate()
            .map(|(i, c)| (c, i as u64))
            .collect();

        let bits = self.bits();
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        indptr.push(0u64);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        for r in rows.iter() {
            if r >= self.num_rows {
                return Err(GraphError::InvalidIdArray(format!(
                    "row id {r} out of range for {} rows",
                    self.num_rows
                )));
            }
            let (start, end) = self.row_bounds(r);
            for k in start..end {
                if let Some(&c) = col_pos.get(&self.indices.get(k)) {
                    indices.push(c);
                    data.push(self.data.get(k));
                }
            }
            indptr.push(indices.len() as u64);
        }
        Ok(CsrMatrix {
            num_rows: rows.len() as u64,
            num_cols: cols.len() as u64,
            indptr: IdArray { bits, data: indptr },
            indices: IdArray {
                bits,
                data: indices,
            },
            data: IdArray { bits, data },
        })
    }

    /// Whether any row stores the same column twice.
    #[must_use]
    pub fn has_duplicate(&self) -> bool {
        let mut seen: FxHashSet<u64> = FxHashSet::default();
        for r in 0..self.num_rows {
            seen.clear();
            let (start, end) = self.row_bounds(r);
            for &c in &self.indices.as_slice()[start..end] {
                if !seen.insert(c) {
                    return true;
                }
            }
        }
        false
    }
}
