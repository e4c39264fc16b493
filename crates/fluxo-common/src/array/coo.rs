//! Coordinate-format sparse adjacency.

use crate::collections::FxHashSet;
use crate::error::{GraphError, Result};

use super::csr::CsrMatrix;
use super::{IdArray, IdBits};

/// A sparse matrix as parallel `(row, col)` arrays.
///
/// Entry `i` is the edge `row[i] -> col[i]`, and `i` itself is the edge id:
/// COO is the canonical edge ordering every other format refers back to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooMatrix {
    /// Number of rows (source vertices).
    pub num_rows: u64,
    /// Number of columns (destination vertices).
    pub num_cols: u64,
    /// Source vertex per edge.
    pub row: IdArray,
    /// Destination vertex per edge.
    pub col: IdArray,
}

impl CooMatrix {
    /// Builds a COO matrix, validating the edge arrays against the shape.
    ///
    /// # Errors
    ///
    /// `InvalidIdArray` if `row` and `col` differ in length or width, or if
    /// any id falls outside the matrix shape.
    pub fn new(num_rows: u64, num_cols: u64, row: IdArray, col: IdArray) -> Result<Self> {
        if row.len() != col.len() {
            return Err(GraphError::InvalidIdArray(format!(
                "row and col lengths differ: {} vs {}",
                row.len(),
                col.len()
            )));
        }
        if row.bits() != col.bits() {
            return Err(GraphError::InvalidIdArray(
                "row and col widths differ".into(),
            ));
        }
        if let Some(v) = row.iter().find(|&v| v >= num_rows) {
            return Err(GraphError::InvalidIdArray(format!(
                "row id {v} out of range for {num_rows} rows"
            )));
        }
        if let Some(v) = col.iter().find(|&v| v >= num_cols) {
            return Err(GraphError::InvalidIdArray(format!(
                "col id {v} out of range for {num_cols} cols"
            )));
        }
        Ok(Self {
            num_rows,
            num_cols,
            row,
            col,
        })
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.row.len()
    }

    /// Width tag of the id arrays.
    #[must_use]
    pub fn bits(&self) -> IdBits {
        self.row.bits()
    }

    /// Converts to CSR. The CSR `data` array holds the COO edge ids, so the
    /// canonical edge numbering survives the conversion. Edges within a row
    /// keep their COO relative order, and all derived arrays keep this
    /// matrix's width tag.
    #[must_use]
    pub fn to_csr(&self) -> CsrMatrix {
        let n = self.num_rows as usize;
        let e = self.num_edges();
        let bits = self.bits();
        let row = self.row.as_slice();
        let col = self.col.as_slice();

        let mut indptr = vec![0u64; n + 1];
        for &r in row {
            indptr[r as usize + 1] += 1;
        }
        for i in 0..n {
            indptr[i + 1] += indptr[i];
        }

        let mut cursor: Vec<u64> = indptr[..n].to_vec();
        let mut indices = vec![0u64; e];
        let mut data = vec![0u64; e];
        for eid in 0..e {
            let r = row[eid] as usize;
            let k = cursor[r] as usize;
            indices[k] = col[eid];
            data[k] = eid as u64;
            cursor[r] += 1;
        }

        CsrMatrix {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            indptr: IdArray { bits, data: indptr },
            indices: IdArray {
                bits,
                data: indices,
            },
            data: IdArray { bits, data },
        }
    }

    /// Whether any `(row, col)` pair occurs more than once.
    #[must_use]
    pub fn has_duplicate(&self) -> bool {
        let mut seen: FxHashSet<(u64, u64)> = FxHashSet::default();
        self.row
            .iter()
            .zip(self.col.iter())
            .any(|pair| !seen.insert(pair))
    }
}
