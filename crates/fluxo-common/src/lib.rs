//! Shared foundations for the fluxo graph engine.
//!
//! - [`array`] - width-tagged id arrays and the COO/CSR sparse kernels
//! - [`collections`] - FxHash-backed map and set aliases
//! - [`error`] - [`GraphError`] and the workspace [`Result`] alias

pub mod array;
pub mod collections;
pub mod error;

pub use array::{relabel_inplace, CooMatrix, CsrMatrix, DeviceContext, IdArray, IdBits};
pub use error::{GraphError, Result};
