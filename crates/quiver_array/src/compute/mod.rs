//! Kernels operating on single chunks.

pub mod cast;
pub mod concat;
pub mod filter;
pub mod slice;
pub mod sort;
pub mod take;
