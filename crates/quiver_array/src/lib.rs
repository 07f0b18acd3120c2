//! Immutable chunked columnar data containers and the compute kernels
//! that operate on them.
//!
//! Arrays are split into contiguous chunks. All kernels operate on a
//! single chunk; chunk iteration and parallelism happen a layer up in
//! the executor.

pub mod array;
pub mod bitmap;
pub mod chunked;
pub mod compute;
pub mod datatype;
pub mod scalar;
pub mod stream;
pub mod table;
