//! Containers driven by the mutarith operate protocol.
//!
//! Dense vectors and matrices (backed by `ndarray` storage), a lazy
//! transposition wrapper, and a CSR sparse matrix. All arithmetic is
//! expressed through `mutarith-core`'s engine, so any element type that
//! participates in the protocol (machine numbers, arbitrary-precision
//! integers, nested containers) benefits automatically from the buffered
//! accumulation discipline.

#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod error;

pub mod vector;

pub mod matrix;

pub mod transpose;

pub mod sparse;

pub use error::ArithError;
pub use matrix::DenseMatrix;
pub use sparse::CsrMatrix;
pub use transpose::Transpose;
pub use vector::DenseVector;
