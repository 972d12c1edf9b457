//! Umbrella crate for the mutarith workspace.
//!
//! Re-exports the operate protocol ([`mutarith_core`]), the dense and sparse
//! containers ([`mutarith_containers`]), and the arbitrary-precision adapter
//! ([`mutarith_bigint`]) under one roof.
//!
//! The protocol in one example:
//!
//! ```
//! use mutarith::prelude::*;
//! use mutarith::{Big, DenseVector};
//!
//! # fn main() -> Result<(), anyhow::Error> {
//! let a = DenseVector::from_vec(vec![Big::from(1), Big::from(2)]);
//! let b = DenseVector::from_vec(vec![Big::from(10), Big::from(20)]);
//!
//! // allocate-always tier
//! let sum = operate(Add, &a, &b)?;
//!
//! // in-place tier: consumes its target, mutates it when the type permits
//! let sum2 = operate_in_place(Add, a.mutable_copy(), &b)?;
//! assert!(sum.canonical_eq(&sum2));
//!
//! // fused tier: a + b * c without the intermediate product
//! let fused = add_mul(&a, &b, &Big::from(2))?;
//! assert!(fused.canonical_eq(&DenseVector::from_vec(vec![
//!     Big::from(21),
//!     Big::from(42),
//! ])));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![no_std]

pub use mutarith_bigint::Big;
pub use mutarith_containers::{ArithError, CsrMatrix, DenseMatrix, DenseVector, Transpose};
pub use mutarith_core::prelude;
pub use mutarith_core::{
    canonical, fused, mutability, op, operate, promote, zero, Immutable, Mutability, Mutable,
    Promote, Promoted, Uniform, UniformScalar,
};
