//! Lazy transposition wrapper.
//!
//! `Transpose<M>` records a transposition structurally instead of moving
//! elements. Elementwise operations and scaling act through the wrapper on
//! the untransposed storage; promotion propagates the wrapper kind, so the
//! combination of two transposed operands stays transposed. Canonical
//! equality compares mathematical content, unwrapping the transposition
//! against plain matrices.

use mutarith_core::canonical::CanonicalEq;
use mutarith_core::mutability::Value;
use mutarith_core::op::{Add, Mul, Sub};
use mutarith_core::operate::{Operate, OperateAssign};
use mutarith_core::promote::{Promote, Promoted, Uniform, UniformScalar};
use mutarith_core::zero::Zeroable;

use crate::error::ArithError;
use crate::matrix::DenseMatrix;

/// Structural transposition of a wrapped container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpose<M> {
    inner: M,
}

impl<M> Transpose<M> {
    /// Wraps `inner` as its transposition.
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// The untransposed container.
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Unwraps, discarding the transposition.
    pub fn into_inner(self) -> M {
        self.inner
    }
}

// Mutability is a property of the storage, which the wrapper does not change.
impl<M: Value> Value for Transpose<M> {
    type Mutability = M::Mutability;
}

impl<M: Zeroable> Zeroable for Transpose<M> {
    fn zero_out(&mut self) {
        self.inner.zero_out();
    }
}

// Elementwise operations between two transposed operands commute with the
// transposition, so they delegate to the inner containers and re-wrap.
macro_rules! transpose_elementwise {
    ($op:ty) => {
        unsafe impl<A: Promote<$op, B>, B> Promote<$op, Transpose<B>> for Transpose<A> {
            type Res = Transpose<Promoted<$op, A, B>>;
        }

        impl<A, B> Operate<$op, Transpose<B>> for Transpose<A>
        where
            A: Operate<$op, B, Err = ArithError>,
        {
            type Err = ArithError;

            fn operate(&self, rhs: &Transpose<B>) -> Result<Self::Res, ArithError> {
                Ok(Transpose::new(self.inner.operate(&rhs.inner)?))
            }

            fn operate_into(
                out: &mut Self::Res,
                lhs: &Self,
                rhs: &Transpose<B>,
            ) -> Result<(), ArithError> {
                A::operate_into(&mut out.inner, &lhs.inner, &rhs.inner)
            }
        }

        impl<A, B> OperateAssign<$op, Transpose<B>> for Transpose<A>
        where
            A: OperateAssign<$op, B, Err = ArithError>,
        {
            fn operate_assign(&mut self, rhs: &Transpose<B>) -> Result<(), ArithError> {
                self.inner.operate_assign(&rhs.inner)
            }
        }
    };
}

transpose_elementwise!(Add);
transpose_elementwise!(Sub);

// Uniform scaling commutes with transposition as well.
unsafe impl<A, S> Promote<Mul, Uniform<S>> for Transpose<A>
where
    A: Promote<Mul, Uniform<S>>,
    S: UniformScalar,
{
    type Res = Transpose<Promoted<Mul, A, Uniform<S>>>;
}

impl<A, S> Operate<Mul, Uniform<S>> for Transpose<A>
where
    A: Operate<Mul, Uniform<S>, Err = ArithError>,
    S: UniformScalar,
{
    type Err = ArithError;

    fn operate(&self, rhs: &Uniform<S>) -> Result<Self::Res, ArithError> {
        Ok(Transpose::new(self.inner.operate(rhs)?))
    }
}

impl<A, S> OperateAssign<Mul, Uniform<S>> for Transpose<A>
where
    A: OperateAssign<Mul, Uniform<S>, Err = ArithError>,
    S: UniformScalar,
{
    fn operate_assign(&mut self, rhs: &Uniform<S>) -> Result<(), ArithError> {
        self.inner.operate_assign(rhs)
    }
}

// Two transposed values are canonically equal exactly when their untransposed
// contents are.
impl<A: CanonicalEq<B>, B> CanonicalEq<Transpose<B>> for Transpose<A> {
    fn canonical_eq(&self, rhs: &Transpose<B>) -> bool {
        self.inner.canonical_eq(&rhs.inner)
    }
}

impl<T: CanonicalEq<S>, S> CanonicalEq<DenseMatrix<S>> for Transpose<DenseMatrix<T>> {
    fn canonical_eq(&self, rhs: &DenseMatrix<S>) -> bool {
        let lhs = &self.inner;
        if lhs.nrows() != rhs.ncols() || lhs.ncols() != rhs.nrows() {
            return false;
        }
        (0..rhs.nrows()).all(|i| {
            (0..rhs.ncols()).all(|j| match (lhs.get(j, i), rhs.get(i, j)) {
                (Some(l), Some(r)) => l.canonical_eq(r),
                _ => false,
            })
        })
    }
}

impl<T: CanonicalEq<S>, S> CanonicalEq<Transpose<DenseMatrix<S>>> for DenseMatrix<T> {
    fn canonical_eq(&self, rhs: &Transpose<DenseMatrix<S>>) -> bool {
        let rhs_inner = rhs.inner();
        if self.nrows() != rhs_inner.ncols() || self.ncols() != rhs_inner.nrows() {
            return false;
        }
        (0..self.nrows()).all(|i| {
            (0..self.ncols()).all(|j| match (self.get(i, j), rhs_inner.get(j, i)) {
                (Some(l), Some(r)) => l.canonical_eq(r),
                _ => false,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use mutarith_core::operate::operate;

    fn m(rows: &[&[i64]]) -> DenseMatrix<i64> {
        DenseMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn transpose_equals_explicitly_flipped_matrix() {
        let t = m(&[&[1, 2, 3], &[4, 5, 6]]).transposed();
        let flipped = m(&[&[1, 4], &[2, 5], &[3, 6]]);
        assert!(t.canonical_eq(&flipped));
        assert!(flipped.canonical_eq(&t));
    }

    #[test]
    fn transpose_is_not_equal_to_its_untransposed_source() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert!(!a.clone().transposed().canonical_eq(&a));

        // symmetric content is the exception
        let s = m(&[&[1, 7], &[7, 1]]);
        assert!(s.clone().transposed().canonical_eq(&s));
    }

    #[test]
    fn elementwise_sum_keeps_the_wrapper() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 2], &[3, 4]]).transposed();
        let b = m(&[&[10, 20], &[30, 40]]).transposed();
        let sum = operate(Add, &a, &b)?;
        assert!(sum.canonical_eq(&m(&[&[11, 22], &[33, 44]]).transposed()));
        assert!(sum.canonical_eq(&m(&[&[11, 33], &[22, 44]])));
        Ok(())
    }

    #[test]
    fn scaling_acts_through_the_wrapper() -> Result<(), anyhow::Error> {
        let t = m(&[&[1, 2], &[3, 4]]).transposed();
        let scaled = operate(Mul, &t, &Uniform(2i64))?;
        assert!(scaled.canonical_eq(&m(&[&[2, 6], &[4, 8]])));
        Ok(())
    }
}
