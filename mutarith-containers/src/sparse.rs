//! Compressed sparse row matrix.
//!
//! Stored as the usual three-array CSR layout. Construction validates and
//! sorts the input coordinates once; after that every row's column indices
//! are strictly increasing, which the merge-based operations below rely on.
//!
//! Canonical equality treats absent entries as additive identities, so a
//! sparse matrix compares equal to the dense matrix with the same content
//! and explicitly stored zeros do not break equality.

use alloc::vec::Vec;

use mutarith_core::canonical::CanonicalEq;
use mutarith_core::mutability::{Mutable, Value};
use mutarith_core::op::{Add, AddMul, Dot, Mul, Sub};
use mutarith_core::operate::{Operate, OperateAssign};
use mutarith_core::promote::{Promote, Promoted, Uniform, UniformScalar};
use mutarith_core::zero::Zeroable;
use mutarith_core::fused::{FusedAssign, FusedOperate};
use num_traits::Zero;

use crate::error::{check_output_shape, check_same_shape, ArithError};
use crate::matrix::DenseMatrix;
use crate::vector::DenseVector;

/// Sparse matrix in compressed sparse row form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix<E> {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<E>,
}

impl<E> CsrMatrix<E> {
    /// Builds a matrix from `(row, col, value)` triplets.
    ///
    /// Coordinates must be in range and pairwise distinct; input order does
    /// not matter.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        mut triplets: Vec<(usize, usize, E)>,
    ) -> Result<Self, ArithError> {
        if triplets.iter().any(|&(r, c, _)| r >= nrows || c >= ncols) {
            return Err(ArithError::Construction("entry coordinate out of range"));
        }
        triplets.sort_by_key(|&(r, c, _)| (r, c));
        if triplets.windows(2).any(|w| (w[0].0, w[0].1) == (w[1].0, w[1].1)) {
            return Err(ArithError::Construction("duplicate entry coordinate"));
        }

        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        row_ptr.push(0);
        let mut row = 0;
        for (r, c, v) in triplets {
            while row < r {
                row_ptr.push(col_idx.len());
                row += 1;
            }
            col_idx.push(c);
            values.push(v);
        }
        while row < nrows {
            row_ptr.push(col_idx.len());
            row += 1;
        }
        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// `[rows, cols]` shape, as validated against other operands.
    pub fn shape(&self) -> [usize; 2] {
        [self.nrows, self.ncols]
    }

    /// Number of stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The stored entry at `(i, j)`, if any.
    pub fn get(&self, i: usize, j: usize) -> Option<&E> {
        let (lo, hi) = (*self.row_ptr.get(i)?, *self.row_ptr.get(i + 1)?);
        let p = self.col_idx[lo..hi].binary_search(&j).ok()?;
        Some(&self.values[lo + p])
    }

    fn row(&self, i: usize) -> (&[usize], &[E]) {
        let (lo, hi) = (self.row_ptr[i], self.row_ptr[i + 1]);
        (&self.col_idx[lo..hi], &self.values[lo..hi])
    }

    /// Expands to a dense matrix, filling absent entries with the additive
    /// identity.
    pub fn to_dense(&self) -> DenseMatrix<E>
    where
        E: Zero + Clone,
    {
        let mut rows: Vec<Vec<E>> = (0..self.nrows)
            .map(|_| core::iter::repeat_with(E::zero).take(self.ncols).collect())
            .collect();
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&j, v) in cols.iter().zip(vals) {
                rows[i][j] = v.clone();
            }
        }
        DenseMatrix::from_rows(rows).expect("rows built with a fixed width")
    }
}

impl<E: Clone> Value for CsrMatrix<E> {
    type Mutability = Mutable;
}

// Zeroes the stored values in place. The sparsity pattern is kept: pattern
// reuse is the reason callers zero a sparse accumulator instead of
// rebuilding it.
impl<E: Zeroable> Zeroable for CsrMatrix<E> {
    fn zero_out(&mut self) {
        for v in &mut self.values {
            v.zero_out();
        }
    }
}

impl<T, S> CanonicalEq<CsrMatrix<S>> for CsrMatrix<T>
where
    T: CanonicalEq<S> + Zero,
    S: Zero,
{
    fn canonical_eq(&self, rhs: &CsrMatrix<S>) -> bool {
        self.shape() == rhs.shape()
            && (0..self.nrows).all(|i| {
                (0..self.ncols).all(|j| match (self.get(i, j), rhs.get(i, j)) {
                    (Some(l), Some(r)) => l.canonical_eq(r),
                    (Some(l), None) => l.canonical_eq(&S::zero()),
                    (None, Some(r)) => T::zero().canonical_eq(r),
                    (None, None) => true,
                })
            })
    }
}

impl<T, S> CanonicalEq<DenseMatrix<S>> for CsrMatrix<T>
where
    T: CanonicalEq<S> + Zero,
{
    fn canonical_eq(&self, rhs: &DenseMatrix<S>) -> bool {
        self.shape() == rhs.shape()
            && (0..self.nrows).all(|i| {
                (0..self.ncols).all(|j| {
                    let r = rhs.get(i, j).expect("index within checked shape");
                    match self.get(i, j) {
                        Some(l) => l.canonical_eq(r),
                        None => T::zero().canonical_eq(r),
                    }
                })
            })
    }
}

impl<T, S> CanonicalEq<CsrMatrix<S>> for DenseMatrix<T>
where
    S: CanonicalEq<T> + Zero,
{
    fn canonical_eq(&self, rhs: &CsrMatrix<S>) -> bool {
        rhs.canonical_eq(self)
    }
}

// Elementwise add/sub: per-row merge of the two sorted column lists. The
// result pattern is the union of the operand patterns; left-only entries are
// carried over through the promoted type, right-only entries go through
// `op(0, r)`, which is what makes the same loop serve subtraction.
macro_rules! sparse_elementwise {
    ($op:ty) => {
        unsafe impl<T: Promote<$op, S>, S> Promote<$op, CsrMatrix<S>> for CsrMatrix<T> {
            type Res = CsrMatrix<Promoted<$op, T, S>>;
        }

        impl<T, S> Operate<$op, CsrMatrix<S>> for CsrMatrix<T>
        where
            T: Operate<$op, S> + Clone + Zero,
            Promoted<$op, T, S>: From<T>,
            ArithError: From<<T as Operate<$op, S>>::Err>,
        {
            type Err = ArithError;

            fn operate(&self, rhs: &CsrMatrix<S>) -> Result<Self::Res, ArithError> {
                check_same_shape(&self.shape(), &rhs.shape())?;
                let mut row_ptr = Vec::with_capacity(self.nrows + 1);
                let mut col_idx = Vec::new();
                let mut values = Vec::new();
                row_ptr.push(0);
                for i in 0..self.nrows {
                    let (lc, lv) = self.row(i);
                    let (rc, rv) = rhs.row(i);
                    let (mut p, mut q) = (0, 0);
                    while p < lc.len() || q < rc.len() {
                        match (lc.get(p), rc.get(q)) {
                            (Some(&jl), Some(&jr)) if jl == jr => {
                                col_idx.push(jl);
                                values.push(lv[p].operate(&rv[q])?);
                                p += 1;
                                q += 1;
                            }
                            (Some(&jl), Some(&jr)) if jl < jr => {
                                col_idx.push(jl);
                                values.push(lv[p].clone().into());
                                p += 1;
                            }
                            (Some(_), Some(&jr)) => {
                                col_idx.push(jr);
                                values.push(T::zero().operate(&rv[q])?);
                                q += 1;
                            }
                            (Some(&jl), None) => {
                                col_idx.push(jl);
                                values.push(lv[p].clone().into());
                                p += 1;
                            }
                            (None, Some(&jr)) => {
                                col_idx.push(jr);
                                values.push(T::zero().operate(&rv[q])?);
                                q += 1;
                            }
                            (None, None) => unreachable!(),
                        }
                    }
                    row_ptr.push(col_idx.len());
                }
                Ok(CsrMatrix {
                    nrows: self.nrows,
                    ncols: self.ncols,
                    row_ptr,
                    col_idx,
                    values,
                })
            }
        }
    };
}

sparse_elementwise!(Add);
sparse_elementwise!(Sub);

// Uniform scaling maps the stored values; the pattern is untouched. Scaling
// by zero leaves explicit zeros behind rather than re-compressing, which
// canonical equality absorbs.
unsafe impl<T: Promote<Mul, S>, S: UniformScalar> Promote<Mul, Uniform<S>> for CsrMatrix<T> {
    type Res = CsrMatrix<Promoted<Mul, T, S>>;
}

impl<T, S> Operate<Mul, Uniform<S>> for CsrMatrix<T>
where
    T: Operate<Mul, S>,
    S: UniformScalar,
    ArithError: From<<T as Operate<Mul, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &Uniform<S>) -> Result<Self::Res, ArithError> {
        let values = self
            .values
            .iter()
            .map(|v| v.operate(&rhs.0).map_err(ArithError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CsrMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr: self.row_ptr.clone(),
            col_idx: self.col_idx.clone(),
            values,
        })
    }
}

impl<T, S> OperateAssign<Mul, Uniform<S>> for CsrMatrix<T>
where
    T: OperateAssign<Mul, S>,
    S: UniformScalar,
    ArithError: From<<T as Operate<Mul, S>>::Err>,
{
    fn operate_assign(&mut self, rhs: &Uniform<S>) -> Result<(), ArithError> {
        for v in &mut self.values {
            v.operate_assign(&rhs.0)?;
        }
        Ok(())
    }
}

// Sparse matrix-vector product: the fused inner step visits stored entries
// only, with one scratch value for the whole product.
unsafe impl<T: Promote<Dot, S>, S> Promote<Mul, DenseVector<S>> for CsrMatrix<T> {
    type Res = DenseVector<Promoted<Dot, T, S>>;
}

impl<T, S> Operate<Mul, DenseVector<S>> for CsrMatrix<T>
where
    T: Promote<Dot, S>,
    Promoted<Dot, T, S>: Zero + Clone + Zeroable + FusedAssign<AddMul, T, S>,
    ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &DenseVector<S>) -> Result<Self::Res, ArithError> {
        check_same_shape(&[self.ncols], &[rhs.len()])?;
        let mut out: DenseVector<Promoted<Dot, T, S>> = DenseVector::zeros(self.nrows);
        Self::accumulate_spmv(&mut out, self, rhs)?;
        Ok(out)
    }

    fn operate_into(
        out: &mut Self::Res,
        lhs: &Self,
        rhs: &DenseVector<S>,
    ) -> Result<(), ArithError> {
        check_same_shape(&[lhs.ncols], &[rhs.len()])?;
        check_output_shape(&[lhs.nrows], &[out.len()])?;
        out.zero_out();
        Self::accumulate_spmv(out, lhs, rhs)
    }
}

impl<T> CsrMatrix<T> {
    fn accumulate_spmv<S>(
        out: &mut DenseVector<Promoted<Dot, T, S>>,
        lhs: &CsrMatrix<T>,
        rhs: &DenseVector<S>,
    ) -> Result<(), ArithError>
    where
        T: Promote<Dot, S>,
        Promoted<Dot, T, S>: FusedAssign<AddMul, T, S>,
        ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
    {
        let mut buf = <Promoted<Dot, T, S> as FusedAssign<AddMul, T, S>>::make_buffer();
        for (i, slot) in out.array_mut().iter_mut().enumerate() {
            let (cols, vals) = lhs.row(i);
            for (&j, v) in cols.iter().zip(vals) {
                slot.buffered_fused_assign(&mut buf, v, &rhs.array()[j])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutarith_core::operate::{operate, operate_into};
    use std::vec;

    fn sample() -> CsrMatrix<i64> {
        // [1 0 2]
        // [0 0 3]
        CsrMatrix::from_triplets(2, 3, vec![(0, 0, 1), (1, 2, 3), (0, 2, 2)]).unwrap()
    }

    #[test]
    fn construction_sorts_and_validates() {
        let m = sample();
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(0, 0), Some(&1));
        assert_eq!(m.get(0, 2), Some(&2));
        assert_eq!(m.get(1, 2), Some(&3));
        assert_eq!(m.get(1, 0), None);

        let dup = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 1i64), (0, 0, 2)]);
        assert_eq!(
            dup.unwrap_err(),
            ArithError::Construction("duplicate entry coordinate")
        );
        let oob = CsrMatrix::from_triplets(2, 2, vec![(2, 0, 1i64)]);
        assert_eq!(
            oob.unwrap_err(),
            ArithError::Construction("entry coordinate out of range")
        );
    }

    #[test]
    fn sparse_equals_its_dense_expansion() {
        let m = sample();
        assert!(m.canonical_eq(&m.to_dense()));
        assert!(m.to_dense().canonical_eq(&m));
    }

    #[test]
    fn explicit_zeros_do_not_break_equality() {
        let with_zero =
            CsrMatrix::from_triplets(2, 2, vec![(0, 0, 5i64), (1, 1, 0)]).unwrap();
        let without = CsrMatrix::from_triplets(2, 2, vec![(0, 0, 5i64)]).unwrap();
        assert!(with_zero.canonical_eq(&without));
        assert!(without.canonical_eq(&with_zero));
        assert_ne!(with_zero.nnz(), without.nnz());
    }

    #[test]
    fn addition_merges_patterns() -> Result<(), anyhow::Error> {
        let a = sample();
        let b = CsrMatrix::from_triplets(2, 3, vec![(0, 1, 10i64), (1, 2, -3)]).unwrap();
        let sum = operate(Add, &a, &b)?;
        let expected =
            CsrMatrix::from_triplets(2, 3, vec![(0, 0, 1i64), (0, 1, 10), (0, 2, 2), (1, 2, 0)])
                .unwrap();
        assert!(sum.canonical_eq(&expected));
        Ok(())
    }

    #[test]
    fn addition_requires_matching_shapes() {
        let a = sample();
        let b = CsrMatrix::from_triplets(3, 3, vec![(0, 0, 1i64)]).unwrap();
        assert!(operate(Add, &a, &b).is_err());
    }

    #[test]
    fn subtraction_negates_right_only_entries() -> Result<(), anyhow::Error> {
        let a = sample();
        let b = CsrMatrix::from_triplets(2, 3, vec![(0, 1, 10i64), (1, 2, 1)]).unwrap();
        let diff = operate(Sub, &a, &b)?;
        let expected = CsrMatrix::from_triplets(
            2,
            3,
            vec![(0, 0, 1i64), (0, 1, -10), (0, 2, 2), (1, 2, 2)],
        )
        .unwrap();
        assert!(diff.canonical_eq(&expected));
        Ok(())
    }

    #[test]
    fn matvec_visits_stored_entries_only() -> Result<(), anyhow::Error> {
        let m = sample();
        let x = DenseVector::from_vec(vec![1i64, 100, 10]);
        let y = operate(Mul, &m, &x)?;
        assert!(y.canonical_eq(&DenseVector::from_vec(vec![21i64, 30])));
        Ok(())
    }

    #[test]
    fn matvec_into_validates_before_writing() -> Result<(), anyhow::Error> {
        let m = sample();
        let x = DenseVector::from_vec(vec![1i64, 100, 10]);

        let mut wrong = DenseVector::<i64>::zeros(3);
        let err = operate_into(Mul, &mut wrong, &m, &x).unwrap_err();
        assert_eq!(
            err,
            ArithError::OutputShapeMismatch {
                expected: vec![2],
                found: vec![3]
            }
        );

        let mut out = DenseVector::from_vec(vec![5i64, 5]);
        operate_into(Mul, &mut out, &m, &x)?;
        assert!(out.canonical_eq(&DenseVector::from_vec(vec![21i64, 30])));
        Ok(())
    }

    #[test]
    fn scaling_preserves_the_pattern() -> Result<(), anyhow::Error> {
        let m = sample();
        let scaled = operate(Mul, &m, &Uniform(0i64))?;
        assert_eq!(scaled.nnz(), m.nnz());
        assert!(scaled.canonical_eq(&CsrMatrix::from_triplets(2, 3, vec![]).unwrap()));
        Ok(())
    }

    #[test]
    fn zeroing_keeps_the_pattern_for_reuse() {
        let mut m = sample();
        m.zero_out();
        assert_eq!(m.nnz(), 3);
        assert!(m.canonical_eq(&CsrMatrix::<i64>::from_triplets(2, 3, vec![]).unwrap()));
    }
}
