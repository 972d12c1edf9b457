//! Dense matrix driven by the operate protocol.
//!
//! The matrix products are explicit index loops rather than iterator
//! reductions: the buffer protocol needs direct access to the inner
//! accumulation step, so one scratch value can serve every `(i, j, k)`
//! position. Accumulation order is row-major over the output with the
//! reduction index innermost, which fixes the result bit-for-bit for
//! non-commutative or non-associative element types.

use alloc::vec::Vec;

use mutarith_core::canonical::CanonicalEq;
use mutarith_core::fused::{FusedAssign, FusedOperate};
use mutarith_core::mutability::{Mutable, Value};
use mutarith_core::op::{Add, AddMul, Dot, FusedOperation, Mul, Sub};
use mutarith_core::operate::{Operate, OperateAssign};
use mutarith_core::promote::{Promote, Promoted, Uniform, UniformScalar};
use mutarith_core::zero::Zeroable;
use ndarray::Array2;
use num_traits::Zero;

use crate::error::{check_output_shape, check_same_shape, ArithError};
use crate::transpose::Transpose;
use crate::vector::DenseVector;

/// Dense row-major matrix owning its elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix<E> {
    data: Array2<E>,
}

impl<E> DenseMatrix<E> {
    /// Builds a matrix from equal-length rows.
    pub fn from_rows(rows: Vec<Vec<E>>) -> Result<Self, ArithError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(ArithError::Construction("rows have unequal lengths"));
        }
        let flat: Vec<E> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|_| ArithError::Construction("row/column counts disagree"))?;
        Ok(Self { data })
    }

    /// An `nrows × ncols` matrix of additive identities.
    pub fn zeros(nrows: usize, ncols: usize) -> Self
    where
        E: Zero + Clone,
    {
        Self {
            data: Array2::from_elem((nrows, ncols), E::zero()),
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// `[rows, cols]` shape, as validated against other operands.
    pub fn shape(&self) -> [usize; 2] {
        [self.nrows(), self.ncols()]
    }

    /// Immutable element access.
    pub fn get(&self, i: usize, j: usize) -> Option<&E> {
        self.data.get((i, j))
    }

    /// Wraps the matrix in a lazy transposition view.
    pub fn transposed(self) -> Transpose<Self> {
        Transpose::new(self)
    }
}

impl<E: Clone> Value for DenseMatrix<E> {
    type Mutability = Mutable;
}

impl<E: Zeroable> Zeroable for DenseMatrix<E> {
    fn zero_out(&mut self) {
        for e in self.data.iter_mut() {
            e.zero_out();
        }
    }
}

impl<T: CanonicalEq<S>, S> CanonicalEq<DenseMatrix<S>> for DenseMatrix<T> {
    fn canonical_eq(&self, rhs: &DenseMatrix<S>) -> bool {
        self.shape() == rhs.shape()
            && self
                .data
                .iter()
                .zip(rhs.data.iter())
                .all(|(l, r)| l.canonical_eq(r))
    }
}

macro_rules! matrix_elementwise {
    ($op:ty) => {
        unsafe impl<T: Promote<$op, S>, S> Promote<$op, DenseMatrix<S>> for DenseMatrix<T> {
            type Res = DenseMatrix<Promoted<$op, T, S>>;
        }

        impl<T, S> Operate<$op, DenseMatrix<S>> for DenseMatrix<T>
        where
            T: Operate<$op, S>,
            ArithError: From<<T as Operate<$op, S>>::Err>,
        {
            type Err = ArithError;

            fn operate(&self, rhs: &DenseMatrix<S>) -> Result<Self::Res, ArithError> {
                check_same_shape(&self.shape(), &rhs.shape())?;
                let flat = self
                    .data
                    .iter()
                    .zip(rhs.data.iter())
                    .map(|(l, r)| l.operate(r).map_err(ArithError::from))
                    .collect::<Result<Vec<_>, _>>()?;
                let data = Array2::from_shape_vec((self.nrows(), self.ncols()), flat)
                    .expect("shape preserved by elementwise map");
                Ok(DenseMatrix { data })
            }

            fn operate_into(
                out: &mut Self::Res,
                lhs: &Self,
                rhs: &DenseMatrix<S>,
            ) -> Result<(), ArithError> {
                check_same_shape(&lhs.shape(), &rhs.shape())?;
                check_output_shape(&lhs.shape(), &out.shape())?;
                for ((o, l), r) in out.data.iter_mut().zip(lhs.data.iter()).zip(rhs.data.iter()) {
                    T::operate_into(o, l, r)?;
                }
                Ok(())
            }
        }

        impl<T, S> OperateAssign<$op, DenseMatrix<S>> for DenseMatrix<T>
        where
            T: OperateAssign<$op, S>,
            ArithError: From<<T as Operate<$op, S>>::Err>,
        {
            fn operate_assign(&mut self, rhs: &DenseMatrix<S>) -> Result<(), ArithError> {
                check_same_shape(&self.shape(), &rhs.shape())?;
                for (l, r) in self.data.iter_mut().zip(rhs.data.iter()) {
                    l.operate_assign(r)?;
                }
                Ok(())
            }
        }
    };
}

matrix_elementwise!(Add);
matrix_elementwise!(Sub);

// Uniform scaling, promoting through the element type.
unsafe impl<T: Promote<Mul, S>, S: UniformScalar> Promote<Mul, Uniform<S>> for DenseMatrix<T> {
    type Res = DenseMatrix<Promoted<Mul, T, S>>;
}

impl<T, S> Operate<Mul, Uniform<S>> for DenseMatrix<T>
where
    T: Operate<Mul, S>,
    S: UniformScalar,
    ArithError: From<<T as Operate<Mul, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &Uniform<S>) -> Result<Self::Res, ArithError> {
        let flat = self
            .data
            .iter()
            .map(|l| l.operate(&rhs.0).map_err(ArithError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let data = Array2::from_shape_vec((self.nrows(), self.ncols()), flat)
            .expect("shape preserved by elementwise map");
        Ok(DenseMatrix { data })
    }
}

impl<T, S> OperateAssign<Mul, Uniform<S>> for DenseMatrix<T>
where
    T: OperateAssign<Mul, S>,
    S: UniformScalar,
    ArithError: From<<T as Operate<Mul, S>>::Err>,
{
    fn operate_assign(&mut self, rhs: &Uniform<S>) -> Result<(), ArithError> {
        for l in self.data.iter_mut() {
            l.operate_assign(&rhs.0)?;
        }
        Ok(())
    }
}

// Matrix-matrix product: explicit (i, j, k) triple loop, one buffered fused
// step per inner iteration.
unsafe impl<T: Promote<Dot, S>, S> Promote<Mul, DenseMatrix<S>> for DenseMatrix<T> {
    type Res = DenseMatrix<Promoted<Dot, T, S>>;
}

impl<T, S> Operate<Mul, DenseMatrix<S>> for DenseMatrix<T>
where
    T: Promote<Dot, S>,
    Promoted<Dot, T, S>: Zero + Clone + Zeroable + FusedAssign<AddMul, T, S>,
    ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &DenseMatrix<S>) -> Result<Self::Res, ArithError> {
        check_same_shape(&[self.ncols()], &[rhs.nrows()])?;
        let mut out: DenseMatrix<Promoted<Dot, T, S>> =
            DenseMatrix::zeros(self.nrows(), rhs.ncols());
        Self::accumulate_product(&mut out, self, rhs)?;
        Ok(out)
    }

    // every check runs before the output is touched; a failed product must
    // not wipe the caller's storage
    fn operate_into(
        out: &mut Self::Res,
        lhs: &Self,
        rhs: &DenseMatrix<S>,
    ) -> Result<(), ArithError> {
        check_same_shape(&[lhs.ncols()], &[rhs.nrows()])?;
        check_output_shape(&[lhs.nrows(), rhs.ncols()], &out.shape())?;
        out.zero_out();
        Self::accumulate_product(out, lhs, rhs)
    }
}

impl<T> DenseMatrix<T> {
    fn accumulate_product<S>(
        out: &mut DenseMatrix<Promoted<Dot, T, S>>,
        lhs: &DenseMatrix<T>,
        rhs: &DenseMatrix<S>,
    ) -> Result<(), ArithError>
    where
        T: Promote<Dot, S>,
        Promoted<Dot, T, S>: FusedAssign<AddMul, T, S>,
        ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
    {
        let (m, n, kk) = (lhs.nrows(), rhs.ncols(), lhs.ncols());
        let mut buf = <Promoted<Dot, T, S> as FusedAssign<AddMul, T, S>>::make_buffer();
        for i in 0..m {
            for j in 0..n {
                for k in 0..kk {
                    out.data[[i, j]].buffered_fused_assign(
                        &mut buf,
                        &lhs.data[[i, k]],
                        &rhs.data[[k, j]],
                    )?;
                }
            }
        }
        Ok(())
    }

    fn accumulate_matvec<S>(
        out: &mut DenseVector<Promoted<Dot, T, S>>,
        lhs: &DenseMatrix<T>,
        rhs: &DenseVector<S>,
    ) -> Result<(), ArithError>
    where
        T: Promote<Dot, S>,
        Promoted<Dot, T, S>: FusedAssign<AddMul, T, S>,
        ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
    {
        let mut buf = <Promoted<Dot, T, S> as FusedAssign<AddMul, T, S>>::make_buffer();
        for (i, slot) in out.array_mut().iter_mut().enumerate() {
            for k in 0..lhs.ncols() {
                slot.buffered_fused_assign(&mut buf, &lhs.data[[i, k]], &rhs.array()[k])?;
            }
        }
        Ok(())
    }
}

// Matrix-vector product: same fused inner step over a single output index.
unsafe impl<T: Promote<Dot, S>, S> Promote<Mul, DenseVector<S>> for DenseMatrix<T> {
    type Res = DenseVector<Promoted<Dot, T, S>>;
}

impl<T, S> Operate<Mul, DenseVector<S>> for DenseMatrix<T>
where
    T: Promote<Dot, S>,
    Promoted<Dot, T, S>: Zero + Clone + Zeroable + FusedAssign<AddMul, T, S>,
    ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &DenseVector<S>) -> Result<Self::Res, ArithError> {
        check_same_shape(&[self.ncols()], &[rhs.len()])?;
        let mut out: DenseVector<Promoted<Dot, T, S>> = DenseVector::zeros(self.nrows());
        Self::accumulate_matvec(&mut out, self, rhs)?;
        Ok(out)
    }

    fn operate_into(
        out: &mut Self::Res,
        lhs: &Self,
        rhs: &DenseVector<S>,
    ) -> Result<(), ArithError> {
        check_same_shape(&[lhs.ncols()], &[rhs.len()])?;
        check_output_shape(&[lhs.nrows()], &[out.len()])?;
        out.zero_out();
        Self::accumulate_matvec(out, lhs, rhs)
    }
}

// Fused multiply-accumulate against a matrix: `self ± b * c` with `c` a
// scaling factor.
unsafe impl<Op, T, U, V> Promote<Op, (DenseMatrix<U>, V)> for DenseMatrix<T>
where
    Op: FusedOperation,
    T: Promote<Op, (U, V)>,
{
    type Res = DenseMatrix<Promoted<Op, T, (U, V)>>;
}

impl<Op, T, U, V> FusedOperate<Op, DenseMatrix<U>, V> for DenseMatrix<T>
where
    Op: FusedOperation,
    T: FusedOperate<Op, U, V>,
    ArithError: From<<T as FusedOperate<Op, U, V>>::Err>,
{
    type Err = ArithError;

    fn fused(&self, b: &DenseMatrix<U>, c: &V) -> Result<Self::Res, ArithError> {
        check_same_shape(&self.shape(), &b.shape())?;
        let flat = self
            .data
            .iter()
            .zip(b.data.iter())
            .map(|(t, u)| t.fused(u, c).map_err(ArithError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let data = Array2::from_shape_vec((self.nrows(), self.ncols()), flat)
            .expect("shape preserved by elementwise map");
        Ok(DenseMatrix { data })
    }
}

impl<Op, T, U, V> FusedAssign<Op, DenseMatrix<U>, V> for DenseMatrix<T>
where
    Op: FusedOperation,
    T: FusedAssign<Op, U, V>,
    ArithError: From<<T as FusedOperate<Op, U, V>>::Err>,
{
    type Buffer = T::Buffer;

    fn make_buffer() -> Self::Buffer {
        T::make_buffer()
    }

    fn buffered_fused_assign(
        &mut self,
        buf: &mut Self::Buffer,
        b: &DenseMatrix<U>,
        c: &V,
    ) -> Result<(), ArithError> {
        check_same_shape(&self.shape(), &b.shape())?;
        for (slot, u) in self.data.iter_mut().zip(b.data.iter()) {
            slot.buffered_fused_assign(buf, u, c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutarith_core::operate::{operate, operate_into};
    use std::vec;

    fn m(rows: &[&[i64]]) -> DenseMatrix<i64> {
        DenseMatrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn matmul_two_by_two() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 2], &[3, 4]]);
        let b = m(&[&[5, 6], &[7, 8]]);
        let c = operate(Mul, &a, &b)?;
        assert!(c.canonical_eq(&m(&[&[19, 22], &[43, 50]])));
        Ok(())
    }

    #[test]
    fn matmul_into_reuses_and_rezeroes_output() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 0], &[0, 1]]);
        let b = m(&[&[2, 3], &[4, 5]]);
        let mut out = DenseMatrix::<i64>::zeros(2, 2);
        operate_into(Mul, &mut out, &a, &b)?;
        assert!(out.canonical_eq(&b));
        // second call with different args: no residue from the first
        let c = m(&[&[0, 1], &[1, 0]]);
        operate_into(Mul, &mut out, &c, &b)?;
        assert!(out.canonical_eq(&m(&[&[4, 5], &[2, 3]])));
        Ok(())
    }

    #[test]
    fn matvec_uses_the_fused_inner_step() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let x = DenseVector::from_vec(vec![1i64, 0, -1]);
        let y = operate(Mul, &a, &x)?;
        assert!(y.canonical_eq(&DenseVector::from_vec(vec![-2i64, -2])));
        Ok(())
    }

    #[test]
    fn inner_dimension_mismatch_errors() {
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = m(&[&[1, 2, 3], &[4, 5, 6]]);
        assert!(operate(Mul, &a, &b).is_err());
    }

    #[test]
    fn failed_product_leaves_the_output_untouched() {
        // inner dimensions disagree; the caller's storage must survive
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let sentinel = m(&[&[9, 9, 9], &[9, 9, 9]]);
        let mut out = sentinel.clone();
        assert!(operate_into(Mul, &mut out, &a, &b).is_err());
        assert!(out.canonical_eq(&sentinel));
    }

    #[test]
    fn matvec_into_checks_the_output_shape() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let x = DenseVector::from_vec(vec![1i64, 0, -1]);

        let mut wrong = DenseVector::<i64>::zeros(5);
        let err = operate_into(Mul, &mut wrong, &a, &x).unwrap_err();
        assert_eq!(
            err,
            ArithError::OutputShapeMismatch {
                expected: vec![2],
                found: vec![5]
            }
        );
        assert_eq!(wrong.len(), 5);

        let mut out = DenseVector::from_vec(vec![7i64, 7]);
        operate_into(Mul, &mut out, &a, &x)?;
        assert!(out.canonical_eq(&DenseVector::from_vec(vec![-2i64, -2])));
        Ok(())
    }

    #[test]
    fn elementwise_shape_rule_is_exact() {
        // 2×3 + 3×2 must fail, never broadcast or partially write
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = m(&[&[1, 2], &[3, 4], &[5, 6]]);
        let err = operate(Add, &a, &b).unwrap_err();
        assert_eq!(
            err,
            ArithError::ShapeMismatch {
                lhs: vec![2, 3],
                rhs: vec![3, 2]
            }
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let ragged = DenseMatrix::from_rows(vec![vec![1i64, 2], vec![3]]);
        assert_eq!(
            ragged.unwrap_err(),
            ArithError::Construction("rows have unequal lengths")
        );
    }

    #[test]
    fn uniform_scaling_scales_every_element() -> Result<(), anyhow::Error> {
        let a = m(&[&[1, 2], &[3, 4]]);
        let s = operate(Mul, &a, &Uniform(10i64))?;
        assert!(s.canonical_eq(&m(&[&[10, 20], &[30, 40]])));
        Ok(())
    }
}
