//! Dense vector driven by the operate protocol.

use alloc::vec::Vec;

use mutarith_core::canonical::CanonicalEq;
use mutarith_core::fused::{FusedAssign, FusedOperate};
use mutarith_core::mutability::{Mutable, Value};
use mutarith_core::op::{Add, AddMul, Dot, FusedOperation, Mul, Sub};
use mutarith_core::operate::{Operate, OperateAssign};
use mutarith_core::promote::{Promote, Promoted, Uniform, UniformScalar};
use mutarith_core::zero::Zeroable;
use ndarray::Array1;
use num_traits::Zero;

use crate::error::{check_output_shape, check_same_shape, ArithError};

/// Dense vector owning its elements.
///
/// Classified `Mutable`: elements may be overwritten in place, and the
/// structural copy (`mutable_copy`) deep-copies the element storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseVector<E> {
    data: Array1<E>,
}

impl<E> DenseVector<E> {
    /// Builds a vector from its elements.
    pub fn from_vec(v: Vec<E>) -> Self {
        Self {
            data: Array1::from_vec(v),
        }
    }

    /// A vector of `len` additive identities.
    pub fn zeros(len: usize) -> Self
    where
        E: Zero + Clone,
    {
        Self {
            data: Array1::from_elem(len, E::zero()),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the vector has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Immutable element access.
    pub fn get(&self, i: usize) -> Option<&E> {
        self.data.get(i)
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.data.iter()
    }

    pub(crate) fn array(&self) -> &Array1<E> {
        &self.data
    }

    pub(crate) fn array_mut(&mut self) -> &mut Array1<E> {
        &mut self.data
    }
}

impl<E: Clone> Value for DenseVector<E> {
    type Mutability = Mutable;
}

impl<E: Zeroable> Zeroable for DenseVector<E> {
    fn zero_out(&mut self) {
        // additive-identity fill; never enters the reduction path
        for e in self.data.iter_mut() {
            e.zero_out();
        }
    }
}

impl<T: CanonicalEq<S>, S> CanonicalEq<DenseVector<S>> for DenseVector<T> {
    fn canonical_eq(&self, rhs: &DenseVector<S>) -> bool {
        self.len() == rhs.len()
            && self
                .data
                .iter()
                .zip(rhs.data.iter())
                .all(|(l, r)| l.canonical_eq(r))
    }
}

// Elementwise add/sub. Shapes must match exactly: no broadcasting, and the
// shape check runs before any element is written.
macro_rules! vector_elementwise {
    ($op:ty) => {
        unsafe impl<T: Promote<$op, S>, S> Promote<$op, DenseVector<S>> for DenseVector<T> {
            type Res = DenseVector<Promoted<$op, T, S>>;
        }

        impl<T, S> Operate<$op, DenseVector<S>> for DenseVector<T>
        where
            T: Operate<$op, S>,
            ArithError: From<<T as Operate<$op, S>>::Err>,
        {
            type Err = ArithError;

            fn operate(&self, rhs: &DenseVector<S>) -> Result<Self::Res, ArithError> {
                check_same_shape(&[self.len()], &[rhs.len()])?;
                let data = self
                    .data
                    .iter()
                    .zip(rhs.data.iter())
                    .map(|(l, r)| l.operate(r).map_err(ArithError::from))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DenseVector::from_vec(data))
            }

            fn operate_into(
                out: &mut Self::Res,
                lhs: &Self,
                rhs: &DenseVector<S>,
            ) -> Result<(), ArithError> {
                check_same_shape(&[lhs.len()], &[rhs.len()])?;
                check_output_shape(&[lhs.len()], &[out.len()])?;
                for ((o, l), r) in out.data.iter_mut().zip(lhs.data.iter()).zip(rhs.data.iter()) {
                    T::operate_into(o, l, r)?;
                }
                Ok(())
            }
        }

        impl<T, S> OperateAssign<$op, DenseVector<S>> for DenseVector<T>
        where
            T: OperateAssign<$op, S>,
            ArithError: From<<T as Operate<$op, S>>::Err>,
        {
            fn operate_assign(&mut self, rhs: &DenseVector<S>) -> Result<(), ArithError> {
                check_same_shape(&[self.len()], &[rhs.len()])?;
                for (l, r) in self.data.iter_mut().zip(rhs.data.iter()) {
                    l.operate_assign(r)?;
                }
                Ok(())
            }
        }
    };
}

vector_elementwise!(Add);
vector_elementwise!(Sub);

// Uniform scaling. The result promotes through the element type, never
// through the scaling value's own type.
unsafe impl<T: Promote<Mul, S>, S: UniformScalar> Promote<Mul, Uniform<S>> for DenseVector<T> {
    type Res = DenseVector<Promoted<Mul, T, S>>;
}

impl<T, S> Operate<Mul, Uniform<S>> for DenseVector<T>
where
    T: Operate<Mul, S>,
    S: UniformScalar,
    ArithError: From<<T as Operate<Mul, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &Uniform<S>) -> Result<Self::Res, ArithError> {
        let data = self
            .data
            .iter()
            .map(|l| l.operate(&rhs.0).map_err(ArithError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DenseVector::from_vec(data))
    }

    fn operate_into(
        out: &mut Self::Res,
        lhs: &Self,
        rhs: &Uniform<S>,
    ) -> Result<(), ArithError> {
        check_output_shape(&[lhs.len()], &[out.len()])?;
        for (o, l) in out.data.iter_mut().zip(lhs.data.iter()) {
            T::operate_into(o, l, &rhs.0)?;
        }
        Ok(())
    }
}

impl<T, S> OperateAssign<Mul, Uniform<S>> for DenseVector<T>
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

// Dot product: a single fused reduction. No "product array then sum"
// two-pass strategy; the zero-length case short-circuits to the additive
// identity of the promoted element type.
unsafe impl<T: Promote<Dot, S>, S> Promote<Dot, DenseVector<S>> for DenseVector<T> {
    type Res = Promoted<Dot, T, S>;
}

impl<T, S> Operate<Dot, DenseVector<S>> for DenseVector<T>
where
    T: Promote<Dot, S>,
    Promoted<Dot, T, S>: Zero + FusedAssign<AddMul, T, S>,
    ArithError: From<<Promoted<Dot, T, S> as FusedOperate<AddMul, T, S>>::Err>,
{
    type Err = ArithError;

    fn operate(&self, rhs: &DenseVector<S>) -> Result<Self::Res, ArithError> {
        check_same_shape(&[self.len()], &[rhs.len()])?;
        let mut acc = <Promoted<Dot, T, S> as Zero>::zero();
        let mut buf = <Promoted<Dot, T, S> as FusedAssign<AddMul, T, S>>::make_buffer();
        for (l, r) in self.data.iter().zip(rhs.data.iter()) {
            acc.buffered_fused_assign(&mut buf, l, r)?;
        }
        Ok(acc)
    }
}

// Fused multiply-accumulate against a vector: `self ± b * c` with `b` a
// vector of the same length and `c` a scaling factor. One buffer serves
// every element position.
unsafe impl<Op, T, U, V> Promote<Op, (DenseVector<U>, V)> for DenseVector<T>
where
    Op: FusedOperation,
    T: Promote<Op, (U, V)>,
{
    type Res = DenseVector<Promoted<Op, T, (U, V)>>;
}

impl<Op, T, U, V> FusedOperate<Op, DenseVector<U>, V> for DenseVector<T>
where
    Op: FusedOperation,
    T: FusedOperate<Op, U, V>,
    ArithError: From<<T as FusedOperate<Op, U, V>>::Err>,
{
    type Err = ArithError;

    fn fused(&self, b: &DenseVector<U>, c: &V) -> Result<Self::Res, ArithError> {
        check_same_shape(&[self.len()], &[b.len()])?;
        let data = self
            .data
            .iter()
            .zip(b.data.iter())
            .map(|(t, u)| t.fused(u, c).map_err(ArithError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DenseVector::from_vec(data))
    }
}

impl<Op, T, U, V> FusedAssign<Op, DenseVector<U>, V> for DenseVector<T>
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
        b: &DenseVector<U>,
        c: &V,
    ) -> Result<(), ArithError> {
        check_same_shape(&[self.len()], &[b.len()])?;
        for (slot, u) in self.data.iter_mut().zip(b.data.iter()) {
            slot.buffered_fused_assign(buf, u, c)?;
        }
        Ok(())
    }
}
