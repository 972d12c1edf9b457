//! Arbitrary-precision integers as operate-protocol values.
//!
//! [`Big`] wraps `num_bigint::BigInt` and classifies it `Mutable`: its digit
//! storage can be overwritten in place, so the in-place tier and the buffer
//! protocol pay off for real. The fused multiply-accumulate keeps one scratch
//! `BigInt` alive across an entire reduction instead of allocating a product
//! per step.

#![warn(missing_docs)]
#![no_std]
#[cfg(test)]
extern crate std;

use core::convert::Infallible;
use core::fmt;

use mutarith_core::canonical::CanonicalEq;
use mutarith_core::fused::{FusedAssign, FusedOperate};
use mutarith_core::mutability::{Mutable, Value};
use mutarith_core::op::{Add, Dot, FusedOperation, Mul, Sub};
use mutarith_core::operate::{Operate, OperateAssign};
use mutarith_core::promote::{Promote, UniformScalar};
use mutarith_core::zero::Zeroable;
use num_bigint::BigInt;
use num_traits::Zero;

/// Arbitrary-precision signed integer participating in the operate protocol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Big(pub BigInt);

impl Big {
    /// The additive identity.
    pub fn new() -> Self {
        Self(BigInt::zero())
    }
}

impl Default for Big {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BigInt> for Big {
    fn from(v: BigInt) -> Self {
        Self(v)
    }
}

impl From<i64> for Big {
    fn from(v: i64) -> Self {
        Self(BigInt::from(v))
    }
}

impl fmt::Display for Big {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Value for Big {
    type Mutability = Mutable;
}

impl UniformScalar for Big {}

impl Zeroable for Big {
    fn zero_out(&mut self) {
        self.0.set_zero();
    }
}

impl CanonicalEq for Big {
    fn canonical_eq(&self, rhs: &Big) -> bool {
        self.0 == rhs.0
    }
}

// For containers of `Big`: zero-filled construction and the zero-length
// reduction identity.
impl core::ops::Add for Big {
    type Output = Big;

    fn add(self, rhs: Big) -> Big {
        Big(self.0 + rhs.0)
    }
}

impl Zero for Big {
    fn zero() -> Self {
        Self::new()
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn set_zero(&mut self) {
        self.0.set_zero();
    }
}

macro_rules! big_binary {
    ($op:ty, $apply:tt, $assign:tt) => {
        unsafe impl Promote<$op> for Big {
            type Res = Big;
        }

        impl Operate<$op> for Big {
            type Err = Infallible;

            fn operate(&self, rhs: &Big) -> Result<Big, Infallible> {
                Ok(Big(&self.0 $apply &rhs.0))
            }
        }

        impl OperateAssign<$op> for Big {
            fn operate_assign(&mut self, rhs: &Big) -> Result<(), Infallible> {
                self.0 $assign &rhs.0;
                Ok(())
            }
        }
    };
}

big_binary!(Add, +, +=);
big_binary!(Sub, -, -=);
big_binary!(Mul, *, *=);
// scalars are their own one-element dot product
big_binary!(Dot, *, *=);

unsafe impl<Op: FusedOperation> Promote<Op, (Big, Big)> for Big {
    type Res = Big;
}

impl<Op: FusedOperation> FusedOperate<Op> for Big {
    type Err = Infallible;

    fn fused(&self, b: &Big, c: &Big) -> Result<Big, Infallible> {
        // qualified: every fused operation has a `FusedAssign` impl, so a
        // bare method call cannot pin down `Op`
        let mut out = self.clone();
        <Self as FusedAssign<Op>>::fused_assign(&mut out, b, c)?;
        Ok(out)
    }
}

impl<Op: FusedOperation> FusedAssign<Op> for Big {
    // one scratch integer, reused across every accumulation step
    type Buffer = BigInt;

    fn make_buffer() -> BigInt {
        BigInt::zero()
    }

    fn buffered_fused_assign(
        &mut self,
        buf: &mut BigInt,
        b: &Big,
        c: &Big,
    ) -> Result<(), Infallible> {
        buf.clone_from(&b.0);
        *buf *= &c.0;
        if Op::ACCUMULATE_ADD {
            self.0 += &*buf;
        } else {
            self.0 -= &*buf;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutarith_core::fused::{add_mul, add_mul_chain, buffer_for, buffered_operate, sub_mul};
    use mutarith_core::op::{AddMul, SubMul};
    use mutarith_core::operate::{operate, operate_in_place};

    fn big(v: i64) -> Big {
        Big::from(v)
    }

    #[test]
    fn binary_operations_match_plain_bigint() -> Result<(), anyhow::Error> {
        assert_eq!(operate(Add, &big(40), &big(2))?, big(42));
        assert_eq!(operate(Sub, &big(40), &big(2))?, big(38));
        assert_eq!(operate(Mul, &big(6), &big(7))?, big(42));
        assert_eq!(operate(Dot, &big(6), &big(7))?, big(42));
        Ok(())
    }

    #[test]
    fn in_place_tier_takes_the_mutating_path() -> Result<(), anyhow::Error> {
        let a = big(100);
        let spare = a.mutable_copy();
        let r = operate_in_place(Add, spare, &big(1))?;
        assert_eq!(r, big(101));
        // the copy was consumed; the original is untouched
        assert_eq!(a, big(100));
        Ok(())
    }

    #[test]
    fn fused_forms_agree() -> Result<(), anyhow::Error> {
        assert_eq!(add_mul(&big(1), &big(2), &big(3))?, big(7));
        assert_eq!(sub_mul(&big(1), &big(2), &big(3))?, big(-5));
        assert_eq!(add_mul_chain(&big(1), &big(2), &big(3), &big(4))?, big(25));
        Ok(())
    }

    #[test]
    fn one_buffer_serves_a_whole_reduction() -> Result<(), anyhow::Error> {
        let mut acc = Big::new();
        let mut buf = buffer_for::<AddMul, Big, Big, Big>(AddMul);
        for k in 1..=5i64 {
            buffered_operate(AddMul, &mut buf, &mut acc, &big(k), &big(k))?;
        }
        assert_eq!(acc, big(55));

        // the same buffer is reusable for the subtracting variant
        let mut buf = buffer_for::<SubMul, Big, Big, Big>(SubMul);
        buffered_operate(SubMul, &mut buf, &mut acc, &big(5), &big(11))?;
        assert_eq!(acc, big(0));
        assert!(acc.is_zero());
        Ok(())
    }

    #[test]
    fn zeroing_resets_the_value() {
        let mut a = big(-37);
        a.zero_out();
        assert!(a.canonical_eq(&Big::new()));
    }
}
