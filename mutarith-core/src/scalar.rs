//! Primitive machine numbers as protocol participants.
//!
//! Fixed-size numbers are classified `Immutable`: stack temporaries are free,
//! so nothing is gained by mutating them, and the in-place tier degrades to
//! the fresh tier. They still provide the slot-overwrite primitives
//! (`OperateAssign`, `FusedAssign` with a `()` buffer) so containers of
//! machine numbers accumulate directly per element.

use core::convert::Infallible;

use num_traits::Zero;

use crate::canonical::CanonicalEq;
use crate::fused::{FusedAssign, FusedOperate};
use crate::mutability::{Immutable, Value};
use crate::op::{Add, Dot, FusedOperation, Mul, Sub};
use crate::operate::{Operate, OperateAssign};
use crate::promote::{Promote, UniformScalar};
use crate::zero::Zeroable;

macro_rules! scalar_binary_op {
    ($t:ty, $op:ty, $apply:expr, $assign:expr) => {
        unsafe impl Promote<$op> for $t {
            type Res = $t;
        }
        impl Operate<$op> for $t {
            type Err = Infallible;
            fn operate(&self, rhs: &$t) -> Result<$t, Infallible> {
                let f: fn($t, $t) -> $t = $apply;
                Ok(f(*self, *rhs))
            }
        }
        impl OperateAssign<$op> for $t {
            fn operate_assign(&mut self, rhs: &$t) -> Result<(), Infallible> {
                let f: fn(&mut $t, $t) = $assign;
                f(self, *rhs);
                Ok(())
            }
        }
    };
}

macro_rules! scalar_value {
    ($($t:ty),* $(,)?) => {$(
        impl Value for $t {
            type Mutability = Immutable;
        }

        impl UniformScalar for $t {}

        impl Zeroable for $t {
            fn zero_out(&mut self) {
                self.set_zero();
            }
        }

        impl CanonicalEq for $t {
            fn canonical_eq(&self, rhs: &$t) -> bool {
                self == rhs
            }
        }

        scalar_binary_op!($t, Add, |a, b| a + b, |a, b| *a += b);
        scalar_binary_op!($t, Sub, |a, b| a - b, |a, b| *a -= b);
        scalar_binary_op!($t, Mul, |a, b| a * b, |a, b| *a *= b);
        // dot degenerates to mul for scalars
        scalar_binary_op!($t, Dot, |a, b| a * b, |a, b| *a *= b);

        unsafe impl<Op: FusedOperation> Promote<Op, ($t, $t)> for $t {
            type Res = $t;
        }

        impl<Op: FusedOperation> FusedOperate<Op, $t, $t> for $t {
            type Err = Infallible;
            fn fused(&self, b: &$t, c: &$t) -> Result<$t, Infallible> {
                Ok(if Op::ACCUMULATE_ADD {
                    *self + *b * *c
                } else {
                    *self - *b * *c
                })
            }
        }

        impl<Op: FusedOperation> FusedAssign<Op, $t, $t> for $t {
            // machine numbers never benefit from scratch
            type Buffer = ();

            fn make_buffer() -> Self::Buffer {}

            fn buffered_fused_assign(
                &mut self,
                _buf: &mut Self::Buffer,
                b: &$t,
                c: &$t,
            ) -> Result<(), Infallible> {
                if Op::ACCUMULATE_ADD {
                    *self += *b * *c;
                } else {
                    *self -= *b * *c;
                }
                Ok(())
            }
        }
    )*};
}

scalar_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use crate::fused::add_mul;
    use crate::op::{Add, Dot};
    use crate::operate::{operate, operate_in_place};

    #[test]
    fn promotion_matches_runtime_type() -> Result<(), anyhow::Error> {
        // the typed binding is the check: `operate` must produce exactly
        // the promoted type
        let r: f32 = operate(Add, &1.0f32, &2.0f32)?;
        assert_eq!(r, 3.0);
        let d: u64 = operate(Dot, &6u64, &7u64)?;
        assert_eq!(d, 42);
        Ok(())
    }

    #[test]
    fn fused_equals_reference_for_machine_numbers() -> Result<(), anyhow::Error> {
        let reference = 2.0f64 + 3.0 * 4.0;
        assert_eq!(add_mul(&2.0f64, &3.0f64, &4.0f64)?, reference);
        Ok(())
    }

    #[test]
    fn in_place_returns_the_value_for_copy_types() -> Result<(), anyhow::Error> {
        let x = 9i128;
        assert_eq!(operate_in_place(Add, x, &1i128)?, 10);
        Ok(())
    }
}
