//! Fused multiply-accumulate (`add_mul`/`sub_mul`) and the buffer protocol.
//!
//! `a + b * c` is a single operation here, not a `mul` followed by an `add`:
//! the fused step is exactly what avoids allocating the intermediate product.
//! For element types where temporaries dominate cost (arbitrary-precision
//! integers), the buffer protocol lets one scratch value be reused across
//! every element of a container accumulation instead of allocating a fresh
//! temporary per inner-loop step.

use crate::mutability::{Immutable, Mutable, Value};
use crate::op::{AddMul, FusedOperation, Mul, SubMul};
use crate::operate::Operate;
use crate::promote::{Promote, Promoted};

/// The allocate-always tier of the fused family: fresh `self ± b * c`.
pub trait FusedOperate<Op: FusedOperation, B = Self, C = Self>: Promote<Op, (B, C)> {
    /// Error produced by shape validation; `Infallible` for scalars.
    type Err;

    /// Returns a fresh `self ± b * c`; no operand is mutated.
    fn fused(&self, b: &B, c: &C) -> Result<Self::Res, Self::Err>;
}

/// One in-place fused step, `*self ± b * c`, with scratch reuse. Only for
/// combinations whose promoted result type is `Self`: the accumulation
/// target already has the promoted element type.
pub trait FusedAssign<Op: FusedOperation, B = Self, C = Self>:
    FusedOperate<Op, B, C> + Promote<Op, (B, C), Res = Self>
{
    /// Scratch sized for one multiply-accumulate step. `()` when stack
    /// temporaries are free and buffering has no benefit.
    type Buffer;

    /// The `buffer_for` query: allocates scratch reusable across every
    /// element position of a container accumulation.
    fn make_buffer() -> Self::Buffer;

    /// One fused step without caller-provided scratch.
    fn fused_assign(&mut self, b: &B, c: &C) -> Result<(), Self::Err> {
        self.buffered_fused_assign(&mut Self::make_buffer(), b, c)
    }

    /// One fused step reusing `buf`. Must be safe to call repeatedly with
    /// the same buffer in a tight loop: every call leaves `buf` in a state
    /// the next call can use, with no leftover accumulation.
    fn buffered_fused_assign(&mut self, buf: &mut Self::Buffer, b: &B, c: &C)
        -> Result<(), Self::Err>;
}

/// Tag-directed execution of the in-place fused tier.
pub trait FusedRun<Tag, Op: FusedOperation, B, C>: FusedOperate<Op, B, C> + Sized {
    /// Runs the fused step with `self` as the (potential) in-place target.
    fn run_fused(self, b: &B, c: &C) -> Result<Self::Res, Self::Err>;
}

impl<Op: FusedOperation, B, C, T: FusedOperate<Op, B, C>> FusedRun<Immutable, Op, B, C> for T {
    fn run_fused(self, b: &B, c: &C) -> Result<Self::Res, Self::Err> {
        self.fused(b, c)
    }
}

impl<Op: FusedOperation, B, C, T: FusedAssign<Op, B, C>> FusedRun<Mutable, Op, B, C> for T {
    fn run_fused(mut self, b: &B, c: &C) -> Result<Self::Res, Self::Err> {
        self.fused_assign(b, c)?;
        Ok(self)
    }
}

/// The in-place fused tier. Blanket-implemented from the mutability tag,
/// like [`crate::operate::OperateInPlace`].
pub trait FusedInPlace<Op: FusedOperation, B = Self, C = Self>:
    FusedOperate<Op, B, C> + Sized
{
    /// Consumes the target and returns `target ± b * c`; the target is
    /// mutated in place when its type permits.
    fn fused_in_place(self, b: &B, c: &C) -> Result<Self::Res, Self::Err>;
}

impl<Op: FusedOperation, B, C, T> FusedInPlace<Op, B, C> for T
where
    T: Value + FusedRun<<T as Value>::Mutability, Op, B, C>,
{
    fn fused_in_place(self, b: &B, c: &C) -> Result<Self::Res, Self::Err> {
        self.run_fused(b, c)
    }
}

/// Fresh `a + b * c`.
pub fn add_mul<A, B, C>(a: &A, b: &B, c: &C) -> Result<A::Res, A::Err>
where
    A: FusedOperate<AddMul, B, C>,
{
    a.fused(b, c)
}

/// Fresh `a - b * c`.
pub fn sub_mul<A, B, C>(a: &A, b: &B, c: &C) -> Result<A::Res, A::Err>
where
    A: FusedOperate<SubMul, B, C>,
{
    a.fused(b, c)
}

/// Consumes `a` and returns `a + b * c`, in place when `A` permits.
pub fn add_mul_in_place<A, B, C>(a: A, b: &B, c: &C) -> Result<A::Res, A::Err>
where
    A: FusedInPlace<AddMul, B, C>,
{
    a.fused_in_place(b, c)
}

/// Consumes `a` and returns `a - b * c`, in place when `A` permits.
pub fn sub_mul_in_place<A, B, C>(a: A, b: &B, c: &C) -> Result<A::Res, A::Err>
where
    A: FusedInPlace<SubMul, B, C>,
{
    a.fused_in_place(b, c)
}

/// Allocates the scratch value for repeated fused steps on `A`. Returns
/// `()` when buffering has no benefit for the element type.
pub fn buffer_for<Op, A, B, C>(_op: Op) -> A::Buffer
where
    Op: FusedOperation,
    A: FusedAssign<Op, B, C>,
{
    A::make_buffer()
}

/// One buffered fused step against `target`, reusing `buf`.
pub fn buffered_operate<Op, A, B, C>(
    _op: Op,
    buf: &mut A::Buffer,
    target: &mut A,
    b: &B,
    c: &C,
) -> Result<(), A::Err>
where
    Op: FusedOperation,
    A: FusedAssign<Op, B, C>,
{
    target.buffered_fused_assign(buf, b, c)
}

/// Variadic chain `a + b * c * d`, reduced right-to-left so that only one
/// fused step runs against `a`. Mirrors the type-level recursion in
/// [`crate::promote`].
pub fn add_mul_chain<A, B, C, D>(a: &A, b: &B, c: &C, d: &D) -> Result<A::Res, A::Err>
where
    C: Operate<Mul, D>,
    A: FusedOperate<AddMul, B, Promoted<Mul, C, D>>,
    A::Err: From<<C as Operate<Mul, D>>::Err>,
{
    let tail = c.operate(d)?;
    a.fused(b, &tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{AddMul, SubMul};

    #[test]
    fn scalar_fused_matches_unfused() -> Result<(), anyhow::Error> {
        assert_eq!(add_mul(&1.5f64, &2.0f64, &4.0f64)?, 9.5);
        assert_eq!(sub_mul(&1.5f64, &2.0f64, &4.0f64)?, -6.5);
        Ok(())
    }

    #[test]
    fn scalar_buffer_is_unit() -> Result<(), anyhow::Error> {
        let mut buf = buffer_for::<AddMul, f64, f64, f64>(AddMul);
        let mut acc = 1.0f64;
        for k in 0..4 {
            buffered_operate(AddMul, &mut buf, &mut acc, &(k as f64), &2.0f64)?;
        }
        assert_eq!(acc, 1.0 + 2.0 * (0.0 + 1.0 + 2.0 + 3.0));
        Ok(())
    }

    #[test]
    fn in_place_tier_degrades_for_immutable_scalars() -> Result<(), anyhow::Error> {
        let a = 3i32;
        let r = add_mul_in_place(a, &4i32, &5i32)?;
        assert_eq!(r, 23);
        let r = sub_mul_in_place(r, &4i32, &5i32)?;
        assert_eq!(r, 3);
        Ok(())
    }

    #[test]
    fn chain_reduces_through_the_tail_product() -> Result<(), anyhow::Error> {
        assert_eq!(add_mul_chain(&1i64, &2i64, &3i64, &4i64)?, 25);
        Ok(())
    }

    #[test]
    fn sub_mul_is_first_class() -> Result<(), anyhow::Error> {
        // not decomposed: one fused call, one result
        let mut acc = 100u32;
        let mut buf = buffer_for::<SubMul, u32, u32, u32>(SubMul);
        buffered_operate(SubMul, &mut buf, &mut acc, &7u32, &3u32)?;
        assert_eq!(acc, 79);
        Ok(())
    }
}
