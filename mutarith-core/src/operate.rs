//! The three-tier operate engine for binary operations.
//!
//! The tiers give strictly increasing allocation control:
//!
//! - [`operate`] always returns a (possibly freshly allocated) result and
//!   never mutates an argument;
//! - [`operate_in_place`] consumes its target and mutates it when the
//!   mutability classifier permits, transparently degrading to the fresh
//!   tier otherwise; callers must use the returned value;
//! - [`operate_into`] writes into caller-owned storage of compatible shape,
//!   for reuse across many calls.
//!
//! The in-place tier dispatches on the target's [`Mutability`] tag through
//! [`InPlaceRun`]; the decision is made entirely at compile time.

use crate::mutability::{Immutable, Mutable, Value};
use crate::op::Operation;
use crate::promote::Promote;

/// Execution of one binary operation; the allocate-always tier plus the
/// write-into tier.
///
/// Implementors validate shape compatibility *before* writing anything: an
/// operation never partially mutates an output and then fails.
pub trait Operate<Op: Operation, Rhs = Self>: Promote<Op, Rhs> {
    /// Error produced by shape validation. `Infallible` for scalar-like
    /// values whose operations cannot fail.
    type Err;

    /// Returns a fresh `Op(self, rhs)`; neither operand is mutated.
    fn operate(&self, rhs: &Rhs) -> Result<Self::Res, Self::Err>;

    /// Writes `Op(lhs, rhs)` into `out`, which must already have compatible
    /// shape. The default allocates and moves; containers override it to
    /// reuse `out`'s element storage.
    fn operate_into(out: &mut Self::Res, lhs: &Self, rhs: &Rhs) -> Result<(), Self::Err> {
        *out = lhs.operate(rhs)?;
        Ok(())
    }
}

/// The element-overwrite primitive: in-place update through an exclusive
/// reference, for combinations whose promoted result type is `Self`.
///
/// Container loops drive this trait against element slots; primitive scalars
/// implement it as a plain slot overwrite even though they are classified
/// `Immutable` (overwriting the slot is storage reuse, not value mutation).
pub trait OperateAssign<Op: Operation, Rhs = Self>:
    Operate<Op, Rhs> + Promote<Op, Rhs, Res = Self>
{
    /// Replaces `self` with `Op(self, rhs)`.
    fn operate_assign(&mut self, rhs: &Rhs) -> Result<(), Self::Err>;
}

/// Tag-directed execution of the in-place tier. Implemented once per
/// mutability tag; the engine selects the impl from the target's classifier
/// and never falls back by accident.
pub trait InPlaceRun<Tag, Op: Operation, Rhs>: Operate<Op, Rhs> + Sized {
    /// Runs `Op` with `self` as the (potential) in-place target.
    fn run_in_place(self, rhs: &Rhs) -> Result<Self::Res, Self::Err>;
}

impl<Op: Operation, Rhs, T: Operate<Op, Rhs>> InPlaceRun<Immutable, Op, Rhs> for T {
    fn run_in_place(self, rhs: &Rhs) -> Result<Self::Res, Self::Err> {
        // immutable targets get a fresh value
        self.operate(rhs)
    }
}

impl<Op: Operation, Rhs, T: OperateAssign<Op, Rhs>> InPlaceRun<Mutable, Op, Rhs> for T {
    fn run_in_place(mut self, rhs: &Rhs) -> Result<Self::Res, Self::Err> {
        self.operate_assign(rhs)?;
        Ok(self)
    }
}

/// The in-place tier. Blanket-implemented for every protocol [`Value`] from
/// its mutability tag; types never implement this directly.
pub trait OperateInPlace<Op: Operation, Rhs = Self>: Operate<Op, Rhs> + Sized {
    /// Consumes the target and returns `Op(target, rhs)`: either the target
    /// itself mutated in place, or a fresh value. Treat the call as an
    /// ownership hand-off: the binding passed in is gone either way.
    fn operate_in_place(self, rhs: &Rhs) -> Result<Self::Res, Self::Err>;
}

impl<Op: Operation, Rhs, T> OperateInPlace<Op, Rhs> for T
where
    T: Value + InPlaceRun<<T as Value>::Mutability, Op, Rhs>,
{
    fn operate_in_place(self, rhs: &Rhs) -> Result<Self::Res, Self::Err> {
        self.run_in_place(rhs)
    }
}

/// Allocate-always entry point: `operate(Add, &x, &y)`.
pub fn operate<Op, L, Rhs>(_op: Op, lhs: &L, rhs: &Rhs) -> Result<L::Res, L::Err>
where
    Op: Operation,
    L: Operate<Op, Rhs>,
{
    lhs.operate(rhs)
}

/// In-place entry point; consumes `lhs` and returns the result.
pub fn operate_in_place<Op, L, Rhs>(_op: Op, lhs: L, rhs: &Rhs) -> Result<L::Res, L::Err>
where
    Op: Operation,
    L: OperateInPlace<Op, Rhs>,
{
    lhs.operate_in_place(rhs)
}

/// Write-into entry point; `out` must already have compatible shape.
pub fn operate_into<Op, L, Rhs>(
    _op: Op,
    out: &mut L::Res,
    lhs: &L,
    rhs: &Rhs,
) -> Result<(), L::Err>
where
    Op: Operation,
    L: Operate<Op, Rhs>,
{
    L::operate_into(out, lhs, rhs)
}
