//! Operation-aware result-type promotion.
//!
//! `Promote<Op, Rhs>` answers, purely at the type level, "what type must hold
//! the result of `Op` applied to `(Self, Rhs)`". The engine resolves it once
//! per call shape; no runtime value inspection is involved, so a homogeneous
//! loop plans its allocations exactly once.
//!
//! There is deliberately no fallback impl: a combination without a `Promote`
//! impl fails to compile at the call site. Guessing a generic container type
//! would silently corrupt downstream accumulation.
//!
//! Containers compose recursively: promoting an operation over
//! `Container<T>` and `Container<S>` yields the same container kind over
//! `Promoted<Op, T, S>`, and structured wrappers propagate their own kind
//! (the container crates implement this composite rule for their types).

use crate::op::{AddMul, FusedOperation, Mul, Operation, SubMul};

/// Result-type promotion for one operation/operand-type combination.
///
/// For the fused family the right-hand side is the explicit factor tuple:
/// `Promote<AddMul, (B, C)>` is the type of `self + b * c`.
///
/// # Safety
///
/// The implementor MUST ensure that `Res` is exactly the type produced at
/// runtime by the corresponding [`crate::operate::Operate`] (or
/// [`crate::fused::FusedOperate`]) implementation. The engine sizes output
/// storage and scratch buffers from `Res` alone.
pub unsafe trait Promote<Op: Operation, Rhs = Self> {
    /// The type that must hold the result.
    type Res;
}

/// Shorthand for the promoted result type of `Op(L, R)`.
pub type Promoted<Op, L, R> = <L as Promote<Op, R>>::Res;

/// Marker for scalar-like "uniform scaling" values. Multiplying a container
/// by a `UniformScalar` scales every element; the result promotes through
/// the container's element type, never through the scaling value's own type.
pub trait UniformScalar {}

/// Explicit uniform-scaling operand: `Uniform(s)` acts as `s · I`.
///
/// Containers implement `Operate<Mul, Uniform<S>>` to scale every element by
/// `s`. The wrapper keeps scaling distinct, at the type level, from the
/// container-times-container products that share the `Mul` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uniform<S>(pub S);

// Variadic multiply-accumulate chains promote by a closed recursion over an
// explicit operand tuple: `add_mul(a, b, c, d) = add_mul(a, b, c * d)`.
// Associativity of the fold is the invariant the impls below encode; any
// grouping the engine chooses must land on the same `Res`.

macro_rules! chain_promote {
    ($op:ty) => {
        unsafe impl<A, B, C, D> Promote<$op, (B, C, D)> for A
        where
            C: Promote<Mul, D>,
            A: Promote<$op, (B, Promoted<Mul, C, D>)>,
        {
            type Res = <A as Promote<$op, (B, Promoted<Mul, C, D>)>>::Res;
        }

        unsafe impl<A, B, C, D, E> Promote<$op, (B, C, D, E)> for A
        where
            D: Promote<Mul, E>,
            A: Promote<$op, (B, C, Promoted<Mul, D, E>)>,
        {
            type Res = <A as Promote<$op, (B, C, Promoted<Mul, D, E>)>>::Res;
        }
    };
}

chain_promote!(AddMul);
chain_promote!(SubMul);

/// Compile-time witness that a fused chain promotes to the same type for any
/// fold grouping. Exists for downstream tests; carries no data.
pub fn assert_chain_agrees<Op, A, B, C, D>()
where
    Op: FusedOperation,
    C: Promote<Mul, D>,
    A: Promote<Op, (B, C, D)>
        + Promote<Op, (B, Promoted<Mul, C, D>), Res = <A as Promote<Op, (B, C, D)>>::Res>,
{
}
