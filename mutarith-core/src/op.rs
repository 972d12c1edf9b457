//! The closed set of operations the engine understands.
//!
//! Operations are zero-sized marker types passed by value to the engine entry
//! points, so a call site reads `operate(Add, &x, &y)`. The set is sealed: the
//! engine plans allocation from the operation/type pair alone, and an open set
//! would reintroduce the "guess a fallback result type" failure mode.
//!
//! `add_mul`/`sub_mul` are first-class operations, not a `mul` followed by an
//! `add`; fusing them is what lets an accumulation step reuse scratch storage
//! instead of allocating an intermediate product.
//!
//! The `zero` operation has no marker; it is the [`crate::zero::Zeroable`]
//! trait, since it is unary and its result type is known statically.

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for the closed operation set.
pub trait Operation: sealed::Sealed + Copy + 'static {
    /// Human-readable name, used in diagnostics.
    const NAME: &'static str;
}

/// Operations applied position-by-position over containers of equal shape.
pub trait ElementwiseOperation: Operation {}

/// The fused accumulation family, `target ± b * c`.
pub trait FusedOperation: Operation {
    /// `true` for `add_mul`, `false` for `sub_mul`.
    const ACCUMULATE_ADD: bool;
}

macro_rules! operation {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;
        impl sealed::Sealed for $name {}
        impl Operation for $name {
            const NAME: &'static str = $label;
        }
    };
}

operation!(
    /// `lhs + rhs`.
    Add,
    "add"
);
operation!(
    /// `lhs - rhs`.
    Sub,
    "sub"
);
operation!(
    /// `lhs * rhs`: container product, or scalar scaling when `rhs` is a
    /// uniform scalar.
    Mul,
    "mul"
);
operation!(
    /// Fused reduction of two equal-length sequences, `Σ lhs[i] * rhs[i]`.
    /// For scalars it degenerates to `mul`.
    Dot,
    "dot"
);
operation!(
    /// `target + b * c`, without materializing `b * c` as a fresh value.
    AddMul,
    "add_mul"
);
operation!(
    /// `target - b * c`, without materializing `b * c` as a fresh value.
    SubMul,
    "sub_mul"
);

impl ElementwiseOperation for Add {}
impl ElementwiseOperation for Sub {}

impl FusedOperation for AddMul {
    const ACCUMULATE_ADD: bool = true;
}
impl FusedOperation for SubMul {
    const ACCUMULATE_ADD: bool = false;
}
