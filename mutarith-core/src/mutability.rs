//! Per-type mutability capability.
//!
//! Every value participating in the protocol carries a type-level answer to
//! "may the engine overwrite values of this type in place". The engine
//! queries the tag statically when executing the in-place tier; it never
//! inspects values at runtime and never mutates a value whose type did not
//! opt in.

mod sealed {
    pub trait Sealed {}
}

/// Type-level mutability classification.
pub trait Mutability: sealed::Sealed + 'static {
    /// `true` when values of the tagged type may serve as in-place
    /// accumulation targets.
    const IN_PLACE: bool;
}

/// Tag for values supporting in-place element overwrite. Opt-in: a type
/// declares itself `Mutable` only if it also provides the overwrite
/// primitives ([`crate::operate::OperateAssign`],
/// [`crate::fused::FusedAssign`]) for the operations it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutable;

/// Tag for values whose operations must produce a fresh result. The safe
/// default; such values may still appear as right-hand operands of an
/// accumulation into a mutable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Immutable;

impl sealed::Sealed for Mutable {}
impl Mutability for Mutable {
    const IN_PLACE: bool = true;
}
impl sealed::Sealed for Immutable {}
impl Mutability for Immutable {
    const IN_PLACE: bool = false;
}

/// Entry ticket to the protocol.
///
/// Implementors declare their mutability class and provide a structural copy
/// cheap enough to hand to the in-place entry points: the copy must deep-copy
/// every part that could be aliased if shared, and nothing else.
pub trait Value: Clone {
    /// The mutability class of this type.
    type Mutability: Mutability;

    /// Structural copy safe to use as an in-place accumulation target.
    fn mutable_copy(&self) -> Self {
        self.clone()
    }
}

/// The `mutability(Type)` query: does `T` permit in-place accumulation?
pub fn is_in_place<T: Value>() -> bool {
    T::Mutability::IN_PLACE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Frozen(u32);
    impl Value for Frozen {
        type Mutability = Immutable;
    }

    #[test]
    fn default_is_immutable_and_copy_is_deep() {
        assert!(!is_in_place::<Frozen>());
        let a = Frozen(7);
        let b = a.mutable_copy();
        assert_eq!(a, b);
    }

    #[test]
    fn primitive_numbers_are_immutable() {
        assert!(!is_in_place::<i64>());
        assert!(!is_in_place::<f64>());
    }
}
