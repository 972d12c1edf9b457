//! Canonical structural equality.
//!
//! `canonical_eq` compares abstract values, disregarding representation
//! differences that do not change what is represented: container crates
//! unwrap transposition wrappers and treat explicitly stored sparse zeros as
//! absent, recursing into elements with the same canonicalization. Term
//! reordering inside an adapter's own value type is that adapter's
//! canonicalization responsibility, not this trait's.

/// Structural equality up to representation.
pub trait CanonicalEq<Rhs = Self> {
    /// `true` when `self` and `rhs` represent the same abstract value.
    fn canonical_eq(&self, rhs: &Rhs) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_canonical_eq_is_plain_equality() {
        assert!(3i64.canonical_eq(&3i64));
        assert!(!3i64.canonical_eq(&4i64));
        assert!(1.5f64.canonical_eq(&1.5f64));
    }
}
