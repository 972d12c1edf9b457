//! The `zero` operation: in-place reset to the additive identity.
//!
//! Zeroing is unary and its result type is known statically from the value's
//! own type, so it bypasses the promotion machinery entirely. Containers
//! implement it as an element fill, short-circuiting the general reduction
//! path. Fresh zeros come from [`num_traits::Zero`] where the type has a
//! shape-free identity (scalars); containers expose shaped `zeros`
//! constructors instead.

/// In-place reset to the additive identity.
pub trait Zeroable {
    /// Overwrites `self` with the additive identity of its type, reusing
    /// existing storage where possible.
    fn zero_out(&mut self);
}

/// Entry point form of the `zero` operation: `zero_in_place(&mut x)`.
pub fn zero_in_place<T: Zeroable>(x: &mut T) {
    x.zero_out();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_zero_in_place() {
        let mut x = 42i64;
        zero_in_place(&mut x);
        assert_eq!(x, 0);

        let mut y = 2.5f64;
        y.zero_out();
        assert_eq!(y, 0.0);
    }
}
