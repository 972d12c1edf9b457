//! Container arithmetic errors.

use alloc::vec::Vec;
use core::convert::Infallible;

use thiserror::Error;

/// Errors reported by container arithmetic.
///
/// All shape validation happens before any element is written: a failed
/// operation never leaves a partially mutated operand behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithError {
    /// Operand shapes disagree for the requested operation. Shapes must
    /// match exactly; there is no implicit broadcasting.
    #[error("shape mismatch: left-hand side is {lhs:?}, right-hand side is {rhs:?}")]
    ShapeMismatch {
        /// Shape of the left-hand operand.
        lhs: Vec<usize>,
        /// Shape of the right-hand operand.
        rhs: Vec<usize>,
    },

    /// The caller-supplied output of an `operate_into` call cannot
    /// structurally hold the result.
    #[error("output shape mismatch: expected {expected:?}, found {found:?}")]
    OutputShapeMismatch {
        /// Shape the operation requires.
        expected: Vec<usize>,
        /// Shape of the supplied output.
        found: Vec<usize>,
    },

    /// Invalid construction input (ragged rows, out-of-range or duplicate
    /// sparse coordinates).
    #[error("invalid container construction: {0}")]
    Construction(&'static str),
}

impl From<Infallible> for ArithError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

pub(crate) fn check_same_shape(lhs: &[usize], rhs: &[usize]) -> Result<(), ArithError> {
    if lhs == rhs {
        Ok(())
    } else {
        Err(ArithError::ShapeMismatch {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        })
    }
}

pub(crate) fn check_output_shape(expected: &[usize], found: &[usize]) -> Result<(), ArithError> {
    if expected == found {
        Ok(())
    } else {
        Err(ArithError::OutputShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        })
    }
}
