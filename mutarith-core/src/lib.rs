//! Core crate of mutarith: the generic operate protocol.
//!
//! Heterogeneous algebraic value types (machine numbers, arbitrary-precision
//! integers, containers of such values) opt into this protocol to be combined
//! with the standard operations while minimizing intermediate allocation.
//!
//! The protocol has three pieces:
//!
//! - a per-type mutability classification ([`mutability`]),
//! - operation-aware result-type promotion ([`promote`]),
//! - a three-tier execution engine ([`operate`], [`fused`], [`zero`]) that
//!   picks the least-allocating strategy the operand mutability permits.

#![warn(missing_docs)]
#![no_std]
#[cfg(test)]
extern crate std;

pub mod op;

pub mod mutability;

pub mod promote;

pub mod operate;

pub mod fused;

pub mod zero;

pub mod canonical;

// primitive machine numbers as protocol participants
mod scalar;

pub use mutability::{Immutable, Mutability, Mutable, Value};
pub use promote::{Promote, Promoted, Uniform, UniformScalar};

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::canonical::CanonicalEq;
    pub use crate::fused::{
        add_mul, add_mul_chain, add_mul_in_place, buffer_for, buffered_operate, sub_mul,
        sub_mul_in_place, FusedAssign, FusedInPlace, FusedOperate,
    };
    pub use crate::mutability::{is_in_place, Immutable, Mutability, Mutable, Value};
    pub use crate::op::*;
    pub use crate::operate::{
        operate, operate_in_place, operate_into, Operate, OperateAssign, OperateInPlace,
    };
    pub use crate::promote::{Promote, Promoted, Uniform, UniformScalar};
    pub use crate::zero::{zero_in_place, Zeroable};
}
