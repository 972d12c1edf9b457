//! Containers compose over any protocol element type: allocation-heavy
//! bignums and nested containers both flow through the same impls.

use mutarith_bigint::Big;
use mutarith_containers::{ArithError, DenseMatrix, DenseVector};
use mutarith_core::prelude::*;
use num_bigint::BigInt;

fn bigvec(elems: &[i64]) -> DenseVector<Big> {
    DenseVector::from_vec(elems.iter().copied().map(Big::from).collect())
}

#[test]
fn one_scratch_bigint_drives_a_whole_accumulation_loop() -> Result<(), anyhow::Error> {
    let step = bigvec(&[1, 2]);
    let mut target = DenseVector::<Big>::zeros(2);
    let mut buf = buffer_for::<AddMul, DenseVector<Big>, DenseVector<Big>, Big>(AddMul);
    for k in 1..=3i64 {
        buffered_operate(AddMul, &mut buf, &mut target, &step, &Big::from(k))?;
    }
    assert!(target.canonical_eq(&bigvec(&[6, 12])));
    Ok(())
}

#[test]
fn bignum_matrix_product() -> Result<(), anyhow::Error> {
    let of = |v: i64| Big::from(BigInt::from(v));
    let a = DenseMatrix::from_rows(vec![vec![of(1), of(2)], vec![of(3), of(4)]])?;
    let b = DenseMatrix::from_rows(vec![vec![of(5), of(6)], vec![of(7), of(8)]])?;
    let c = operate(Mul, &a, &b)?;
    let expected =
        DenseMatrix::from_rows(vec![vec![of(19), of(22)], vec![of(43), of(50)]])?;
    assert!(c.canonical_eq(&expected));
    Ok(())
}

#[test]
fn nested_vectors_recurse_elementwise() -> Result<(), anyhow::Error> {
    let nest = |rows: &[&[i64]]| {
        DenseVector::from_vec(rows.iter().map(|r| DenseVector::from_vec(r.to_vec())).collect())
    };
    let a = nest(&[&[1, 2], &[3, 4]]);
    let b = nest(&[&[10, 20], &[30, 40]]);
    let sum = operate(Add, &a, &b)?;
    assert!(sum.canonical_eq(&nest(&[&[11, 22], &[33, 44]])));
    Ok(())
}

#[test]
fn inner_shape_mismatch_surfaces_from_the_nested_element() {
    let a = DenseVector::from_vec(vec![DenseVector::from_vec(vec![1i64, 2])]);
    let b = DenseVector::from_vec(vec![DenseVector::from_vec(vec![1i64, 2, 3])]);
    let err = operate(Add, &a, &b).unwrap_err();
    assert_eq!(
        err,
        ArithError::ShapeMismatch {
            lhs: vec![2],
            rhs: vec![3]
        }
    );
}
