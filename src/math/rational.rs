use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Solves the square linear system `a * x = b` exactly over the rationals
/// via Gaussian elimination with partial pivoting. Used for the equilibrium
/// placement of §4.6 step 2, which needs exact (not floating) arithmetic
/// since the result must be byte-reproducible.
///
/// Returns `None` if `a` is singular (never expected for the pinned
/// Laplacian system of a connected graph).
pub fn solve_exact(mut a: Vec<Vec<BigRational>>, mut b: Vec<BigRational>) -> Option<Vec<BigRational>> {
    let n = a.len();
    if n == 0 {
        return Some(Vec::new());
    }

    for col in 0..n {
        let pivot_row = (col..n).max_by_key(|&r| if a[r][col].is_zero() { 0 } else { 1 })?;
        if a[pivot_row][col].is_zero() {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col].clone();
        for k in col..n {
            a[col][k] = a[col][k].clone() / pivot.clone();
        }
        b[col] = b[col].clone() / pivot;

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col].clone();
            if factor.is_zero() {
                continue;
            }
            for k in col..n {
                let sub = a[col][k].clone() * factor.clone();
                a[row][k] = a[row][k].clone() - sub;
            }
            let sub_b = b[col].clone() * factor;
            b[row] = b[row].clone() - sub_b;
        }
    }

    Some(b)
}

pub fn from_i64(n: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::one())
}

pub fn zero() -> BigRational {
    BigRational::zero()
}
