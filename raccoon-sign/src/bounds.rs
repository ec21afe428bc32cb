//! Signature norm checks: infinity bounds on h and z plus a scaled L2 bound.

use raccoon_core::polynomial::Poly;
use raccoon_core::zq::RACC_Q;

use crate::params::ParamSet;

/// Returns true iff the hint `h` and response `z` satisfy the parameter
/// set's rejection bounds. Operates on public values only.
pub fn check_bounds(par: &ParamSet, h: &[Vec<i64>], z: &[Poly]) -> bool {
    let midq = RACC_Q / 2;

    let mut hoo: u64 = 0;
    let mut h22: u64 = 0;
    for hi in h {
        for &x in hi {
            let a = x.unsigned_abs();
            hoo = hoo.max(a);
            h22 += a * a;
        }
    }

    let mut zoo: u64 = 0;
    let mut z22: u64 = 0;
    for zi in z {
        for &x in &zi.c {
            let a = if x > midq { RACC_Q - x } else { x };
            zoo = zoo.max(a);
            let s = a >> 32;
            z22 += s * s;
        }
    }

    if hoo > par.boo_h {
        return false;
    }
    if zoo > par.boo {
        return false;
    }
    // scaled L2: 2^(2*nuw - 64) * ||h||^2 + sum (|z_i| / 2^32)^2
    (h22 << (2 * par.nuw - 64)) + z22 <= par.b22
}
