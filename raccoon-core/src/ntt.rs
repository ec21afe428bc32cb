//! Negacyclic number-theoretic transform over Z_q, n = 512.

use std::sync::OnceLock;

use crate::polynomial::{Poly, RACC_LOGN, RACC_N};
use crate::zq::{self, RACC_Q};

/// Generator of a subgroup of order 2n = 1024 (15 generates both prime
/// fields of the composite q; reducing to the order-2n subgroup gives h).
pub const NTT_H: u64 = 358453792785495;

/// Precomputed twiddle factors, shared by all transforms.
pub struct NttTables {
    /// w[i] = h^bitrev9(i) mod q
    pub w: Vec<u64>,
    /// Inverses of `w`, for the inverse transform.
    pub w_inv: Vec<u64>,
    /// n^-1 mod q, applied at the end of the inverse transform.
    pub n_inv: u64,
}

static TABLES: OnceLock<NttTables> = OnceLock::new();

impl NttTables {
    fn new() -> Self {
        let mut w = Vec::with_capacity(RACC_N);
        for i in 0..RACC_N {
            w.push(zq::mod_pow(NTT_H, bit_reverse(i, RACC_LOGN) as u64, RACC_Q));
        }
        let w_inv = w.iter().map(|&x| zq::mod_inverse(x, RACC_Q)).collect();
        let n_inv = zq::mod_inverse(RACC_N as u64, RACC_Q);
        NttTables { w, w_inv, n_inv }
    }
}

/// Returns the process-wide twiddle tables, computing them on first use.
pub fn tables() -> &'static NttTables {
    TABLES.get_or_init(NttTables::new)
}

/// Returns `x` with its low `bits` bits in reverse order.
pub fn bit_reverse(x: usize, bits: u32) -> usize {
    let mut y = 0;
    for i in 0..bits {
        y |= ((x >> i) & 1) << (bits - 1 - i);
    }
    y
}

/// Forward transform: 9 levels of Cooley-Tukey butterflies. Returns a fresh
/// NTT-domain polynomial; the input is never modified in place.
pub fn ntt(f: &Poly) -> Poly {
    let t = tables();
    let mut v = f.c.clone();
    let mut l = RACC_N / 2;
    while l > 0 {
        let blocks = RACC_N / (2 * l);
        for b in 0..blocks {
            let z = t.w[blocks + b];
            let s = 2 * l * b;
            for j in s..s + l {
                let x = v[j];
                let y = zq::mul(z, v[j + l]);
                v[j] = zq::add(x, y, RACC_Q);
                v[j + l] = zq::sub(x, y, RACC_Q);
            }
        }
        l >>= 1;
    }
    Poly { c: v }
}

/// Inverse transform: Gentleman-Sande butterflies with inverse twiddles,
/// stages in reverse order, final scaling by n^-1.
pub fn intt(f: &Poly) -> Poly {
    let t = tables();
    let mut v = f.c.clone();
    let mut l = 1;
    while l < RACC_N {
        let blocks = RACC_N / (2 * l);
        for b in 0..blocks {
            let z = t.w_inv[blocks + b];
            let s = 2 * l * b;
            for j in s..s + l {
                let x = v[j];
                let y = v[j + l];
                v[j] = zq::add(x, y, RACC_Q);
                v[j + l] = zq::mul(z, zq::sub(x, y, RACC_Q));
            }
        }
        l <<= 1;
    }
    for x in v.iter_mut() {
        *x = zq::mul(*x, t.n_inv);
    }
    Poly { c: v }
}

/// Pointwise product of two NTT-domain polynomials.
pub fn mul_ntt(a: &Poly, b: &Poly) -> Poly {
    let c = a
        .c
        .iter()
        .zip(b.c.iter())
        .map(|(&x, &y)| zq::mul(x, y))
        .collect();
    Poly { c }
}

/// Applies `ntt` to every entry of a vector.
pub fn vec_ntt(v: &[Poly]) -> Vec<Poly> {
    v.iter().map(ntt).collect()
}

/// Applies `intt` to every entry of a vector.
pub fn vec_intt(v: &[Poly]) -> Vec<Poly> {
    v.iter().map(intt).collect()
}

/// Applies `ntt` elementwise to a matrix of polynomials.
pub fn mat_ntt(m: &[Vec<Poly>]) -> Vec<Vec<Poly>> {
    m.iter().map(|row| vec_ntt(row)).collect()
}

/// NTT-domain matrix-vector product: `r[i] = sum_j a[i][j] * v[j]`.
pub fn mul_mat_vec_ntt(a: &[Vec<Poly>], v: &[Poly]) -> Vec<Poly> {
    a.iter()
        .map(|row| {
            let mut acc = mul_ntt(&row[0], &v[0]);
            for (aij, vj) in row.iter().zip(v.iter()).skip(1) {
                acc = &acc + &mul_ntt(aij, vj);
            }
            acc
        })
        .collect()
}
