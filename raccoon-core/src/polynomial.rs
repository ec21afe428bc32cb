//! Polynomials over Z_q[x]/(x^n + 1) with n = 512.

use std::ops::{Add, Sub};

use crate::zq::{self, RACC_Q};

/// Degree of the polynomial modulus x^n + 1.
pub const RACC_N: usize = 512;

/// Base-2 logarithm of the ring dimension.
pub const RACC_LOGN: u32 = 9;

/// A length-n coefficient vector. Coefficients are representatives in
/// `[0, m)` for whichever modulus the surrounding code tracks; the ring
/// modulus q is the default for all operator impls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    pub c: Vec<u64>,
}

impl Poly {
    /// Creates the zero polynomial.
    pub fn zero() -> Self {
        Poly { c: vec![0; RACC_N] }
    }

    /// Wraps a coefficient vector; must have length n.
    pub fn from_coeffs(c: Vec<u64>) -> Self {
        assert_eq!(c.len(), RACC_N, "polynomial must have {} coefficients", RACC_N);
        Poly { c }
    }

    /// Coefficient-wise addition modulo `m`.
    pub fn add_mod(&self, other: &Poly, m: u64) -> Poly {
        let c = self
            .c
            .iter()
            .zip(other.c.iter())
            .map(|(&a, &b)| zq::add(a, b, m))
            .collect();
        Poly { c }
    }

    /// Coefficient-wise subtraction modulo `m`.
    pub fn sub_mod(&self, other: &Poly, m: u64) -> Poly {
        let c = self
            .c
            .iter()
            .zip(other.c.iter())
            .map(|(&a, &b)| zq::sub(a, b, m))
            .collect();
        Poly { c }
    }

    /// Multiplies every coefficient by `2^s` modulo q.
    pub fn lshift(&self, s: u32) -> Poly {
        let c = self
            .c
            .iter()
            .map(|&x| (((x as u128) << s) % RACC_Q as u128) as u64)
            .collect();
        Poly { c }
    }

    /// Rounding right shift: `(x + 2^{s-1}) >> s`, reduced modulo `new_mod`.
    /// Used to round from Z_q down to Z_{q >> s}.
    pub fn rshift_round(&self, s: u32, new_mod: u64) -> Poly {
        let mid = 1u64 << (s - 1);
        let c = self
            .c
            .iter()
            .map(|&x| ((x + mid) >> s) % new_mod)
            .collect();
        Poly { c }
    }

    /// Centers every coefficient of a mod-`m` polynomial into
    /// `(-m/2, m/2]`.
    pub fn center(&self, m: u64) -> Vec<i64> {
        self.c.iter().map(|&x| zq::center(x, m)).collect()
    }

    /// Adds a signed vector into a mod-`m` polynomial.
    pub fn add_signed(&self, other: &[i64], m: u64) -> Poly {
        let m_i = m as i64;
        let c = self
            .c
            .iter()
            .zip(other.iter())
            .map(|(&a, &b)| (((a as i64 + b) % m_i + m_i) % m_i) as u64)
            .collect();
        Poly { c }
    }

    /// Schoolbook negacyclic multiplication; quadratic, used as the test
    /// oracle for the NTT.
    pub fn schoolbook_mul(&self, other: &Poly) -> Poly {
        let mut r = vec![0u64; RACC_N];
        for i in 0..RACC_N {
            for j in 0..RACC_N {
                let x = zq::mul(self.c[i], other.c[j]);
                let k = i + j;
                if k < RACC_N {
                    r[k] = zq::add(r[k], x, RACC_Q);
                } else {
                    // x^n == -1 on wraparound
                    r[k - RACC_N] = zq::sub(r[k - RACC_N], x, RACC_Q);
                }
            }
        }
        Poly { c: r }
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, other: &Poly) -> Poly {
        self.add_mod(other, RACC_Q)
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, other: &Poly) -> Poly {
        self.sub_mod(other, RACC_Q)
    }
}
