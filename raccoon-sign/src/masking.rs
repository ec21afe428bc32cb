//! Masked polynomial arithmetic: d-share additive encodings, zero-encoding,
//! refresh, decoding and the repeated-noise gadget.
//!
//! A masked value is only meaningful as the mod-q sum of its shares; no
//! share ever crosses the crate boundary on its own. Every mix of two masked
//! objects is preceded by a refresh, and share buffers are wiped on drop.

use rand::RngCore;
use zeroize::Zeroize;

use raccoon_core::mask_random::MaskRandom;
use raccoon_core::ntt::{intt, mul_ntt, mul_mat_vec_ntt, ntt};
use raccoon_core::polynomial::Poly;
use raccoon_core::sampling::xof_sample_u;

use crate::params::ParamSet;

/// One ring element split into d additive shares.
pub struct MaskedPoly {
    shares: Vec<Poly>,
}

impl MaskedPoly {
    /// All-zero encoding with d shares.
    pub fn zero(d: usize) -> Self {
        MaskedPoly {
            shares: (0..d).map(|_| Poly::zero()).collect(),
        }
    }

    /// ZeroEncoding: d shares summing to zero, built by iterative pairwise
    /// splitting with fresh masking noise at every level.
    pub fn zero_encoding(d: usize, mrg: &mut MaskRandom) -> Self {
        let mut z = Self::zero(d);
        let mut step = 1;
        while step < d {
            let mut j = 0;
            while j < d {
                for k in j..j + step {
                    let r = mrg.random_poly();
                    z.shares[k] = &z.shares[k] + &r;
                    z.shares[k + step] = &z.shares[k + step] - &r;
                }
                j += 2 * step;
            }
            step <<= 1;
        }
        z
    }

    /// Re-randomizes the shares without changing the decoded value.
    pub fn refresh(&mut self, mrg: &mut MaskRandom) {
        let z = Self::zero_encoding(self.shares.len(), mrg);
        for (s, zi) in self.shares.iter_mut().zip(z.shares.iter()) {
            *s = &*s + zi;
        }
    }

    /// Collapses the shares into the encoded polynomial.
    pub fn decode(&self) -> Poly {
        let mut r = self.shares[0].clone();
        for s in &self.shares[1..] {
            r = &r + s;
        }
        r
    }

    pub fn d(&self) -> usize {
        self.shares.len()
    }

    pub(crate) fn share(&self, j: usize) -> &Poly {
        &self.shares[j]
    }

    pub(crate) fn from_shares(shares: Vec<Poly>) -> Self {
        MaskedPoly { shares }
    }

    fn map(&self, f: impl Fn(&Poly) -> Poly) -> Self {
        MaskedPoly {
            shares: self.shares.iter().map(f).collect(),
        }
    }
}

impl Drop for MaskedPoly {
    fn drop(&mut self) {
        for s in &mut self.shares {
            s.c.zeroize();
        }
    }
}

/// A vector of masked ring elements (the masked s, r, t, w, z vectors).
pub struct MaskedVec {
    rows: Vec<MaskedPoly>,
}

impl MaskedVec {
    /// `rows` independent zero encodings.
    pub fn zero_encodings(rows: usize, d: usize, mrg: &mut MaskRandom) -> Self {
        MaskedVec {
            rows: (0..rows).map(|_| MaskedPoly::zero_encoding(d, mrg)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn row(&self, i: usize) -> &MaskedPoly {
        &self.rows[i]
    }

    pub(crate) fn from_rows(rows: Vec<MaskedPoly>) -> Self {
        MaskedVec { rows }
    }

    /// AddRepNoise: adds `rep` rounds of width-u noise to every share, with
    /// a fresh XOF key per share and a refresh after every round. The inner
    /// refresh prevents pairing any single noise share with secret shares in
    /// a later probe.
    pub fn add_rep_noise(
        &mut self,
        par: &ParamSet,
        u: u32,
        rng: &mut impl RngCore,
        mrg: &mut MaskRandom,
    ) {
        let d = par.d;
        let mut sigma = vec![0u8; par.sec];
        for i in 0..self.rows.len() {
            for i_rep in 0..par.rep {
                for j in 0..d {
                    rng.fill_bytes(&mut sigma);
                    let mut m = Vec::with_capacity(8 + sigma.len());
                    m.extend_from_slice(&[b'u', i_rep as u8, i as u8, j as u8, 0, 0, 0, 0]);
                    m.extend_from_slice(&sigma);
                    let r = xof_sample_u(&m, u);
                    self.rows[i].shares[j] = &self.rows[i].shares[j] + &r;
                }
                self.rows[i].refresh(mrg);
            }
        }
        sigma.zeroize();
    }

    /// Refreshes every row.
    pub fn refresh(&mut self, mrg: &mut MaskRandom) {
        for row in &mut self.rows {
            row.refresh(mrg);
        }
    }

    /// Decodes every row.
    pub fn decode_rows(&self) -> Vec<Poly> {
        self.rows.iter().map(MaskedPoly::decode).collect()
    }

    /// Transforms every share to the NTT domain.
    pub fn ntt(&self) -> Self {
        MaskedVec {
            rows: self.rows.iter().map(|r| r.map(ntt)).collect(),
        }
    }

    /// Transforms every share back to the coefficient domain.
    pub fn intt(&self) -> Self {
        MaskedVec {
            rows: self.rows.iter().map(|r| r.map(intt)).collect(),
        }
    }
}

/// Applies an NTT-domain matrix to every share column independently:
/// the masked counterpart of `mul_mat_vec_ntt`.
pub fn mul_mat_mvec_ntt(a: &[Vec<Poly>], mv: &MaskedVec) -> MaskedVec {
    let k = a.len();
    let d = mv.rows[0].d();
    let mut out: Vec<Vec<Poly>> = (0..k).map(|_| Vec::with_capacity(d)).collect();
    for j in 0..d {
        let col: Vec<Poly> = mv.rows.iter().map(|r| r.shares[j].clone()).collect();
        let rj = mul_mat_vec_ntt(a, &col);
        for (i, p) in rj.into_iter().enumerate() {
            out[i].push(p);
        }
    }
    MaskedVec {
        rows: out.into_iter().map(|shares| MaskedPoly { shares }).collect(),
    }
}

/// Share-wise `z = c * s + r` in the NTT domain.
pub fn mul_add_ntt(c_ntt: &Poly, s: &MaskedVec, r: &MaskedVec) -> MaskedVec {
    let rows = s
        .rows
        .iter()
        .zip(r.rows.iter())
        .map(|(si, ri)| MaskedPoly {
            shares: si
                .shares
                .iter()
                .zip(ri.shares.iter())
                .map(|(sj, rj)| &mul_ntt(c_ntt, sj) + rj)
                .collect(),
        })
        .collect();
    MaskedVec { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::raccoon_128_8;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_zero_encoding_decodes_to_zero() {
        let mut mrg = MaskRandom::new();
        for d in [1usize, 2, 4, 8, 32] {
            let z = MaskedPoly::zero_encoding(d, &mut mrg);
            assert_eq!(z.decode(), Poly::zero(), "d = {}", d);
        }
    }

    #[test]
    fn test_refresh_preserves_decoded_value() {
        let mut mrg = MaskRandom::from_seed(b"refresh test");
        let mut m = MaskedPoly::zero_encoding(8, &mut mrg);
        m.shares[0] = &m.shares[0] + &mrg.random_poly();
        let before = m.decode();
        let shares_before: Vec<Poly> = m.shares.to_vec();
        m.refresh(&mut mrg);
        assert_eq!(m.decode(), before);
        assert_ne!(m.shares, shares_before);
    }

    #[test]
    fn test_add_rep_noise_is_refreshed_noise() {
        // decoded value changes, but stays a valid mod-q polynomial and the
        // gadget is deterministic given both randomness sources
        let par = raccoon_128_8();
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let mut mrg = MaskRandom::from_seed(b"noise");
        let mut v = MaskedVec::zero_encodings(par.ell, par.d, &mut mrg);
        v.add_rep_noise(&par, par.ut, &mut rng, &mut mrg);
        let dec = v.decode_rows();

        let mut rng2 = ChaCha20Rng::from_seed([1u8; 32]);
        let mut mrg2 = MaskRandom::from_seed(b"noise");
        let mut v2 = MaskedVec::zero_encodings(par.ell, par.d, &mut mrg2);
        v2.add_rep_noise(&par, par.ut, &mut rng2, &mut mrg2);
        assert_eq!(dec, v2.decode_rows());
        assert!(dec.iter().any(|p| p != &Poly::zero()));
    }

    #[test]
    fn test_mul_add_ntt_matches_decoded_arithmetic() {
        let mut mrg = MaskRandom::from_seed(b"mul add");
        let d = 4;
        let mut s = MaskedVec::zero_encodings(2, d, &mut mrg);
        let mut r = MaskedVec::zero_encodings(2, d, &mut mrg);
        for i in 0..2 {
            s.rows[i].shares[0] = &s.rows[i].shares[0] + &mrg.random_poly();
            r.rows[i].shares[1] = &r.rows[i].shares[1] + &mrg.random_poly();
        }
        let c = mrg.random_poly();
        let z = mul_add_ntt(&c, &s, &r);
        for i in 0..2 {
            let expect = &mul_ntt(&c, &s.rows[i].decode()) + &r.rows[i].decode();
            assert_eq!(z.rows[i].decode(), expect);
        }
    }

    #[test]
    fn test_masked_matrix_product_commutes_with_decode() {
        let mut mrg = MaskRandom::from_seed(b"matrix");
        let d = 2;
        let a: Vec<Vec<Poly>> = (0..2)
            .map(|_| (0..3).map(|_| mrg.random_poly()).collect())
            .collect();
        let mut mv = MaskedVec::zero_encodings(3, d, &mut mrg);
        for i in 0..3 {
            mv.rows[i].shares[0] = &mv.rows[i].shares[0] + &mrg.random_poly();
        }
        let prod = mul_mat_mvec_ntt(&a, &mv);
        let direct = mul_mat_vec_ntt(&a, &mv.decode_rows());
        assert_eq!(prod.decode_rows(), direct);
    }
}
