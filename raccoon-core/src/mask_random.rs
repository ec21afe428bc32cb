//! LFSR-127 masking noise generator.
//!
//! This is the non-cryptographic share-randomness source: primitive
//! polynomial x^127 + x^64 + 1, advanced 64 bits per step. It must stay
//! strictly separate from the cryptographic RNG that produces seeds and
//! sigmas; mixing the two would break the independence assumption of the
//! masking argument.

use crate::polynomial::{Poly, RACC_N};
use crate::zq::{RACC_Q, RACC_Q_BITS};

const MRG_INIT: u128 = 0x0F1E2D3C4B5A69788796A5B4C3D2E1F0;
const MRG_MASK: u128 = (1 << 127) - 1;

pub struct MaskRandom {
    s: u128,
}

impl MaskRandom {
    /// Starts from the fixed initialization constant.
    pub fn new() -> Self {
        MaskRandom { s: MRG_INIT }
    }

    /// XORs up to 16 seed bytes into the low 128 bits of the initial state.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut s = MRG_INIT;
        for (i, &b) in seed.iter().take(16).enumerate() {
            s ^= (b as u128) << (8 * i);
        }
        MaskRandom { s }
    }

    /// Advances the register by 64 steps.
    fn step64(&mut self) {
        let x = (self.s >> 63) ^ (self.s >> 126);
        self.s = (((self.s ^ x) << 64) ^ x) & MRG_MASK;
    }

    /// Uniform value in `[0, q)`: one step per attempt, low 49 bits,
    /// rejecting overshoots.
    pub fn uniform_q(&mut self) -> u64 {
        loop {
            self.step64();
            let z = (self.s as u64) & ((1u64 << RACC_Q_BITS) - 1);
            if z < RACC_Q {
                return z;
            }
        }
    }

    /// A polynomial of n uniform mod-q coefficients.
    pub fn random_poly(&mut self) -> Poly {
        Poly::from_coeffs((0..RACC_N).map(|_| self.uniform_q()).collect())
    }
}

impl Default for MaskRandom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfsr_known_answer() {
        // matches the generator's hardware testbench values
        let expected = [
            0x05A7896B4D2F1u64,
            0x14BC078F169E6,
            0x168B1A47A1FC9,
            0x046E3B916EC5F,
            0x05CA43AD9E72D,
            0x0348F079E16E5,
        ];
        let mut mrg = MaskRandom::new();
        for &e in &expected {
            assert_eq!(mrg.uniform_q(), e);
        }
    }

    #[test]
    fn test_seed_changes_stream() {
        // a low-byte seed only reaches the output once the register rotates,
        // so compare the second draws
        let mut a = MaskRandom::new();
        let mut b = MaskRandom::from_seed(&[1, 2, 3]);
        assert_eq!(a.uniform_q(), b.uniform_q());
        assert_ne!(a.uniform_q(), b.uniform_q());
        // a full-width seed diverges immediately
        let seed: Vec<u8> = (0..16).collect();
        assert_ne!(
            MaskRandom::from_seed(&seed).uniform_q(),
            MaskRandom::new().uniform_q()
        );
        // empty seed is the default state
        let mut c = MaskRandom::from_seed(&[]);
        let mut d = MaskRandom::new();
        assert_eq!(c.uniform_q(), d.uniform_q());
    }

    #[test]
    fn test_random_poly_in_range() {
        let p = MaskRandom::new().random_poly();
        assert!(p.c.iter().all(|&x| x < RACC_Q));
    }
}
