//! Raccoon parameter sets: one per (security level, masking order) pair.

use raccoon_core::polynomial::RACC_N;
use raccoon_core::zq::{RACC_Q, RACC_Q_BITS};

/// An immutable Raccoon parameter set together with its derived sizes and
/// rejection bounds.
#[derive(Debug, Clone)]
pub struct ParamSet {
    /// Display name, e.g. "Raccoon-128-8".
    pub name: String,
    /// Pre-image resistance target in bits.
    pub bitsec: usize,
    /// Number of additive masking shares (power of two).
    pub d: usize,
    /// Rows of the public matrix A.
    pub k: usize,
    /// Columns of the public matrix A.
    pub ell: usize,
    /// Hamming weight of the ternary challenge polynomial.
    pub w: usize,
    /// Low bits dropped when rounding t.
    pub nut: u32,
    /// Low bits dropped when rounding w.
    pub nuw: u32,
    /// Repetitions of the noise-add gadget per component.
    pub rep: usize,
    /// Bit width of the noise added to s and t.
    pub ut: u32,
    /// Bit width of the noise added to r and w.
    pub uw: u32,

    /// Pre-image resistance in bytes.
    pub sec: usize,
    /// Collision resistance in bytes.
    pub crh: usize,
    /// A-seed size in bytes.
    pub as_sz: usize,
    /// mu digest size.
    pub mu_sz: usize,
    /// tr = H(pk) digest size.
    pub tr_sz: usize,
    /// Challenge hash size.
    pub ch_sz: usize,
    /// Secret-key serialization key size.
    pub mk_sz: usize,

    /// Serialized public key size.
    pub pk_sz: usize,
    /// Serialized secret key size.
    pub sk_sz: usize,
    /// Fixed signature size.
    pub sig_sz: usize,

    /// Scaled L2 bound.
    pub b22: u64,
    /// Infinity bound on z.
    pub boo: u64,
    /// Infinity bound on the hint h.
    pub boo_h: u64,
}

impl ParamSet {
    fn new(
        bitsec: usize,
        d: usize,
        rep: usize,
        ut: u32,
        uw: u32,
        k: usize,
        ell: usize,
        w: usize,
    ) -> Self {
        const NUT: u32 = 42;
        const NUW: u32 = 44;

        let sec = bitsec / 8;
        let crh = 2 * sec;
        let q_bits = RACC_Q_BITS as usize;

        let pk_sz = sec + k * RACC_N * (q_bits - NUT as usize) / 8;
        let sk_sz = pk_sz + (d - 1) * sec + ell * RACC_N * q_bits / 8;
        let sig_sz = match sec {
            16 => 11524,
            24 => 14544,
            32 => 20330,
            _ => unreachable!(),
        };

        // Rejection bounds; the f64 expression order matters for exact
        // agreement with published values.
        let n = RACC_N as f64;
        let sigma = ((d * rep) as f64 / 12.0).sqrt();
        let eu_w = (1u64 << uw) as f64 * sigma;
        let eu_t = (1u64 << ut) as f64 * sigma;
        let beta2 = n
            * ((k + ell) as f64 * (eu_w * eu_w + w as f64 * (eu_t * eu_t))
                + k as f64
                    * ((1u128 << (2 * NUW)) as f64 / 6.0
                        + w as f64 * (1u128 << (2 * NUT)) as f64 / 12.0));
        let b22 = (1.2 * beta2 / (1u128 << 64) as f64) as u64;
        let boo = (6.0 * (beta2 / (RACC_N * (k + ell)) as f64).sqrt()) as u64;
        let boo_h = (boo + (1u64 << (NUW - 1))) >> NUW;

        ParamSet {
            name: format!("Raccoon-{}-{}", bitsec, d),
            bitsec,
            d,
            k,
            ell,
            w,
            nut: NUT,
            nuw: NUW,
            rep,
            ut,
            uw,
            sec,
            crh,
            as_sz: sec,
            mu_sz: crh,
            tr_sz: crh,
            ch_sz: crh,
            mk_sz: sec,
            pk_sz,
            sk_sz,
            sig_sz,
            b22,
            boo,
            boo_h,
        }
    }

    /// Modulus of the rounded t domain, q >> nut.
    pub fn qt(&self) -> u64 {
        RACC_Q >> self.nut
    }

    /// Modulus of the rounded w domain, q >> nuw.
    pub fn qw(&self) -> u64 {
        RACC_Q >> self.nuw
    }
}

pub fn raccoon_128_1() -> ParamSet {
    ParamSet::new(128, 1, 8, 6, 41, 5, 4, 19)
}

pub fn raccoon_128_2() -> ParamSet {
    ParamSet::new(128, 2, 4, 6, 41, 5, 4, 19)
}

pub fn raccoon_128_4() -> ParamSet {
    ParamSet::new(128, 4, 2, 6, 41, 5, 4, 19)
}

pub fn raccoon_128_8() -> ParamSet {
    ParamSet::new(128, 8, 4, 5, 40, 5, 4, 19)
}

pub fn raccoon_128_16() -> ParamSet {
    ParamSet::new(128, 16, 2, 5, 40, 5, 4, 19)
}

pub fn raccoon_128_32() -> ParamSet {
    ParamSet::new(128, 32, 4, 4, 39, 5, 4, 19)
}

pub fn raccoon_192_1() -> ParamSet {
    ParamSet::new(192, 1, 8, 7, 41, 7, 5, 31)
}

pub fn raccoon_192_2() -> ParamSet {
    ParamSet::new(192, 2, 4, 7, 41, 7, 5, 31)
}

pub fn raccoon_192_4() -> ParamSet {
    ParamSet::new(192, 4, 2, 7, 41, 7, 5, 31)
}

pub fn raccoon_192_8() -> ParamSet {
    ParamSet::new(192, 8, 4, 6, 40, 7, 5, 31)
}

pub fn raccoon_192_16() -> ParamSet {
    ParamSet::new(192, 16, 2, 6, 40, 7, 5, 31)
}

pub fn raccoon_192_32() -> ParamSet {
    ParamSet::new(192, 32, 4, 5, 39, 7, 5, 31)
}

pub fn raccoon_256_1() -> ParamSet {
    ParamSet::new(256, 1, 8, 6, 41, 9, 7, 44)
}

pub fn raccoon_256_2() -> ParamSet {
    ParamSet::new(256, 2, 4, 6, 41, 9, 7, 44)
}

pub fn raccoon_256_4() -> ParamSet {
    ParamSet::new(256, 4, 2, 6, 41, 9, 7, 44)
}

pub fn raccoon_256_8() -> ParamSet {
    ParamSet::new(256, 8, 4, 5, 40, 9, 7, 44)
}

pub fn raccoon_256_16() -> ParamSet {
    ParamSet::new(256, 16, 2, 5, 40, 9, 7, 44)
}

pub fn raccoon_256_32() -> ParamSet {
    ParamSet::new(256, 32, 4, 4, 39, 9, 7, 44)
}

/// All 18 parameter sets, in KAT order.
pub fn all_param_sets() -> Vec<ParamSet> {
    vec![
        raccoon_128_1(),
        raccoon_128_2(),
        raccoon_128_4(),
        raccoon_128_8(),
        raccoon_128_16(),
        raccoon_128_32(),
        raccoon_192_1(),
        raccoon_192_2(),
        raccoon_192_4(),
        raccoon_192_8(),
        raccoon_192_16(),
        raccoon_192_32(),
        raccoon_256_1(),
        raccoon_256_2(),
        raccoon_256_4(),
        raccoon_256_8(),
        raccoon_256_16(),
        raccoon_256_32(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_sizes() {
        let p = raccoon_128_1();
        assert_eq!((p.pk_sz, p.sk_sz, p.sig_sz), (2256, 14800, 11524));
        let p = raccoon_128_8();
        assert_eq!((p.pk_sz, p.sk_sz, p.sig_sz), (2256, 14912, 11524));
        let p = raccoon_192_16();
        assert_eq!((p.pk_sz, p.sk_sz, p.sig_sz), (3160, 19200, 14544));
        let p = raccoon_256_32();
        assert_eq!((p.pk_sz, p.sk_sz, p.sig_sz), (4064, 27008, 20330));
    }

    #[test]
    fn test_rejection_bounds() {
        let p = raccoon_128_8();
        assert_eq!(p.b22, 14656575897);
        assert_eq!(p.boo, 41954689765971);
        assert_eq!(p.boo_h, 2);
        let p = raccoon_192_1();
        assert_eq!(p.b22, 24964497408);
        assert_eq!(p.boo, 47419426657048);
        assert_eq!(p.boo_h, 3);
        let p = raccoon_256_4();
        assert_eq!(p.b22, 38439957299);
        assert_eq!(p.boo, 50958538642039);
        assert_eq!(p.boo_h, 3);
    }

    #[test]
    fn test_registry_names() {
        let all = all_param_sets();
        assert_eq!(all.len(), 18);
        assert_eq!(all[3].name, "Raccoon-128-8");
        for p in &all {
            assert!(p.d.is_power_of_two());
            assert_eq!(p.mu_sz, 2 * p.sec);
            assert_eq!(p.qw(), RACC_Q >> 44);
        }
    }
}
