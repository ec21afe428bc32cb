//! Keypair generation, the rejection-sampled signing loop, and verification.
//!
//! These operate on the decoded-key / in-memory representations; the byte
//! level lives in `codec`.

use rand::RngCore;
use sha3::digest::XofReader;
use zeroize::Zeroize;

use raccoon_core::hashing::Shake256Xof;
use raccoon_core::mask_random::MaskRandom;
use raccoon_core::ntt::{intt, mul_ntt, mul_mat_vec_ntt, mat_ntt, ntt, vec_intt, vec_ntt};
use raccoon_core::polynomial::Poly;
use raccoon_core::sampling::{chal_poly, expand_a};

use crate::bounds::check_bounds;
use crate::masking::{mul_add_ntt, mul_mat_mvec_ntt, MaskedVec};
use crate::params::ParamSet;

/// Verification key: the A-seed and the rounded commitment vector t.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyKey {
    pub seed: Vec<u8>,
    pub t: Vec<Poly>,
}

/// Masked signing key. The secret vector s is held as d NTT-domain shares
/// and is re-randomized in place on every use; share buffers are wiped on
/// drop.
pub struct SigningKey {
    pub seed: Vec<u8>,
    pub t: Vec<Poly>,
    pub(crate) s: MaskedVec,
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// A decoded signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub c_hash: Vec<u8>,
    pub h: Vec<Vec<i64>>,
    pub z: Vec<Poly>,
}

/// Generates a masked keypair.
pub fn keygen(
    par: &ParamSet,
    rng: &mut impl RngCore,
    mrg: &mut MaskRandom,
) -> (SigningKey, VerifyKey) {
    // seed <- {0,1}^kappa, A := ExpandA(seed)
    let mut seed = vec![0u8; par.as_sz];
    rng.fill_bytes(&mut seed);
    let a_ntt = mat_ntt(&expand_a(&seed, par.k, par.ell));

    // [[s]] <- ell zero encodings + repeated noise
    let mut ms = MaskedVec::zero_encodings(par.ell, par.d, mrg);
    ms.add_rep_noise(par, par.ut, rng, mrg);

    // [[t]] := A * [[s]] + repeated noise
    let ms_ntt = ms.ntt();
    let mut mt = mul_mat_mvec_ntt(&a_ntt, &ms_ntt).intt();
    mt.add_rep_noise(par, par.ut, rng, mrg);

    // t := round( Decode([[t]]) )
    let qt = par.qt();
    let t: Vec<Poly> = mt
        .decode_rows()
        .iter()
        .map(|ti| ti.rshift_round(par.nut, qt))
        .collect();

    (
        SigningKey {
            seed: seed.clone(),
            t: t.clone(),
            s: ms_ntt,
        },
        VerifyKey { seed, t },
    )
}

/// Signs a message commitment `mu` (see `codec::buff_mu`). Restarts with
/// fresh commitment noise until the bounds check accepts; each iteration
/// succeeds with constant probability, so the loop terminates in expected
/// O(1) rounds.
pub fn sign_mu(
    par: &ParamSet,
    msk: &mut SigningKey,
    mu: &[u8],
    rng: &mut impl RngCore,
    mrg: &mut MaskRandom,
) -> Signature {
    let a_ntt = mat_ntt(&expand_a(&msk.seed, par.k, par.ell));
    let qw = par.qw();

    loop {
        // [[r]] <- ell zero encodings + commitment noise
        let mut mr = MaskedVec::zero_encodings(par.ell, par.d, mrg);
        mr.add_rep_noise(par, par.uw, rng, mrg);
        let mut mr_ntt = mr.ntt();

        // [[w]] := A * [[r]] + noise; w := round( Decode([[w]]) )
        let mut mw = mul_mat_mvec_ntt(&a_ntt, &mr_ntt).intt();
        mw.add_rep_noise(par, par.uw, rng, mrg);
        let w: Vec<Poly> = mw
            .decode_rows()
            .iter()
            .map(|wi| wi.rshift_round(par.nuw, qw))
            .collect();

        // challenge
        let c_hash = chal_hash(par, mu, &w);
        let c_ntt = ntt(&chal_poly(&c_hash, par.w));

        // refresh both masked operands before mixing them
        msk.s.refresh(mrg);
        mr_ntt.refresh(mrg);

        // [[z]] := c * [[s]] + [[r]], refreshed, then decoded
        let mut mz_ntt = mul_add_ntt(&c_ntt, &msk.s, &mr_ntt);
        mz_ntt.refresh(mrg);
        let z_ntt = mz_ntt.decode_rows();

        // y := A*z - 2^nut * c * t
        let mut y = mul_mat_vec_ntt(&a_ntt, &z_ntt);
        for i in 0..par.k {
            let tp = ntt(&msk.t[i].lshift(par.nut));
            y[i] = intt(&(&y[i] - &mul_ntt(&c_ntt, &tp)));
        }

        // h := center( w - round(y) )
        let h: Vec<Vec<i64>> = (0..par.k)
            .map(|i| {
                let yr = y[i].rshift_round(par.nuw, qw);
                w[i].sub_mod(&yr, qw).center(qw)
            })
            .collect();

        let z = vec_intt(&z_ntt);
        if check_bounds(par, &h, &z) {
            return Signature { c_hash, h, z };
        }
    }
}

/// Verifies a signature over a message commitment `mu`.
pub fn verify_mu(par: &ParamSet, vk: &VerifyKey, mu: &[u8], sig: &Signature) -> bool {
    verify_mu_inner(par, vk, mu, sig).is_ok()
}

fn verify_mu_inner(
    par: &ParamSet,
    vk: &VerifyKey,
    mu: &[u8],
    sig: &Signature,
) -> Result<(), crate::RaccError> {
    if !check_bounds(par, &sig.h, &sig.z) {
        return Err(crate::RaccError::BoundsFail);
    }

    let a_ntt = mat_ntt(&expand_a(&vk.seed, par.k, par.ell));
    let c_ntt = ntt(&chal_poly(&sig.c_hash, par.w));

    // y := A*z - 2^nut * c * t, then w' := round(y) + h
    let z_ntt = vec_ntt(&sig.z);
    let y = mul_mat_vec_ntt(&a_ntt, &z_ntt);
    let qw = par.qw();
    let w: Vec<Poly> = (0..par.k)
        .map(|i| {
            let tp = ntt(&vk.t[i].lshift(par.nut));
            let yi = intt(&(&y[i] - &mul_ntt(&c_ntt, &tp)));
            yi.rshift_round(par.nuw, qw).add_signed(&sig.h[i], qw)
        })
        .collect();

    if chal_hash(par, mu, &w) != sig.c_hash {
        return Err(crate::RaccError::BadChallenge);
    }
    Ok(())
}

/// ChalHash: binds mu and the rounded commitment w into the challenge hash,
/// header `'h' || k || padding`.
pub fn chal_hash(par: &ParamSet, mu: &[u8], w: &[Poly]) -> Vec<u8> {
    let lqw = 64 - par.qw().leading_zeros();
    let blen = ((lqw + 7) / 8) as usize;

    let mut xof = Shake256Xof::new();
    xof.absorb(&[b'h', par.k as u8, 0, 0, 0, 0, 0, 0]);
    xof.absorb(mu);
    for wi in w {
        for &x in &wi.c {
            xof.absorb(&x.to_le_bytes()[..blen]);
        }
    }

    let mut c_hash = vec![0u8; par.ch_sz];
    xof.finish().read(&mut c_hash);
    c_hash
}
