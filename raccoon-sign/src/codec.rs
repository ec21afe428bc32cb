//! Serialization: fixed-width bit packing for keys, the unary/stop-bit
//! signature bitstream, and the byte-level sign/open API.

use rand::RngCore;
use sha3::digest::XofReader;
use zeroize::Zeroize;

use raccoon_core::hashing::{shake256, Shake256Xof};
use raccoon_core::mask_random::MaskRandom;
use raccoon_core::polynomial::{Poly, RACC_N};
use raccoon_core::sampling::xof_sample_q;
use raccoon_core::zq::{RACC_Q, RACC_Q_BITS};

use crate::masking::{MaskedPoly, MaskedVec};
use crate::params::ParamSet;
use crate::sign::{keygen, sign_mu, verify_mu, Signature, SigningKey, VerifyKey};
use crate::RaccError;

/// Number of verbatim low bits in the z encoding.
const Z_LOW_BITS: usize = 40;

/// Packs the low `bits` bits of every element, LSB first.
pub fn encode_bits(v: &[u64], bits: u32) -> Vec<u8> {
    debug_assert!(bits <= 56);
    let mask = (1u64 << bits) - 1;
    let mut out = Vec::with_capacity((v.len() * bits as usize + 7) / 8);
    let mut acc: u64 = 0;
    let mut fill: u32 = 0;
    for &x in v {
        acc |= (x & mask) << fill;
        fill += bits;
        while fill >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            fill -= 8;
        }
    }
    if fill > 0 {
        out.push(acc as u8);
    }
    out
}

/// Unpacks `n` elements of `bits` bits each; returns the elements and the
/// number of bytes consumed.
pub fn decode_bits(b: &[u8], bits: u32, n: usize) -> Result<(Vec<u64>, usize), RaccError> {
    debug_assert!(bits <= 56);
    let mask = (1u64 << bits) - 1;
    let mut v = Vec::with_capacity(n);
    let mut acc: u64 = 0;
    let mut fill: u32 = 0;
    let mut i = 0;
    while v.len() < n {
        while fill < bits {
            let byte = *b.get(i).ok_or(RaccError::InvalidLength)?;
            acc |= (byte as u64) << fill;
            i += 1;
            fill += 8;
        }
        while fill >= bits && v.len() < n {
            v.push(acc & mask);
            acc >>= bits;
            fill -= bits;
        }
    }
    Ok((v, i))
}

struct BitWriter {
    out: Vec<u8>,
    acc: u8,
    fill: u32,
}

impl BitWriter {
    fn new(out: Vec<u8>) -> Self {
        BitWriter { out, acc: 0, fill: 0 }
    }

    fn push(&mut self, bit: u64) {
        self.acc |= (bit as u8 & 1) << self.fill;
        self.fill += 1;
        if self.fill == 8 {
            self.out.push(self.acc);
            self.acc = 0;
            self.fill = 0;
        }
    }

    fn push_ones(&mut self, count: u64) {
        for _ in 0..count {
            self.push(1);
        }
    }

    /// Pads the trailing partial byte with zero bits.
    fn finish(mut self) -> Vec<u8> {
        if self.fill > 0 {
            self.out.push(self.acc);
        }
        self.out
    }
}

struct BitReader<'a> {
    b: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(b: &'a [u8]) -> Self {
        BitReader { b, pos: 0 }
    }

    fn read(&mut self) -> Result<u64, RaccError> {
        let byte = *self.b.get(self.pos >> 3).ok_or(RaccError::InvalidLength)?;
        let bit = (byte >> (self.pos & 7)) & 1;
        self.pos += 1;
        Ok(bit as u64)
    }
}

/// Hint coefficients: `|x|` ones, a zero stop bit, and a sign bit for
/// non-zero values.
fn enc_h(bw: &mut BitWriter, h: &[i64]) {
    for &x in h {
        if x == 0 {
            bw.push(0);
        } else {
            bw.push_ones(x.unsigned_abs());
            bw.push(0);
            bw.push((x < 0) as u64);
        }
    }
}

fn dec_h(br: &mut BitReader) -> Result<Vec<i64>, RaccError> {
    let mut h = Vec::with_capacity(RACC_N);
    for _ in 0..RACC_N {
        let mut x: i64 = 0;
        while br.read()? == 1 {
            x += 1;
        }
        if x != 0 && br.read()? == 1 {
            x = -x;
        }
        h.push(x);
    }
    Ok(h)
}

/// Response coefficients: centered magnitude with `Z_LOW_BITS` verbatim low
/// bits, the high part as a run of ones, a stop bit and a sign bit.
fn enc_z(bw: &mut BitWriter, z: &Poly) {
    for &c in &z.c {
        let (mut x, sgn) = if c == 0 {
            (0u64, None)
        } else if c > RACC_Q / 2 {
            (RACC_Q - c, Some(1u64))
        } else {
            (c, Some(0u64))
        };
        for _ in 0..Z_LOW_BITS {
            bw.push(x & 1);
            x >>= 1;
        }
        bw.push_ones(x);
        bw.push(0);
        if let Some(s) = sgn {
            bw.push(s);
        }
    }
}

fn dec_z(br: &mut BitReader, par: &ParamSet) -> Result<Poly, RaccError> {
    let mut c = Vec::with_capacity(RACC_N);
    for _ in 0..RACC_N {
        let mut x: u64 = 0;
        for j in 0..Z_LOW_BITS {
            x |= br.read()? << j;
        }
        let mut hi: u64 = 0;
        while br.read()? == 1 {
            hi += 1;
        }
        x += hi << Z_LOW_BITS;
        if x > par.boo {
            // overshoot sentinel; check_bounds will reject it
            x = par.boo + 1;
        }
        if x != 0 && br.read()? == 1 {
            x = RACC_Q - x;
        }
        c.push(x % RACC_Q);
    }
    Ok(Poly::from_coeffs(c))
}

fn encode_pk_parts(par: &ParamSet, seed: &[u8], t: &[Poly]) -> Vec<u8> {
    let mut b = Vec::with_capacity(par.pk_sz);
    b.extend_from_slice(seed);
    let bits = RACC_Q_BITS - par.nut;
    for ti in t {
        b.extend_from_slice(&encode_bits(&ti.c, bits));
    }
    b
}

/// Serializes a verification key: seed, then t packed at q_bits - nut bits
/// per coefficient.
pub fn encode_pk(par: &ParamSet, vk: &VerifyKey) -> Vec<u8> {
    encode_pk_parts(par, &vk.seed, &vk.t)
}

/// Decodes a verification key; also returns `tr = SHAKE256(pk)` and the
/// number of bytes consumed.
pub fn decode_pk(par: &ParamSet, b: &[u8]) -> Result<(VerifyKey, Vec<u8>, usize), RaccError> {
    if b.len() < par.as_sz {
        return Err(RaccError::InvalidLength);
    }
    let seed = b[..par.as_sz].to_vec();
    let mut l = par.as_sz;
    let bits = RACC_Q_BITS - par.nut;
    let mut t = Vec::with_capacity(par.k);
    for _ in 0..par.k {
        let (v, used) = decode_bits(&b[l..], bits, RACC_N)?;
        t.push(Poly::from_coeffs(v));
        l += used;
    }
    let tr = shake256(&b[..l], par.tr_sz);
    Ok((VerifyKey { seed, t }, tr, l))
}

/// Serializes the masked signing key: the public key, one fresh XOF key per
/// share 1..d-1, then share 0 adjusted so that the d shares still sum to
/// the secret (in the NTT domain) and packed at full q_bits width.
pub fn encode_sk(par: &ParamSet, msk: &SigningKey, rng: &mut impl RngCore) -> Vec<u8> {
    let mut b = encode_pk_parts(par, &msk.seed, &msk.t);

    let mut s0: Vec<Poly> = (0..par.ell)
        .map(|i| msk.s.row(i).share(0).clone())
        .collect();

    for j in 1..par.d {
        let mut key = vec![0u8; par.mk_sz];
        rng.fill_bytes(&mut key);
        b.extend_from_slice(&key);
        for (i, s0i) in s0.iter_mut().enumerate() {
            let mut m = Vec::with_capacity(8 + key.len());
            m.extend_from_slice(&[b'K', i as u8, j as u8, 0, 0, 0, 0, 0]);
            m.extend_from_slice(&key);
            let r = xof_sample_q(&m);
            *s0i = &(&*s0i - &r) + msk.s.row(i).share(j);
        }
    }

    for s0i in &s0 {
        b.extend_from_slice(&encode_bits(&s0i.c, RACC_Q_BITS));
    }
    for s0i in s0.iter_mut() {
        s0i.c.zeroize();
    }
    b
}

/// Decodes a signing key; shares 1..d-1 are re-expanded from their XOF keys.
pub fn decode_sk(par: &ParamSet, b: &[u8]) -> Result<(SigningKey, Vec<u8>, usize), RaccError> {
    let (vk, tr, mut l) = decode_pk(par, b)?;

    let mut shares: Vec<Vec<Poly>> = (0..par.ell)
        .map(|_| Vec::with_capacity(par.d))
        .collect();
    for row in shares.iter_mut() {
        row.push(Poly::zero()); // share 0 placeholder
    }

    for j in 1..par.d {
        if b.len() < l + par.mk_sz {
            return Err(RaccError::InvalidLength);
        }
        let key = &b[l..l + par.mk_sz];
        l += par.mk_sz;
        for (i, row) in shares.iter_mut().enumerate() {
            let mut m = Vec::with_capacity(8 + key.len());
            m.extend_from_slice(&[b'K', i as u8, j as u8, 0, 0, 0, 0, 0]);
            m.extend_from_slice(key);
            row.push(xof_sample_q(&m));
        }
    }

    for row in shares.iter_mut() {
        let (v, used) = decode_bits(&b[l..], RACC_Q_BITS, RACC_N)?;
        row[0] = Poly::from_coeffs(v);
        l += used;
    }

    let s = MaskedVec::from_rows(shares.into_iter().map(MaskedPoly::from_shares).collect());
    Ok((
        SigningKey {
            seed: vk.seed,
            t: vk.t,
            s,
        },
        tr,
        l,
    ))
}

/// Serializes a signature without padding or length checks.
pub fn encode_sig(sig: &Signature) -> Vec<u8> {
    let mut bw = BitWriter::new(sig.c_hash.clone());
    for hi in &sig.h {
        enc_h(&mut bw, hi);
    }
    for zi in &sig.z {
        enc_z(&mut bw, zi);
    }
    bw.finish()
}

/// Deserializes a signature from a `sig_sz`-byte buffer.
pub fn decode_sig(par: &ParamSet, s: &[u8]) -> Result<Signature, RaccError> {
    if s.len() < par.ch_sz {
        return Err(RaccError::InvalidLength);
    }
    let c_hash = s[..par.ch_sz].to_vec();
    let mut br = BitReader::new(&s[par.ch_sz..]);
    let mut h = Vec::with_capacity(par.k);
    for _ in 0..par.k {
        h.push(dec_h(&mut br)?);
    }
    let mut z = Vec::with_capacity(par.ell);
    for _ in 0..par.ell {
        z.push(dec_z(&mut br, par)?);
    }
    Ok(Signature { c_hash, h, z })
}

/// BUFF binding: `mu = SHAKE256(tr || msg)` with `tr = SHAKE256(pk)`.
pub fn buff_mu(par: &ParamSet, tr: &[u8], msg: &[u8]) -> Vec<u8> {
    let mut xof = Shake256Xof::new();
    xof.absorb(tr);
    xof.absorb(msg);
    let mut mu = vec![0u8; par.mu_sz];
    xof.finish().read(&mut mu);
    mu
}

/// Key pair generation directly into bytes: `(pk, sk)`.
pub fn byte_keygen(
    par: &ParamSet,
    rng: &mut impl RngCore,
    mrg: &mut MaskRandom,
) -> (Vec<u8>, Vec<u8>) {
    let (msk, vk) = keygen(par, rng, mrg);
    (encode_pk(par, &vk), encode_sk(par, &msk, rng))
}

/// Detached signature of fixed length `sig_sz`. Short encodings are padded
/// with zero bytes; on the rare overlong encoding, all noise is discarded
/// and the message re-signed.
pub fn byte_signature(
    par: &ParamSet,
    msg: &[u8],
    sk: &[u8],
    rng: &mut impl RngCore,
    mrg: &mut MaskRandom,
) -> Result<Vec<u8>, RaccError> {
    let (mut msk, tr, _) = decode_sk(par, sk)?;
    let mu = buff_mu(par, &tr, msg);
    loop {
        let sig = sign_mu(par, &mut msk, &mu, rng, mrg);
        let mut b = encode_sig(&sig);
        if b.len() <= par.sig_sz {
            b.resize(par.sig_sz, 0);
            return Ok(b);
        }
    }
}

/// Signature envelope: `signature || message`.
pub fn byte_sign(
    par: &ParamSet,
    msg: &[u8],
    sk: &[u8],
    rng: &mut impl RngCore,
    mrg: &mut MaskRandom,
) -> Result<Vec<u8>, RaccError> {
    let mut sm = byte_signature(par, msg, sk, rng, mrg)?;
    sm.extend_from_slice(msg);
    Ok(sm)
}

/// Detached verification directly from bytes.
pub fn byte_verify(par: &ParamSet, msg: &[u8], sm: &[u8], pk: &[u8]) -> bool {
    if sm.len() < par.sig_sz {
        return false;
    }
    let Ok((vk, tr, _)) = decode_pk(par, pk) else {
        return false;
    };
    let Ok(sig) = decode_sig(par, &sm[..par.sig_sz]) else {
        return false;
    };
    let mu = buff_mu(par, &tr, msg);
    verify_mu(par, &vk, &mu, &sig)
}

/// Opens a signature envelope: returns the verification outcome and the
/// enclosed message.
pub fn byte_open(par: &ParamSet, sm: &[u8], pk: &[u8]) -> (bool, Vec<u8>) {
    let msg = if sm.len() > par.sig_sz {
        sm[par.sig_sz..].to_vec()
    } else {
        Vec::new()
    };
    (byte_verify(par, &msg, sm, pk), msg)
}
