//! XOF-driven samplers: uniform mod-q rejection sampling, centered binary
//! noise, matrix expansion and the Fiat-Shamir challenge polynomial.

use sha3::digest::XofReader;

use crate::hashing::Shake256Xof;
use crate::polynomial::{Poly, RACC_N};
use crate::zq::{RACC_Q, RACC_Q_BITS};

/// Expands `seed_material` to n uniform coefficients in `[0, q)`.
///
/// Reads 7 little-endian bytes at a time, masks to 49 bits and rejects
/// values at or above q. The rejection branches only on XOF output.
pub fn xof_sample_q(seed_material: &[u8]) -> Poly {
    let blen = (RACC_Q_BITS as usize + 7) / 8;
    let mask = (1u64 << RACC_Q_BITS) - 1;

    let mut xof = Shake256Xof::new();
    xof.absorb(seed_material);
    let mut reader = xof.finish();

    let mut c = Vec::with_capacity(RACC_N);
    let mut buf = [0u8; 8];
    while c.len() < RACC_N {
        reader.read(&mut buf[..blen]);
        let x = u64::from_le_bytes(buf) & mask;
        if x < RACC_Q {
            c.push(x);
        }
    }
    Poly { c }
}

/// ExpandA: derives the public k x ell matrix from a seed, one XOF per cell
/// with header `'A' || row || col || padding`.
pub fn expand_a(seed: &[u8], k: usize, ell: usize) -> Vec<Vec<Poly>> {
    (0..k)
        .map(|i| {
            (0..ell)
                .map(|j| {
                    let mut m = Vec::with_capacity(8 + seed.len());
                    m.extend_from_slice(&[b'A', i as u8, j as u8, 0, 0, 0, 0, 0]);
                    m.extend_from_slice(seed);
                    xof_sample_q(&m)
                })
                .collect()
        })
        .collect()
}

/// Samples a centered uniform polynomial of width `2^u`: each coefficient is
/// a two's-complement value in `[-2^{u-1}, 2^{u-1})`, reduced mod q. No
/// rejection is involved.
pub fn xof_sample_u(seed_material: &[u8], u: u32) -> Poly {
    let blen = (u as usize + 7) / 8;
    let mask = (1u64 << u) - 1;
    let mid = 1u64 << (u - 1);

    let mut xof = Shake256Xof::new();
    xof.absorb(seed_material);
    let mut reader = xof.finish();

    let mut c = Vec::with_capacity(RACC_N);
    let mut buf = [0u8; 8];
    for _ in 0..RACC_N {
        reader.read(&mut buf[..blen]);
        // flip the sign bit, then subtract the offset mod q
        let x = (u64::from_le_bytes(buf) & mask) ^ mid;
        c.push(if x >= mid { x - mid } else { RACC_Q - (mid - x) });
    }
    Poly { c }
}

/// ChalPoly: derives a ternary polynomial of Hamming weight `w` from the
/// challenge hash, header `'c' || w || padding`.
pub fn chal_poly(c_hash: &[u8], w: usize) -> Poly {
    let mask_n = RACC_N - 1;
    // log2(n) bits for the position plus one sign bit
    let blen = (mask_n.ilog2() as usize + 1 + 1 + 7) / 8;

    let mut xof = Shake256Xof::new();
    xof.absorb(&[b'c', w as u8, 0, 0, 0, 0, 0, 0]);
    xof.absorb(c_hash);
    let mut reader = xof.finish();

    let mut c = vec![0u64; RACC_N];
    let mut wt = 0;
    let mut buf = [0u8; 8];
    while wt < w {
        reader.read(&mut buf[..blen]);
        let x = u64::from_le_bytes(buf);
        let sign = x & 1;
        let idx = ((x >> 1) as usize) & mask_n;
        if c[idx] == 0 {
            c[idx] = if sign == 1 { 1 } else { RACC_Q - 1 };
            wt += 1;
        }
    }
    Poly { c }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zq;

    #[test]
    fn test_expand_a_known_values() {
        let seed: Vec<u8> = (0..16).collect();
        let a = expand_a(&seed, 5, 4);
        assert_eq!(a.len(), 5);
        assert_eq!(a[0].len(), 4);
        assert_eq!(
            &a[0][0].c[..4],
            &[444655023877294, 269828300105754, 62200532690252, 527227434020902]
        );
        assert_eq!(&a[4][3].c[..2], &[483140971879569, 507957304233090]);
    }

    #[test]
    fn test_expand_a_deterministic() {
        let seed = [0xAAu8; 16];
        let a = expand_a(&seed, 2, 2);
        let b = expand_a(&seed, 2, 2);
        assert_eq!(a, b);
        // different cells differ
        assert_ne!(a[0][0], a[0][1]);
    }

    #[test]
    fn test_sample_u_known_values() {
        let mut m = vec![b'u', 1, 2, 3, 0, 0, 0, 0];
        m.extend(0u8..16);
        let r = xof_sample_u(&m, 40);
        assert_eq!(
            &r.c[..4],
            &[1997620946, 549367839163128, 549424320667808, 549309499071517]
        );
    }

    #[test]
    fn test_sample_u_range() {
        let r = xof_sample_u(b"range check", 6);
        let bound = 1i64 << 5;
        for &x in &r.c {
            let v = zq::center(x, RACC_Q);
            assert!(v >= -bound && v < bound, "out of range: {}", v);
        }
    }

    #[test]
    fn test_chal_poly_known_values() {
        let c_hash: Vec<u8> = (0..32).collect();
        let cp = chal_poly(&c_hash, 19);
        let nz: Vec<(usize, u64)> = cp
            .c
            .iter()
            .enumerate()
            .filter(|(_, &x)| x != 0)
            .map(|(i, &x)| (i, x))
            .collect();
        assert_eq!(nz.len(), 19);
        let minus = RACC_Q - 1;
        assert_eq!(
            &nz[..5],
            &[(8, minus), (9, minus), (26, 1), (39, minus), (93, 1)]
        );
    }

    #[test]
    fn test_chal_poly_weight_and_ternary() {
        let cp = chal_poly(b"some challenge hash material", 44);
        let nonzero = cp.c.iter().filter(|&&x| x != 0).count();
        assert_eq!(nonzero, 44);
        for &x in &cp.c {
            assert!(x == 0 || x == 1 || x == RACC_Q - 1);
        }
    }
}
