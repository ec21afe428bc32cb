//! Deterministic AES-256-CTR DRBG matching the NIST KAT harness.
//!
//! Every `fill_bytes` call emits the requested bytes and then re-keys, so
//! the output agrees byte for byte with the `randombytes()` stream of the
//! NIST PQC test suite.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes256;
use rand::{Error, RngCore};
use zeroize::Zeroize;

pub struct KatDrbg {
    key: [u8; 32],
    ctr: [u8; 16],
}

impl KatDrbg {
    /// Initializes from a 48-byte entropy input.
    pub fn new(entropy: &[u8; 48]) -> Self {
        let mut drbg = KatDrbg {
            key: [0u8; 32],
            ctr: [0u8; 16],
        };
        let mut update = [0u8; 48];
        drbg.get_bytes(&mut update);
        for (u, e) in update.iter_mut().zip(entropy.iter()) {
            *u ^= e;
        }
        drbg.set_state(&update);
        update.zeroize();
        drbg
    }

    fn set_state(&mut self, update: &[u8; 48]) {
        self.key.copy_from_slice(&update[..32]);
        self.ctr.copy_from_slice(&update[32..]);
    }

    fn increment_ctr(&mut self) {
        for b in self.ctr.iter_mut().rev() {
            *b = b.wrapping_add(1);
            if *b != 0 {
                break;
            }
        }
    }

    fn get_bytes(&mut self, out: &mut [u8]) {
        let cipher = Aes256::new(GenericArray::from_slice(&self.key));
        let mut off = 0;
        while off < out.len() {
            self.increment_ctr();
            let mut block = GenericArray::clone_from_slice(&self.ctr);
            cipher.encrypt_block(&mut block);
            let n = (out.len() - off).min(16);
            out[off..off + n].copy_from_slice(&block[..n]);
            off += n;
        }
    }
}

impl RngCore for KatDrbg {
    fn next_u32(&mut self) -> u32 {
        let mut b = [0u8; 4];
        self.fill_bytes(&mut b);
        u32::from_le_bytes(b)
    }

    fn next_u64(&mut self) -> u64 {
        let mut b = [0u8; 8];
        self.fill_bytes(&mut b);
        u64::from_le_bytes(b)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.get_bytes(dest);
        let mut update = [0u8; 48];
        self.get_bytes(&mut update);
        self.set_state(&update);
        update.zeroize();
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl Drop for KatDrbg {
    fn drop(&mut self) {
        self.key.zeroize();
        self.ctr.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kat_entropy() -> [u8; 48] {
        let mut e = [0u8; 48];
        for (i, b) in e.iter_mut().enumerate() {
            *b = i as u8;
        }
        e
    }

    #[test]
    fn test_first_output_matches_nist_kat_seed() {
        // the "seed" field of count 0 in every official .rsp file generated
        // from entropy_input = 00 01 02 .. 2F
        let mut drbg = KatDrbg::new(&kat_entropy());
        let mut seed = [0u8; 48];
        drbg.fill_bytes(&mut seed);
        assert_eq!(
            hex::encode_upper(seed),
            "061550234D158C5EC95595FE04EF7A25767F2E24CC2BC479D09D86DC9ABCFDE7056A8C266F9EF97ED08541DBD2E1FFA1"
        );
    }

    #[test]
    fn test_stream_advances_and_reseeds() {
        let mut drbg = KatDrbg::new(&kat_entropy());
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        drbg.fill_bytes(&mut a);
        drbg.fill_bytes(&mut b);
        assert_ne!(a, b);

        // deterministic across instances
        let mut drbg2 = KatDrbg::new(&kat_entropy());
        let mut a2 = [0u8; 16];
        drbg2.fill_bytes(&mut a2);
        assert_eq!(a, a2);
    }
}
