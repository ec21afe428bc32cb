use rand::rngs::OsRng;
use rand::RngCore;

use raccoon_core::hashing::shake256;
use raccoon_core::mask_random::MaskRandom;
use raccoon_sign::codec::{byte_keygen, byte_open, byte_sign};
use raccoon_sign::kat_drbg::KatDrbg;
use raccoon_sign::params::{raccoon_128_1, raccoon_128_8};

fn main() {
    println!("Masked Raccoon Signature Example");
    println!("================================");

    // Parameter set: 128-bit security with 8 masking shares
    let par = raccoon_128_8();
    println!("Parameter set: {}", par.name);
    println!(
        "k = {}, ell = {}, d = {}, rep = {}, challenge weight = {}",
        par.k, par.ell, par.d, par.rep, par.w
    );

    // Deterministic RNGs so the output is reproducible: the NIST KAT DRBG
    // for key material and the LFSR generator for masking noise
    let mut entropy = [0u8; 48];
    for (i, b) in entropy.iter_mut().enumerate() {
        *b = i as u8;
    }
    let mut rng = KatDrbg::new(&entropy);
    let mut mrg = MaskRandom::new();

    // Generate a masked keypair
    println!("\nKey generation:");
    println!("---------------");
    let (pk, sk) = byte_keygen(&par, &mut rng, &mut mrg);
    println!("pk: {} bytes, checksum {}", pk.len(), hex::encode(shake256(&pk, 8)));
    println!("sk: {} bytes, checksum {}", sk.len(), hex::encode(shake256(&sk, 8)));

    // Sign a message
    println!("\nSigning:");
    println!("--------");
    let msg = b"abc";
    let sm = byte_sign(&par, msg, &sk, &mut rng, &mut mrg).expect("well-formed secret key");
    println!(
        "signed message: {} bytes (fixed {}-byte signature + {}-byte message)",
        sm.len(),
        par.sig_sz,
        msg.len()
    );
    println!("checksum {}", hex::encode(shake256(&sm, 8)));

    // Verify
    println!("\nVerification:");
    println!("-------------");
    let (ok, opened) = byte_open(&par, &sm, &pk);
    println!("byte_open: valid = {}, message = {:?}", ok, String::from_utf8_lossy(&opened));

    // Tamper with the signature and watch verification fail
    println!("\nTampering with the signature:");
    println!("-----------------------------");
    let mut bad = sm.clone();
    bad[10] ^= 1;
    let (ok, _) = byte_open(&par, &bad, &pk);
    println!("flipped one bit in the signature body: valid = {}", ok);

    if !ok {
        println!("Tampered signature rejected, as expected.");
    }

    // The same flow with fresh system randomness and an unmasked (d = 1)
    // parameter set
    println!("\nFresh randomness, {}:", raccoon_128_1().name);
    println!("--------------------------------");
    let par = raccoon_128_1();
    let mut seed = [0u8; 16];
    OsRng.fill_bytes(&mut seed);
    let mut mrg = MaskRandom::from_seed(&seed);
    let (pk, sk) = byte_keygen(&par, &mut OsRng, &mut mrg);
    let sm = byte_sign(&par, b"fresh message", &sk, &mut OsRng, &mut mrg)
        .expect("well-formed secret key");
    let (ok, _) = byte_open(&par, &sm, &pk);
    println!("sign/verify with OsRng: valid = {}", ok);
}
