#![allow(missing_docs)]
use lattice_core::kem::{self, SHARED_KEY_LEN};
use lattice_core::lwe::{self, EXTRA_SAMPLES};
use lattice_core::{CryptoError, LweKem, LweParams};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn demo_params() -> LweParams {
    LweParams::new(64, 2053, 3.2).unwrap()
}

#[test]
fn test_lwe_round_trip() {
    let mut rng = StdRng::seed_from_u64(17);
    let (public_key, secret_key) = lwe::generate_keys(&demo_params(), &mut rng);

    let message = b"HELLO WORLD\x00\xff";
    let ciphertext = lwe::encrypt(&public_key, message, &mut rng);
    assert_eq!(ciphertext.bits.len(), message.len() * 8);
    assert_eq!(lwe::decrypt(&secret_key, &ciphertext).unwrap(), message);
}

#[test]
fn test_lwe_default_parameters_round_trip() {
    let params = LweParams::default();
    assert_eq!(params.n(), 128);
    assert_eq!(params.q(), 2053);
    assert_eq!(params.m(), 128 + EXTRA_SAMPLES);

    let mut rng = rand::rng();
    let (public_key, secret_key) = lwe::generate_keys(&params, &mut rng);
    let ciphertext = lwe::encrypt(&public_key, b"lattice", &mut rng);
    assert_eq!(lwe::decrypt(&secret_key, &ciphertext).unwrap(), b"lattice");
}

#[test]
fn test_lwe_encryption_is_randomized() {
    let mut rng = StdRng::seed_from_u64(3);
    let (public_key, _) = lwe::generate_keys(&demo_params(), &mut rng);
    let first = lwe::encrypt(&public_key, b"same", &mut rng);
    let second = lwe::encrypt(&public_key, b"same", &mut rng);
    assert_ne!(first, second);
}

#[test]
fn test_lwe_rejects_malformed_ciphertexts() {
    let mut rng = StdRng::seed_from_u64(5);
    let (public_key, secret_key) = lwe::generate_keys(&demo_params(), &mut rng);

    let mut partial = lwe::encrypt(&public_key, b"ab", &mut rng);
    partial.bits.pop();
    assert!(matches!(
        lwe::decrypt(&secret_key, &partial),
        Err(CryptoError::InvalidCiphertext { .. })
    ));

    let mut wrong_dimension = lwe::encrypt(&public_key, b"a", &mut rng);
    wrong_dimension.bits[0].u.push(1);
    assert!(matches!(
        lwe::decrypt(&secret_key, &wrong_dimension),
        Err(CryptoError::InvalidCiphertext { .. })
    ));
}

#[test]
fn test_lwe_parameter_validation() {
    assert!(matches!(
        LweParams::new(0, 2053, 3.2),
        Err(CryptoError::InvalidParameters(_))
    ));
    assert!(matches!(
        LweParams::new(64, 3, 3.2),
        Err(CryptoError::InvalidParameters(_))
    ));
    assert!(matches!(
        LweParams::new(64, 2053, f64::NAN),
        Err(CryptoError::InvalidParameters(_))
    ));
    assert!(LweParams::new(64, 2053, 0.0).is_ok());
}

#[test]
fn test_public_key_serialization_header() {
    let mut rng = StdRng::seed_from_u64(9);
    let (public_key, _) = lwe::generate_keys(&demo_params(), &mut rng);
    let bytes = public_key.to_bytes();

    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(&bytes[2..4], &64u16.to_be_bytes());
    assert_eq!(&bytes[4..8], &2053u32.to_be_bytes());
    assert_eq!(&bytes[8..10], &114u16.to_be_bytes());
    assert_eq!(bytes.len(), 10 + 4 * (114 * 64 + 114));
}

#[test]
fn test_hash_is_length_prefixed() {
    // Moving a byte across a part boundary must change the digest.
    assert_ne!(kem::hash(&[b"ab", b"c"]), kem::hash(&[b"a", b"bc"]));
    assert_eq!(kem::hash(&[b"x"]), kem::hash(&[b"x"]));
    assert_eq!(kem::hash(&[]).len(), SHARED_KEY_LEN);
}

#[test]
fn test_kem_shared_keys_match() {
    let mut rng = StdRng::seed_from_u64(42);
    let kem = LweKem::new(demo_params());
    let secret = kem.generate_keys(&mut rng);

    let (ciphertext, sender_key) = kem.encapsulate(secret.public_key(), b"session-1", &mut rng);
    let receiver_key = kem.decapsulate(&secret, &ciphertext, b"session-1");
    assert_eq!(sender_key, receiver_key);

    let message = b"HELLO WORLD";
    let sealed = kem::apply_shared_key(message, &sender_key);
    assert_ne!(sealed.as_slice(), message);
    assert_eq!(kem::apply_shared_key(&sealed, &receiver_key), message);
}

#[test]
fn test_kem_fresh_encapsulations_differ() {
    let mut rng = StdRng::seed_from_u64(8);
    let kem = LweKem::new(demo_params());
    let secret = kem.generate_keys(&mut rng);

    let (_, first) = kem.encapsulate(secret.public_key(), b"", &mut rng);
    let (_, second) = kem.encapsulate(secret.public_key(), b"", &mut rng);
    assert_ne!(first, second);
}

#[test]
fn test_kem_mismatched_associated_data_is_rejected() {
    let mut rng = StdRng::seed_from_u64(11);
    let kem = LweKem::new(demo_params());
    let secret = kem.generate_keys(&mut rng);

    let (ciphertext, sender_key) = kem.encapsulate(secret.public_key(), b"session-1", &mut rng);
    let rejected = kem.decapsulate(&secret, &ciphertext, b"session-2");
    assert_ne!(rejected, sender_key);

    // Rejection is deterministic for the same inputs.
    assert_eq!(rejected, kem.decapsulate(&secret, &ciphertext, b"session-2"));
}

#[test]
fn test_kem_tampered_ciphertext_is_rejected() {
    let mut rng = StdRng::seed_from_u64(12);
    let kem = LweKem::new(demo_params());
    let secret = kem.generate_keys(&mut rng);

    let (mut ciphertext, sender_key) = kem.encapsulate(secret.public_key(), b"ad", &mut rng);
    ciphertext.bits[0].v = (ciphertext.bits[0].v + 1) % 2053;
    let rejected = kem.decapsulate(&secret, &ciphertext, b"ad");
    assert_ne!(rejected, sender_key);

    // Truncated ciphertexts do not decrypt at all and still get a key back.
    ciphertext.bits.truncate(3);
    assert_ne!(kem.decapsulate(&secret, &ciphertext, b"ad"), sender_key);
}

#[test]
fn test_kem_ciphertext_for_another_receiver_is_rejected() {
    let mut rng = StdRng::seed_from_u64(13);
    let kem = LweKem::new(demo_params());
    let alice = kem.generate_keys(&mut rng);
    let bob = kem.generate_keys(&mut rng);

    let (ciphertext, sender_key) = kem.encapsulate(alice.public_key(), b"", &mut rng);
    assert_ne!(kem.decapsulate(&bob, &ciphertext, b""), sender_key);
}
