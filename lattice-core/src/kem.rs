// File:    kem.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Key encapsulation with associated data on top of LWE, via the Fujisaki-Okamoto transform.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! The sender hashes a random seed into `mbar`, derives the encryption coins from
//! `mbar`, and encrypts `mbar` deterministically. The receiver decrypts, re-encrypts
//! with the same coins and compares. On a match the shared key is
//! `H("kdf", mbar, H("ct", ct), H(pk), ad)`. Otherwise a pseudo-random key is
//! derived from the secret `z` (implicit rejection), so a tampered ciphertext or
//! mismatched associated data yields a key unrelated to the sender's.

use crate::lwe::{self, LweCiphertext, LweParams, LwePublicKey, LweSecretKey};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha3::Shake256;
use sha3::digest::{ExtendableOutput, Update};

/// Length in bytes of shared keys, seeds and hashes.
pub const SHARED_KEY_LEN: usize = 32;

/// A key agreed through encapsulation.
pub type SharedKey = [u8; SHARED_KEY_LEN];

/// SHAKE-256 over `parts`, each prefixed with its length as a 32-bit big-endian integer.
#[must_use]
pub fn hash(parts: &[&[u8]]) -> [u8; SHARED_KEY_LEN] {
    let mut shake = Shake256::default();
    for part in parts {
        let len = u32::try_from(part.len()).unwrap_or(u32::MAX);
        shake.update(&len.to_be_bytes());
        shake.update(part);
    }
    let mut out = [0u8; SHARED_KEY_LEN];
    shake.finalize_xof_into(&mut out);
    out
}

/// Everything the receiver keeps: the LWE key pair, the public key hash and the
/// rejection secret `z`.
#[derive(Clone)]
pub struct KemSecret {
    public_key: LwePublicKey,
    secret_key: LweSecretKey,
    public_key_hash: [u8; SHARED_KEY_LEN],
    z: [u8; SHARED_KEY_LEN],
}

impl KemSecret {
    /// The public key to hand to senders.
    #[must_use]
    pub const fn public_key(&self) -> &LwePublicKey {
        &self.public_key
    }
}

impl std::fmt::Debug for KemSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KemSecret")
            .field("params", self.public_key.params())
            .finish_non_exhaustive()
    }
}

/// LWE-based KEM with associated data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LweKem {
    params: LweParams,
}

impl LweKem {
    /// Creates a KEM over the given LWE parameters.
    #[must_use]
    pub const fn new(params: LweParams) -> Self {
        Self { params }
    }

    /// Generates the receiver's key material.
    pub fn generate_keys<R: Rng + ?Sized>(&self, rng: &mut R) -> KemSecret {
        let (public_key, secret_key) = lwe::generate_keys(&self.params, rng);
        let public_key_hash = hash(&[b"pk", &public_key.to_bytes()]);
        let mut z = [0u8; SHARED_KEY_LEN];
        rng.fill_bytes(&mut z);
        debug!(
            "Generated KEM key (n = {}, q = {}).",
            self.params.n(),
            self.params.q()
        );
        KemSecret {
            public_key,
            secret_key,
            public_key_hash,
            z,
        }
    }

    /// Produces a ciphertext and the shared key it carries, bound to `ad`.
    pub fn encapsulate<R: Rng + ?Sized>(
        &self,
        public_key: &LwePublicKey,
        ad: &[u8],
        rng: &mut R,
    ) -> (LweCiphertext, SharedKey) {
        let public_key_hash = hash(&[b"pk", &public_key.to_bytes()]);
        let mut seed = [0u8; SHARED_KEY_LEN];
        rng.fill_bytes(&mut seed);
        let mbar = hash(&[b"mbar", &seed, &public_key_hash, ad]);
        let coins = hash(&[b"coins", &mbar, &public_key_hash, ad]);
        let ciphertext = encrypt_deterministic(public_key, &mbar, &coins);
        let key = hash(&[
            b"kdf",
            &mbar,
            &hash(&[b"ct", &ciphertext.to_bytes()]),
            &public_key_hash,
            ad,
        ]);
        (ciphertext, key)
    }

    /// Recovers the shared key from `ciphertext`.
    ///
    /// Never fails: a ciphertext that does not re-encrypt identically yields the
    /// rejection key instead.
    #[must_use]
    pub fn decapsulate(&self, secret: &KemSecret, ciphertext: &LweCiphertext, ad: &[u8]) -> SharedKey {
        let ciphertext_hash = hash(&[b"ct", &ciphertext.to_bytes()]);
        let mut mbar = [0u8; SHARED_KEY_LEN];
        if let Ok(decrypted) = lwe::decrypt(&secret.secret_key, ciphertext) {
            let len = decrypted.len().min(SHARED_KEY_LEN);
            mbar[..len].copy_from_slice(&decrypted[..len]);
        }
        let coins = hash(&[b"coins", &mbar, &secret.public_key_hash, ad]);
        let reencrypted = encrypt_deterministic(&secret.public_key, &mbar, &coins);
        if reencrypted == *ciphertext {
            hash(&[b"kdf", &mbar, &ciphertext_hash, &secret.public_key_hash, ad])
        } else {
            debug!("Ciphertext did not re-encrypt; returning the rejection key.");
            hash(&[
                b"kdf-reject",
                &secret.z,
                &ciphertext_hash,
                &secret.public_key_hash,
                ad,
            ])
        }
    }
}

/// Encrypts with a generator seeded from `coins`, so equal inputs give equal ciphertexts.
fn encrypt_deterministic(
    public_key: &LwePublicKey,
    message: &[u8; SHARED_KEY_LEN],
    coins: &[u8; SHARED_KEY_LEN],
) -> LweCiphertext {
    let mut rng = StdRng::from_seed(hash(&[b"rng-seed", coins]));
    lwe::encrypt(public_key, message, &mut rng)
}

/// XORs `data` with the shared key repeated to its length. Applying it twice restores `data`.
#[must_use]
pub fn apply_shared_key(data: &[u8], key: &SharedKey) -> Vec<u8> {
    data.iter().zip(key.iter().cycle()).map(|(d, k)| d ^ k).collect()
}
