// File:    lwe.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Bit-wise Learning With Errors public key encryption over Z_q.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Textbook LWE (Regev-style) encryption, one ciphertext per message bit.
//!
//! Key generation samples a binary secret `s`, a uniform `m x n` matrix `A` and
//! discrete-Gaussian noise `e`, and publishes `(A, b = A·s + e mod q)`. A bit is
//! encrypted by summing a random subset of the rows of `(A, b)` and adding
//! `bit · ⌊q/2⌋` to the last coordinate. Decryption rounds `v - <u, s>` to the
//! nearer of `0` and `q/2`.
//!
//! These parameters are for demonstration; they do not target a security level.

use crate::error::CryptoError;
use rand::Rng;
use std::f64::consts::PI;

/// Number of samples in the public key beyond the dimension (`m = n + 50`).
pub const EXTRA_SAMPLES: usize = 50;

/// Parameters of the LWE scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LweParams {
    n: usize,
    q: u32,
    sigma: f64,
}

impl Default for LweParams {
    fn default() -> Self {
        Self {
            n: 128,
            q: 2053,
            sigma: 3.2,
        }
    }
}

impl LweParams {
    /// Creates a parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameters`] if `n` is zero or too large to
    /// serialize, `q` is below 4, or `sigma` is negative or not finite.
    pub fn new(n: usize, q: u32, sigma: f64) -> Result<Self, CryptoError> {
        if n == 0 || n + EXTRA_SAMPLES > usize::from(u16::MAX) {
            return Err(CryptoError::InvalidParameters(format!(
                "dimension {n} must be between 1 and {}",
                usize::from(u16::MAX) - EXTRA_SAMPLES
            )));
        }
        if q < 4 {
            return Err(CryptoError::InvalidParameters(format!(
                "modulus {q} must be at least 4"
            )));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(CryptoError::InvalidParameters(format!(
                "noise width {sigma} must be a non-negative number"
            )));
        }
        Ok(Self { n, q, sigma })
    }

    /// Secret dimension.
    #[must_use]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Modulus.
    #[must_use]
    pub const fn q(&self) -> u32 {
        self.q
    }

    /// Width of the discrete Gaussian noise.
    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Number of samples in the public key.
    #[must_use]
    pub const fn m(&self) -> usize {
        self.n + EXTRA_SAMPLES
    }
}

/// Public key `(A, b)`. `A` is stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LwePublicKey {
    params: LweParams,
    a: Vec<u32>,
    b: Vec<u32>,
}

impl LwePublicKey {
    /// Parameters the key was generated with.
    #[must_use]
    pub const fn params(&self) -> &LweParams {
        &self.params
    }

    fn row(&self, i: usize) -> &[u32] {
        &self.a[i * self.params.n..(i + 1) * self.params.n]
    }

    /// Canonical byte form: `"PK" || n:u16 || q:u32 || m:u16` (big endian)
    /// followed by `A` and then `b` as little-endian 32-bit words.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(10 + 4 * (self.a.len() + self.b.len()));
        out.extend_from_slice(b"PK");
        out.extend_from_slice(&to_u16(self.params.n).to_be_bytes());
        out.extend_from_slice(&self.params.q.to_be_bytes());
        out.extend_from_slice(&to_u16(self.params.m()).to_be_bytes());
        for word in self.a.iter().chain(&self.b) {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }
}

/// Binary secret vector `s`.
#[derive(Clone, PartialEq, Eq)]
pub struct LweSecretKey {
    q: u32,
    s: Vec<u32>,
}

// Never print the secret.
impl std::fmt::Debug for LweSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LweSecretKey")
            .field("q", &self.q)
            .field("n", &self.s.len())
            .finish_non_exhaustive()
    }
}

/// Encryption of a single bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitCiphertext {
    /// Sum of the selected rows of `A`.
    pub u: Vec<u32>,
    /// Sum of the selected entries of `b`, plus the encoded bit.
    pub v: u32,
}

/// Encryption of a byte string, eight bit ciphertexts per byte, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LweCiphertext {
    /// One entry per message bit.
    pub bits: Vec<BitCiphertext>,
}

impl LweCiphertext {
    /// Canonical byte form: `"CT" || count:u32`, then for every bit
    /// `len(u):u32 || u` (little-endian words) `|| v:u64` (lengths and `v` big endian).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"CT");
        out.extend_from_slice(&to_u32(self.bits.len()).to_be_bytes());
        for bit in &self.bits {
            out.extend_from_slice(&to_u32(bit.u.len() * 4).to_be_bytes());
            for word in &bit.u {
                out.extend_from_slice(&word.to_le_bytes());
            }
            out.extend_from_slice(&u64::from(bit.v).to_be_bytes());
        }
        out
    }
}

// Lengths are bounded by `LweParams::new` and by the message sizes used here.
fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Samples a rounded Gaussian of width `sigma` (Box-Muller), reduced mod `q`.
fn sample_discrete_gaussian<R: Rng + ?Sized>(rng: &mut R, sigma: f64, q: u32) -> u32 {
    // 1 - [0, 1) keeps the logarithm finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    #[allow(clippy::cast_possible_truncation)]
    let noise = (z * sigma).round() as i64;
    let reduced = noise.rem_euclid(i64::from(q));
    u32::try_from(reduced).unwrap_or(0)
}

fn add_mod(x: u32, y: u32, q: u32) -> u32 {
    let sum = (u64::from(x) + u64::from(y)) % u64::from(q);
    u32::try_from(sum).unwrap_or(0)
}

/// Generates a key pair.
pub fn generate_keys<R: Rng + ?Sized>(
    params: &LweParams,
    rng: &mut R,
) -> (LwePublicKey, LweSecretKey) {
    let (n, m, q) = (params.n, params.m(), params.q);
    let s: Vec<u32> = (0..n).map(|_| rng.random_range(0..=1)).collect();
    let a: Vec<u32> = (0..m * n).map(|_| rng.random_range(0..q)).collect();
    let b = (0..m)
        .map(|i| {
            let row = &a[i * n..(i + 1) * n];
            let inner = row
                .iter()
                .zip(&s)
                .fold(0, |acc, (&a_ij, &s_j)| add_mod(acc, a_ij * s_j, q));
            add_mod(inner, sample_discrete_gaussian(&mut *rng, params.sigma, q), q)
        })
        .collect();
    (
        LwePublicKey {
            params: *params,
            a,
            b,
        },
        LweSecretKey { q, s },
    )
}

/// Encrypts `plaintext` bit by bit under `public_key`.
///
/// With a seeded `rng` the output is fully determined by the inputs.
pub fn encrypt<R: Rng + ?Sized>(
    public_key: &LwePublicKey,
    plaintext: &[u8],
    rng: &mut R,
) -> LweCiphertext {
    let params = &public_key.params;
    let (n, m, q) = (params.n, params.m(), params.q);
    let half = q / 2;
    let bits = plaintext
        .iter()
        .flat_map(|&byte| (0..8u8).rev().map(move |shift| (byte >> shift) & 1))
        .map(|bit| {
            let subset_size = rng.random_range(n / 2..=n);
            let mut u = vec![0u32; n];
            let mut v = 0u32;
            for i in rand::seq::index::sample(&mut *rng, m, subset_size) {
                for (u_j, &a_ij) in u.iter_mut().zip(public_key.row(i)) {
                    *u_j = add_mod(*u_j, a_ij, q);
                }
                v = add_mod(v, public_key.b[i], q);
            }
            BitCiphertext {
                u,
                v: add_mod(v, u32::from(bit) * half, q),
            }
        })
        .collect();
    LweCiphertext { bits }
}

/// Decrypts a ciphertext back into bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidCiphertext`] if the bit count is not a multiple
/// of eight or a bit ciphertext does not match the key's dimension.
pub fn decrypt(secret_key: &LweSecretKey, ciphertext: &LweCiphertext) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.bits.len() % 8 != 0 {
        return Err(CryptoError::invalid_ciphertext(format!(
            "{} bits do not form whole bytes",
            ciphertext.bits.len()
        )));
    }
    let q = secret_key.q;
    let quarter = q / 4;
    let three_quarters = u32::try_from(u64::from(q) * 3 / 4).unwrap_or(u32::MAX);
    let mut bytes = Vec::with_capacity(ciphertext.bits.len() / 8);
    for chunk in ciphertext.bits.chunks(8) {
        let mut byte = 0u8;
        for bit in chunk {
            if bit.u.len() != secret_key.s.len() {
                return Err(CryptoError::invalid_ciphertext(format!(
                    "bit ciphertext has dimension {}, key has {}",
                    bit.u.len(),
                    secret_key.s.len()
                )));
            }
            let inner = bit
                .u
                .iter()
                .zip(&secret_key.s)
                .fold(0, |acc, (&u_j, &s_j)| add_mod(acc, u_j % q * s_j, q));
            let diff = add_mod(bit.v % q, q - inner, q);
            let value = u8::from((quarter..=three_quarters).contains(&diff));
            byte = (byte << 1) | value;
        }
        bytes.push(byte);
    }
    Ok(bytes)
}
