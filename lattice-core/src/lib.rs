// File:    lib.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The main library crate for lattice-core, exposing the crypto facade used by the CLI and web front ends.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # Lattice Core Library
//!
//! This library provides the request/response boundary of the lattice encryption
//! demo: key pair generation, encryption and decryption behind a single
//! [`Cryptosystem`] trait.
//!
//! The transform behind [`CryptoFacade`] is a placeholder. Encryption reverses the
//! message and encodes it together with a prefix of the public key; it provides
//! no security whatsoever. The contract (types, errors, token opacity) is what a
//! real LWE backend has to honor when it replaces the internals.
//!
//! Alongside it, [`lwe`] implements bit-wise LWE encryption and [`kem`] builds a
//! key encapsulation mechanism with associated data on top of it.

/// Error types returned by the facade and the key store.
pub mod error;
/// The `Cryptosystem` trait and its placeholder implementation.
pub mod facade;
/// LWE key encapsulation with associated data.
pub mod kem;
/// Generated key pairs.
pub mod keys;
/// Reading and writing key pair files.
pub mod keystore;
/// Learning With Errors bit encryption.
pub mod lwe;
/// Scheme parameters and per-call overrides.
pub mod params;
/// Tagged result values handed to front ends.
pub mod result;
/// Encoding and decoding of the opaque key and ciphertext tokens.
pub mod token;

pub use error::{CryptoError, KeystoreError};
pub use facade::{CryptoFacade, Cryptosystem};
pub use kem::{KemSecret, LweKem, SharedKey};
pub use keys::KeyPair;
pub use lwe::{LweCiphertext, LweParams, LwePublicKey};
pub use params::{ParameterOverrides, Parameters};
pub use result::{DecryptionResult, EncryptionResult};
