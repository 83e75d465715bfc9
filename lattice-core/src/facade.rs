// File:    facade.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The stateless request/response boundary for key generation, encryption and decryption.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::error::CryptoError;
use crate::keys::KeyPair;
use crate::params::{ParameterOverrides, Parameters};
use crate::token::{self, KeyKind, KeyToken};
use chrono::{DateTime, Utc};
use log::debug;
use uuid::Uuid;

/// The operations front ends depend on.
///
/// Every call is independent; implementations hold no mutable state, so a
/// single instance can be shared across threads.
pub trait Cryptosystem: Send + Sync {
    /// The parameters used when a caller supplies no overrides.
    fn defaults(&self) -> Parameters;

    /// Generates a key pair, merging `overrides` onto the defaults.
    fn generate_key_pair(&self, overrides: &ParameterOverrides) -> KeyPair;

    /// Encrypts `message` for the holder of `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyInput`] for an empty or whitespace-only
    /// message and [`CryptoError::EncodingError`] if no token can be produced.
    fn encrypt(&self, message: &str, public_key: &str) -> Result<String, CryptoError>;

    /// Recovers the plaintext from `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptyInput`] for an empty or whitespace-only
    /// ciphertext and [`CryptoError::InvalidCiphertext`] if it does not decode.
    fn decrypt(&self, ciphertext: &str, private_key: &str) -> Result<String, CryptoError>;

    /// Returns whether `key` decodes to a token with a type, a dimension and a modulus.
    fn validate_key(&self, key: &str) -> bool;
}

/// Placeholder implementation of [`Cryptosystem`].
///
/// There is no lattice arithmetic here: keys are encoded metadata and
/// encryption is string reversal plus encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CryptoFacade {
    defaults: Parameters,
}

impl CryptoFacade {
    /// Creates a facade that uses `defaults` for calls without overrides.
    #[must_use]
    pub const fn new(defaults: Parameters) -> Self {
        Self { defaults }
    }

    /// Generates a key pair stamped with `now` instead of the current time.
    #[must_use]
    pub fn generate_key_pair_at(
        &self,
        overrides: &ParameterOverrides,
        now: DateTime<Utc>,
    ) -> KeyPair {
        let parameters = self.defaults.with_overrides(overrides);
        let key_for = |kind| {
            token::encode_key(&KeyToken {
                kind,
                dimension: parameters.dimension,
                modulus: parameters.modulus,
                timestamp: now.timestamp_millis(),
            })
        };
        let pair = KeyPair {
            id: Uuid::new_v4(),
            public_key: key_for(KeyKind::Public),
            private_key: key_for(KeyKind::Private),
            parameters,
            generated: now,
        };
        debug!(
            "Generated key pair {} (dimension {}, modulus {}).",
            pair.id, parameters.dimension, parameters.modulus
        );
        pair
    }
}

impl Cryptosystem for CryptoFacade {
    fn defaults(&self) -> Parameters {
        self.defaults
    }

    fn generate_key_pair(&self, overrides: &ParameterOverrides) -> KeyPair {
        self.generate_key_pair_at(overrides, Utc::now())
    }

    fn encrypt(&self, message: &str, public_key: &str) -> Result<String, CryptoError> {
        if message.trim().is_empty() {
            return Err(CryptoError::EmptyInput("Message"));
        }
        let ciphertext = token::encode_ciphertext(message, public_key)?;
        debug!("Encrypted {} characters.", message.chars().count());
        Ok(ciphertext)
    }

    /// The private key is not checked against the key that produced the
    /// ciphertext; any well-formed token decodes.
    fn decrypt(&self, ciphertext: &str, _private_key: &str) -> Result<String, CryptoError> {
        if ciphertext.trim().is_empty() {
            return Err(CryptoError::EmptyInput("Ciphertext"));
        }
        token::decode_ciphertext(ciphertext).inspect_err(|e| debug!("Rejected ciphertext: {e}"))
    }

    fn validate_key(&self, key: &str) -> bool {
        token::decode_key(key).is_ok()
    }
}
