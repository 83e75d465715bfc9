// File:    token.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Text encoding of the opaque key and ciphertext tokens exchanged with front ends.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Key tokens are URL-safe base64 over a small JSON document. Ciphertext tokens
//! are standard base64 over `reverse(message) | key prefix`.

use crate::error::CryptoError;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::num::NonZeroU32;

/// Separates the reversed message from the key prefix inside a ciphertext.
pub const SEPARATOR: char = '|';
/// Number of public key characters embedded in a ciphertext.
pub const KEY_PREFIX_LEN: usize = 16;

/// Key tokens are written padded but read back with or without padding.
const KEY_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Which half of a key pair a token belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The public (encryption) key.
    #[serde(rename = "pub")]
    Public,
    /// The private (decryption) key.
    #[serde(rename = "priv")]
    Private,
}

impl KeyKind {
    /// The discriminator written into the token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "pub",
            Self::Private => "priv",
        }
    }
}

/// The structure carried inside a key token.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyToken {
    /// Type discriminator.
    #[serde(rename = "type")]
    pub kind: KeyKind,
    /// Lattice dimension the key was generated for.
    pub dimension: NonZeroU32,
    /// Modulus the key was generated for.
    pub modulus: NonZeroU32,
    /// Generation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

/// Encodes a key token.
#[must_use]
pub fn encode_key(token: &KeyToken) -> String {
    let document = json!({
        "type": token.kind.as_str(),
        "dimension": token.dimension.get(),
        "modulus": token.modulus.get(),
        "timestamp": token.timestamp,
    });
    general_purpose::URL_SAFE.encode(document.to_string())
}

/// Decodes a key token back into its structure.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKey`] if the text is not URL-safe base64, is not
/// JSON, or is missing the discriminator, the dimension or the modulus.
pub fn decode_key(key: &str) -> Result<KeyToken, CryptoError> {
    let bytes = KEY_DECODER
        .decode(key.trim())
        .map_err(|e| CryptoError::InvalidKey(format!("not base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CryptoError::InvalidKey(format!("unexpected structure: {e}")))
}

/// Produces a ciphertext token from a message and a public key.
///
/// # Errors
///
/// Returns [`CryptoError::EncodingError`] if the embedded key prefix contains the
/// separator, since the token could not be split back apart.
pub fn encode_ciphertext(message: &str, public_key: &str) -> Result<String, CryptoError> {
    let prefix: String = public_key.chars().take(KEY_PREFIX_LEN).collect();
    if prefix.contains(SEPARATOR) {
        return Err(CryptoError::EncodingError(format!(
            "public key contains the reserved character '{SEPARATOR}'"
        )));
    }
    let reversed: String = message.chars().rev().collect();
    Ok(general_purpose::STANDARD.encode(format!("{reversed}{SEPARATOR}{prefix}")))
}

/// Recovers the message from a ciphertext token.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidCiphertext`] if the token is not base64, not
/// UTF-8, has no separator, or carries an empty message.
pub fn decode_ciphertext(ciphertext: &str) -> Result<String, CryptoError> {
    let bytes = general_purpose::STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| CryptoError::invalid_ciphertext(format!("not base64: {e}")))?;
    let decoded = String::from_utf8(bytes)
        .map_err(|_| CryptoError::invalid_ciphertext("payload is not UTF-8"))?;
    // The key prefix never contains the separator, the message may.
    let (reversed, _key_prefix) = decoded
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| CryptoError::invalid_ciphertext("missing key marker"))?;
    if reversed.is_empty() {
        return Err(CryptoError::invalid_ciphertext("empty payload"));
    }
    Ok(reversed.chars().rev().collect())
}
