// File:    keys.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: The key pair value produced by key generation and passed back into encryption and decryption.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::params::Parameters;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A generated public/private token pair together with its parameters.
///
/// Created once per generation call and never mutated afterwards. Callers
/// treat both keys as opaque and only hand them back to the facade.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    /// A unique identifier for the key pair.
    pub id: Uuid,
    /// Opaque token used for encryption.
    pub public_key: String,
    /// Opaque token used for decryption.
    pub private_key: String,
    /// Parameters the pair was generated with.
    pub parameters: Parameters,
    /// When the pair was generated.
    pub generated: DateTime<Utc>,
}

impl KeyPair {
    /// Lowercase hex SHA-256 of the public key, for display.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.public_key.as_bytes());
        format!("{digest:x}")
    }
}
