// File:    result.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Serializable success/failure values returned to front ends for encryption and decryption.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};

/// Outcome of an encryption request as seen by a front end.
///
/// On failure `ciphertext` is empty and `error` carries the message to display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResult {
    /// The ciphertext token, empty on failure.
    pub ciphertext: String,
    /// Whether encryption succeeded.
    pub success: bool,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String, CryptoError>> for EncryptionResult {
    fn from(result: Result<String, CryptoError>) -> Self {
        match result {
            Ok(ciphertext) => Self {
                ciphertext,
                success: true,
                error: None,
            },
            Err(e) => Self {
                ciphertext: String::new(),
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl EncryptionResult {
    /// Converts back into a `Result`, yielding the ciphertext or the error message.
    ///
    /// # Errors
    ///
    /// Returns the failure message when `success` is false.
    pub fn into_result(self) -> Result<String, String> {
        if self.success {
            Ok(self.ciphertext)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

/// Outcome of a decryption request as seen by a front end.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DecryptionResult {
    /// The recovered plaintext, empty on failure.
    pub plaintext: String,
    /// Whether decryption succeeded.
    pub success: bool,
    /// Human-readable failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<String, CryptoError>> for DecryptionResult {
    fn from(result: Result<String, CryptoError>) -> Self {
        match result {
            Ok(plaintext) => Self {
                plaintext,
                success: true,
                error: None,
            },
            Err(e) => Self {
                plaintext: String::new(),
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl DecryptionResult {
    /// Converts back into a `Result`, yielding the plaintext or the error message.
    ///
    /// # Errors
    ///
    /// Returns the failure message when `success` is false.
    pub fn into_result(self) -> Result<String, String> {
        if self.success {
            Ok(self.plaintext)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}
