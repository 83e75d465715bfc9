// File:    error.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Error taxonomy for facade operations and key pair files.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the crypto facade.
///
/// The `Display` output of every variant is the human-readable message that
/// front ends show inline, so it is written for end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The message or ciphertext was empty or contained only whitespace.
    /// Carries the name of the offending input ("Message", "Ciphertext").
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    /// The ciphertext token could not be decoded or lacks the expected structure.
    #[error("Decryption failed: invalid ciphertext or key ({reason})")]
    InvalidCiphertext {
        /// What was wrong with the token.
        reason: String,
    },

    /// Producing a token failed.
    #[error("Encryption failed: {0}")]
    EncodingError(String),

    /// A key token could not be decoded into its structure.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Scheme parameters outside the supported range.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl CryptoError {
    pub(crate) fn invalid_ciphertext(reason: impl Into<String>) -> Self {
        Self::InvalidCiphertext {
            reason: reason.into(),
        }
    }
}

/// Errors produced while reading or writing key pair files.
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// The file could not be read or written.
    #[error("failed to access key pair file '{}': {source}", .path.display())]
    Io {
        /// The file that was accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not a valid key pair document.
    #[error("failed to parse key pair file '{}': {source}", .path.display())]
    Json {
        /// The file that was parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
