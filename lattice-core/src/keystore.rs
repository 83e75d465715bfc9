use crate::error::KeystoreError;
use crate::keys::KeyPair;
use std::fs;
use std::path::Path;

/// Loads a key pair from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a key pair.
pub fn load_key_pair(path: &Path) -> Result<KeyPair, KeystoreError> {
    let contents = fs::read_to_string(path).map_err(|source| KeystoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| KeystoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves a key pair to a JSON file, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the key pair cannot be serialized or the file cannot be written.
pub fn save_key_pair(path: &Path, key_pair: &KeyPair) -> Result<(), KeystoreError> {
    let contents = serde_json::to_string_pretty(key_pair).map_err(|source| KeystoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| KeystoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
