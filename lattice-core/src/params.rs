// File:    params.rs
// Author:  apezoo
// Date:    2026-10-18
//
// Description: Scheme parameters attached to every key pair, and the partial overrides callers may supply.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

const fn non_zero(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(v) => v,
        None => panic!("parameter constant must be non-zero"),
    }
}

/// Default lattice dimension.
pub const DEFAULT_DIMENSION: NonZeroU32 = non_zero(512);
/// Default modulus.
pub const DEFAULT_MODULUS: NonZeroU32 = non_zero(1024);
/// Default error bound.
pub const DEFAULT_ERROR_BOUND: u32 = 3;
/// Default key size in bits.
pub const DEFAULT_KEY_SIZE: NonZeroU32 = non_zero(256);

/// Configuration of the (placeholder) scheme.
///
/// Immutable once attached to a [`KeyPair`](crate::KeyPair).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Lattice dimension.
    pub dimension: NonZeroU32,
    /// Modulus of the ring.
    pub modulus: NonZeroU32,
    /// Bound on the sampled error.
    pub error_bound: u32,
    /// Key size in bits.
    pub key_size: NonZeroU32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            modulus: DEFAULT_MODULUS,
            error_bound: DEFAULT_ERROR_BOUND,
            key_size: DEFAULT_KEY_SIZE,
        }
    }
}

impl Parameters {
    /// Returns a copy of `self` with every field present in `overrides` replaced.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ParameterOverrides) -> Self {
        Self {
            dimension: overrides.dimension.unwrap_or(self.dimension),
            modulus: overrides.modulus.unwrap_or(self.modulus),
            error_bound: overrides.error_bound.unwrap_or(self.error_bound),
            key_size: overrides.key_size.unwrap_or(self.key_size),
        }
    }
}

/// A partial [`Parameters`] value. Absent fields fall back to the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParameterOverrides {
    /// Lattice dimension override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<NonZeroU32>,
    /// Modulus override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulus: Option<NonZeroU32>,
    /// Error bound override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_bound: Option<u32>,
    /// Key size override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<NonZeroU32>,
}

impl ParameterOverrides {
    /// Returns `true` when no field is overridden.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dimension.is_none()
            && self.modulus.is_none()
            && self.error_bound.is_none()
            && self.key_size.is_none()
    }
}
