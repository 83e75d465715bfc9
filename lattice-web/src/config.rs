use lattice_core::{ParameterOverrides, Parameters};
use std::num::NonZeroU32;
use std::str::FromStr;
use thiserror::Error;

/// Port used when `LATTICE_WEB_PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// An environment variable held a value that could not be used.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid value '{value}' for {name}: {reason}")]
pub struct ConfigError {
    /// The variable name.
    pub name: &'static str,
    /// The rejected value.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Default parameters handed to the facade.
    pub defaults: Parameters,
}

impl WebConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable or zero value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable or zero value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var(&lookup, "LATTICE_WEB_PORT")?.unwrap_or(DEFAULT_PORT);
        let overrides = ParameterOverrides {
            dimension: parse_var::<NonZeroU32, _>(&lookup, "LATTICE_DIMENSION")?,
            modulus: parse_var::<NonZeroU32, _>(&lookup, "LATTICE_MODULUS")?,
            error_bound: parse_var::<u32, _>(&lookup, "LATTICE_ERROR_BOUND")?,
            key_size: parse_var::<NonZeroU32, _>(&lookup, "LATTICE_KEY_SIZE")?,
        };
        Ok(Self {
            port,
            defaults: Parameters::default().with_overrides(&overrides),
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError {
            name,
            value: value.clone(),
            reason: e.to_string(),
        })
}
