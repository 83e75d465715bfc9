#![deny(missing_docs)]
//! A command-line interface for the lattice encryption demo.

use clap::{Args, Parser, Subcommand};
use lattice_core::keystore;
use lattice_core::token;
use lattice_core::{CryptoFacade, Cryptosystem, KeyPair, ParameterOverrides, Parameters};
use log::{error, info};
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Generate a key pair and save it\nlattice-cli keygen --output ./keys.json\n\n# Generate a key pair with a larger dimension\nlattice-cli keygen --dimension 1024\n\n# Encrypt a message with a saved key pair\nlattice-cli encrypt 'Hello, Lattice!' --keypair ./keys.json\n\n# Decrypt a ciphertext with an explicit private key\nlattice-cli decrypt <CIPHERTEXT> --private-key <KEY>\n\n# Check whether a key token is well formed\nlattice-cli validate <KEY>"
)]
struct Cli {
    /// JSON file with default parameter overrides, e.g. {"dimension": 1024}.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair
    Keygen {
        #[command(flatten)]
        parameters: ParameterArgs,

        /// Save the key pair to this file and print its ID instead of the full key pair.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Encrypt a message with a public key
    Encrypt {
        /// The message to encrypt
        message: String,

        /// The public key token to encrypt with.
        #[arg(long, value_name = "KEY", conflicts_with = "keypair", required_unless_present = "keypair")]
        public_key: Option<String>,

        /// A key pair file whose public key is used.
        #[arg(long, value_name = "FILE")]
        keypair: Option<PathBuf>,
    },
    /// Decrypt a ciphertext with a private key
    Decrypt {
        /// The ciphertext token to decrypt
        ciphertext: String,

        /// The private key token to decrypt with.
        #[arg(long, value_name = "KEY", conflicts_with = "keypair", required_unless_present = "keypair")]
        private_key: Option<String>,

        /// A key pair file whose private key is used.
        #[arg(long, value_name = "FILE")]
        keypair: Option<PathBuf>,
    },
    /// Check whether a key token is well formed
    Validate {
        /// The key token to check
        key: String,
    },
    /// Show the structure encoded in a key token
    Inspect {
        /// The key token to decode
        key: String,
    },
    /// Print the default parameters in effect
    Defaults,
}

#[derive(Args)]
struct ParameterArgs {
    /// Lattice dimension.
    #[arg(long)]
    dimension: Option<NonZeroU32>,
    /// Modulus.
    #[arg(long)]
    modulus: Option<NonZeroU32>,
    /// Bound on the sampled error.
    #[arg(long)]
    error_bound: Option<u32>,
    /// Key size in bits.
    #[arg(long)]
    key_size: Option<NonZeroU32>,
}

impl From<&ParameterArgs> for ParameterOverrides {
    fn from(args: &ParameterArgs) -> Self {
        Self {
            dimension: args.dimension,
            modulus: args.modulus,
            error_bound: args.error_bound,
            key_size: args.key_size,
        }
    }
}

/// Reads the overrides file, if any, and applies it to the built-in defaults.
fn load_defaults(path: Option<&Path>) -> Result<Parameters, String> {
    let Some(path) = path else {
        return Ok(Parameters::default());
    };
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {e}", path.display()))?;
    let overrides: ParameterOverrides = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {e}", path.display()))?;
    Ok(Parameters::default().with_overrides(&overrides))
}

/// Picks the inline key if given, otherwise loads the key pair file and selects a key from it.
fn resolve_key(
    inline: Option<&String>,
    keypair: Option<&PathBuf>,
    select: fn(KeyPair) -> String,
) -> String {
    if let Some(key) = inline {
        return key.clone();
    }
    let Some(path) = keypair else {
        error!("Either a key or --keypair must be provided.");
        process::exit(1);
    };
    keystore::load_key_pair(path).map(select).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    })
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to serialize output: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let defaults = load_defaults(cli.config.as_deref()).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
    let facade = CryptoFacade::new(defaults);

    match &cli.command {
        Commands::Keygen { parameters, output } => {
            let overrides = ParameterOverrides::from(parameters);
            if !overrides.is_empty() {
                info!("Generating key pair with overrides {overrides:?}.");
            }
            let key_pair = facade.generate_key_pair(&overrides);
            info!(
                "Generated key pair '{}' with fingerprint {}.",
                key_pair.id,
                key_pair.fingerprint()
            );
            match output {
                Some(path) => {
                    if let Err(e) = keystore::save_key_pair(path, &key_pair) {
                        error!("{e}");
                        process::exit(1);
                    }
                    info!("Saved key pair to '{}'.", path.display());
                    println!("{}", key_pair.id);
                }
                None => print_json(&key_pair),
            }
        }
        Commands::Encrypt {
            message,
            public_key,
            keypair,
        } => {
            let public_key = resolve_key(public_key.as_ref(), keypair.as_ref(), |k| k.public_key);
            match facade.encrypt(message, &public_key) {
                Ok(ciphertext) => println!("{ciphertext}"),
                Err(e) => {
                    error!("{e}");
                    process::exit(1);
                }
            }
        }
        Commands::Decrypt {
            ciphertext,
            private_key,
            keypair,
        } => {
            let private_key =
                resolve_key(private_key.as_ref(), keypair.as_ref(), |k| k.private_key);
            match facade.decrypt(ciphertext, &private_key) {
                Ok(plaintext) => println!("{plaintext}"),
                Err(e) => {
                    error!("{e}");
                    process::exit(1);
                }
            }
        }
        Commands::Validate { key } => {
            if facade.validate_key(key) {
                println!("valid");
            } else {
                println!("invalid");
                process::exit(1);
            }
        }
        Commands::Inspect { key } => match token::decode_key(key) {
            Ok(decoded) => print_json(&decoded),
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        },
        Commands::Defaults => print_json(&facade.defaults()),
    }
}
