//! HTTP boundary between browser front ends and the lattice crypto facade.
//!
//! Every route is a thin JSON wrapper around one [`Cryptosystem`] call. Each of
//! the three operations is gated by its own [`InFlight`] slot so that a second
//! request for the same operation is refused while the first is running.

/// Single-slot guards for in-flight operations.
pub mod busy;
/// Configuration read from the environment.
pub mod config;

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use busy::InFlight;
use lattice_core::{
    CryptoFacade, Cryptosystem, DecryptionResult, EncryptionResult, KeyPair, ParameterOverrides,
};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state.
pub struct AppState {
    facade: Box<dyn Cryptosystem>,
    keygen: InFlight,
    encrypt: InFlight,
    decrypt: InFlight,
}

impl AppState {
    /// Wraps a cryptosystem with one idle in-flight slot per operation.
    #[must_use]
    pub fn new(facade: impl Cryptosystem + 'static) -> Self {
        Self {
            facade: Box::new(facade),
            keygen: InFlight::default(),
            encrypt: InFlight::default(),
            decrypt: InFlight::default(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CryptoFacade::default())
    }
}

/// Body of `POST /api/encrypt`.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EncryptRequest {
    /// The message to encrypt.
    pub message: String,
    /// The public key token.
    pub public_key: String,
}

/// Body of `POST /api/decrypt`.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    /// The ciphertext token.
    pub ciphertext: String,
    /// The private key token.
    pub private_key: String,
}

/// Body of `POST /api/keys/validate`.
#[derive(Deserialize, Serialize, Debug)]
pub struct ValidateKeyRequest {
    /// The key token to check.
    pub key: String,
}

/// Response of `POST /api/keys/generate`.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyPairResponse {
    /// The generated pair.
    pub key_pair: KeyPair,
    /// Hex SHA-256 of the public key.
    pub fingerprint: String,
}

/// Response of `GET /api/status`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// A key generation request is running.
    pub keygen_busy: bool,
    /// An encryption request is running.
    pub encrypt_busy: bool,
    /// A decryption request is running.
    pub decrypt_busy: bool,
}

/// Builds the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/parameters", get(parameters_handler))
        .route("/api/keys/generate", post(generate_key_pair_handler))
        .route("/api/keys/validate", post(validate_key_handler))
        .route("/api/encrypt", post(encrypt_handler))
        .route("/api/decrypt", post(decrypt_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Reports which operations are currently in flight.
async fn status_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    let response = StatusResponse {
        keygen_busy: state.keygen.is_busy(),
        encrypt_busy: state.encrypt.is_busy(),
        decrypt_busy: state.decrypt.is_busy(),
    };
    (StatusCode::OK, Json(response))
}

async fn parameters_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!(state.facade.defaults())))
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "error": message })))
}

/// An empty body means "no overrides".
fn parse_overrides(body: &[u8]) -> Result<ParameterOverrides, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(ParameterOverrides::default())
    } else {
        serde_json::from_slice(body)
    }
}

async fn generate_key_pair_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let overrides = match parse_overrides(&body) {
        Ok(overrides) => overrides,
        Err(err) => {
            warn!("Rejected key generation parameters: {err}");
            return failure(
                StatusCode::BAD_REQUEST,
                &format!("Invalid parameters: {err}"),
            );
        }
    };
    let Some(_guard) = state.keygen.try_begin() else {
        warn!("Refused key generation: another request is in flight.");
        return failure(StatusCode::CONFLICT, "Key generation already in progress");
    };
    let key_pair = state.facade.generate_key_pair(&overrides);
    let response = GenerateKeyPairResponse {
        fingerprint: key_pair.fingerprint(),
        key_pair,
    };
    (StatusCode::CREATED, Json(json!(response)))
}

async fn validate_key_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected key validation body: {rejection}");
            return failure(rejection.status(), &rejection.body_text());
        }
    };
    let valid = state.facade.validate_key(&payload.key);
    (StatusCode::OK, Json(json!({ "valid": valid })))
}

fn encrypt_failure(status: StatusCode, message: String) -> (StatusCode, Json<EncryptionResult>) {
    let result = EncryptionResult {
        ciphertext: String::new(),
        success: false,
        error: Some(message),
    };
    (status, Json(result))
}

fn decrypt_failure(status: StatusCode, message: String) -> (StatusCode, Json<DecryptionResult>) {
    let result = DecryptionResult {
        plaintext: String::new(),
        success: false,
        error: Some(message),
    };
    (status, Json(result))
}

async fn encrypt_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EncryptRequest>, JsonRejection>,
) -> (StatusCode, Json<EncryptionResult>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected encryption body: {rejection}");
            return encrypt_failure(rejection.status(), rejection.body_text());
        }
    };
    let Some(_guard) = state.encrypt.try_begin() else {
        warn!("Refused encryption: another request is in flight.");
        return encrypt_failure(StatusCode::CONFLICT, "Encryption already in progress".to_string());
    };
    let result = EncryptionResult::from(state.facade.encrypt(&payload.message, &payload.public_key));
    (status_for(result.success), Json(result))
}

async fn decrypt_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DecryptRequest>, JsonRejection>,
) -> (StatusCode, Json<DecryptionResult>) {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected decryption body: {rejection}");
            return decrypt_failure(rejection.status(), rejection.body_text());
        }
    };
    let Some(_guard) = state.decrypt.try_begin() else {
        warn!("Refused decryption: another request is in flight.");
        return decrypt_failure(StatusCode::CONFLICT, "Decryption already in progress".to_string());
    };
    let result =
        DecryptionResult::from(state.facade.decrypt(&payload.ciphertext, &payload.private_key));
    (status_for(result.success), Json(result))
}

const fn status_for(success: bool) -> StatusCode {
    if success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}
