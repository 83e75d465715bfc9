#![allow(missing_docs)]
use lattice_core::{
    CryptoError, CryptoFacade, Cryptosystem, DecryptionResult, EncryptionResult, KeyPair,
    ParameterOverrides, Parameters,
};
use lattice_web::{AppState, GenerateKeyPairResponse, StatusResponse, router};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

async fn spawn_server(state: AppState) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    let app = router(Arc::new(state));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    (format!("http://{addr}"), handle)
}

async fn generate(client: &reqwest::Client, base_url: &str, body: Value) -> KeyPair {
    let response = client
        .post(format!("{base_url}/api/keys/generate"))
        .json(&body)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: GenerateKeyPairResponse = response.json().await.expect("parse key pair");
    assert_eq!(body.fingerprint, body.key_pair.fingerprint());
    body.key_pair
}

#[tokio::test]
async fn http_round_trip() {
    let (base_url, server) = spawn_server(AppState::default()).await;
    let client = reqwest::Client::new();

    let keys = generate(&client, &base_url, json!({})).await;
    assert_eq!(keys.parameters, Parameters::default());

    let encrypted: EncryptionResult = client
        .post(format!("{base_url}/api/encrypt"))
        .json(&json!({ "message": "Hello, Lattice!", "publicKey": keys.public_key }))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("parse encryption result");
    assert!(encrypted.success);
    assert_ne!(encrypted.ciphertext, "Hello, Lattice!");

    let response = client
        .post(format!("{base_url}/api/decrypt"))
        .json(&json!({ "ciphertext": encrypted.ciphertext, "privateKey": keys.private_key }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::OK);
    let decrypted: DecryptionResult = response.json().await.expect("parse decryption result");
    assert_eq!(decrypted.into_result(), Ok("Hello, Lattice!".to_string()));

    server.abort();
}

#[tokio::test]
async fn http_failures_are_tagged_results() {
    let (base_url, server) = spawn_server(AppState::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base_url}/api/encrypt"))
        .json(&json!({ "message": "  ", "publicKey": "key" }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: EncryptionResult = response.json().await.expect("parse error response");
    assert!(!body.success);
    assert_eq!(body.error.as_deref(), Some("Message cannot be empty"));

    let response = client
        .post(format!("{base_url}/api/decrypt"))
        .json(&json!({ "ciphertext": "not-a-valid-token", "privateKey": "key" }))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: DecryptionResult = response.json().await.expect("parse error response");
    assert!(body.plaintext.is_empty());
    assert!(body.error.unwrap().contains("invalid ciphertext"));

    server.abort();
}

#[tokio::test]
async fn http_overrides_and_validation() {
    let defaults = Parameters {
        modulus: std::num::NonZeroU32::new(3329).unwrap(),
        ..Parameters::default()
    };
    let (base_url, server) = spawn_server(AppState::new(CryptoFacade::new(defaults))).await;
    let client = reqwest::Client::new();

    let served: Parameters = client
        .get(format!("{base_url}/api/parameters"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("parse parameters");
    assert_eq!(served, defaults);

    let keys = generate(&client, &base_url, json!({ "dimension": 1024 })).await;
    assert_eq!(keys.parameters.dimension.get(), 1024);
    assert_eq!(keys.parameters.modulus.get(), 3329);
    assert_eq!(keys.parameters.key_size.get(), 256);

    for (key, expected) in [(keys.public_key.as_str(), true), ("garbage", false)] {
        let body: Value = client
            .post(format!("{base_url}/api/keys/validate"))
            .json(&json!({ "key": key }))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("parse validation");
        assert_eq!(body["valid"], expected);
    }

    // Zero is not a valid dimension, and unknown fields are refused.
    for body in [json!({ "dimension": 0 }), json!({ "dimensions": 1024 })] {
        let response = client
            .post(format!("{base_url}/api/keys/generate"))
            .json(&body)
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("parse error response");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid parameters"));
    }

    server.abort();
}

#[tokio::test]
async fn http_generate_without_body_uses_defaults() {
    let (base_url, server) = spawn_server(AppState::default()).await;
    let client = reqwest::Client::new();

    for body in ["", " \n"] {
        let response = client
            .post(format!("{base_url}/api/keys/generate"))
            .body(body)
            .send()
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::CREATED);
        let generated: GenerateKeyPairResponse = response.json().await.expect("parse key pair");
        assert_eq!(generated.key_pair.parameters, Parameters::default());
    }

    server.abort();
}

#[tokio::test]
async fn http_malformed_bodies_are_tagged_results() {
    let (base_url, server) = spawn_server(AppState::default()).await;
    let client = reqwest::Client::new();

    let cases = [
        ("/api/keys/generate", Some("application/json"), "{not json"),
        ("/api/encrypt", Some("application/json"), "{not json"),
        ("/api/encrypt", None, r#"{"message":"hi","publicKey":"key"}"#),
        ("/api/decrypt", Some("application/json"), r#"{"ciphertext":"abc"}"#),
        ("/api/decrypt", Some("application/json"), ""),
        ("/api/keys/validate", Some("application/json"), "[]"),
    ];
    for (path, content_type, body) in cases {
        let mut request = client.post(format!("{base_url}{path}")).body(body);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        let response = request.send().await.expect("request should succeed");
        assert!(
            response.status().is_client_error(),
            "{path} answered {} for {body:?}",
            response.status()
        );
        let body: Value = response.json().await.expect("tagged failure body");
        assert_eq!(body["success"], false, "{path}");
        assert!(!body["error"].as_str().unwrap().is_empty(), "{path}");
    }

    // A missing content type keeps the framework's status code.
    let response = client
        .post(format!("{base_url}/api/encrypt"))
        .body(r#"{"message":"hi","publicKey":"key"}"#)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: EncryptionResult = response.json().await.expect("parse error response");
    assert!(body.ciphertext.is_empty());
    assert!(body.error.is_some());

    server.abort();
}

#[tokio::test]
async fn http_status_uses_camel_case_keys() {
    let (base_url, server) = spawn_server(AppState::default()).await;
    let client = reqwest::Client::new();

    let status: Value = client
        .get(format!("{base_url}/api/status"))
        .send()
        .await
        .expect("request should succeed")
        .json()
        .await
        .expect("parse status");
    assert_eq!(
        status,
        json!({ "keygenBusy": false, "encryptBusy": false, "decryptBusy": false })
    );

    server.abort();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Keygen,
    Encrypt,
    Decrypt,
}

impl Gate {
    fn path(self) -> &'static str {
        match self {
            Self::Keygen => "/api/keys/generate",
            Self::Encrypt => "/api/encrypt",
            Self::Decrypt => "/api/decrypt",
        }
    }

    fn body(self, keys: &KeyPair, ciphertext: &str) -> Value {
        match self {
            Self::Keygen => json!({}),
            Self::Encrypt => json!({ "message": "held", "publicKey": keys.public_key }),
            Self::Decrypt => json!({ "ciphertext": ciphertext, "privateKey": keys.private_key }),
        }
    }

    fn success(self) -> StatusCode {
        match self {
            Self::Keygen => StatusCode::CREATED,
            Self::Encrypt | Self::Decrypt => StatusCode::OK,
        }
    }

    fn conflict_message(self) -> &'static str {
        match self {
            Self::Keygen => "Key generation already in progress",
            Self::Encrypt => "Encryption already in progress",
            Self::Decrypt => "Decryption already in progress",
        }
    }

    fn is_busy(self, status: StatusResponse) -> bool {
        match self {
            Self::Keygen => status.keygen_busy,
            Self::Encrypt => status.encrypt_busy,
            Self::Decrypt => status.decrypt_busy,
        }
    }

    /// Some other operation, which must not be blocked by this one.
    fn other(self) -> Self {
        match self {
            Self::Keygen => Self::Encrypt,
            Self::Encrypt => Self::Decrypt,
            Self::Decrypt => Self::Keygen,
        }
    }
}

/// Blocks inside the gated operation until the test releases it.
struct GatedSystem {
    gate: Gate,
    inner: CryptoFacade,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedSystem {
    fn hold(&self, operation: Gate) {
        if operation != self.gate {
            return;
        }
        if let Ok(release) = self.release.lock() {
            let _ = release.recv_timeout(Duration::from_secs(10));
        }
    }
}

impl Cryptosystem for GatedSystem {
    fn defaults(&self) -> Parameters {
        self.inner.defaults()
    }

    fn generate_key_pair(&self, overrides: &ParameterOverrides) -> KeyPair {
        self.hold(Gate::Keygen);
        self.inner.generate_key_pair(overrides)
    }

    fn encrypt(&self, message: &str, public_key: &str) -> Result<String, CryptoError> {
        self.hold(Gate::Encrypt);
        self.inner.encrypt(message, public_key)
    }

    fn decrypt(&self, ciphertext: &str, private_key: &str) -> Result<String, CryptoError> {
        self.hold(Gate::Decrypt);
        self.inner.decrypt(ciphertext, private_key)
    }

    fn validate_key(&self, key: &str) -> bool {
        self.inner.validate_key(key)
    }
}

/// Holds one `gate` request in flight and checks that a second one is refused
/// with 409, that another operation still goes through, and that the slot is
/// free again afterwards.
async fn assert_overlap_refused(gate: Gate) {
    let local = CryptoFacade::default();
    let keys = local.generate_key_pair(&ParameterOverrides::default());
    let ciphertext = local.encrypt("held", &keys.public_key).unwrap();

    let (release_tx, release_rx) = mpsc::channel();
    let state = AppState::new(GatedSystem {
        gate,
        inner: CryptoFacade::default(),
        release: Mutex::new(release_rx),
    });
    let (base_url, server) = spawn_server(state).await;
    let client = reqwest::Client::new();
    let url = |operation: Gate| format!("{base_url}{}", operation.path());

    let first = tokio::spawn({
        let request = client.post(url(gate)).json(&gate.body(&keys, &ciphertext));
        async move { request.send().await }
    });

    // Wait until the first request holds the slot.
    let mut busy = false;
    for _ in 0..100 {
        let status: StatusResponse = client
            .get(format!("{base_url}/api/status"))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("parse status");
        if gate.is_busy(status) {
            busy = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(busy, "first {gate:?} request never became busy");

    let response = client
        .post(url(gate))
        .json(&gate.body(&keys, &ciphertext))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("parse conflict");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], gate.conflict_message());

    let other = gate.other();
    let response = client
        .post(url(other))
        .json(&other.body(&keys, &ciphertext))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), other.success(), "{other:?} was blocked by {gate:?}");

    // One release for the held request, one for the follow-up below.
    release_tx.send(()).expect("release first request");
    release_tx.send(()).expect("release third request");
    let first = first.await.expect("task should finish").expect("request should succeed");
    assert_eq!(first.status(), gate.success());

    let response = client
        .post(url(gate))
        .json(&gate.body(&keys, &ciphertext))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), gate.success());

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn http_overlapping_key_generations_are_refused() {
    assert_overlap_refused(Gate::Keygen).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn http_overlapping_encryptions_are_refused() {
    assert_overlap_refused(Gate::Encrypt).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn http_overlapping_decryptions_are_refused() {
    assert_overlap_refused(Gate::Decrypt).await;
}
