#![deny(missing_docs)]
//! A web server for the lattice encryption demo, serving the JSON API browser front ends call.

use lattice_core::CryptoFacade;
use lattice_web::config::WebConfig;
use lattice_web::{AppState, router};
use local_ip_address::local_ip;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env().unwrap_or_else(|e| {
        error!("Invalid configuration: {e}");
        process::exit(1);
    });
    info!(
        "Default parameters: dimension {}, modulus {}, error bound {}, key size {}.",
        config.defaults.dimension,
        config.defaults.modulus,
        config.defaults.error_bound,
        config.defaults.key_size
    );

    let app_state = Arc::new(AppState::new(CryptoFacade::new(config.defaults)));
    let app = router(app_state);

    // Run the server.
    let port = config.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap_or_else(|e| {
        error!("Failed to bind {addr}: {e}");
        process::exit(1);
    });

    println!("listening on:");
    match local_ip() {
        Ok(my_local_ip) => println!("  - http://{my_local_ip}:{port}/api/status"),
        Err(e) => warn!("Could not determine the local IP address: {e}"),
    }
    println!("  - http://127.0.0.1:{port}/api/status");

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {e}");
        process::exit(1);
    }
}
