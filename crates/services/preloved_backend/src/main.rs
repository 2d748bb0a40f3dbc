use preloved_backend::{app_state::AppState, build_app};
use preloved_common::logging;
use preloved_config::{ensure_dotenv_loaded, load_config};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let dotenv_path = ensure_dotenv_loaded();
    logging::init();
    info!("Environment loaded from {}", dotenv_path);

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    let state = match AppState::new(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize services: {}", e);
            process::exit(1);
        }
    };
    let app = build_app(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };
    info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
