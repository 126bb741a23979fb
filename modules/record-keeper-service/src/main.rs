//! Record Keeper Service: a small file-backed notes site.
//!
//! Serves HTML pages for creating, showing, editing and deleting records,
//! plus a JSON RPC status API on the same port.
//! Default: http://127.0.0.1:5050/

mod config;
mod pages;
mod routes;
mod store;

use axum::routing::{get, post};
use config::Config;
use routes::AppState;
use std::sync::Arc;
use std::time::Instant;
use store::RecordStore;

fn app(state: Arc<AppState>) -> axum::Router {
    let cors = tower_http::cors::CorsLayer::permissive();

    axum::Router::new()
        .route("/", get(routes::index))
        .route("/new", get(routes::new_record))
        .route("/new/", get(routes::new_record))
        .route("/create", post(routes::create))
        .route("/create/", post(routes::create))
        .route("/show/:slug", get(routes::show))
        .route("/edit/:slug", get(routes::edit))
        .route("/save/:slug", post(routes::save))
        .route("/delete/:slug", get(routes::delete).post(routes::delete))
        // RPC
        .route("/rpc/records/list", get(routes::list_records))
        .route("/rpc/status", get(routes::status))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(cors)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Opening records directory at: {}", config.records_dir.display());
    let store = match RecordStore::open(&config.records_dir).await {
        Ok(store) => store,
        Err(e) => {
            log::error!(
                "Failed to open records directory {}: {}",
                config.records_dir.display(),
                e
            );
            return Err(std::io::Error::other(e));
        }
    };

    let state = Arc::new(AppState {
        store: Arc::new(store),
        start_time: Instant::now(),
    });

    let addr = config.listen_addr();
    log::info!("Record Keeper Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await
}
