mod config;
mod error;
mod labels;
mod pipeline;
mod services;
mod session;
mod state;
mod tabular;

use crate::config::AppConfig;
use crate::session::FsSessionStore;
use crate::state::AppState;
use actix_web::{web, App, HttpResponse, HttpServer};
use env_logger::Env;
use log::info;
use std::sync::Arc;

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not Found")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    let store = FsSessionStore::open(&config.data_dir)?;
    info!(
        "session data in {}, fonts from {}",
        store.root().display(),
        config.fonts_dir.display()
    );

    let host = config.host.clone();
    let port = config.port;
    // multipart bodies are capped while streaming; allow a little framing overhead
    let payload_limit = config.max_upload_bytes + 64 * 1024;
    let state = AppState::new(Arc::new(store), config);

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(payload_limit))
            .app_data(web::Data::new(state.clone()))
            .service(services::records::configure_routes())
            .service(services::labels::configure_routes())
            .default_service(web::route().to(not_found))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
