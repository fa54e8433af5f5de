use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod gitlab;
mod llm;
mod orchestrator;
mod parser;
mod position;
mod prompt;
mod types;

use api::AppState;
use config::AppConfig;
use gitlab::GitLabClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("configuration error: {e}");
        std::process::exit(1);
    });

    let state = AppState {
        gitlab: Arc::new(GitLabClient::new(
            config.gitlab.host.clone(),
            config.gitlab.token.clone(),
        )),
        backend: Arc::from(llm::backend_from_config(&config.llm)),
    };

    let bind_addr = (config.server.host.clone(), config.server.port);
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "code reviewer listening"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
