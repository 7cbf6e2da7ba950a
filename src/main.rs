mod config;
mod error;
mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::llm::LlmClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    let client = LlmClient::from_env().expect("completion gateway config invalid");
    tracing::info!(provider = client.provider_name(), model = client.model(), "completion gateway ready");

    let addr = config.listen_addr();
    let state = state::AppState::new(Arc::new(client), config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "leafdoc listening");
    axum::serve(listener, app).await.expect("server failed");
}
