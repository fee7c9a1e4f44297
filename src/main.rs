use scenebot::adapters::local::ProcessRunner;
use scenebot::{router, AppConfig, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scenebot=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!(
        layout = ?config.layout,
        output_root = %config.output_root.display(),
        tmp_dir = %config.tmp_dir.display(),
        processor = %config.processor.program,
        "configuration loaded"
    );

    let state = AppState::new(&config, Arc::new(ProcessRunner::new()));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    info!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
