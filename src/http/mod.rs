//! HTTP layer - routes, handlers and HTML pages.

pub mod download;
pub mod jobs;
pub mod pages;
pub mod upload;


use crate::application::{Dispatcher, JobRegistry};
use crate::config::AppConfig;
use crate::domain::jobs::ProcessorCommand;
use crate::domain::layout::{Layout, OutputLayout};
use crate::ports::runner::CommandRunner;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub layout: Layout,
    pub processor: ProcessorCommand,
    pub default_margin: String,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: &AppConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let layout = Layout::new(&config.output_root, &config.tmp_dir, config.layout);
        // Isolated jobs own their workspace, so it can go once the job is done.
        // In the shared layout the next upload sweeps it instead.
        let remove_workspace = config.layout == OutputLayout::Isolated;

        Self {
            layout,
            processor: config.processor.clone(),
            default_margin: config.default_margin.clone(),
            dispatcher: Arc::new(Dispatcher::new(
                runner,
                JobRegistry::new(config.job_history),
                remove_workspace,
            )),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/process", post(upload::process))
        .route("/download", get(download::list))
        .route("/download/", get(download::list))
        .route("/download/:filename", get(download::file))
        .route("/jobs/:id", get(jobs::status))
        .route("/jobs/:id/download/", get(jobs::list))
        .route("/jobs/:id/download/:filename", get(jobs::file))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
