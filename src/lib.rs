//! scenebot - upload front-end for the scene optimisation script
//!
//! Hexagonal layout:
//! - domain/: paths, upload inputs, job records, file name rules
//! - ports/: trait definitions
//! - adapters/: local filesystem and process implementations
//! - application/: background job dispatch
//! - http/: axum routes and pages
//! - config: environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod ports;

pub use config::AppConfig;
pub use http::{router, AppState};
