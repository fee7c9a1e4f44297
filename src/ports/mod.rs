//! Ports - trait seams between the application and its adapters.

pub mod runner;
