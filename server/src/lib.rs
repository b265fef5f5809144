pub mod config;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod pipelines;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use routes::app;
pub use state::AppState;
