//! Web dashboard exposing the tool surface and the update stream over HTTP.

mod api;
mod error;
mod handlers;
mod server;

pub use api::StatusResponse;
pub use error::DashboardError;
pub use handlers::AppState;
pub use server::{DashboardConfig, DashboardServer, DEFAULT_PORT};
