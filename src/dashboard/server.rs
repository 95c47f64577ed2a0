//! Dashboard HTTP server with axum router and graceful shutdown.

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_events_sse, get_status, get_tools, post_agent_connect, post_agent_disconnect, post_finish,
    post_tool, post_workout, AppState,
};
use super::DashboardError;
use crate::runtime::WorkoutHandle;

/// Default port for the dashboard server.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the dashboard server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host address to bind to.
    pub host: String,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            cors_permissive: true,
        }
    }
}

/// HTTP front end for a running workout.
pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
    cancel: CancellationToken,
}

impl DashboardServer {
    /// Create a server with default configuration.
    #[must_use]
    pub fn new(workout: WorkoutHandle, cancel: CancellationToken) -> Self {
        Self {
            config: DashboardConfig::default(),
            state: AppState::new(workout),
            cancel,
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/api/status", get(get_status))
            .route("/api/events", get(get_events_sse))
            .route("/api/tools", get(get_tools))
            .route("/api/tools/:name", post(post_tool))
            .route("/api/workout", post(post_workout))
            .route("/api/workout/finish", post(post_finish))
            .route("/api/agent/connect", post(post_agent_connect))
            .route("/api/agent/disconnect", post(post_agent_disconnect))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server until the cancellation token fires, then shut down
    /// gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), DashboardError> {
        let addr = self.address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| DashboardError::BindError {
                address: addr.clone(),
                source,
            })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), DashboardError> {
        let cancel = self.cancel.clone();
        let app = self.build_router();

        if let Ok(local) = listener.local_addr() {
            tracing::info!(address = %local, "Starting dashboard server");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Dashboard server shutting down gracefully");
            })
            .await?;
        Ok(())
    }
}
