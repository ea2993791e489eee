//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::usecase::{
    ConnectSessionUseCase, CreateShapeUseCase, DeleteShapesUseCase, DisconnectSessionUseCase,
    GetShapeHistoryUseCase, RelayCursorUseCase, RoomMembershipUseCase,
};

use super::{
    handler::{get_chats, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room relay server
///
/// Serves the WebSocket relay on `/ws` and the shape history on `/chats/{room_id}`.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     room_membership_usecase,
///     relay_cursor_usecase,
///     create_shape_usecase,
///     delete_shapes_usecase,
///     get_shape_history_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// CORS を許可するフロントエンドのオリジン
    frontend_url: Option<String>,
}

impl Server {
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        room_membership_usecase: Arc<RoomMembershipUseCase>,
        relay_cursor_usecase: Arc<RelayCursorUseCase>,
        create_shape_usecase: Arc<CreateShapeUseCase>,
        delete_shapes_usecase: Arc<DeleteShapesUseCase>,
        get_shape_history_usecase: Arc<GetShapeHistoryUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_session_usecase,
                disconnect_session_usecase,
                room_membership_usecase,
                relay_cursor_usecase,
                create_shape_usecase,
                delete_shapes_usecase,
                get_shape_history_usecase,
            }),
            frontend_url: None,
        }
    }

    /// Allow cross-origin HTTP requests from the given frontend origin.
    pub fn with_frontend_url(mut self, frontend_url: Option<String>) -> Self {
        self.frontend_url = frontend_url;
        self
    }

    /// Build the router with all endpoints and middleware.
    pub fn router(&self) -> Router {
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/chats/{room_id}", get(get_chats))
            .route("/api/health", get(health_check))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        match self.cors_layer() {
            Some(cors) => app.layer(cors),
            None => app,
        }
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        let origin = self.frontend_url.as_deref()?;
        match HeaderValue::from_str(origin) {
            Ok(origin) => Some(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::exact(origin))
                    .allow_methods([Method::GET])
                    .allow_headers(Any),
            ),
            Err(e) => {
                tracing::warn!("Ignoring invalid frontend URL '{}': {}", origin, e);
                None
            }
        }
    }

    /// Run the server on the given host and port until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<token>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener (no shutdown signal handling).
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        axum::serve(listener, self.router()).await
    }
}
