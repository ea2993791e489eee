//! Room relay server for the shared canvas.
//!
//! Relays cursor positions and shape operations between clients in the same
//! room, and persists shapes so that late joiners can fetch the history.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=secret cargo run --bin sketchroom-server
//! cargo run --bin sketchroom-server -- --port 3000 --jwt-secret secret --database-url sqlite://shapes.db
//! ```

use std::sync::Arc;

use clap::Parser;
use sketchroom_server::{
    domain::ShapeStore,
    infrastructure::{
        auth::JwtTokenVerifier,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemorySessionRegistry, InMemoryShapeStore, SqliteShapeStore},
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, CreateShapeUseCase, DEFAULT_HISTORY_LIMIT, DeleteShapesUseCase,
        DisconnectSessionUseCase, GetShapeHistoryUseCase, RelayCursorUseCase,
        RoomMembershipUseCase,
    },
};
use sketchroom_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "sketchroom-server")]
#[command(about = "Real-time room relay with shape history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Secret used to verify HS256 bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// SQLite URL for the shape store (in-memory store when omitted)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Number of events returned by GET /chats/{room_id}
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Frontend origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Stores, registry and verifier
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Shape store (SQLite if configured, otherwise in-memory)
    let store: Arc<dyn ShapeStore> = match args.database_url.as_deref() {
        Some(url) => match SqliteShapeStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Using SQLite shape store at {}", url);
                Arc::new(store)
            }
            Err(e) => {
                tracing::error!("Failed to open shape store: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("DATABASE_URL is not set; shapes will be lost on restart");
            Arc::new(InMemoryShapeStore::new())
        }
    };
    let registry = Arc::new(InMemorySessionRegistry::new());
    let verifier = Arc::new(JwtTokenVerifier::new(&args.jwt_secret));

    // 2. MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        verifier,
        registry.clone(),
        message_pusher.clone(),
        Arc::new(SystemClock),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let room_membership_usecase = Arc::new(RoomMembershipUseCase::new(registry.clone()));
    let relay_cursor_usecase = Arc::new(RelayCursorUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let create_shape_usecase = Arc::new(CreateShapeUseCase::new(
        registry.clone(),
        store.clone(),
        message_pusher.clone(),
    ));
    let delete_shapes_usecase = Arc::new(DeleteShapesUseCase::new(
        registry.clone(),
        store.clone(),
        message_pusher.clone(),
    ));
    let get_shape_history_usecase =
        Arc::new(GetShapeHistoryUseCase::new(store, args.history_limit));

    // 4. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        room_membership_usecase,
        relay_cursor_usecase,
        create_shape_usecase,
        delete_shapes_usecase,
        get_shape_history_usecase,
    )
    .with_frontend_url(args.frontend_url);

    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
