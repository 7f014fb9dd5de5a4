//! GiftDraw room server binary.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::HeaderValue,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use giftdraw_rs::config::Config;
use giftdraw_rs::handlers;
use giftdraw_rs::notify::ChannelNotifier;
use giftdraw_rs::protocol::ServerMessage;
use giftdraw_rs::router;
use giftdraw_rs::state::AppState;
use giftdraw_rs::store::{HttpStore, MemoryStore, Store};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

type ServerContext = (Arc<AppState>, Arc<ChannelNotifier>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn Store> = if config.store.url.is_empty() {
        tracing::info!("No store endpoint configured, using in-process store");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!(endpoint = %config.store.url, "Using REST store backend");
        Arc::new(HttpStore::new(&config.store.url, &config.store.token))
    };

    let notifier = Arc::new(ChannelNotifier::new());
    let state = Arc::new(AppState::new(config.clone(), store, notifier.clone()));

    let cors = if config.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state((state, notifier));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 GiftDraw server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("WebSocket: ws://{}/ws", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>GiftDraw Server</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "giftdraw-rs",
        "timestamp": std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State((state, notifier)): State<ServerContext>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, notifier))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, notifier: Arc<ChannelNotifier>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let conn_id = Uuid::new_v4().to_string();
    notifier.register(&conn_id, tx);
    tracing::info!(conn = %conn_id, "New connection established");

    // Outbound pump
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Inbound envelopes are processed in arrival order, one at a time.
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                router::handle_envelope(&state, &conn_id, &text).await;
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    handlers::disconnect(&state, &conn_id);
    notifier.unregister(&conn_id);
    send_task.abort();
}
