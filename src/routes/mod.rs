use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::config::{Config, PlayerSettings};
use crate::room_registry::actor_client::RoomRegistryClient;

mod health;
mod metrics;
mod room;

#[derive(Clone)]
pub struct AppState {
    pub room_registry: RoomRegistryClient,
    pub player_settings: PlayerSettings,
}

pub fn create_router(config: &Config) -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::get))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/ws", get(room::connect_player_to_websocket))
        .layer(if config.allow_cors {
            log::info!("CorsLayer Permissive");
            CorsLayer::permissive()
        } else {
            CorsLayer::default()
        })
}
