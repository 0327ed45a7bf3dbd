use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use crate::player::actor::PlayerActor;
use crate::routes::AppState;

pub async fn connect_player_to_websocket(
    State(state): State<AppState>,
    websocket_upgrade: WebSocketUpgrade,
) -> Response {
    websocket_upgrade.on_upgrade(move |websocket| async move {
        PlayerActor::create(
            websocket,
            state.room_registry,
            state.player_settings.inactivity_timeout(),
        )
        .await
    })
}
