use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::room_registry::actor::RoomRegistryActor;
use crate::routes::{self, AppState};
use crate::word_bank::WordBank;

pub async fn create_web_server(config: Config, listener: TcpListener) -> std::io::Result<()> {
    let word_bank = Arc::new(WordBank::load(&config.words.file_path));
    let room_registry = RoomRegistryActor::spawn(config.room.clone(), word_bank);

    let router = routes::create_router(&config).with_state(AppState {
        room_registry,
        player_settings: config.player.clone(),
    });

    log::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}
