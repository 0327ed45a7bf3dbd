use lazy_static::lazy_static;
use prometheus::{IntGauge, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_ROOMS: IntGauge =
        IntGauge::new("impostor_active_rooms", "Rooms with a running room actor")
            .expect("metric cannot be created");
    pub static ref CONNECTED_PLAYERS: IntGauge =
        IntGauge::new("impostor_connected_players", "Amount of players connected")
            .expect("metric cannot be created");
}

pub fn register_metrics() {
    for gauge in [ACTIVE_ROOMS.clone(), CONNECTED_PLAYERS.clone()] {
        if let Err(error) = REGISTRY.register(Box::new(gauge)) {
            log::error!("Could not register metric. Error: '{error}'.");
        }
    }
}
