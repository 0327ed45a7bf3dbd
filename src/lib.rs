pub mod config;
pub mod error;
pub mod metrics;
pub mod player;
pub mod room;
pub mod room_registry;
pub mod startup;
pub mod word_bank;

mod routes;
mod websocket;
