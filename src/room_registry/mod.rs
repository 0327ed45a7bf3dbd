pub mod actor;
pub mod actor_client;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RoomSettings;
use crate::room::actor::RoomActor;
use crate::room::actor_client::RoomClient;
use crate::room_registry::actor_client::RoomRegistryClient;
use crate::word_bank::WordBank;

/// Every live room of the process, keyed by room id.
pub struct RoomRegistry {
    rooms: HashMap<String, RoomClient>,
    settings: RoomSettings,
    word_bank: Arc<WordBank>,
    next_instance: u64,
}

impl RoomRegistry {
    pub const DEFAULT_ROOM_ID: &'static str = "default";

    pub fn new(settings: RoomSettings, word_bank: Arc<WordBank>) -> Self {
        RoomRegistry {
            rooms: HashMap::default(),
            settings,
            word_bank,
            next_instance: 0,
        }
    }

    pub fn normalize_room_id(room_id: &str) -> String {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            RoomRegistry::DEFAULT_ROOM_ID.to_string()
        } else {
            room_id.to_string()
        }
    }

    /// Returns the room with this id, spawning it first if there is none or the existing
    /// one already stopped.
    pub fn get_or_create(
        &mut self,
        room_id: &str,
        room_registry: RoomRegistryClient,
    ) -> RoomClient {
        let room_id = RoomRegistry::normalize_room_id(room_id);
        if let Some(room) = self.rooms.get(&room_id) {
            if !room.is_closed() {
                return room.clone();
            }
            log::debug!("Room {room_id} is stopping, replacing it with a new one.");
        }

        self.next_instance += 1;
        let room = RoomActor::spawn(
            &room_id,
            self.next_instance,
            self.settings.clone(),
            self.word_bank.clone(),
            room_registry,
        );
        self.rooms.insert(room_id, room.clone());
        room
    }

    /// Removes the room only if it is still the same instance. A room that stopped
    /// after being replaced must not take its successor with it.
    pub fn remove(&mut self, room_id: &str, instance: u64) -> Option<RoomClient> {
        match self.rooms.get(room_id) {
            Some(room) if room.instance() == instance => {
                log::info!("Room removed. RoomId: '{room_id}', Instance: '{instance}'.");
                self.rooms.remove(room_id)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
