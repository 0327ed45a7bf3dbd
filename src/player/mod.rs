pub mod actor;
pub mod player_id;

use self::player_id::PlayerId;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Player {
            id,
            name: name.to_string(),
            alive: true,
        }
    }
}
