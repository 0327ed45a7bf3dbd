use std::{fmt::Display, sync::Arc};

use rand::distributions::{Alphanumeric, DistString};
use serde::{Serialize, Serializer};

/// Connection-scoped identity of a player. Cheap to clone, it's shared between the
/// room state, the vote map and every outbound message.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId {
    value: Arc<str>,
}

impl PlayerId {
    const LENGTH: usize = 16;

    pub fn random() -> Self {
        Self::from_owned(Alphanumeric.sample_string(&mut rand::thread_rng(), PlayerId::LENGTH))
    }

    pub fn from_owned(value: String) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn from_slice(value: &str) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_slice(&self) -> &str {
        &self.value
    }
}

// Use explicit implementation of Clone instead of derived one for code clarity
impl Clone for PlayerId {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        PlayerId::from_owned(value)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        PlayerId::from_slice(value)
    }
}

impl Serialize for PlayerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_slice())
    }
}
