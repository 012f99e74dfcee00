use serde::{Deserialize, Serialize};
use std::fmt;

/// A syncable collection. `All` runs the four concrete kinds in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    JobPostings,
    Events,
    ChatMessages,
    All,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::JobPostings => "job_postings",
            EntityKind::Events => "events",
            EntityKind::ChatMessages => "chat_messages",
            EntityKind::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "users" => Some(EntityKind::Users),
            "job_postings" => Some(EntityKind::JobPostings),
            "events" => Some(EntityKind::Events),
            "chat_messages" => Some(EntityKind::ChatMessages),
            "all" => Some(EntityKind::All),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
