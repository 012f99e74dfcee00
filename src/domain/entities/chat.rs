use serde::{Deserialize, Serialize};

/// A chat thread document. Only used to enumerate the threads the current
/// user participates in before a per-thread message pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatThread {
    #[serde(skip)]
    pub chat_id: String,
    pub participant_ids: Vec<String>,
}

impl ChatThread {
    pub fn new(chat_id: impl Into<String>, participant_ids: Vec<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            participant_ids,
        }
    }
}

/// A message document within a thread's `messages` subcollection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMessage {
    pub chat_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// "text", "image", "file" or "system"; empty means "text".
    pub message_type: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: i64,
    pub timestamp: i64,
    pub read_status: bool,
    pub read_timestamp: i64,
    pub reply_to_message_id: Option<String>,
    pub is_edited: bool,
    pub edit_timestamp: i64,
    pub is_deleted: bool,
    pub delete_timestamp: i64,
}
