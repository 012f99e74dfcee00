use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::value_objects::SyncStatus;

use super::mappers::split_list;

/// Cached alumni profile. Primary key `user_id` is the remote document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CachedUser {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub graduation_year: Option<String>,
    pub major: Option<String>,
    pub current_job_title: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
    pub skills: String,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    pub is_mentor: bool,
    pub mentor_expertise: Option<String>,
    pub is_online: bool,
    pub last_seen: i64,
    pub privacy_profile_visible: bool,
    pub privacy_contact_visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_sync: i64,
    pub sync_status: String,
}

impl CachedUser {
    pub fn skills_list(&self) -> Vec<String> {
        split_list(&self.skills)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CachedJobPosting {
    pub job_id: String,
    pub company: String,
    pub position: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub job_type: String,
    pub experience_level: String,
    pub salary_range: String,
    pub application_deadline: i64,
    pub application_url: Option<String>,
    pub posted_by_user_id: String,
    pub posted_by_name: String,
    pub posted_at: i64,
    pub is_active: bool,
    pub tags: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_sync: i64,
    pub sync_status: String,
}

impl CachedJobPosting {
    pub fn requirements_list(&self) -> Vec<String> {
        split_list(&self.requirements)
    }

    pub fn tags_list(&self) -> Vec<String> {
        split_list(&self.tags)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CachedEvent {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub start_time: i64,
    pub end_time: i64,
    pub location: String,
    pub venue: String,
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    pub max_attendees: i64,
    pub current_attendees: i64,
    pub registration_deadline: i64,
    pub is_paid: bool,
    pub price: f64,
    pub currency: String,
    pub organizer_id: String,
    pub organizer_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub tags: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_sync: i64,
    pub sync_status: String,
}

impl CachedEvent {
    pub fn tags_list(&self) -> Vec<String> {
        split_list(&self.tags)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CachedChatMessage {
    pub message_id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub message_type: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: i64,
    pub timestamp: i64,
    pub is_read: bool,
    pub read_timestamp: i64,
    pub reply_to_message_id: Option<String>,
    pub is_edited: bool,
    pub edit_timestamp: i64,
    pub is_deleted: bool,
    pub delete_timestamp: i64,
    pub updated_at: i64,
    pub last_sync: i64,
    pub sync_status: String,
}

impl CachedChatMessage {
    /// A message composed on this device, not yet confirmed by the remote
    /// store. Gets a fresh id and `pending` status; the send path flips it
    /// to `synced` once the remote write is acknowledged.
    pub fn new_local(
        chat_id: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            message_id: Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            content: content.into(),
            message_type: "text".to_string(),
            file_url: None,
            file_name: None,
            file_size: 0,
            timestamp: now,
            is_read: false,
            read_timestamp: 0,
            reply_to_message_id: None,
            is_edited: false,
            edit_timestamp: 0,
            is_deleted: false,
            delete_timestamp: 0,
            updated_at: now,
            last_sync: 0,
            sync_status: SyncStatus::Pending.as_str().to_string(),
        }
    }
}
