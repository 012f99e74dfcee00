use crate::application::ports::RemoteDocument;
use crate::domain::entities::{AlumniEvent, ChatMessage, JobPosting, User};
use crate::domain::value_objects::SyncStatus;
use crate::shared::error::AppError;

use super::rows::{CachedChatMessage, CachedEvent, CachedJobPosting, CachedUser};

/// Currency applied to paid events whose document carries none.
pub const DEFAULT_CURRENCY: &str = "UGX";

const DEFAULT_MESSAGE_TYPE: &str = "text";

const LIST_DELIMITER: &str = ",";

/// Flattens an ordered string collection into the single delimited TEXT
/// column the cache schema uses.
pub fn join_list(values: &[String]) -> String {
    values.join(LIST_DELIMITER)
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .collect()
}

pub fn user_row(doc: RemoteDocument, last_sync: i64) -> Result<CachedUser, AppError> {
    let user: User = serde_json::from_value(doc.data)
        .map_err(|err| AppError::Deserialization(format!("user {}: {}", doc.id, err)))?;

    Ok(CachedUser {
        user_id: doc.id,
        email: user.email,
        full_name: user.full_name,
        profile_image_url: user.profile_image_url,
        bio: user.bio,
        graduation_year: user.graduation_year,
        major: user.major,
        current_job_title: user.current_job_title,
        current_company: user.current_company,
        location: user.location,
        skills: join_list(&user.skills),
        linkedin_url: user.linkedin_url,
        github_url: user.github_url,
        website_url: user.website_url,
        is_mentor: user.is_mentor,
        mentor_expertise: user.mentor_expertise,
        is_online: user.is_online,
        last_seen: user.last_seen,
        privacy_profile_visible: user.privacy_profile_visibility,
        privacy_contact_visible: user.privacy_contact_visibility,
        created_at: user.created_at,
        updated_at: user.updated_at,
        last_sync,
        sync_status: SyncStatus::Synced.as_str().to_string(),
    })
}

pub fn job_posting_row(doc: RemoteDocument, last_sync: i64) -> Result<CachedJobPosting, AppError> {
    let job: JobPosting = serde_json::from_value(doc.data)
        .map_err(|err| AppError::Deserialization(format!("job posting {}: {}", doc.id, err)))?;

    Ok(CachedJobPosting {
        job_id: doc.id,
        company: job.company,
        position: job.position,
        description: job.description,
        requirements: join_list(&job.requirements),
        location: job.location,
        job_type: job.job_type,
        experience_level: job.experience_level,
        salary_range: job.salary_range,
        application_deadline: job.application_deadline,
        application_url: job.application_url,
        posted_by_user_id: job.posted_by_user_id,
        posted_by_name: job.posted_by_name,
        posted_at: job.posted_at,
        is_active: job.is_active,
        tags: join_list(&job.tags),
        created_at: job.created_at,
        updated_at: job.updated_at,
        last_sync,
        sync_status: SyncStatus::Synced.as_str().to_string(),
    })
}

pub fn event_row(doc: RemoteDocument, last_sync: i64) -> Result<CachedEvent, AppError> {
    let event: AlumniEvent = serde_json::from_value(doc.data)
        .map_err(|err| AppError::Deserialization(format!("event {}: {}", doc.id, err)))?;

    let currency = if event.currency.trim().is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        event.currency
    };

    Ok(CachedEvent {
        event_id: doc.id,
        title: event.title,
        description: event.description,
        category: event.category,
        start_time: event.start_time,
        end_time: event.end_time,
        location: event.location,
        venue: event.venue,
        is_virtual: event.is_virtual,
        meeting_link: event.meeting_link,
        max_attendees: event.max_attendees,
        current_attendees: event.current_attendees,
        registration_deadline: event.registration_deadline,
        is_paid: event.is_paid,
        price: event.price,
        currency,
        organizer_id: event.organizer_id,
        organizer_name: event.organizer_name,
        contact_email: event.contact_email,
        contact_phone: event.contact_phone,
        image_url: event.image_url,
        tags: join_list(&event.tags),
        is_active: event.is_active,
        created_at: event.created_at,
        updated_at: event.updated_at,
        last_sync,
        sync_status: SyncStatus::Synced.as_str().to_string(),
    })
}

pub fn message_row(
    chat_id: &str,
    doc: RemoteDocument,
    last_sync: i64,
) -> Result<CachedChatMessage, AppError> {
    let message: ChatMessage = serde_json::from_value(doc.data)
        .map_err(|err| AppError::Deserialization(format!("chat message {}: {}", doc.id, err)))?;

    let chat_id = if message.chat_id.is_empty() {
        chat_id.to_string()
    } else {
        message.chat_id
    };
    let message_type = if message.message_type.trim().is_empty() {
        DEFAULT_MESSAGE_TYPE.to_string()
    } else {
        message.message_type
    };

    Ok(CachedChatMessage {
        message_id: doc.id,
        chat_id,
        sender_id: message.sender_id,
        sender_name: message.sender_name,
        content: message.content,
        message_type,
        file_url: message.file_url,
        file_name: message.file_name,
        file_size: message.file_size,
        timestamp: message.timestamp,
        is_read: message.read_status,
        read_timestamp: message.read_timestamp,
        reply_to_message_id: message.reply_to_message_id,
        is_edited: message.is_edited,
        edit_timestamp: message.edit_timestamp,
        is_deleted: message.is_deleted,
        delete_timestamp: message.delete_timestamp,
        updated_at: last_sync,
        last_sync,
        sync_status: SyncStatus::Synced.as_str().to_string(),
    })
}
