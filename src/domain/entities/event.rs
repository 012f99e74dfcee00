use serde::{Deserialize, Serialize};

/// An event document from the remote `alumni_events` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlumniEvent {
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
    /// Empty when the organizer never picked one; the cache substitutes the
    /// portal's default currency on conversion.
    pub currency: String,
    pub organizer_id: String,
    pub organizer_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
