use serde::{Deserialize, Serialize};

/// An alumni profile as stored in the remote `users` collection. Documents
/// written by older client versions may omit most fields, so everything is
/// defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub email: String,
    pub full_name: String,
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub graduation_year: Option<String>,
    pub major: Option<String>,
    pub current_job_title: Option<String>,
    pub current_company: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    pub is_mentor: bool,
    pub mentor_expertise: Option<String>,
    pub is_online: bool,
    pub last_seen: i64,
    pub privacy_profile_visibility: bool,
    pub privacy_contact_visibility: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
