use serde::{Deserialize, Serialize};

/// A job posting document from the remote `job_postings` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPosting {
    pub company: String,
    pub position: String,
    pub description: String,
    pub requirements: Vec<String>,
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
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
