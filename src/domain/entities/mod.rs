mod chat;
mod event;
mod job_posting;
mod user;

pub use chat::{ChatMessage, ChatThread};
pub use event::AlumniEvent;
pub use job_posting::JobPosting;
pub use user::User;
