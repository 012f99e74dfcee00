pub mod event_cache;
pub mod job_cache;
pub mod mappers;
pub mod message_cache;
pub mod rows;
pub mod user_cache;
pub mod watermarks;

pub use event_cache::EventCache;
pub use job_cache::JobPostingCache;
pub use message_cache::ChatMessageCache;
pub use rows::{CachedChatMessage, CachedEvent, CachedJobPosting, CachedUser};
pub use user_cache::UserCache;
pub use watermarks::WatermarkStore;
