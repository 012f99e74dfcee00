//! Offline cache and synchronization core for the Alumni Portal client.
//!
//! The crate keeps a local SQLite mirror of the portal's remote collections
//! (alumni profiles, job postings, events, chat messages) and reconciles it
//! incrementally: each pass fetches documents modified since the last
//! watermark, converts them to cache rows and replaces them by id. The
//! orchestrator schedules passes under network/battery preconditions with
//! keep/replace de-duplication and bounded backoff. Directory and chat
//! screens read the cache; only the executor talks to the remote store.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod shared;

pub use application::ports::{
    ConnectivityProbe, IdentityProvider, RemoteDocument, RemoteDocumentSource,
};
pub use application::services::{PassSummary, SyncExecutor, SyncOrchestrator};
pub use domain::value_objects::{EntityKind, SyncStatus};
pub use runtime::SyncRuntime;
pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};
