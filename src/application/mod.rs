pub mod ports;
pub mod services;

pub use services::{PassSummary, SyncExecutor, SyncOrchestrator};
