pub mod sync_executor;
pub mod sync_orchestrator;

pub use sync_executor::{PassSummary, RowSink, SyncExecutor};
pub use sync_orchestrator::{SyncOrchestrator, SyncStatusReport};
