//! Run Store, Run Logger, current-run context, and Screenshot Pipeline
//! (C5, C6, C7).

pub mod context;
pub mod error;
pub mod logger;
pub mod models;
pub mod screenshot;
pub mod store;
pub mod utils;

pub use context::ContextStore;
pub use error::RunError;
pub use logger::RunLogger;
pub use models::{
    ActionType, CurrentRunContext, ExecutionMethod, InsightEntry, InsightType, LogEntry, LogStatus,
    RunInstance, RunStatus, ScreenshotRecord,
};
pub use screenshot::ScreenshotPipeline;
pub use store::{RunStatistics, RunStore, RunSummary};
