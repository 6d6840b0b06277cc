pub mod api;
pub mod core;
pub mod edgar;
pub mod metrics;
pub mod summarize;
pub mod template;
pub mod utils;

// Re-exports
pub use crate::core::config::AppConfig;
pub use crate::core::error::{PipelineError, PipelineResult};
pub use crate::core::service::TemplateService;
pub use crate::template::GenerateResponse;
pub use crate::utils::progress::ProgressTracker;
