//! service-core: Shared infrastructure for the Quiz Solver account crates.
pub mod config;
pub mod error;
pub mod observability;

pub use secrecy;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
