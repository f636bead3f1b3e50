pub mod config;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;

pub use session::{AuthSession, LoginOutcome};
