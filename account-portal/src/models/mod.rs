pub mod auth;
pub mod plan;
pub mod user;

pub use auth::{AuthResponse, Credentials, OAuthCallback, RegisterData, TokenPair};
pub use plan::{PlanDuration, PlanPayment, Pricing, UserPlan};
pub use user::User;
