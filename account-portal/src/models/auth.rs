use super::user::User;
use secrecy::Secret;
use serde::Deserialize;

pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

pub struct RegisterData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Secret<String>,
}

/// Body of a successful login or registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: Secret<String>,
    #[serde(default)]
    pub refresh_token: Option<Secret<String>>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: Secret<String>,
    #[serde(default)]
    pub refresh_token: Option<Secret<String>>,
}

/// Query parameters the Google OAuth flow redirects back with.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallback {
    pub token: Option<String>,
    pub error: Option<String>,
}
