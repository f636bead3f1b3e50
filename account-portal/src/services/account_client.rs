use crate::config::ApiSettings;
use crate::models::{
    AuthResponse, Credentials, PlanDuration, PlanPayment, Pricing, RegisterData, TokenPair, User,
    UserPlan,
};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use service_core::error::AppError;
use service_core::observability::TracedClientExt;

/// Account API routes.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const GOOGLE: &str = "/auth/google";
    pub const REFRESH: &str = "/auth/refresh";
    pub const LOGOUT: &str = "/auth/logout";
    pub const OAUTH_PROFILE: &str = "/auth/profile";
    pub const PROFILE: &str = "/users/profile";
    pub const MY_PLANS: &str = "/user-plans/my-plans";
    pub const PLAN_DURATIONS: &str = "/plan-durations";
    pub const PLAN_PAYMENTS: &str = "/plan-payments";
}

pub struct AccountClient {
    client: Client,
    settings: ApiSettings,
}

impl AccountClient {
    pub fn new(settings: ApiSettings) -> Result<Self, AppError> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    /// Where the browser goes to start a Google sign-in.
    pub fn google_sign_in_url(&self) -> String {
        format!("{}{}", self.base_url(), endpoints::GOOGLE)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AppError> {
        let response = self
            .post(
                endpoints::LOGIN,
                json!({
                    "email": credentials.email,
                    "password": credentials.password.expose_secret(),
                }),
            )
            .await?;

        parse(response).await
    }

    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, AppError> {
        let response = self
            .post(
                endpoints::REGISTER,
                json!({
                    "firstName": data.first_name,
                    "lastName": data.last_name,
                    "email": data.email,
                    "password": data.password.expose_secret(),
                    "signUpWith": "email",
                }),
            )
            .await?;

        parse(response).await
    }

    pub async fn refresh(&self, refresh_token: &Secret<String>) -> Result<TokenPair, AppError> {
        let response = self
            .post(
                endpoints::REFRESH,
                json!({ "refreshToken": refresh_token.expose_secret() }),
            )
            .await?;

        parse(response).await
    }

    /// Revoke the session server-side.
    pub async fn logout(
        &self,
        access_token: &Secret<String>,
        refresh_token: Option<&Secret<String>>,
    ) -> Result<(), AppError> {
        let url = self.url(endpoints::LOGOUT);
        let body = match refresh_token {
            Some(token) => json!({ "refreshToken": token.expose_secret() }),
            None => json!({}),
        };

        let response = self
            .client
            .traced_post(&url)
            .bearer_auth(access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::HttpError(e)
            })?;

        ensure_success(response).await.map(|_| ())
    }

    /// Profile of the bearer of an OAuth callback token.
    pub async fn oauth_profile(&self, access_token: &Secret<String>) -> Result<User, AppError> {
        let response = self
            .get_with_auth(endpoints::OAUTH_PROFILE, access_token)
            .await?;
        parse(response).await
    }

    pub async fn profile(&self, access_token: &Secret<String>) -> Result<User, AppError> {
        let response = self.get_with_auth(endpoints::PROFILE, access_token).await?;
        parse(response).await
    }

    pub async fn plan_durations(&self) -> Result<Vec<PlanDuration>, AppError> {
        let response = self.get(endpoints::PLAN_DURATIONS).await?;
        parse(response).await
    }

    pub async fn plan_payments(&self) -> Result<Vec<PlanPayment>, AppError> {
        let response = self.get(endpoints::PLAN_PAYMENTS).await?;
        parse(response).await
    }

    /// Durations and prices together, fetched concurrently.
    pub async fn pricing(&self) -> Result<Pricing, AppError> {
        let (durations, payments) = tokio::try_join!(self.plan_durations(), self.plan_payments())?;
        Ok(Pricing {
            durations,
            payments,
        })
    }

    /// Plans held by the bearer.
    pub async fn my_plans(&self, access_token: &Secret<String>) -> Result<Vec<UserPlan>, AppError> {
        let response = self.get_with_auth(endpoints::MY_PLANS, access_token).await?;
        parse(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Send a POST request with trace context propagation.
    async fn post(&self, path: &str, body: Value) -> Result<Response, AppError> {
        let url = self.url(path);

        self.client
            .traced_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                AppError::HttpError(e)
            })
    }

    async fn get(&self, path: &str) -> Result<Response, AppError> {
        let url = self.url(path);

        self.client.traced_get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to send GET request to {}: {}", url, e);
            AppError::HttpError(e)
        })
    }

    /// Send a GET request with auth token and trace context propagation.
    async fn get_with_auth(
        &self,
        path: &str,
        access_token: &Secret<String>,
    ) -> Result<Response, AppError> {
        let url = self.url(path);

        self.client
            .traced_get(&url)
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                AppError::HttpError(e)
            })
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    tracing::warn!(status = %status, message = %message, "Account API request failed");
    Err(AppError::from_status(status, message))
}

/// The API reports `{"message": "..."}` or, for validation failures,
/// `{"message": ["...", "..."]}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        Value::Array(messages) => {
            let joined = messages
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}
