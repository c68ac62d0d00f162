use async_trait::async_trait;
use serde_json::Value;

use crate::domain::AuthError;

/// What the auth service answered, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAuthResponse {
    pub status: u16,
    /// `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

/// Outbound port for the sign-in/registration service.
///
/// Implementations only return `Err` when no response arrived at all.
/// Non-2xx answers are returned as `Ok` so the caller can read the body.
#[async_trait]
pub trait AuthClient: Send + Sync + 'static {
    async fn sign_in(&self, identifier: &str, password: &str)
        -> Result<RawAuthResponse, AuthError>;

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RawAuthResponse, AuthError>;
}
