use std::sync::Arc;

use serde_json::Value;

use super::models::{EmailAddress, SessionIdentity};
use super::ports::outbound::{AuthClient, KeyValueStore};
use super::{AuthError, SessionGate};

const SIGN_IN_FAILED: &str = "Sign-in failed.";
const REGISTRATION_FAILED: &str = "Registration failed.";

/// The interpreted answer of the auth service.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthReply {
    Success {
        /// `None` when the reply had no usable `user` object.
        identity: Option<SessionIdentity>,
        message: Option<String>,
    },
    Failure(Option<String>),
}

impl AuthReply {
    /// Success needs a 2xx status and a boolean `ok: true`; anything else fails.
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let ok = body
            .and_then(|b| b.get("ok"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if (200..300).contains(&status) && ok {
            return Self::Success {
                identity: body
                    .and_then(|b| b.get("user"))
                    .and_then(SessionIdentity::from_value),
                message: string_field(body, "message"),
            };
        }

        Self::Failure(string_field(body, "error"))
    }
}

fn string_field(body: Option<&Value>, field: &str) -> Option<String> {
    body.and_then(|b| b.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(trimmed)
}

/// Sign-in and registration against the auth service.
pub struct AuthFlow<A: AuthClient, K: KeyValueStore> {
    client: Arc<A>,
    gate: Arc<SessionGate<K>>,
}

impl<A: AuthClient, K: KeyValueStore> AuthFlow<A, K> {
    pub fn new(client: Arc<A>, gate: Arc<SessionGate<K>>) -> Self {
        Self { client, gate }
    }

    /// Signs in with a username or email.
    ///
    /// `Ok(None)` means the server accepted the credentials but did not return
    /// a usable identity, so nothing was stored.
    pub async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<SessionIdentity>, AuthError> {
        let identifier = required(identifier, "identifier")?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        tracing::debug!(identifier, "Signing in");
        let response = self.client.sign_in(identifier, password).await?;

        match AuthReply::from_response(response.status, response.body.as_ref()) {
            AuthReply::Success {
                identity: Some(identity),
                ..
            } => {
                if let Err(err) = self.gate.store_identity(&identity).await {
                    tracing::error!(error = %err, "Failed to persist session");
                    return Err(AuthError::Transport(err.to_string()));
                }
                Ok(Some(identity))
            }
            AuthReply::Success { identity: None, .. } => {
                tracing::warn!(
                    status = response.status,
                    "Sign-in succeeded without a usable identity"
                );
                Ok(None)
            }
            AuthReply::Failure(message) => Err(AuthError::Rejected(
                message.unwrap_or_else(|| SIGN_IN_FAILED.to_string()),
            )),
        }
    }

    /// Creates an account and returns the server's message, if it sent one.
    /// The caller switches to sign-in afterwards; nothing is stored.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, AuthError> {
        let username = required(username, "username")?;
        let email = required(email, "email")?;
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        let email = EmailAddress::parse(email)?;

        tracing::debug!(username, "Registering account");
        let response = self.client.register(username, email.as_str(), password).await?;

        match AuthReply::from_response(response.status, response.body.as_ref()) {
            AuthReply::Success { message, .. } => Ok(message),
            AuthReply::Failure(message) => Err(AuthError::Rejected(
                message.unwrap_or_else(|| REGISTRATION_FAILED.to_string()),
            )),
        }
    }
}
