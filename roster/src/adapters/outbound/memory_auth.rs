use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{
    models::SessionIdentity,
    ports::outbound::{AuthClient, RawAuthResponse},
    AuthError,
};

#[derive(Debug, Clone)]
struct Account {
    identity: SessionIdentity,
    password: String,
}

/// Auth service kept in process memory, answering like the real one.
#[derive(Debug, Default)]
pub struct MemoryAuthClient {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// One account, `dev` / `dev@example.com`, password `dev`.
    pub fn seeded() -> Self {
        let client = Self::new();
        client.add_account("dev", "dev@example.com", "dev");
        client
    }

    fn add_account(&self, username: &str, email: &str, password: &str) -> SessionIdentity {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let identity = SessionIdentity {
            id: accounts.len() as i64 + 1,
            username: username.to_string(),
            email: email.to_string(),
        };
        accounts.push(Account {
            identity: identity.clone(),
            password: password.to_string(),
        });
        identity
    }
}

#[async_trait]
impl AuthClient for MemoryAuthClient {
    async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<RawAuthResponse, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        let found = accounts.iter().find(|a| {
            (a.identity.username == identifier
                || a.identity.email.eq_ignore_ascii_case(identifier))
                && a.password == password
        });

        Ok(match found {
            Some(account) => RawAuthResponse {
                status: 200,
                body: Some(json!({ "ok": true, "user": account.identity })),
            },
            None => RawAuthResponse {
                status: 401,
                body: Some(json!({
                    "ok": false,
                    "error": "Invalid username/email or password"
                })),
            },
        })
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RawAuthResponse, AuthError> {
        let taken = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|a| {
                a.identity.username == username || a.identity.email.eq_ignore_ascii_case(email)
            });
        if taken {
            return Ok(RawAuthResponse {
                status: 409,
                body: Some(json!({
                    "ok": false,
                    "error": "Username or email already registered"
                })),
            });
        }

        self.add_account(username, email, password);
        Ok(RawAuthResponse {
            status: 201,
            body: Some(json!({ "ok": true, "message": "Account created." })),
        })
    }
}
