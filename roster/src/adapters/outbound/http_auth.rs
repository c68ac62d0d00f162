use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::{
    ports::outbound::{AuthClient, RawAuthResponse},
    AuthError,
};

pub const DEFAULT_SIGN_IN_PATH: &str = "/api/auth/masuk";
pub const DEFAULT_REGISTER_PATH: &str = "/api/auth/daftar";

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Auth service reached over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: Client,
    sign_in_url: Url,
    register_url: Url,
}

impl HttpAuthClient {
    /// Paths resolve under `api_url`, keeping any path prefix it has.
    /// A leading `/` on a path is ignored.
    pub fn new(api_url: &str, sign_in_path: &str, register_path: &str) -> Result<Self, AuthError> {
        let base_url = Url::parse(&format!("{}/", api_url.trim_end_matches('/')))
            .map_err(|e| AuthError::Transport(format!("invalid API URL {api_url}: {e}")))?;
        let endpoint = |path: &str| {
            base_url
                .join(path.trim_start_matches('/'))
                .map_err(|e| AuthError::Transport(format!("failed to build URL for {path}: {e}")))
        };
        let sign_in_url = endpoint(sign_in_path)?;
        let register_url = endpoint(register_path)?;

        let client = Client::builder()
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            sign_in_url,
            register_url,
        })
    }

    async fn post(&self, url: &Url, body: &impl Serialize) -> Result<RawAuthResponse, AuthError> {
        tracing::debug!(%url, "Posting auth request");
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Auth request failed");
                AuthError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(RawAuthResponse {
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<RawAuthResponse, AuthError> {
        self.post(
            &self.sign_in_url,
            &SignInRequest {
                identifier,
                password,
            },
        )
        .await
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RawAuthResponse, AuthError> {
        self.post(
            &self.register_url,
            &RegisterRequest {
                username,
                email,
                password,
            },
        )
        .await
    }
}
