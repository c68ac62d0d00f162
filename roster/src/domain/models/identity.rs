use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The signed-in account as held by the client.
///
/// A projection of the account row: it never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl SessionIdentity {
    /// Parses a stored or received identity, treating any shape mismatch as absent.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        Self::from_value(&value)
    }
}

/// An address that passed the registration form's shape check: one `@`, a
/// non-blank mailbox, and a dotted domain with no empty labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

#[derive(Error, Debug, PartialEq)]
pub enum EmailError {
    #[error("'{0}' is not an email address: it needs exactly one '@'")]
    AtSign(String),
    #[error("'{0}' is not an email address: nothing before the '@'")]
    EmptyMailbox(String),
    #[error("'{0}' is not an email address: the domain should look like example.com")]
    BadDomain(String),
}

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let Some((mailbox, domain)) = raw.split_once('@') else {
            return Err(EmailError::AtSign(raw.to_string()));
        };
        if domain.contains('@') {
            return Err(EmailError::AtSign(raw.to_string()));
        }
        if mailbox.trim().is_empty() {
            return Err(EmailError::EmptyMailbox(raw.to_string()));
        }

        let mut labels = domain.split('.');
        let dotted = labels.clone().count() > 1;
        if !dotted || labels.any(|label| label.trim().is_empty()) {
            return Err(EmailError::BadDomain(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_requires_exact_field_types() {
        let good = json!({"id": 7, "username": "sari", "email": "sari@lab.id"});
        assert_eq!(
            SessionIdentity::from_value(&good),
            Some(SessionIdentity {
                id: 7,
                username: "sari".to_string(),
                email: "sari@lab.id".to_string(),
            })
        );

        for bad in [
            json!({"id": "7", "username": "sari", "email": "sari@lab.id"}),
            json!({"id": 7.5, "username": "sari", "email": "sari@lab.id"}),
            json!({"id": 7, "username": 3, "email": "sari@lab.id"}),
            json!({"id": 7, "username": "sari"}),
            json!([7, "sari", "sari@lab.id"]),
            json!(null),
        ] {
            assert_eq!(SessionIdentity::from_value(&bad), None, "{bad}");
        }
    }

    #[test]
    fn identity_serializes_only_its_three_fields() {
        let raw = json!({
            "id": 1, "username": "a", "email": "a@b.co", "password": "$2b$10$hash"
        });
        let identity = SessionIdentity::from_value(&raw).unwrap();
        let written = serde_json::to_value(&identity).unwrap();
        assert_eq!(written, json!({"id": 1, "username": "a", "email": "a@b.co"}));
    }

    #[test]
    fn corrupt_json_is_absent() {
        assert_eq!(SessionIdentity::from_json("{not json"), None);
        assert_eq!(SessionIdentity::from_json(""), None);
    }

    #[test]
    fn email_shape_check() {
        assert_eq!(
            EmailAddress::parse("sari@lab.id").unwrap().as_str(),
            "sari@lab.id"
        );

        for (raw, expected) in [
            ("sari.lab.id", EmailError::AtSign("sari.lab.id".to_string())),
            ("sari@@lab.id", EmailError::AtSign("sari@@lab.id".to_string())),
            (" @lab.id", EmailError::EmptyMailbox(" @lab.id".to_string())),
            ("sari@lab", EmailError::BadDomain("sari@lab".to_string())),
            ("sari@lab..id", EmailError::BadDomain("sari@lab..id".to_string())),
            ("sari@.lab.id", EmailError::BadDomain("sari@.lab.id".to_string())),
        ] {
            assert_eq!(EmailAddress::parse(raw).unwrap_err(), expected, "{raw}");
        }
    }
}
