use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{wire, Npm};
use crate::domain::ValidationError;

/// A programmer as stored in the `programmer` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammerProfile {
    pub npm: Npm,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "no_hp", default)]
    pub phone: Option<String>,
    #[serde(rename = "bidang", default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// User input for creating or editing a programmer.
#[derive(Debug, Clone, Default)]
pub struct ProgrammerForm {
    pub npm: String,
    pub name: String,
    pub phone: String,
    pub specialty: String,
    pub region: String,
}

impl ProgrammerForm {
    pub fn from_profile(profile: &ProgrammerProfile) -> Self {
        Self {
            npm: profile.npm.to_string(),
            name: profile.name.clone(),
            phone: profile.phone.clone().unwrap_or_default(),
            specialty: profile.specialty.clone().unwrap_or_default(),
            region: profile.region.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<ProgrammerRow, ValidationError> {
        let npm = self.npm.trim();
        if npm.is_empty() {
            return Err(ValidationError::MissingField("npm"));
        }
        let npm = npm
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidNumber("npm"))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        Ok(ProgrammerRow {
            npm: Npm::new(npm),
            name: name.to_string(),
            phone: wire::trimmed_or_none(&self.phone),
            specialty: wire::trimmed_or_none(&self.specialty),
            region: wire::trimmed_or_none(&self.region),
        })
    }
}

/// A validated programmer row, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgrammerRow {
    pub npm: Npm,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "no_hp")]
    pub phone: Option<String>,
    #[serde(rename = "bidang")]
    pub specialty: Option<String>,
    pub region: Option<String>,
}
