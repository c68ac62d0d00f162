use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::{wire, Npm, StandbyId};
use crate::domain::{normalize, CanonicalTime, ValidationError};

/// An on-call assignment as stored in the `standby` table.
///
/// Start and end are validated independently; nothing requires `start < end`
/// and overlapping assignments for the same programmer are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandbyAssignment {
    pub id: StandbyId,
    #[serde(rename = "npm")]
    pub programmer: Npm,
    #[serde(rename = "tanggal", with = "wire::iso_date")]
    pub date: Date,
    #[serde(rename = "waktu_mulai")]
    pub start_time: CanonicalTime,
    #[serde(rename = "waktu_selesai")]
    pub end_time: CanonicalTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// User input for creating or editing an assignment.
#[derive(Debug, Clone)]
pub struct StandbyForm {
    pub programmer: Option<Npm>,
    pub date: Option<Date>,
    pub start: String,
    pub end: String,
}

impl Default for StandbyForm {
    fn default() -> Self {
        Self {
            programmer: None,
            date: None,
            start: "08:30".to_string(),
            end: "15:30".to_string(),
        }
    }
}

impl StandbyForm {
    /// Pre-fills the form from an existing assignment.
    pub fn from_assignment(assignment: &StandbyAssignment) -> Self {
        Self {
            programmer: Some(assignment.programmer),
            date: Some(assignment.date),
            start: assignment.start_time.hh_mm().to_string(),
            end: assignment.end_time.hh_mm().to_string(),
        }
    }

    pub fn validate(&self) -> Result<StandbyRow, ValidationError> {
        let programmer = self
            .programmer
            .ok_or(ValidationError::MissingField("programmer"))?;
        let date = self.date.ok_or(ValidationError::MissingField("date"))?;
        let start_time = normalize(&self.start)?;
        let end_time = normalize(&self.end)?;

        Ok(StandbyRow {
            programmer,
            date,
            start_time,
            end_time,
        })
    }
}

/// A validated assignment row, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandbyRow {
    #[serde(rename = "npm")]
    pub programmer: Npm,
    #[serde(rename = "tanggal", with = "wire::iso_date")]
    pub date: Date,
    #[serde(rename = "waktu_mulai")]
    pub start_time: CanonicalTime,
    #[serde(rename = "waktu_selesai")]
    pub end_time: CanonicalTime,
}
