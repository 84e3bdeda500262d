use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for scholarship programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScholarshipId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Student registration number; doubles as the notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRegNo(pub String);

impl fmt::Display for ScholarshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StudentRegNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named application field paired with the percentage weight it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringCriterion {
    pub field_name: String,
    #[serde(default)]
    pub field_label: String,
    pub weight: f64,
}

/// Scholarship program settings consulted when a merit list is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: ScholarshipId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number_of_awards: Option<u32>,
    #[serde(default)]
    pub scoring_criteria: Vec<ScoringCriterion>,
    #[serde(default)]
    pub merit_list_generated: bool,
}

impl Scholarship {
    pub fn weight_total(&self) -> f64 {
        self.scoring_criteria
            .iter()
            .map(|criterion| criterion.weight)
            .sum()
    }
}

/// Review status of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Submitted application. `application_data` is the free-form form payload,
/// keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub scholarship_id: ScholarshipId,
    pub student_regno: StudentRegNo,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub application_data: BTreeMap<String, Value>,
}

/// Placement of a student on a merit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeritStatus {
    Selected,
    Waitlist,
    Awarded,
    Pending,
}

impl MeritStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MeritStatus::Selected => "selected",
            MeritStatus::Waitlist => "waitlist",
            MeritStatus::Awarded => "awarded",
            MeritStatus::Pending => "pending",
        }
    }

    /// Status assigned by ranking alone; `Awarded` and `Pending` only come from
    /// manual edits.
    pub const fn for_rank(rank: u32, number_of_awards: u32) -> Self {
        if rank <= number_of_awards {
            MeritStatus::Selected
        } else {
            MeritStatus::Waitlist
        }
    }
}

/// One ranked row of a merit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeritEntry {
    pub scholarship_id: ScholarshipId,
    pub student_regno: StudentRegNo,
    pub application_id: ApplicationId,
    pub total_score: f64,
    pub rank: u32,
    pub status: MeritStatus,
    pub score_breakdown: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
