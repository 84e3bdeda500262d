use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, MeritEntry, MeritStatus, Scholarship, ScholarshipId, StudentRegNo,
};

/// Source of submitted applications.
pub trait ApplicationStore: Send + Sync {
    /// Every application for the scholarship whose status is `approved`.
    fn approved_for(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<Application>, RepositoryError>;
}

/// Scholarship program settings.
pub trait ScholarshipStore: Send + Sync {
    fn fetch(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError>;
    fn mark_merit_list_generated(&self, id: &ScholarshipId) -> Result<(), RepositoryError>;
}

/// Persistence for generated merit lists.
///
/// `replace_all` must swap the complete list for a scholarship in one step:
/// readers and concurrent writers observe either the previous list or the new
/// one, and a failed call leaves the previous list in place.
pub trait MeritListStore: Send + Sync {
    fn replace_all(
        &self,
        scholarship_id: &ScholarshipId,
        entries: Vec<MeritEntry>,
    ) -> Result<(), RepositoryError>;

    /// Stored entries ordered by rank.
    fn list(&self, scholarship_id: &ScholarshipId) -> Result<Vec<MeritEntry>, RepositoryError>;

    fn update_status(
        &self,
        scholarship_id: &ScholarshipId,
        student_regno: &StudentRegNo,
        status: MeritStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<MeritEntry, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for student-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Notification row addressed to a student by registration number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: StudentRegNo,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub scholarship_id: ScholarshipId,
    pub status: MeritStatus,
    pub rank: u32,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
