use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::context::RequestContext;
use super::domain::{
    MeritEntry, MeritStatus, Scholarship, ScholarshipId, ScoringCriterion, StudentRegNo,
};
use super::ranking::MeritRanker;
use super::repository::{
    ApplicationStore, MeritListStore, Notification, NotificationData, NotificationSink,
    RepositoryError, ScholarshipStore,
};
use crate::config::MeritConfig;

const WEIGHT_TOTAL: f64 = 100.0;
const WEIGHT_TOLERANCE: f64 = 0.01;

/// Service composing the stores, the ranker, and the notification sink.
pub struct MeritListService<A, S, M, N> {
    applications: Arc<A>,
    scholarships: Arc<S>,
    merit_lists: Arc<M>,
    notifications: Arc<N>,
    config: MeritConfig,
}

impl<A, S, M, N> MeritListService<A, S, M, N>
where
    A: ApplicationStore + 'static,
    S: ScholarshipStore + 'static,
    M: MeritListStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        applications: Arc<A>,
        scholarships: Arc<S>,
        merit_lists: Arc<M>,
        notifications: Arc<N>,
        config: MeritConfig,
    ) -> Self {
        Self {
            applications,
            scholarships,
            merit_lists,
            notifications,
            config,
        }
    }

    /// Rank the approved applications of a scholarship and replace its merit
    /// list. Nothing is written unless every precondition holds.
    pub fn generate(
        &self,
        context: &RequestContext,
        scholarship_id: &ScholarshipId,
    ) -> Result<MeritListSummary, MeritListServiceError> {
        let scholarship = self.scholarship(scholarship_id)?;
        let (criteria, number_of_awards) = self.validate(&scholarship)?;

        let applications = self.applications.approved_for(scholarship_id)?;
        if applications.is_empty() {
            return Err(PreconditionFailure::NoApprovedApplications.into());
        }

        let ranker = MeritRanker::new(criteria, number_of_awards);
        let entries = ranker.rank(&applications, Utc::now());
        let summary = MeritListSummary::from_entries(&entries, number_of_awards);

        self.merit_lists
            .replace_all(scholarship_id, entries.clone())?;
        self.scholarships.mark_merit_list_generated(scholarship_id)?;

        info!(
            actor = %context.actor,
            scholarship = %scholarship_id,
            total = summary.total_applications,
            selected = summary.selected_count,
            waitlist = summary.waitlist_count,
            "merit list generated"
        );

        self.notify_students(&scholarship, &entries);

        Ok(summary)
    }

    /// Stored merit list for redisplay, ordered by rank.
    pub fn merit_list(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<MeritEntry>, MeritListServiceError> {
        self.scholarship(scholarship_id)?;
        Ok(self.merit_lists.list(scholarship_id)?)
    }

    /// Manual status edit for a single merit-list entry.
    pub fn update_entry_status(
        &self,
        context: &RequestContext,
        scholarship_id: &ScholarshipId,
        student_regno: &StudentRegNo,
        status: MeritStatus,
    ) -> Result<MeritEntry, MeritListServiceError> {
        let entry = self
            .merit_lists
            .update_status(scholarship_id, student_regno, status, Utc::now())
            .map_err(|error| match error {
                RepositoryError::NotFound => MeritListServiceError::EntryNotFound {
                    scholarship_id: scholarship_id.clone(),
                    student_regno: student_regno.clone(),
                },
                other => other.into(),
            })?;

        info!(
            actor = %context.actor,
            scholarship = %scholarship_id,
            student = %student_regno,
            status = status.label(),
            "merit entry status updated"
        );

        Ok(entry)
    }

    fn scholarship(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Scholarship, MeritListServiceError> {
        self.scholarships
            .fetch(scholarship_id)?
            .ok_or_else(|| MeritListServiceError::ScholarshipNotFound(scholarship_id.clone()))
    }

    fn validate(
        &self,
        scholarship: &Scholarship,
    ) -> Result<(Vec<ScoringCriterion>, u32), PreconditionFailure> {
        if scholarship.scoring_criteria.is_empty() {
            return Err(PreconditionFailure::MissingCriteria);
        }

        let mut seen = BTreeSet::new();
        for criterion in &scholarship.scoring_criteria {
            if !seen.insert(criterion.field_name.as_str()) {
                return Err(PreconditionFailure::DuplicateCriterion {
                    field_name: criterion.field_name.clone(),
                });
            }
        }

        let number_of_awards = match scholarship.number_of_awards {
            Some(count) if count > 0 => count,
            _ => return Err(PreconditionFailure::AwardCountNotPositive),
        };

        if self.config.enforce_weight_total {
            let total = scholarship.weight_total();
            if (total - WEIGHT_TOTAL).abs() > WEIGHT_TOLERANCE {
                return Err(PreconditionFailure::WeightTotalMismatch { total });
            }
        }

        Ok((scholarship.scoring_criteria.clone(), number_of_awards))
    }

    fn notify_students(&self, scholarship: &Scholarship, entries: &[MeritEntry]) {
        let program = if scholarship.name.trim().is_empty() {
            scholarship.id.0.as_str()
        } else {
            scholarship.name.as_str()
        };

        let mut delivered = 0usize;
        for entry in entries {
            let notification = Notification {
                user_id: entry.student_regno.clone(),
                title: self.config.notification_title.clone(),
                message: notification_message(program, entry),
                data: NotificationData {
                    scholarship_id: entry.scholarship_id.clone(),
                    status: entry.status,
                    rank: entry.rank,
                },
            };

            match self.notifications.notify(notification) {
                Ok(()) => delivered += 1,
                Err(error) => warn!(
                    scholarship = %entry.scholarship_id,
                    student = %entry.student_regno,
                    %error,
                    "merit notification failed"
                ),
            }
        }

        debug!(
            scholarship = %scholarship.id,
            delivered,
            total = entries.len(),
            "merit notifications dispatched"
        );
    }
}

fn notification_message(program: &str, entry: &MeritEntry) -> String {
    match entry.status {
        MeritStatus::Selected | MeritStatus::Awarded => format!(
            "Congratulations! You have been selected for {program} with merit rank {}.",
            entry.rank
        ),
        MeritStatus::Waitlist | MeritStatus::Pending => format!(
            "You have been placed on the waitlist for {program} at merit rank {}.",
            entry.rank
        ),
    }
}

/// Outcome of a merit-list generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeritListSummary {
    pub total_applications: usize,
    pub selected_count: usize,
    pub waitlist_count: usize,
    pub top_score: f64,
    /// Score at rank `min(number_of_awards, total_applications)`.
    pub cutoff_score: f64,
}

impl MeritListSummary {
    /// Summarize entries ordered by rank.
    pub fn from_entries(entries: &[MeritEntry], number_of_awards: u32) -> Self {
        let count_status = |status: MeritStatus| {
            entries
                .iter()
                .filter(|entry| entry.status == status)
                .count()
        };

        let cutoff_rank = usize::try_from(number_of_awards)
            .unwrap_or(usize::MAX)
            .min(entries.len());
        let cutoff_score = cutoff_rank
            .checked_sub(1)
            .and_then(|index| entries.get(index))
            .map(|entry| entry.total_score)
            .unwrap_or(0.0);

        Self {
            total_applications: entries.len(),
            selected_count: count_status(MeritStatus::Selected),
            waitlist_count: count_status(MeritStatus::Waitlist),
            top_score: entries.first().map(|entry| entry.total_score).unwrap_or(0.0),
            cutoff_score,
        }
    }
}

/// Reasons a scholarship cannot have a merit list generated yet.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionFailure {
    #[error("no scoring criteria configured for this scholarship")]
    MissingCriteria,
    #[error("scoring criterion '{field_name}' is configured more than once")]
    DuplicateCriterion { field_name: String },
    #[error("number of awards must be set to a positive value")]
    AwardCountNotPositive,
    #[error("no approved applications found for this scholarship")]
    NoApprovedApplications,
    #[error("scoring criteria weights must total 100 (got {total:.2})")]
    WeightTotalMismatch { total: f64 },
}

/// Error raised by the merit list service.
#[derive(Debug, thiserror::Error)]
pub enum MeritListServiceError {
    #[error("scholarship {0} not found")]
    ScholarshipNotFound(ScholarshipId),
    #[error("no merit entry for student {student_regno} in scholarship {scholarship_id}")]
    EntryNotFound {
        scholarship_id: ScholarshipId,
        student_regno: StudentRegNo,
    },
    #[error(transparent)]
    Precondition(#[from] PreconditionFailure),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
