mod policy;
mod rules;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, MeritEntry, MeritStatus, ScholarshipId, ScoringCriterion,
    StudentRegNo,
};
use policy::merit_order;

/// Stateless ranker that applies a scholarship's criteria to its approved
/// applications.
///
/// Callers validate the inputs first: criteria must be non-empty, there must
/// be at least one application, and the award count must be positive. The
/// ranker itself never fails; unreadable field values contribute zero.
pub struct MeritRanker {
    criteria: Vec<ScoringCriterion>,
    number_of_awards: u32,
}

impl MeritRanker {
    pub fn new(criteria: Vec<ScoringCriterion>, number_of_awards: u32) -> Self {
        Self {
            criteria,
            number_of_awards,
        }
    }

    pub fn criteria(&self) -> &[ScoringCriterion] {
        &self.criteria
    }

    /// Weighted score of a single application.
    pub fn score(&self, application: &Application) -> ScoredApplication {
        let (score_breakdown, total_score) =
            rules::score_application(&self.criteria, &application.application_data);

        ScoredApplication {
            scholarship_id: application.scholarship_id.clone(),
            application_id: application.id.clone(),
            student_regno: application.student_regno.clone(),
            total_score,
            score_breakdown,
        }
    }

    /// Scores, orders, and ranks the applications, stamping every entry with
    /// `generated_at`.
    pub fn rank(
        &self,
        applications: &[Application],
        generated_at: DateTime<Utc>,
    ) -> Vec<MeritEntry> {
        let mut scored: Vec<ScoredApplication> = applications
            .iter()
            .map(|application| self.score(application))
            .collect();
        scored.sort_by(merit_order);

        scored
            .into_iter()
            .zip(1u32..)
            .map(|(scored, rank)| MeritEntry {
                scholarship_id: scored.scholarship_id,
                student_regno: scored.student_regno,
                application_id: scored.application_id,
                total_score: scored.total_score,
                rank,
                status: MeritStatus::for_rank(rank, self.number_of_awards),
                score_breakdown: scored.score_breakdown,
                created_at: generated_at,
                updated_at: generated_at,
            })
            .collect()
    }
}

/// Score card for one application before it is placed on the list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredApplication {
    pub scholarship_id: ScholarshipId,
    pub application_id: ApplicationId,
    pub student_regno: StudentRegNo,
    pub total_score: f64,
    pub score_breakdown: BTreeMap<String, f64>,
}

#[cfg(test)]
pub(crate) fn coerce_for_tests(value: Option<&serde_json::Value>) -> f64 {
    rules::coerce_field_value(value)
}

#[cfg(test)]
pub(crate) fn round_for_tests(value: f64) -> f64 {
    rules::round_score(value)
}
