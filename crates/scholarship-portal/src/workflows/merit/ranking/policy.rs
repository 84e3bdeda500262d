use std::cmp::Ordering;

use super::ScoredApplication;

/// Merit order: higher totals first, then registration number, then
/// application id so equal scores rank the same way on every run.
pub(crate) fn merit_order(left: &ScoredApplication, right: &ScoredApplication) -> Ordering {
    right
        .total_score
        .total_cmp(&left.total_score)
        .then_with(|| left.student_regno.cmp(&right.student_regno))
        .then_with(|| left.application_id.cmp(&right.application_id))
}
