//! Merit-list ranking for scholarship programs.
//!
//! [`MeritRanker`] is a pure transformation from criteria and approved
//! applications to ranked entries. [`MeritListService`] wraps it with the
//! store lookups, precondition checks, list replacement, and student
//! notifications that make up a generation run.

pub mod context;
pub mod domain;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use context::{RequestContext, ACTOR_HEADER};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, MeritEntry, MeritStatus, Scholarship,
    ScholarshipId, ScoringCriterion, StudentRegNo,
};
pub use ranking::{MeritRanker, ScoredApplication};
pub use repository::{
    ApplicationStore, MeritListStore, Notification, NotificationData, NotificationError,
    NotificationSink, RepositoryError, ScholarshipStore,
};
pub use router::{merit_router, StatusUpdateRequest};
pub use service::{MeritListService, MeritListServiceError, MeritListSummary, PreconditionFailure};
