use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use scholarship_portal::config::MeritConfig;
use scholarship_portal::error::AppError;
use scholarship_portal::workflows::merit::{
    Application, ApplicationStatus, ApplicationStore, MeritEntry, MeritListService,
    MeritListStore, MeritStatus, Notification, NotificationError, NotificationSink,
    RepositoryError, Scholarship, ScholarshipId, ScholarshipStore, StudentRegNo,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

pub(crate) type PortalService = MeritListService<
    InMemoryApplicationStore,
    InMemoryScholarshipStore,
    InMemoryMeritListStore,
    InMemoryNotificationSink,
>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} lock poisoned")))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<Vec<Application>>>,
}

impl InMemoryApplicationStore {
    pub(crate) fn extend(&self, applications: Vec<Application>) -> Result<(), RepositoryError> {
        lock(&self.records, "application store")?.extend(applications);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn replace(&self, applications: Vec<Application>) -> Result<(), RepositoryError> {
        *lock(&self.records, "application store")? = applications;
        Ok(())
    }
}

impl ApplicationStore for InMemoryApplicationStore {
    fn approved_for(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.records, "application store")?;
        Ok(guard
            .iter()
            .filter(|application| {
                &application.scholarship_id == scholarship_id
                    && application.status == ApplicationStatus::Approved
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryScholarshipStore {
    records: Arc<Mutex<HashMap<ScholarshipId, Scholarship>>>,
}

impl InMemoryScholarshipStore {
    pub(crate) fn upsert(&self, scholarship: Scholarship) -> Result<(), RepositoryError> {
        lock(&self.records, "scholarship store")?.insert(scholarship.id.clone(), scholarship);
        Ok(())
    }
}

impl ScholarshipStore for InMemoryScholarshipStore {
    fn fetch(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError> {
        Ok(lock(&self.records, "scholarship store")?.get(id).cloned())
    }

    fn mark_merit_list_generated(&self, id: &ScholarshipId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "scholarship store")?;
        let scholarship = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        scholarship.merit_list_generated = true;
        Ok(())
    }
}

/// Merit lists keyed by scholarship. The whole list is swapped under one lock,
/// so concurrent generations never interleave their writes.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMeritListStore {
    lists: Arc<Mutex<HashMap<ScholarshipId, Vec<MeritEntry>>>>,
}

impl MeritListStore for InMemoryMeritListStore {
    fn replace_all(
        &self,
        scholarship_id: &ScholarshipId,
        mut entries: Vec<MeritEntry>,
    ) -> Result<(), RepositoryError> {
        entries.sort_by_key(|entry| entry.rank);
        lock(&self.lists, "merit list store")?.insert(scholarship_id.clone(), entries);
        Ok(())
    }

    fn list(&self, scholarship_id: &ScholarshipId) -> Result<Vec<MeritEntry>, RepositoryError> {
        Ok(lock(&self.lists, "merit list store")?
            .get(scholarship_id)
            .cloned()
            .unwrap_or_default())
    }

    fn update_status(
        &self,
        scholarship_id: &ScholarshipId,
        student_regno: &StudentRegNo,
        status: MeritStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<MeritEntry, RepositoryError> {
        let mut guard = lock(&self.lists, "merit list store")?;
        let entry = guard
            .get_mut(scholarship_id)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|entry| &entry.student_regno == student_regno)
            })
            .ok_or(RepositoryError::NotFound)?;
        entry.status = status;
        entry.updated_at = updated_at;
        Ok(entry.clone())
    }
}

/// Keeps delivered notifications in memory and logs each one.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationSink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationSink for InMemoryNotificationSink {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            user = %notification.user_id,
            rank = notification.data.rank,
            status = notification.data.status.label(),
            "notification queued"
        );
        self.events
            .lock()
            .map_err(|_| NotificationError::Transport("notification lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

impl InMemoryNotificationSink {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Handles to every store behind a [`PortalService`].
#[derive(Default, Clone)]
pub(crate) struct PortalStores {
    pub(crate) applications: Arc<InMemoryApplicationStore>,
    pub(crate) scholarships: Arc<InMemoryScholarshipStore>,
    pub(crate) merit_lists: Arc<InMemoryMeritListStore>,
    pub(crate) notifications: Arc<InMemoryNotificationSink>,
}

impl PortalStores {
    pub(crate) fn service(&self, config: MeritConfig) -> PortalService {
        MeritListService::new(
            self.applications.clone(),
            self.scholarships.clone(),
            self.merit_lists.clone(),
            self.notifications.clone(),
            config,
        )
    }

    pub(crate) fn seed(&self, seed: SeedData) -> Result<(), RepositoryError> {
        for scholarship in seed.scholarships {
            self.scholarships.upsert(scholarship)?;
        }
        self.applications.extend(seed.applications)
    }
}

/// JSON seed document for the in-memory stores.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeedData {
    #[serde(default)]
    pub(crate) scholarships: Vec<Scholarship>,
    #[serde(default)]
    pub(crate) applications: Vec<Application>,
}

impl SeedData {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub(crate) fn read_scholarship(path: &Path) -> Result<Scholarship, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
