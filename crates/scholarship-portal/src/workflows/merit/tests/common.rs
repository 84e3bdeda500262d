use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::MeritConfig;
use crate::workflows::merit::domain::{
    Application, ApplicationId, ApplicationStatus, MeritEntry, MeritStatus, Scholarship,
    ScholarshipId, ScoringCriterion, StudentRegNo,
};
use crate::workflows::merit::repository::{
    ApplicationStore, MeritListStore, Notification, NotificationError, NotificationSink,
    RepositoryError, ScholarshipStore,
};
use crate::workflows::merit::MeritListService;

pub(super) const SCHOLARSHIP: &str = "sch-merit";

pub(super) fn scholarship_id() -> ScholarshipId {
    ScholarshipId(SCHOLARSHIP.to_string())
}

pub(super) fn criteria() -> Vec<ScoringCriterion> {
    vec![
        ScoringCriterion {
            field_name: "cgpa".to_string(),
            field_label: "CGPA".to_string(),
            weight: 60.0,
        },
        ScoringCriterion {
            field_name: "income_score".to_string(),
            field_label: "Income score".to_string(),
            weight: 40.0,
        },
    ]
}

pub(super) fn scholarship(number_of_awards: Option<u32>) -> Scholarship {
    Scholarship {
        id: scholarship_id(),
        name: "Founders Merit Award".to_string(),
        number_of_awards,
        scoring_criteria: criteria(),
        merit_list_generated: false,
    }
}

pub(super) fn application(id: &str, regno: &str, data: Value) -> Application {
    let application_data: BTreeMap<String, Value> = match data {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };

    Application {
        id: ApplicationId(id.to_string()),
        scholarship_id: scholarship_id(),
        student_regno: StudentRegNo(regno.to_string()),
        status: ApplicationStatus::Approved,
        application_data,
    }
}

pub(super) fn regno(value: &str) -> StudentRegNo {
    StudentRegNo(value.to_string())
}

pub(super) fn generated_at() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T09:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(super) type MemoryService =
    MeritListService<MemoryApplications, MemoryScholarships, MemoryMeritLists, MemoryNotifications>;

pub(super) struct Fixture {
    pub(super) service: MemoryService,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) scholarships: Arc<MemoryScholarships>,
    pub(super) merit_lists: Arc<MemoryMeritLists>,
    pub(super) notifications: Arc<MemoryNotifications>,
}

pub(super) fn build_service(scholarship: Scholarship, applications: Vec<Application>) -> Fixture {
    build_service_with_config(scholarship, applications, MeritConfig::default())
}

pub(super) fn build_service_with_config(
    scholarship: Scholarship,
    applications: Vec<Application>,
    config: MeritConfig,
) -> Fixture {
    let application_store = Arc::new(MemoryApplications::with(applications));
    let scholarships = Arc::new(MemoryScholarships::with(scholarship));
    let merit_lists = Arc::new(MemoryMeritLists::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = MeritListService::new(
        application_store.clone(),
        scholarships.clone(),
        merit_lists.clone(),
        notifications.clone(),
        config,
    );

    Fixture {
        service,
        applications: application_store,
        scholarships,
        merit_lists,
        notifications,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<Vec<Application>>>,
}

impl MemoryApplications {
    pub(super) fn with(records: Vec<Application>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(super) fn push(&self, application: Application) {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .push(application);
    }

    pub(super) fn clear(&self) {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .clear();
    }
}

impl ApplicationStore for MemoryApplications {
    fn approved_for(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| {
                &record.scholarship_id == scholarship_id
                    && record.status == ApplicationStatus::Approved
            })
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryScholarships {
    records: Arc<Mutex<HashMap<ScholarshipId, Scholarship>>>,
}

impl MemoryScholarships {
    pub(super) fn with(scholarship: Scholarship) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .expect("scholarship mutex poisoned")
            .insert(scholarship.id.clone(), scholarship);
        store
    }

    pub(super) fn generated(&self, id: &ScholarshipId) -> bool {
        self.records
            .lock()
            .expect("scholarship mutex poisoned")
            .get(id)
            .map(|scholarship| scholarship.merit_list_generated)
            .unwrap_or(false)
    }
}

impl ScholarshipStore for MemoryScholarships {
    fn fetch(&self, id: &ScholarshipId) -> Result<Option<Scholarship>, RepositoryError> {
        let guard = self.records.lock().expect("scholarship mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn mark_merit_list_generated(&self, id: &ScholarshipId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("scholarship mutex poisoned");
        let scholarship = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        scholarship.merit_list_generated = true;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMeritLists {
    lists: Arc<Mutex<HashMap<ScholarshipId, Vec<MeritEntry>>>>,
}

impl MemoryMeritLists {
    pub(super) fn seed(&self, scholarship_id: &ScholarshipId, entries: Vec<MeritEntry>) {
        self.lists
            .lock()
            .expect("merit mutex poisoned")
            .insert(scholarship_id.clone(), entries);
    }

    pub(super) fn stored(&self, scholarship_id: &ScholarshipId) -> Vec<MeritEntry> {
        self.lists
            .lock()
            .expect("merit mutex poisoned")
            .get(scholarship_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl MeritListStore for MemoryMeritLists {
    fn replace_all(
        &self,
        scholarship_id: &ScholarshipId,
        entries: Vec<MeritEntry>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lists.lock().expect("merit mutex poisoned");
        guard.insert(scholarship_id.clone(), entries);
        Ok(())
    }

    fn list(&self, scholarship_id: &ScholarshipId) -> Result<Vec<MeritEntry>, RepositoryError> {
        let mut entries = self.stored(scholarship_id);
        entries.sort_by_key(|entry| entry.rank);
        Ok(entries)
    }

    fn update_status(
        &self,
        scholarship_id: &ScholarshipId,
        student_regno: &StudentRegNo,
        status: MeritStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<MeritEntry, RepositoryError> {
        let mut guard = self.lists.lock().expect("merit mutex poisoned");
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

/// Merit store whose writes always fail, leaving whatever was seeded intact.
#[derive(Default, Clone)]
pub(super) struct ReadOnlyMeritLists {
    pub(super) inner: MemoryMeritLists,
}

impl MeritListStore for ReadOnlyMeritLists {
    fn replace_all(
        &self,
        _scholarship_id: &ScholarshipId,
        _entries: Vec<MeritEntry>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, scholarship_id: &ScholarshipId) -> Result<Vec<MeritEntry>, RepositoryError> {
        self.inner.list(scholarship_id)
    }

    fn update_status(
        &self,
        _scholarship_id: &ScholarshipId,
        _student_regno: &StudentRegNo,
        _status: MeritStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<MeritEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationSink for MemoryNotifications {
    fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifications;

impl NotificationSink for OfflineNotifications {
    fn notify(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
