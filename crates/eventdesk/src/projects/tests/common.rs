use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use crate::projects::{
    project_router, ChoiceSpec, Clock, ConfigSection, EventService, FieldKind, FormField,
    FormSchema, Project, ProjectId, ProjectRepository, ProjectSeed, ProjectStatus, Registration,
    RegistrationDraft, RegistrationRepository, RepositoryError,
};
use crate::storage::MemoryStore;

pub(super) type MemoryService = EventService<MemoryStore, MemoryStore>;

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn now() -> DateTime<Utc> {
    at(2024, 3, 15, 12)
}

/// Clock pinned to an instant the test can move.
pub(super) struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(super) fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub(super) fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().expect("clock mutex poisoned") = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("clock mutex poisoned")
    }
}

pub(super) fn seed(name: &str) -> ProjectSeed {
    ProjectSeed {
        name: name.to_string(),
        manager_id: "m1".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 4, 15).expect("valid date"),
        location: "Seoul".to_string(),
        status: ProjectStatus::Planning,
    }
}

pub(super) fn build_service() -> (MemoryService, MemoryStore, Arc<FixedClock>) {
    let store = MemoryStore::new();
    let clock = Arc::new(FixedClock::new(now()));
    let service = EventService::new(Arc::new(store.clone()), Arc::new(store.clone()))
        .with_clock(clock.clone());
    (service, store, clock)
}

/// Form with a required name, a t-shirt radio with an "Other" fallback, and a
/// sizes checkbox with an "Other" fallback.
pub(super) fn tshirt_schema() -> FormSchema {
    FormSchema::new(vec![
        FormField::new("name", FieldKind::Text, "Name").required(),
        FormField::new(
            "shirt",
            FieldKind::Radio(ChoiceSpec::new(["S", "M", "L"]).with_other()),
            "T-shirt size",
        ),
        FormField::new(
            "sizes",
            FieldKind::Checkbox(ChoiceSpec::new(["S", "M", "L"]).with_other()),
            "Sizes you could wear",
        ),
    ])
}

/// Creates a project with both public pages enabled and the t-shirt form.
pub(super) fn open_project(service: &MemoryService, name: &str) -> Project {
    let project = service.create_project(seed(name)).expect("project created");
    service
        .patch_section(&project.id, ConfigSection::LandingPage, &json!({ "isEnabled": true }))
        .expect("landing enabled");
    service
        .patch_section(
            &project.id,
            ConfigSection::RegistrationPage,
            &json!({
                "isEnabled": true,
                "fields": serde_json::to_value(tshirt_schema()).expect("schema json"),
            }),
        )
        .expect("registration enabled")
}

pub(super) fn complete_draft(name: &str) -> RegistrationDraft {
    let mut draft = RegistrationDraft::new();
    draft.set_value("name", name);
    draft.set_value("shirt", "M");
    draft.agree_privacy(true);
    draft
}

/// Registration store that is unavailable for the first `failures` inserts.
pub(super) struct FlakyRegistrations {
    inner: MemoryStore,
    remaining_failures: AtomicUsize,
}

impl FlakyRegistrations {
    pub(super) fn new(inner: MemoryStore, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

impl RegistrationRepository for FlakyRegistrations {
    fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, RepositoryError> {
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.insert_registration(registration)
    }

    fn list_registrations(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        self.inner.list_registrations(project_id)
    }

    fn registration_counts(&self) -> Result<BTreeMap<ProjectId, u64>, RepositoryError> {
        self.inner.registration_counts()
    }
}

/// Project store that makes every writer wait at a shared barrier before it reaches
/// the wrapped store, so concurrent admin edits overlap.
pub(super) struct RendezvousProjects {
    inner: MemoryStore,
    barrier: Barrier,
}

impl RendezvousProjects {
    pub(super) fn new(inner: MemoryStore, writers: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(writers),
        }
    }
}

impl ProjectRepository for RendezvousProjects {
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        self.inner.list_projects()
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        self.inner.insert_project(project)
    }

    fn modify_project<T, E, F>(
        &self,
        id: &ProjectId,
        change: F,
    ) -> Result<Option<(Project, T)>, E>
    where
        F: FnOnce(&mut Project) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.barrier.wait();
        self.inner.modify_project(id, change)
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.inner.delete_project(id)
    }
}

pub(super) struct UnavailableStore;

impl ProjectRepository for UnavailableStore {
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_project(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_project(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify_project<T, E, F>(
        &self,
        _id: &ProjectId,
        _change: F,
    ) -> Result<Option<(Project, T)>, E>
    where
        F: FnOnce(&mut Project) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn delete_project(&self, _id: &ProjectId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl RegistrationRepository for UnavailableStore {
    fn insert_registration(
        &self,
        _registration: Registration,
    ) -> Result<Registration, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_registrations(
        &self,
        _project_id: &ProjectId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn registration_counts(&self) -> Result<BTreeMap<ProjectId, u64>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    project_router(Arc::new(service))
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
