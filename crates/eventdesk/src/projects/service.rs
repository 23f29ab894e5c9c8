use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::admission::AdmissionState;
use super::domain::{Member, NotificationConfig, Project, ProjectId, ProjectSeed};
use super::form::{FieldId, FieldPatch, FormField, SchemaError};
use super::listing::{
    filter_registrations, summarize_projects, ProjectQuery, ProjectSummary, RegistrationQuery,
};
use super::patch::{ConfigSection, PatchError, ProjectDetailsPatch};
use super::registration::{Registration, RegistrationDraft, RegistrationId, ValidationError};
use super::repository::{ProjectRepository, RegistrationRepository, RepositoryError};
use super::views::{LandingView, RegistrationFormView, SubmissionReceipt};
use crate::export::{self, ExportError};

/// Source of the current instant, injectable so admission windows can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Service composing project configuration, public views, and registration intake.
pub struct EventService<P, R> {
    projects: Arc<P>,
    registrations: Arc<R>,
    clock: Arc<dyn Clock>,
    roster: Vec<Member>,
}

impl<P, R> EventService<P, R>
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    pub fn new(projects: Arc<P>, registrations: Arc<R>) -> Self {
        Self {
            projects,
            registrations,
            clock: Arc::new(SystemClock),
            roster: Member::default_roster(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_roster(mut self, roster: Vec<Member>) -> Self {
        self.roster = roster;
        self
    }

    pub fn roster(&self) -> &[Member] {
        &self.roster
    }

    /// Create a project from admin-supplied details with default configuration.
    pub fn create_project(&self, seed: ProjectSeed) -> Result<Project, EventServiceError> {
        if seed.name.trim().is_empty() {
            return Err(EventServiceError::BlankName);
        }

        let project = Project::from_seed(ProjectId::generate(), seed, self.clock.now());
        let stored = self.projects.insert_project(project)?;
        info!(project_id = %stored.id, name = %stored.name, "project created");
        Ok(stored)
    }

    pub fn project(&self, id: &ProjectId) -> Result<Project, EventServiceError> {
        self.projects
            .fetch_project(id)?
            .ok_or_else(|| EventServiceError::NotFound(id.clone()))
    }

    /// Admin listing with registration counts, filtered and sorted per `query`.
    pub fn list_projects(
        &self,
        query: &ProjectQuery,
    ) -> Result<Vec<ProjectSummary>, EventServiceError> {
        let projects = self.projects.list_projects()?;
        let counts = self.registrations.registration_counts()?;
        Ok(summarize_projects(projects, &counts, &self.roster, query))
    }

    pub fn update_details(
        &self,
        id: &ProjectId,
        patch: ProjectDetailsPatch,
    ) -> Result<Project, EventServiceError> {
        if patch
            .name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(EventServiceError::BlankName);
        }

        let (project, ()) = self.mutate(id, |project| {
            project.apply_details(patch);
            Ok(())
        })?;
        info!(project_id = %id, "project details updated");
        Ok(project)
    }

    /// Merge `patch` into one configuration section and persist the project.
    pub fn patch_section(
        &self,
        id: &ProjectId,
        section: ConfigSection,
        patch: &Value,
    ) -> Result<Project, EventServiceError> {
        let (project, ()) = self.mutate(id, |project| {
            project.apply_patch(section, patch)?;
            Ok(())
        })?;
        info!(project_id = %id, %section, "project section updated");
        Ok(project)
    }

    pub fn add_field(&self, id: &ProjectId) -> Result<FormField, EventServiceError> {
        let (project, field_id) =
            self.mutate(id, |project| Ok(project.registration_page.fields.add_field()))?;
        info!(project_id = %id, field_id = %field_id, "form field added");

        project
            .registration_page
            .fields
            .field(&field_id)
            .cloned()
            .ok_or_else(|| EventServiceError::NotFound(id.clone()))
    }

    pub fn update_field(
        &self,
        id: &ProjectId,
        field_id: &FieldId,
        patch: FieldPatch,
    ) -> Result<Project, EventServiceError> {
        let (project, ()) = self.mutate(id, |project| {
            project.registration_page.fields.update_field(field_id, patch);
            Ok(())
        })?;
        Ok(project)
    }

    pub fn remove_field(
        &self,
        id: &ProjectId,
        field_id: &FieldId,
    ) -> Result<Project, EventServiceError> {
        let (project, ()) = self.mutate(id, |project| {
            project.registration_page.fields.remove_field(field_id);
            Ok(())
        })?;
        info!(project_id = %id, field_id = %field_id, "form field removed");
        Ok(project)
    }

    /// Deletes the project. Its registrations are retained by the store.
    pub fn delete_project(&self, id: &ProjectId) -> Result<(), EventServiceError> {
        self.project(id)?;
        self.projects
            .delete_project(id)
            .map_err(|error| not_found_as(id, error))?;
        info!(project_id = %id, "project deleted");
        Ok(())
    }

    pub fn registrations(
        &self,
        id: &ProjectId,
        query: &RegistrationQuery,
    ) -> Result<Vec<Registration>, EventServiceError> {
        self.project(id)?;
        let registrations = self.registrations.list_registrations(id)?;
        Ok(filter_registrations(registrations, query))
    }

    /// Writes every registration of the project as CSV, oldest first. Returns the row count.
    pub fn export_registrations<W: Write>(
        &self,
        id: &ProjectId,
        writer: W,
    ) -> Result<usize, EventServiceError> {
        let project = self.project(id)?;
        let mut registrations = self.registrations.list_registrations(id)?;
        registrations.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));

        let rows = export::write_csv(&project.registration_page.fields, &registrations, writer)?;
        info!(project_id = %id, rows, "registrations exported");
        Ok(rows)
    }

    /// Public landing page. Hidden unless enabled, except for admin previews.
    pub fn landing(&self, id: &ProjectId, preview: bool) -> Result<LandingView, EventServiceError> {
        let project = self.project(id)?;
        if !project.landing_page.is_enabled && !preview {
            return Err(EventServiceError::NotFound(id.clone()));
        }

        let count = self.registrations.count_registrations(id)?;
        let state = project.admission(self.clock.now(), count);
        Ok(LandingView::build(&project, count, state, preview))
    }

    pub fn registration_form(
        &self,
        id: &ProjectId,
    ) -> Result<RegistrationFormView, EventServiceError> {
        let project = self.project(id)?;
        if !project.registration_page.is_enabled {
            return Err(EventServiceError::NotFound(id.clone()));
        }

        let count = self.registrations.count_registrations(id)?;
        let state = project.admission(self.clock.now(), count);
        Ok(RegistrationFormView::build(&project, state))
    }

    /// Accept a registration. Admission is re-evaluated at submit time, then the
    /// draft is validated and finalized. Nothing is written on any failure, and
    /// the draft is only borrowed so the caller can retry it unchanged.
    pub fn submit(
        &self,
        id: &ProjectId,
        draft: &RegistrationDraft,
    ) -> Result<SubmissionReceipt, EventServiceError> {
        let project = self.project(id)?;
        let now = self.clock.now();
        let count = self.registrations.count_registrations(id)?;

        let state = project.admission(now, count);
        if !state.is_open() {
            warn!(project_id = %id, state = state.label(), "registration rejected");
            return Err(EventServiceError::Admission(state));
        }

        let schema = &project.registration_page.fields;
        if let Err(error) = draft.validate(schema, &project.terms) {
            warn!(project_id = %id, %error, "registration failed validation");
            return Err(error.into());
        }

        let registration = Registration {
            id: RegistrationId::generate(),
            project_id: id.clone(),
            submitted_at: now,
            answers: draft.finalize(schema),
        };
        let stored = self.registrations.insert_registration(registration)?;
        info!(project_id = %id, registration_id = %stored.id, "registration accepted");

        let success_message = if project.notification.success_message.trim().is_empty() {
            NotificationConfig::starter().success_message
        } else {
            project.notification.success_message
        };

        Ok(SubmissionReceipt {
            registration: stored,
            success_message,
        })
    }

    /// Apply `change` to the latest stored project inside the store's write. The form
    /// schema is validated only when the change touched it, so unrelated edits still
    /// save on legacy records.
    fn mutate<T>(
        &self,
        id: &ProjectId,
        change: impl FnOnce(&mut Project) -> Result<T, EventServiceError>,
    ) -> Result<(Project, T), EventServiceError> {
        self.projects
            .modify_project(id, |project| -> Result<T, EventServiceError> {
                let fields_before = project.registration_page.fields.clone();
                let outcome = change(project)?;
                if project.registration_page.fields != fields_before {
                    project.registration_page.fields.validate()?;
                }
                Ok(outcome)
            })?
            .ok_or_else(|| EventServiceError::NotFound(id.clone()))
    }
}

fn not_found_as(id: &ProjectId, error: RepositoryError) -> EventServiceError {
    match error {
        RepositoryError::NotFound => EventServiceError::NotFound(id.clone()),
        other => EventServiceError::Repository(other),
    }
}

/// Error raised by the event service.
#[derive(Debug, thiserror::Error)]
pub enum EventServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("project {0} not found")]
    NotFound(ProjectId),
    #[error("{}", .0.message())]
    Admission(AdmissionState),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error("project name must not be empty")]
    BlankName,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl EventServiceError {
    /// Whether the same request may succeed if retried unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Repository(error) => error.is_retryable(),
            _ => false,
        }
    }
}
