//! Persisted row shapes. Column names are snake_case; section payloads keep their
//! camelCase keys, matching how the configuration is edited.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::projects::{
    Answers, DesignConfig, LandingPageConfig, NotificationConfig, PolicyConfig, Project,
    ProjectId, ProjectStatus, Registration, RegistrationId, RegistrationPageConfig,
    ScheduleWindow, SeoConfig, TermsConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub manager_id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seo: Option<SeoConfig>,
    #[serde(default)]
    pub landing_page: Option<LandingPageConfig>,
    #[serde(default)]
    pub registration_page: Option<RegistrationPageConfig>,
    #[serde(default)]
    pub schedule: Option<ScheduleWindow>,
    #[serde(default)]
    pub policy: Option<PolicyConfig>,
    #[serde(default)]
    pub terms: Option<TermsConfig>,
    #[serde(default)]
    pub design: Option<DesignConfig>,
    #[serde(default)]
    pub notification: Option<NotificationConfig>,
}

impl From<ProjectRow> for Project {
    /// Missing sections load as defaults. SEO metadata absent from older rows, or
    /// left blank, is synthesized from the landing copy and the project name. A row
    /// without an event date takes the day it was created, or the Unix epoch.
    fn from(row: ProjectRow) -> Self {
        let landing_page = row.landing_page.unwrap_or_default();
        let synthesized = SeoConfig::synthesized(&landing_page, &row.name);
        let seo = match row.seo {
            None => synthesized,
            Some(mut seo) => {
                if seo.title.trim().is_empty() {
                    seo.title = synthesized.title;
                }
                if seo.description.trim().is_empty() {
                    seo.description = synthesized.description;
                }
                seo
            }
        };

        let date = row
            .date
            .or_else(|| row.created_at.map(|created| created.date_naive()))
            .unwrap_or_default();
        let created_at = row.created_at.unwrap_or_else(|| {
            date.and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or_default()
        });

        Self {
            id: ProjectId(row.id),
            name: row.name,
            manager_id: row.manager_id,
            date,
            location: row.location,
            status: row.status.unwrap_or(ProjectStatus::Planning),
            created_at,
            seo,
            landing_page,
            registration_page: row.registration_page.unwrap_or_default(),
            schedule: row.schedule.unwrap_or_default(),
            policy: row.policy.unwrap_or_default(),
            terms: row.terms.unwrap_or_default(),
            design: row.design.unwrap_or_default(),
            notification: row.notification.unwrap_or_default(),
        }
    }
}

impl From<Project> for ProjectRow {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.0,
            name: project.name,
            manager_id: project.manager_id,
            date: Some(project.date),
            location: project.location,
            status: Some(project.status),
            created_at: Some(project.created_at),
            seo: Some(project.seo),
            landing_page: Some(project.landing_page),
            registration_page: Some(project.registration_page),
            schedule: Some(project.schedule),
            policy: Some(project.policy),
            terms: Some(project.terms),
            design: Some(project.design),
            notification: Some(project.notification),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub id: String,
    pub project_id: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Answers,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: RegistrationId(row.id),
            project_id: ProjectId(row.project_id),
            submitted_at: row.submitted_at,
            answers: row.answers,
        }
    }
}

impl From<Registration> for RegistrationRow {
    fn from(registration: Registration) -> Self {
        Self {
            id: registration.id.0,
            project_id: registration.project_id.0,
            submitted_at: registration.submitted_at,
            answers: registration.answers,
        }
    }
}
