use chrono::NaiveDate;
use serde::Serialize;

use super::admission::AdmissionState;
use super::domain::{PageMetadata, Project, ProjectId, ScheduleWindow, TermsConfig};
use super::form::{FieldId, FormField};
use super::registration::Registration;

/// Call-to-action state for the landing page button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub state: AdmissionState,
    pub enabled: bool,
    pub message: &'static str,
}

impl From<AdmissionState> for CallToAction {
    fn from(state: AdmissionState) -> Self {
        Self {
            state,
            enabled: state.is_open(),
            message: state.message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityView {
    pub current: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

/// Everything a renderer needs for the public landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    pub project_id: ProjectId,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    pub theme_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    pub schedule: ScheduleWindow,
    pub capacity: CapacityView,
    pub call_to_action: CallToAction,
    pub metadata: PageMetadata,
    pub preview: bool,
}

impl LandingView {
    pub(crate) fn build(
        project: &Project,
        count: u64,
        state: AdmissionState,
        preview: bool,
    ) -> Self {
        let landing = &project.landing_page;
        Self {
            project_id: project.id.clone(),
            name: project.name.clone(),
            date: project.date,
            location: project.location.clone(),
            title: landing.title.clone(),
            description: landing.description.clone(),
            hero_image: landing.hero_image.clone(),
            theme_color: landing.theme_color.clone(),
            logo_url: project.design.logo_url.clone(),
            footer_text: project.design.footer_text.clone(),
            contact_info: project.design.contact_info.clone(),
            schedule: project.schedule.clone(),
            capacity: CapacityView {
                current: count,
                max: project.policy.capacity(),
            },
            call_to_action: CallToAction::from(state),
            metadata: project.landing_metadata(),
            preview,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub id: FieldId,
    pub input_type: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub has_other_option: bool,
}

impl From<&FormField> for FieldView {
    fn from(field: &FormField) -> Self {
        Self {
            id: field.id.clone(),
            input_type: field.kind.input_type(),
            label: field.label.clone(),
            placeholder: field.placeholder.clone(),
            required: field.required,
            options: field.display_options(),
            has_other_option: field.has_other_option(),
        }
    }
}

/// Public registration form, with the admission state evaluated when it was served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationFormView {
    pub project_id: ProjectId,
    pub project_name: String,
    pub title: String,
    pub description: String,
    pub fields: Vec<FieldView>,
    pub terms: TermsConfig,
    pub admission: AdmissionState,
    pub message: &'static str,
    pub metadata: PageMetadata,
}

impl RegistrationFormView {
    pub(crate) fn build(project: &Project, state: AdmissionState) -> Self {
        let page = &project.registration_page;
        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            title: page.title.clone(),
            description: page.description.clone(),
            fields: page.fields.iter().map(FieldView::from).collect(),
            terms: project.terms.clone(),
            admission: state,
            message: state.message(),
            metadata: project.registration_metadata(),
        }
    }
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub registration: Registration,
    pub success_message: String,
}
