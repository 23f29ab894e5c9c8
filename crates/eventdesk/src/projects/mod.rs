//! Event projects: the form schema, admission rules, registration intake, and the
//! admin/public HTTP surface built on them.

pub mod admission;
pub mod domain;
pub mod form;
pub mod listing;
pub mod patch;
pub mod registration;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use admission::AdmissionState;
pub use domain::{
    DesignConfig, LandingPageConfig, Member, NotificationConfig, PageMetadata, PolicyConfig,
    Project, ProjectId, ProjectSeed, ProjectStatus, RegistrationPageConfig, ScheduleWindow,
    SeoConfig, TermsConfig,
};
pub use form::{
    parse_options, ChoiceSpec, FieldId, FieldKind, FieldPatch, FieldType, FormField, FormSchema,
    SchemaError, OTHER_OPTION,
};
pub use listing::{ProjectQuery, ProjectSort, ProjectSummary, RegistrationQuery, RegistrationSort};
pub use patch::{ConfigSection, PatchError, ProjectDetailsPatch};
pub use registration::{
    AnswerValue, Answers, Registration, RegistrationDraft, RegistrationId, ValidationError,
};
pub use repository::{ProjectRepository, RegistrationRepository, RepositoryError};
pub use router::project_router;
pub use service::{Clock, EventService, EventServiceError, SystemClock};
pub use views::{
    CallToAction, CapacityView, FieldView, LandingView, RegistrationFormView, SubmissionReceipt,
};
