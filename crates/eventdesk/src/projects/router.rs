use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{ProjectId, ProjectSeed};
use super::form::{FieldId, FieldPatch};
use super::listing::{ProjectQuery, RegistrationQuery};
use super::patch::{ConfigSection, ProjectDetailsPatch};
use super::registration::RegistrationDraft;
use super::repository::{ProjectRepository, RegistrationRepository, RepositoryError};
use super::service::{EventService, EventServiceError};

const ADMIN_PROJECTS_PATH: &str = "/admin/projects";

/// Router builder exposing the admin project endpoints and the public event endpoints.
pub fn project_router<P, R>(service: Arc<EventService<P, R>>) -> Router
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects",
            get(list_handler::<P, R>).post(create_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id",
            get(project_handler::<P, R>)
                .patch(details_handler::<P, R>)
                .delete(delete_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id/sections/:section",
            patch(section_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id/fields",
            post(add_field_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id/fields/:field_id",
            patch(update_field_handler::<P, R>).delete(remove_field_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id/registrations",
            get(registrations_handler::<P, R>),
        )
        .route(
            "/api/v1/projects/:project_id/registrations/export",
            get(export_handler::<P, R>),
        )
        .route("/api/v1/events/:project_id", get(landing_handler::<P, R>))
        .route(
            "/api/v1/events/:project_id/form",
            get(form_handler::<P, R>),
        )
        .route(
            "/api/v1/events/:project_id/registrations",
            post(submit_handler::<P, R>),
        )
        .with_state(service)
}

type SharedService<P, R> = State<Arc<EventService<P, R>>>;

/// Runs a service call on the blocking pool, since stores may do file I/O.
async fn run_blocking<P, R, T>(
    service: Arc<EventService<P, R>>,
    call: impl FnOnce(&EventService<P, R>) -> Result<T, EventServiceError> + Send + 'static,
) -> Result<T, EventServiceError>
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .unwrap_or_else(|error| {
            Err(RepositoryError::Unavailable(format!("storage task failed: {error}")).into())
        })
}

pub(crate) async fn list_handler<P, R>(
    State(service): SharedService<P, R>,
    Query(query): Query<ProjectQuery>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match run_blocking(service, move |service| service.list_projects(&query)).await {
        Ok(projects) => (StatusCode::OK, axum::Json(projects)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn create_handler<P, R>(
    State(service): SharedService<P, R>,
    axum::Json(seed): axum::Json<ProjectSeed>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match run_blocking(service, move |service| service.create_project(seed)).await {
        Ok(project) => (StatusCode::CREATED, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn project_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match run_blocking(service, move |service| service.project(&ProjectId(project_id))).await {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn details_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
    axum::Json(patch): axum::Json<ProjectDetailsPatch>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.update_details(&ProjectId(project_id), patch)
    })
    .await;
    match outcome {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.delete_project(&ProjectId(project_id))
    })
    .await;
    match outcome {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn section_handler<P, R>(
    State(service): SharedService<P, R>,
    Path((project_id, section)): Path<(String, String)>,
    axum::Json(patch): axum::Json<Value>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let section = match section.parse::<ConfigSection>() {
        Ok(section) => section,
        Err(error) => return EventServiceError::from(error).into_response(),
    };

    let outcome = run_blocking(service, move |service| {
        service.patch_section(&ProjectId(project_id), section, &patch)
    })
    .await;
    match outcome {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn add_field_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    match run_blocking(service, move |service| service.add_field(&ProjectId(project_id))).await {
        Ok(field) => (StatusCode::CREATED, axum::Json(field)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn update_field_handler<P, R>(
    State(service): SharedService<P, R>,
    Path((project_id, field_id)): Path<(String, String)>,
    axum::Json(patch): axum::Json<FieldPatch>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.update_field(&ProjectId(project_id), &FieldId(field_id), patch)
    })
    .await;
    match outcome {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn remove_field_handler<P, R>(
    State(service): SharedService<P, R>,
    Path((project_id, field_id)): Path<(String, String)>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.remove_field(&ProjectId(project_id), &FieldId(field_id))
    })
    .await;
    match outcome {
        Ok(project) => (StatusCode::OK, axum::Json(project)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn registrations_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
    Query(query): Query<RegistrationQuery>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.registrations(&ProjectId(project_id), &query)
    })
    .await;
    match outcome {
        Ok(registrations) => (StatusCode::OK, axum::Json(registrations)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn export_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let exported = run_blocking(service, move |service| {
        let mut body = Vec::new();
        service.export_registrations(&ProjectId(project_id), &mut body)?;
        Ok(body)
    })
    .await;
    match exported {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LandingParams {
    #[serde(default)]
    preview: bool,
}

pub(crate) async fn landing_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
    Query(params): Query<LandingParams>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.landing(&ProjectId(project_id), params.preview)
    })
    .await;
    match outcome {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn form_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.registration_form(&ProjectId(project_id))
    })
    .await;
    match outcome {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_handler<P, R>(
    State(service): SharedService<P, R>,
    Path(project_id): Path<String>,
    axum::Json(draft): axum::Json<RegistrationDraft>,
) -> Response
where
    P: ProjectRepository + 'static,
    R: RegistrationRepository + 'static,
{
    let outcome = run_blocking(service, move |service| {
        service.submit(&ProjectId(project_id), &draft)
    })
    .await;
    match outcome {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for EventServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, payload) = match &self {
            EventServiceError::Validation(error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": message,
                    "field": error.field_id().map(|id| id.as_str()),
                }),
            ),
            EventServiceError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": message,
                    "projectId": id.as_str(),
                    "redirect": ADMIN_PROJECTS_PATH,
                }),
            ),
            EventServiceError::Admission(state) => (
                StatusCode::CONFLICT,
                json!({
                    "error": message,
                    "state": state.label(),
                }),
            ),
            EventServiceError::Schema(_)
            | EventServiceError::Patch(_)
            | EventServiceError::BlankName => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
            }
            EventServiceError::Repository(RepositoryError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": message,
                    "retryable": true,
                }),
            ),
            EventServiceError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            EventServiceError::Repository(RepositoryError::Conflict) => {
                (StatusCode::CONFLICT, json!({ "error": message }))
            }
            EventServiceError::Export(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, axum::Json(payload)).into_response()
    }
}
