use std::collections::BTreeMap;

use super::domain::{Project, ProjectId};
use super::registration::Registration;

/// Storage abstraction for project aggregates so the service can be exercised in isolation.
pub trait ProjectRepository: Send + Sync {
    /// All stored projects. An empty store yields an empty list, never an error.
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError>;
    /// Applies `change` to the latest stored project and persists it while the store
    /// holds its own lock, so edits to different sections never overwrite each other.
    /// `Ok(None)` when the project does not exist. An error from `change` leaves the
    /// stored project untouched.
    fn modify_project<T, E, F>(
        &self,
        id: &ProjectId,
        change: F,
    ) -> Result<Option<(Project, T)>, E>
    where
        F: FnOnce(&mut Project) -> Result<T, E>,
        E: From<RepositoryError>;
    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for submitted registrations.
pub trait RegistrationRepository: Send + Sync {
    /// Persists a new registration. The returned record is authoritative: a store
    /// may replace the locally assigned id and submission time with its own.
    fn insert_registration(&self, registration: Registration)
        -> Result<Registration, RepositoryError>;
    fn list_registrations(&self, project_id: &ProjectId)
        -> Result<Vec<Registration>, RepositoryError>;

    fn count_registrations(&self, project_id: &ProjectId) -> Result<u64, RepositoryError> {
        Ok(self.list_registrations(project_id)?.len() as u64)
    }

    /// Registration totals keyed by project, for listings.
    fn registration_counts(&self) -> Result<BTreeMap<ProjectId, u64>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
