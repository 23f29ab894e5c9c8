use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::record::{ProjectRow, RegistrationRow};
use crate::projects::{
    Project, ProjectId, ProjectRepository, Registration, RegistrationRepository, RepositoryError,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    projects: Vec<ProjectRow>,
    #[serde(default)]
    registrations: Vec<RegistrationRow>,
}

/// Single-file JSON store. Every operation re-reads the file, and writes replace it
/// through a sibling temporary file so a crash never leaves a truncated document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreFile, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(error) => return Err(unavailable(&self.path, error)),
        };

        if raw.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        serde_json::from_str(&raw).map_err(|error| unavailable(&self.path, error))
    }

    fn write(&self, file: &StoreFile) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| unavailable(parent, error))?;
        }

        let payload =
            serde_json::to_string_pretty(file).map_err(|error| unavailable(&self.path, error))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload).map_err(|error| unavailable(&staging, error))?;
        fs::rename(&staging, &self.path).map_err(|error| unavailable(&self.path, error))
    }

    fn query<T>(&self, read: impl FnOnce(StoreFile) -> T) -> Result<T, RepositoryError> {
        let _held = self.lock()?;
        Ok(read(self.read()?))
    }

    fn transact<T, E: From<RepositoryError>>(
        &self,
        change: impl FnOnce(&mut StoreFile) -> Result<T, E>,
    ) -> Result<T, E> {
        let _held = self.lock()?;
        let mut file = self.read()?;
        let outcome = change(&mut file)?;
        self.write(&file)?;
        Ok(outcome)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, RepositoryError> {
        self.guard
            .lock()
            .map_err(|_| RepositoryError::Unavailable("json store lock poisoned".to_string()))
    }
}

fn unavailable(path: &Path, error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {error}", path.display()))
}

impl ProjectRepository for JsonFileStore {
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        self.query(|file| file.projects.into_iter().map(Project::from).collect())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.query(|file| {
            file.projects
                .into_iter()
                .find(|row| row.id == id.0)
                .map(Project::from)
        })
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        self.transact(|file| {
            if file.projects.iter().any(|row| row.id == project.id.0) {
                return Err(RepositoryError::Conflict);
            }
            file.projects.push(ProjectRow::from(project.clone()));
            Ok(project)
        })
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
        self.transact(|file| {
            let Some(row) = file.projects.iter_mut().find(|row| row.id == id.0) else {
                return Ok(None);
            };

            let mut project = Project::from(row.clone());
            let outcome = change(&mut project)?;
            *row = ProjectRow::from(project.clone());
            Ok(Some((project, outcome)))
        })
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        self.transact(|file| {
            let before = file.projects.len();
            file.projects.retain(|row| row.id != id.0);
            if file.projects.len() == before {
                Err(RepositoryError::NotFound)
            } else {
                Ok(())
            }
        })
    }
}

impl RegistrationRepository for JsonFileStore {
    fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, RepositoryError> {
        self.transact(|file| {
            if file
                .registrations
                .iter()
                .any(|row| row.id == registration.id.0)
            {
                return Err(RepositoryError::Conflict);
            }
            file.registrations
                .push(RegistrationRow::from(registration.clone()));
            Ok(registration)
        })
    }

    fn list_registrations(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        self.query(|file| {
            file.registrations
                .into_iter()
                .filter(|row| row.project_id == project_id.0)
                .map(Registration::from)
                .collect()
        })
    }

    fn registration_counts(&self) -> Result<BTreeMap<ProjectId, u64>, RepositoryError> {
        self.query(|file| {
            let mut counts = BTreeMap::new();
            for row in file.registrations {
                *counts.entry(ProjectId(row.project_id)).or_insert(0) += 1;
            }
            counts
        })
    }
}
