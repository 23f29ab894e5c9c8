use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::projects::{
    Project, ProjectId, ProjectRepository, Registration, RegistrationRepository, RepositoryError,
};

/// Process-local store backing both repositories. Clones share the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    projects: Arc<Mutex<BTreeMap<ProjectId, Project>>>,
    registrations: Arc<Mutex<Vec<Registration>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
}

impl ProjectRepository for MemoryStore {
    fn list_projects(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(lock(&self.projects)?.values().cloned().collect())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(lock(&self.projects)?.get(id).cloned())
    }

    fn insert_project(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut projects = lock(&self.projects)?;
        if projects.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        projects.insert(project.id.clone(), project.clone());
        Ok(project)
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
        let mut projects = lock(&self.projects)?;
        let Some(existing) = projects.get_mut(id) else {
            return Ok(None);
        };

        let mut working = existing.clone();
        let outcome = change(&mut working)?;
        *existing = working.clone();
        Ok(Some((working, outcome)))
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        lock(&self.projects)?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

impl RegistrationRepository for MemoryStore {
    fn insert_registration(
        &self,
        registration: Registration,
    ) -> Result<Registration, RepositoryError> {
        let mut registrations = lock(&self.registrations)?;
        if registrations.iter().any(|existing| existing.id == registration.id) {
            return Err(RepositoryError::Conflict);
        }
        registrations.push(registration.clone());
        Ok(registration)
    }

    fn list_registrations(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        Ok(lock(&self.registrations)?
            .iter()
            .filter(|registration| &registration.project_id == project_id)
            .cloned()
            .collect())
    }

    fn count_registrations(&self, project_id: &ProjectId) -> Result<u64, RepositoryError> {
        Ok(lock(&self.registrations)?
            .iter()
            .filter(|registration| &registration.project_id == project_id)
            .count() as u64)
    }

    fn registration_counts(&self) -> Result<BTreeMap<ProjectId, u64>, RepositoryError> {
        let mut counts = BTreeMap::new();
        for registration in lock(&self.registrations)?.iter() {
            *counts.entry(registration.project_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
