use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Member, Project, ProjectId, ProjectStatus};
use super::registration::Registration;

const UNASSIGNED_MANAGER: &str = "Unassigned";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectSort {
    /// Most recent event date first.
    #[default]
    Latest,
    Oldest,
    MostRegistrations,
    LeastRegistrations,
    NameAsc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ProjectSort,
}

/// Row of the admin project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub manager_id: String,
    pub manager_name: String,
    pub date: NaiveDate,
    pub location: String,
    pub status: ProjectStatus,
    pub registration_count: u64,
    pub landing_enabled: bool,
    pub registration_enabled: bool,
}

pub(crate) fn summarize_projects(
    projects: Vec<Project>,
    counts: &BTreeMap<ProjectId, u64>,
    roster: &[Member],
    query: &ProjectQuery,
) -> Vec<ProjectSummary> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut summaries: Vec<ProjectSummary> = projects
        .into_iter()
        .map(|project| {
            let manager_name = roster
                .iter()
                .find(|member| member.id == project.manager_id)
                .map(|member| member.name.clone())
                .unwrap_or_else(|| UNASSIGNED_MANAGER.to_string());
            ProjectSummary {
                registration_count: counts.get(&project.id).copied().unwrap_or(0),
                landing_enabled: project.landing_page.is_enabled,
                registration_enabled: project.registration_page.is_enabled,
                id: project.id,
                name: project.name,
                manager_id: project.manager_id,
                manager_name,
                date: project.date,
                location: project.location,
                status: project.status,
            }
        })
        .filter(|summary| match &needle {
            Some(needle) => {
                summary.name.to_lowercase().contains(needle)
                    || summary.manager_name.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    match query.sort {
        ProjectSort::Latest => summaries.sort_by(|a, b| b.date.cmp(&a.date)),
        ProjectSort::Oldest => summaries.sort_by(|a, b| a.date.cmp(&b.date)),
        ProjectSort::MostRegistrations => {
            summaries.sort_by(|a, b| b.registration_count.cmp(&a.registration_count))
        }
        ProjectSort::LeastRegistrations => {
            summaries.sort_by(|a, b| a.registration_count.cmp(&b.registration_count))
        }
        ProjectSort::NameAsc => summaries.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    summaries
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationSort {
    #[default]
    Latest,
    Oldest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: RegistrationSort,
}

/// Filters by a case-insensitive match over every answer, then orders by submission time.
pub(crate) fn filter_registrations(
    registrations: Vec<Registration>,
    query: &RegistrationQuery,
) -> Vec<Registration> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase);

    let mut matching: Vec<Registration> = registrations
        .into_iter()
        .filter(|registration| match &needle {
            Some(needle) => registration
                .answers
                .values()
                .map(|answer| answer.display())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
                .contains(needle),
            None => true,
        })
        .collect();

    match query.sort {
        RegistrationSort::Latest => matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at)),
        RegistrationSort::Oldest => matching.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at)),
    }

    matching
}
