use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{Project, ProjectStatus};

/// Independently editable configuration sections of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSection {
    Seo,
    LandingPage,
    RegistrationPage,
    Schedule,
    Policy,
    Design,
    Terms,
    Notification,
}

impl ConfigSection {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Seo,
            Self::LandingPage,
            Self::RegistrationPage,
            Self::Schedule,
            Self::Policy,
            Self::Design,
            Self::Terms,
            Self::Notification,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Seo => "seo",
            Self::LandingPage => "landingPage",
            Self::RegistrationPage => "registrationPage",
            Self::Schedule => "schedule",
            Self::Policy => "policy",
            Self::Design => "design",
            Self::Terms => "terms",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for ConfigSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConfigSection {
    type Err = PatchError;

    /// Accepts both the camelCase key and the snake_case storage column name.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ordered()
            .into_iter()
            .find(|section| section.key().to_ascii_lowercase() == normalized)
            .ok_or_else(|| PatchError::UnknownSection(raw.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("unknown configuration section '{0}'")]
    UnknownSection(String),
    #[error("patch for {section} must be a JSON object")]
    NotAnObject { section: ConfigSection },
    #[error("patch for {section} is invalid: {source}")]
    Invalid {
        section: ConfigSection,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed partial update of a project's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailsPatch {
    pub name: Option<String>,
    pub manager_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    /// Shallow-merges `patch` into one section. Keys missing from `patch` keep their
    /// value, `null` clears optional keys, sibling sections are never touched. On
    /// error the project is left unchanged.
    pub fn apply_patch(&mut self, section: ConfigSection, patch: &Value) -> Result<(), PatchError> {
        let Value::Object(patch) = patch else {
            return Err(PatchError::NotAnObject { section });
        };

        match section {
            ConfigSection::Seo => self.seo = merge_section(&self.seo, patch, section)?,
            ConfigSection::LandingPage => {
                self.landing_page = merge_section(&self.landing_page, patch, section)?
            }
            ConfigSection::RegistrationPage => {
                self.registration_page = merge_section(&self.registration_page, patch, section)?
            }
            ConfigSection::Schedule => {
                self.schedule = merge_section(&self.schedule, patch, section)?
            }
            ConfigSection::Policy => self.policy = merge_section(&self.policy, patch, section)?,
            ConfigSection::Design => self.design = merge_section(&self.design, patch, section)?,
            ConfigSection::Terms => self.terms = merge_section(&self.terms, patch, section)?,
            ConfigSection::Notification => {
                self.notification = merge_section(&self.notification, patch, section)?
            }
        }

        Ok(())
    }

    pub fn apply_details(&mut self, patch: ProjectDetailsPatch) {
        let ProjectDetailsPatch {
            name,
            manager_id,
            date,
            location,
            status,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(manager_id) = manager_id {
            self.manager_id = manager_id;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(status) = status {
            self.status = status;
        }
    }
}

fn merge_section<T>(
    current: &T,
    patch: &Map<String, Value>,
    section: ConfigSection,
) -> Result<T, PatchError>
where
    T: Serialize + DeserializeOwned,
{
    let invalid = |source| PatchError::Invalid { section, source };

    let mut merged = serde_json::to_value(current).map_err(invalid)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(merged).map_err(invalid)
}
