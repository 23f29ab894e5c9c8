use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::admission::{self, AdmissionState};
use super::form::FormSchema;

const DEFAULT_THEME_COLOR: &str = "#3b82f6";
const DEFAULT_REGISTRATION_TITLE: &str = "Registration";
const DEFAULT_PRIVACY_POLICY: &str =
    "I agree to the collection and use of my personal information.";
const DEFAULT_SUCCESS_MESSAGE: &str = "Your registration is complete.";

/// Identifier wrapper for projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// A person on the organising team who can be assigned as project manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl Member {
    fn new(id: &str, name: &str, role: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        }
    }

    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::new("m1", "Chulsoo Kim", "PM"),
            Self::new("m2", "Younghee Lee", "Designer"),
            Self::new("m3", "Minsu Park", "Developer"),
            Self::new("m4", "Sujin Jung", "Marketer"),
            Self::new("m5", "Donghoon Choi", "Developer"),
        ]
    }
}

/// Search-engine and browser-tab metadata for the public pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
}

impl SeoConfig {
    /// Synthesizes SEO metadata for records stored before the section existed.
    pub fn synthesized(landing: &LandingPageConfig, project_name: &str) -> Self {
        let title = non_blank(&landing.title).unwrap_or(project_name).to_string();
        let description = non_blank(&landing.description)
            .unwrap_or_default()
            .to_string();

        Self {
            title,
            description,
            og_image: None,
            favicon_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandingPageConfig {
    pub is_enabled: bool,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    pub theme_color: String,
}

impl Default for LandingPageConfig {
    fn default() -> Self {
        Self {
            is_enabled: false,
            title: String::new(),
            description: String::new(),
            hero_image: None,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationPageConfig {
    pub is_enabled: bool,
    pub title: String,
    pub description: String,
    pub fields: FormSchema,
}

/// Application and event windows. Every bound is optional (open-ended).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleWindow {
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub application_start: Option<DateTime<Utc>>,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub application_end: Option<DateTime<Utc>>,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub event_start: Option<DateTime<Utc>>,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub event_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i64>,
    /// Recorded but not enforced: the deduplication key was never defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_duplicate: Option<bool>,
}

impl PolicyConfig {
    /// Effective capacity; `None` when unlimited (absent or non-positive).
    pub fn capacity(&self) -> Option<u64> {
        self.max_participants
            .filter(|max| *max > 0)
            .map(|max| max as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TermsConfig {
    pub privacy_policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_consent: Option<String>,
    pub require_privacy: bool,
    pub require_marketing: bool,
}

impl TermsConfig {
    pub fn starter() -> Self {
        Self {
            privacy_policy: DEFAULT_PRIVACY_POLICY.to_string(),
            marketing_consent: None,
            require_privacy: true,
            require_marketing: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationConfig {
    pub success_message: String,
}

impl NotificationConfig {
    pub fn starter() -> Self {
        Self {
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
        }
    }
}

/// Descriptive fields supplied when an admin creates a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSeed {
    pub name: String,
    #[serde(default)]
    pub manager_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

/// Aggregate root: an event together with every configuration section the admin edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub manager_id: String,
    pub date: NaiveDate,
    pub location: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub seo: SeoConfig,
    pub landing_page: LandingPageConfig,
    pub registration_page: RegistrationPageConfig,
    pub schedule: ScheduleWindow,
    pub policy: PolicyConfig,
    pub terms: TermsConfig,
    pub design: DesignConfig,
    pub notification: NotificationConfig,
}

impl Project {
    /// Builds a new project with usable defaults: both public pages disabled, three
    /// required starter questions, and privacy consent required.
    pub fn from_seed(id: ProjectId, seed: ProjectSeed, created_at: DateTime<Utc>) -> Self {
        let ProjectSeed {
            name,
            manager_id,
            date,
            location,
            status,
        } = seed;

        Self {
            id,
            seo: SeoConfig {
                title: name.clone(),
                ..SeoConfig::default()
            },
            landing_page: LandingPageConfig {
                title: name.clone(),
                ..LandingPageConfig::default()
            },
            registration_page: RegistrationPageConfig {
                is_enabled: false,
                title: DEFAULT_REGISTRATION_TITLE.to_string(),
                description: String::new(),
                fields: FormSchema::starter(),
            },
            schedule: ScheduleWindow::default(),
            policy: PolicyConfig::default(),
            terms: TermsConfig::starter(),
            design: DesignConfig::default(),
            notification: NotificationConfig::starter(),
            name,
            manager_id,
            date,
            location,
            status,
            created_at,
        }
    }

    /// Registration availability for this project at `now`.
    pub fn admission(&self, now: DateTime<Utc>, registration_count: u64) -> AdmissionState {
        admission::evaluate(
            now,
            &self.schedule,
            &self.policy,
            registration_count,
            self.registration_page.is_enabled,
        )
    }

    pub fn landing_metadata(&self) -> PageMetadata {
        PageMetadata::resolve(
            &self.seo,
            &self.landing_page.title,
            &self.landing_page.description,
        )
    }

    pub fn registration_metadata(&self) -> PageMetadata {
        PageMetadata::resolve(
            &self.seo,
            &self.registration_page.title,
            &self.registration_page.description,
        )
    }
}

/// Document title, description and favicon for a rendered public page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
}

impl PageMetadata {
    fn resolve(seo: &SeoConfig, page_title: &str, page_description: &str) -> Self {
        Self {
            title: non_blank(&seo.title).unwrap_or(page_title).to_string(),
            description: non_blank(&seo.description)
                .unwrap_or(page_description)
                .to_string(),
            favicon_url: seo.favicon_url.clone(),
            og_image: seo.og_image.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Serde adapter for optional schedule timestamps.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM[:SS]` form produced by
/// datetime-local inputs (read as UTC). Empty strings deserialize to `None`.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => serializer.serialize_str(&instant.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => parse(&value).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("'{value}' is not an ISO-8601 timestamp"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seed() -> ProjectSeed {
        ProjectSeed {
            name: "Spring Meetup".to_string(),
            manager_id: "m1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 15).expect("valid date"),
            location: "Jeju".to_string(),
            status: ProjectStatus::Planning,
        }
    }

    #[test]
    fn new_projects_start_with_usable_defaults() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let project = Project::from_seed(ProjectId::from("p1"), seed(), created);

        assert!(!project.landing_page.is_enabled);
        assert!(!project.registration_page.is_enabled);
        assert_eq!(project.landing_page.title, "Spring Meetup");
        assert_eq!(project.seo.title, "Spring Meetup");
        assert_eq!(project.registration_page.fields.len(), 3);
        assert!(project
            .registration_page
            .fields
            .iter()
            .all(|field| field.required));
        assert!(project.terms.require_privacy);
        assert!(!project.terms.require_marketing);
        assert!(!project.terms.privacy_policy.is_empty());
        assert!(!project.notification.success_message.is_empty());
        assert_eq!(project.schedule, ScheduleWindow::default());
        assert_eq!(project.policy.capacity(), None);
    }

    #[test]
    fn capacity_ignores_non_positive_limits() {
        let mut policy = PolicyConfig {
            max_participants: Some(0),
            allow_duplicate: Some(false),
        };
        assert_eq!(policy.capacity(), None);
        policy.max_participants = Some(-5);
        assert_eq!(policy.capacity(), None);
        policy.max_participants = Some(50);
        assert_eq!(policy.capacity(), Some(50));
    }

    #[test]
    fn schedule_accepts_naive_and_rfc3339_timestamps() {
        let window: ScheduleWindow = serde_json::from_value(serde_json::json!({
            "applicationStart": "2024-03-01T09:00:00",
            "applicationEnd": "2024-04-10T18:00:00+09:00",
            "eventStart": "2024-04-15T10:00",
            "eventEnd": ""
        }))
        .expect("schedule parses");

        assert_eq!(
            window.application_start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(
            window.application_end,
            Some(Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap())
        );
        assert_eq!(
            window.event_start,
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 10, 0, 0).unwrap())
        );
        assert_eq!(window.event_end, None);
    }

    #[test]
    fn schedule_rejects_garbage_timestamps() {
        let result: Result<ScheduleWindow, _> = serde_json::from_value(serde_json::json!({
            "applicationStart": "next tuesday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn page_metadata_falls_back_to_page_copy() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut project = Project::from_seed(ProjectId::from("p1"), seed(), created);
        project.seo.title = String::new();
        project.landing_page.description = "Join us in Jeju".to_string();
        project.seo.favicon_url = Some("https://cdn.example.com/icon.png".to_string());

        let metadata = project.landing_metadata();
        assert_eq!(metadata.title, "Spring Meetup");
        assert_eq!(metadata.description, "Join us in Jeju");
        assert_eq!(
            metadata.favicon_url.as_deref(),
            Some("https://cdn.example.com/icon.png")
        );

        let register = project.registration_metadata();
        assert_eq!(register.title, "Registration");
    }

    #[test]
    fn synthesized_seo_prefers_landing_copy_then_name() {
        let landing = LandingPageConfig {
            title: "Spring Meetup".to_string(),
            description: "Bring a friend".to_string(),
            ..LandingPageConfig::default()
        };
        let seo = SeoConfig::synthesized(&landing, "Internal name");
        assert_eq!(seo.title, "Spring Meetup");
        assert_eq!(seo.description, "Bring a friend");

        let seo = SeoConfig::synthesized(&LandingPageConfig::default(), "Internal name");
        assert_eq!(seo.title, "Internal name");
        assert_eq!(seo.description, "");
    }
}
