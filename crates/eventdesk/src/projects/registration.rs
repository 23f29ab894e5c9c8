use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ProjectId, TermsConfig};
use super::form::{ChoiceSpec, FieldId, FieldKind, FormField, FormSchema, OTHER_OPTION};


/// Identifier wrapper for submitted registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

impl RegistrationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single answer: free text or a single choice, or the selections of a checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Choices(Vec<String>),
}

impl AnswerValue {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Choices(values) => values.is_empty(),
        }
    }

    /// Flat rendering used by listings, search and exports.
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Choices(values) => values.join(", "),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

pub type Answers = BTreeMap<FieldId, AnswerValue>;

/// Persisted submission. Created once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub project_id: ProjectId,
    pub submitted_at: DateTime<Utc>,
    pub answers: Answers,
}

/// Reasons a draft cannot be submitted. Each names the condition that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{label}' is required")]
    MissingRequired { field_id: FieldId, label: String },
    #[error("you must agree to the collection and use of personal information")]
    PrivacyConsentRequired,
    #[error("'{label}' must be a valid email address")]
    InvalidEmail { field_id: FieldId, label: String },
    #[error("'{option}' is not an option for '{label}'")]
    UnknownOption {
        field_id: FieldId,
        label: String,
        option: String,
    },
    #[error("please describe your \"Other\" answer for '{label}'")]
    MissingOtherText { field_id: FieldId, label: String },
    #[error("'{label}' received an answer of the wrong shape")]
    WrongShape { field_id: FieldId, label: String },
}

impl ValidationError {
    pub fn field_id(&self) -> Option<&FieldId> {
        match self {
            Self::MissingRequired { field_id, .. }
            | Self::InvalidEmail { field_id, .. }
            | Self::UnknownOption { field_id, .. }
            | Self::MissingOtherText { field_id, .. }
            | Self::WrongShape { field_id, .. } => Some(field_id),
            Self::PrivacyConsentRequired => None,
        }
    }
}

/// In-progress answers for a registration form.
///
/// Checkbox selections keep selection order and never hold the same option twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationDraft {
    values: BTreeMap<FieldId, AnswerValue>,
    other_text: BTreeMap<FieldId, String>,
    privacy_agreed: bool,
    marketing_agreed: bool,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, field_id: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(FieldId(field_id.into()), AnswerValue::Text(value.into()));
    }

    pub fn toggle_choice(&mut self, field_id: impl Into<String>, option: &str, selected: bool) {
        let entry = self
            .values
            .entry(FieldId(field_id.into()))
            .or_insert_with(|| AnswerValue::Choices(Vec::new()));
        if let AnswerValue::Text(_) = entry {
            *entry = AnswerValue::Choices(Vec::new());
        }
        if let AnswerValue::Choices(values) = entry {
            let present = values.iter().any(|value| value == option);
            if selected && !present {
                values.push(option.to_string());
            } else if !selected {
                values.retain(|value| value != option);
            }
        }
    }

    pub fn set_other_text(&mut self, field_id: impl Into<String>, text: impl Into<String>) {
        self.other_text.insert(FieldId(field_id.into()), text.into());
    }

    pub fn agree_privacy(&mut self, agreed: bool) {
        self.privacy_agreed = agreed;
    }

    pub fn agree_marketing(&mut self, agreed: bool) {
        self.marketing_agreed = agreed;
    }

    pub fn value(&self, field_id: &FieldId) -> Option<&AnswerValue> {
        self.values.get(field_id)
    }

    /// Supplementary text for an "Other" answer, if any non-empty text was entered.
    pub fn other_text(&self, field_id: &FieldId) -> Option<&str> {
        self.other_text
            .get(field_id)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn privacy_agreed(&self) -> bool {
        self.privacy_agreed
    }

    pub fn marketing_agreed(&self) -> bool {
        self.marketing_agreed
    }

    /// Checks required answers, per-type value rules, and privacy consent.
    pub fn validate(
        &self,
        schema: &FormSchema,
        terms: &TermsConfig,
    ) -> Result<(), ValidationError> {
        for field in schema {
            let value = self.values.get(&field.id).filter(|value| !value.is_blank());
            match value {
                None if field.required => {
                    return Err(ValidationError::MissingRequired {
                        field_id: field.id.clone(),
                        label: field.label.clone(),
                    })
                }
                None => {}
                Some(value) => self.check_value(field, value)?,
            }
        }

        if terms.require_privacy && !self.privacy_agreed {
            return Err(ValidationError::PrivacyConsentRequired);
        }

        Ok(())
    }

    fn check_value(&self, field: &FormField, value: &AnswerValue) -> Result<(), ValidationError> {
        match (&field.kind, value) {
            // Phone numbers are free text.
            (FieldKind::Text | FieldKind::Textarea | FieldKind::Tel, AnswerValue::Text(_)) => {
                Ok(())
            }
            (FieldKind::Email, AnswerValue::Text(text)) => {
                if looks_like_email(text) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidEmail {
                        field_id: field.id.clone(),
                        label: field.label.clone(),
                    })
                }
            }
            (FieldKind::Select(choice) | FieldKind::Radio(choice), AnswerValue::Text(text)) => {
                self.check_choice(field, choice, text)
            }
            (FieldKind::Checkbox(choice), AnswerValue::Choices(selected)) => selected
                .iter()
                .try_for_each(|option| self.check_choice(field, choice, option)),
            _ => Err(ValidationError::WrongShape {
                field_id: field.id.clone(),
                label: field.label.clone(),
            }),
        }
    }

    fn check_choice(
        &self,
        field: &FormField,
        choice: &ChoiceSpec,
        option: &str,
    ) -> Result<(), ValidationError> {
        if !choice.accepts(option) {
            return Err(ValidationError::UnknownOption {
                field_id: field.id.clone(),
                label: field.label.clone(),
                option: option.to_string(),
            });
        }

        let is_listed = choice.options.iter().any(|listed| listed == option);
        if option == OTHER_OPTION && !is_listed && self.other_text(&field.id).is_none() {
            return Err(ValidationError::MissingOtherText {
                field_id: field.id.clone(),
                label: field.label.clone(),
            });
        }

        Ok(())
    }

    /// Produces the persistable answers for `schema`.
    ///
    /// An "Other" selection on a field with the free-text fallback becomes
    /// `"Other: <text>"`, in place for checkbox selections. Answers for ids the
    /// schema does not know are dropped. The draft itself is left untouched.
    pub fn finalize(&self, schema: &FormSchema) -> Answers {
        let mut answers = Answers::new();

        for field in schema {
            let Some(value) = self.values.get(&field.id) else {
                continue;
            };

            let other_text = self
                .other_text(&field.id)
                .filter(|_| field.has_other_option());

            let finalized = match (&field.kind, value, other_text) {
                (
                    FieldKind::Select(_) | FieldKind::Radio(_),
                    AnswerValue::Text(selected),
                    Some(text),
                ) if selected == OTHER_OPTION =>
                {
                    AnswerValue::Text(compose_other(text))
                }
                (FieldKind::Checkbox(_), AnswerValue::Choices(selected), Some(text)) => {
                    AnswerValue::Choices(
                        selected
                            .iter()
                            .map(|option| {
                                if option == OTHER_OPTION {
                                    compose_other(text)
                                } else {
                                    option.clone()
                                }
                            })
                            .collect(),
                    )
                }
                _ => value.clone(),
            };

            answers.insert(field.id.clone(), finalized);
        }

        answers
    }
}

fn compose_other(text: &str) -> String {
    format!("{OTHER_OPTION}: {text}")
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

