use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Implicit choice appended to option lists when a field accepts free-text answers.
pub const OTHER_OPTION: &str = "Other";

const NEW_FIELD_LABEL: &str = "New question";

/// Stable identity of a form field; never changes once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub String);

impl FieldId {
    pub fn generate() -> Self {
        let raw = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("f{}", &raw[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Plain discriminant of [`FieldKind`], used when an admin switches a field's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Tel,
    Select,
    Radio,
    Checkbox,
}

impl FieldType {
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

/// Options offered by a choice field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSpec {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub has_other_option: bool,
}

impl ChoiceSpec {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            has_other_option: false,
        }
    }

    pub fn with_other(mut self) -> Self {
        self.has_other_option = true;
        self
    }

    /// Whether `value` is one of the accepted answers, counting the implicit "Other".
    pub fn accepts(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
            || (self.has_other_option && value == OTHER_OPTION)
    }
}

/// Field type together with the data only that type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Tel,
    Select(ChoiceSpec),
    Radio(ChoiceSpec),
    Checkbox(ChoiceSpec),
}

impl FieldKind {
    /// Builds a kind of type `field_type`, keeping `choice` only for choice types.
    pub fn from_type(field_type: FieldType, choice: ChoiceSpec) -> Self {
        match field_type {
            FieldType::Text => Self::Text,
            FieldType::Textarea => Self::Textarea,
            FieldType::Email => Self::Email,
            FieldType::Tel => Self::Tel,
            FieldType::Select => Self::Select(choice),
            FieldType::Radio => Self::Radio(choice),
            FieldType::Checkbox => Self::Checkbox(choice),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text => FieldType::Text,
            Self::Textarea => FieldType::Textarea,
            Self::Email => FieldType::Email,
            Self::Tel => FieldType::Tel,
            Self::Select(_) => FieldType::Select,
            Self::Radio(_) => FieldType::Radio,
            Self::Checkbox(_) => FieldType::Checkbox,
        }
    }

    pub fn choice(&self) -> Option<&ChoiceSpec> {
        match self {
            Self::Select(choice) | Self::Radio(choice) | Self::Checkbox(choice) => Some(choice),
            Self::Text | Self::Textarea | Self::Email | Self::Tel => None,
        }
    }

    /// HTML control a renderer should emit for this field.
    pub const fn input_type(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Select(_) => "select",
            Self::Radio(_) => "radio",
            Self::Checkbox(_) => "checkbox",
        }
    }
}

/// One question in a registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: FieldId,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    pub fn new(id: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: FieldId(id.into()),
            kind,
            label: label.into(),
            placeholder: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn has_other_option(&self) -> bool {
        self.kind
            .choice()
            .map(|choice| choice.has_other_option)
            .unwrap_or(false)
    }

    /// Options as rendered, with the implicit "Other" entry appended when enabled.
    pub fn display_options(&self) -> Vec<String> {
        match self.kind.choice() {
            Some(choice) => {
                let mut options = choice.options.clone();
                if choice.has_other_option {
                    options.push(OTHER_OPTION.to_string());
                }
                options
            }
            None => Vec::new(),
        }
    }

    fn apply(&mut self, patch: FieldPatch) {
        let FieldPatch {
            label,
            placeholder,
            required,
            field_type,
            options,
            options_text,
            has_other_option,
        } = patch;

        if let Some(label) = label {
            self.label = label;
        }
        if let Some(placeholder) = placeholder {
            self.placeholder = if placeholder.is_empty() {
                None
            } else {
                Some(placeholder)
            };
        }
        if let Some(required) = required {
            self.required = required;
        }

        let target = field_type.unwrap_or_else(|| self.kind.field_type());
        let mut choice = self.kind.choice().cloned().unwrap_or_default();
        if let Some(options) = options.or_else(|| options_text.as_deref().map(parse_options)) {
            choice.options = options;
        }
        if let Some(flag) = has_other_option {
            choice.has_other_option = flag;
        }
        self.kind = FieldKind::from_type(target, choice);
    }
}

/// Partial update for a single field. Absent keys leave the attribute unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    pub label: Option<String>,
    /// An empty string clears the placeholder.
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub options: Option<Vec<String>>,
    /// Comma separated options as typed by an admin; ignored when `options` is present.
    pub options_text: Option<String>,
    pub has_other_option: Option<bool>,
}

/// Invariant violations detected before a form is saved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("choice field '{label}' ({field_id}) needs at least one option")]
    EmptyOptions { field_id: FieldId, label: String },
    #[error("field id {0} appears more than once")]
    DuplicateFieldId(FieldId),
}

/// Ordered list of fields; order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    /// Name, phone and email questions, all required.
    pub fn starter() -> Self {
        let mut schema = Self::default();
        for (kind, label) in [
            (FieldKind::Text, "Name"),
            (FieldKind::Tel, "Phone"),
            (FieldKind::Email, "Email"),
        ] {
            let id = schema.unused_id();
            schema
                .fields
                .push(FormField::new(id.0, kind, label).required());
        }
        schema
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields.iter().find(|field| &field.id == id)
    }

    /// Appends a required-less single-line text question and returns its id.
    pub fn add_field(&mut self) -> FieldId {
        let id = self.unused_id();
        self.fields
            .push(FormField::new(id.0.clone(), FieldKind::Text, NEW_FIELD_LABEL));
        id
    }

    /// Merges `patch` into the field with `id`. Unknown ids are ignored.
    pub fn update_field(&mut self, id: &FieldId, patch: FieldPatch) {
        if let Some(field) = self.fields.iter_mut().find(|field| &field.id == id) {
            field.apply(patch);
        }
    }

    /// Removes the field with `id`. Unknown ids are ignored.
    pub fn remove_field(&mut self, id: &FieldId) {
        self.fields.retain(|field| &field.id != id);
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(&field.id) {
                return Err(SchemaError::DuplicateFieldId(field.id.clone()));
            }
            if let Some(choice) = field.kind.choice() {
                if choice.options.is_empty() {
                    return Err(SchemaError::EmptyOptions {
                        field_id: field.id.clone(),
                        label: field.label.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn unused_id(&self) -> FieldId {
        loop {
            let candidate = FieldId::generate();
            if self.field(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

impl<'a> IntoIterator for &'a FormSchema {
    type Item = &'a FormField;
    type IntoIter = std::slice::Iter<'a, FormField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Splits an admin-typed, comma separated option list. Entries are trimmed and
/// empty entries are dropped.
pub fn parse_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}
