use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entities::{AppId, AppSummary, FieldDescriptor};

/// Identifies one cached metadata lookup.
///
/// A lookup with no application id (`None` at the call site) is a distinct,
/// never-cached empty case and never becomes a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Apps,
    Fields(AppId),
    Layout(AppId),
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataKey::Apps => write!(f, "apps"),
            MetadataKey::Fields(app_id) => write!(f, "fields({app_id})"),
            MetadataKey::Layout(app_id) => write!(f, "layout({app_id})"),
        }
    }
}

/// A `{value, label}` pair presented to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

impl OptionEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// The "not selected" entry prepended to every field-derived option
    /// list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Option for choosing a field. The stored value is the field code (the
    /// stable reference persisted in configuration); the label is
    /// display-only.
    pub fn from_field(field: &FieldDescriptor) -> Self {
        Self::new(field.code.clone(), field.label.clone())
    }

    /// Option for choosing a monitored application.
    pub fn from_app(app: &AppSummary) -> Self {
        Self::new(app.id.to_string(), app.name.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.label.is_empty()
    }
}

/// Derived option list of one configuration row. Shared so an unchanged
/// row's options carry over between recomputations without copying, and so
/// reuse is observable by pointer identity.
pub type RowOptions = Arc<Vec<OptionEntry>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FieldType;

    #[test]
    fn test_metadata_key_display() {
        assert_eq!(MetadataKey::Apps.to_string(), "apps");
        assert_eq!(MetadataKey::Fields(7).to_string(), "fields(7)");
        assert_eq!(MetadataKey::Layout(7).to_string(), "layout(7)");
    }

    #[test]
    fn test_empty_option_entry() {
        let entry = OptionEntry::empty();
        assert!(entry.is_empty());
        assert_eq!(entry.value, "");
        assert_eq!(entry.label, "");
    }

    #[test]
    fn test_option_entry_from_field_maps_code_to_value() {
        let field = FieldDescriptor {
            code: "patient_id".to_string(),
            label: "Patient ID".to_string(),
            field_type: FieldType::SingleLineText,
            no_label: false,
            required: true,
            enabled: true,
        };

        let entry = OptionEntry::from_field(&field);
        assert_eq!(entry.value, "patient_id");
        assert_eq!(entry.label, "Patient ID");
    }

    #[test]
    fn test_option_entry_from_app() {
        let app = AppSummary::new(42, "Patient Master");
        let entry = OptionEntry::from_app(&app);
        assert_eq!(entry.value, "42");
        assert_eq!(entry.label, "Patient Master");
    }
}
