use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of a monitored application on the remote platform.
pub type AppId = u64;

/// Code identifying a field within an application's form.
pub type FieldCode = String;

/// Field lookup result, ordered by field code so derived option lists are
/// deterministic.
pub type FieldMap = BTreeMap<FieldCode, FieldDescriptor>;

/// Form layout payload. Opaque to this system, passed through unmodified.
pub type Layout = serde_json::Value;

/// One entry of the remote application list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    pub id: AppId,
    pub name: String,
}

impl AppSummary {
    pub fn new(id: AppId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Field type as reported by the metadata provider.
///
/// Only `SINGLE_LINE_TEXT` fields are eligible for primary-key selection in
/// this editor; the catch-all keeps descriptors for every other type the
/// platform may report without this crate having to enumerate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    RichText,
    Number,
    Date,
    DropDown,
    #[serde(other)]
    Unsupported,
}

/// Description of one field, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub code: FieldCode,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub no_label: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub enabled: bool,
}

impl FieldDescriptor {
    /// Whether this field may serve as a row's primary key.
    pub fn is_primary_key_candidate(&self) -> bool {
        self.field_type == FieldType::SingleLineText
    }
}

/// One entry in the ordered configuration list, pairing a monitored
/// application with the field chosen as its primary key.
///
/// The serde names match the persisted member names (`app`,
/// `primaryKeyField`) so rows serialize directly into the stored shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRow {
    #[serde(rename = "app", default)]
    pub app_id: Option<AppId>,
    #[serde(rename = "primaryKeyField", default)]
    pub primary_key_field: Option<FieldCode>,
}

impl ConfigurationRow {
    pub fn new(app_id: Option<AppId>, primary_key_field: Option<FieldCode>) -> Self {
        Self {
            app_id,
            primary_key_field,
        }
    }

    pub fn for_app(app_id: AppId) -> Self {
        Self {
            app_id: Some(app_id),
            primary_key_field: None,
        }
    }
}

/// The ordered sequence of configuration rows edited in one session.
///
/// Order is significant: row `i`'s derived options always correspond to row
/// `i`'s current application, and every recomputation preserves the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    #[serde(rename = "settings", default)]
    pub rows: Vec<ConfigurationRow>,
}

impl ConfigurationDocument {
    pub fn new(rows: Vec<ConfigurationRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
