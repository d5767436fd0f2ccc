//! Builders for test data.

use keyfield_domain::entities::{FieldDescriptor, FieldMap, FieldType};

pub fn field(code: &str, label: &str, field_type: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        code: code.to_string(),
        label: label.to_string(),
        field_type,
        no_label: false,
        required: false,
        enabled: true,
    }
}

pub fn single_line_text_field(code: &str, label: &str) -> FieldDescriptor {
    field(code, label, FieldType::SingleLineText)
}

pub fn multi_line_text_field(code: &str, label: &str) -> FieldDescriptor {
    field(code, label, FieldType::MultiLineText)
}

pub fn number_field(code: &str, label: &str) -> FieldDescriptor {
    field(code, label, FieldType::Number)
}

/// Collects descriptors into a field map keyed by their codes.
pub fn field_map_of(fields: impl IntoIterator<Item = FieldDescriptor>) -> FieldMap {
    fields
        .into_iter()
        .map(|field| (field.code.clone(), field))
        .collect()
}
