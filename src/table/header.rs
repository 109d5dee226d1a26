//! Header resolution.
//!
//! Labels are matched verbatim against the header cells. Required columns
//! must all be present; optional and custom-field columns may be missing.

use std::collections::HashMap;

use crate::errors::{missing_required_header, ConvertError};
use crate::schema::{Field, Schema};

/// Column positions for every standard field and every declared custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIndex {
    positions: [Option<usize>; Field::COUNT],
    custom: Vec<(String, Option<usize>)>,
}

impl HeaderIndex {
    /// Resolves a header row against `schema`, failing if any required
    /// column is missing.
    pub fn resolve(header: &[String], schema: &Schema) -> Result<Self, ConvertError> {
        let required = resolve_required(header, schema)?;
        let optional = resolve_optional(header, schema);

        let mut positions = [None; Field::COUNT];
        for (field, index) in required {
            positions[field.index()] = Some(index);
        }
        for (field, index) in optional {
            positions[field.index()] = index;
        }

        let custom = schema
            .custom_fields()
            .iter()
            .map(|name| (name.clone(), position(header, name)))
            .collect();

        Ok(Self { positions, custom })
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.positions[field.index()]
    }

    /// Declared custom fields with their column, in declared order.
    pub fn custom_fields(&self) -> &[(String, Option<usize>)] {
        &self.custom
    }
}

/// Finds every required column, reporting all missing labels at once.
pub fn resolve_required(
    header: &[String],
    schema: &Schema,
) -> Result<HashMap<Field, usize>, ConvertError> {
    let mut found = HashMap::with_capacity(Field::REQUIRED.len());
    let mut missing = Vec::new();

    for field in Field::REQUIRED {
        let label = schema.label(field);
        match position(header, label) {
            Some(index) => {
                found.insert(field, index);
            }
            None => missing.push(label.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(missing_required_header(missing))
    }
}

/// Looks up every optional column. Never fails.
pub fn resolve_optional(header: &[String], schema: &Schema) -> HashMap<Field, Option<usize>> {
    Field::OPTIONAL
        .iter()
        .map(|&field| (field, position(header, schema.label(field))))
        .collect()
}

// First occurrence wins on duplicate labels.
fn position(header: &[String], label: &str) -> Option<usize> {
    header.iter().position(|cell| cell == label)
}
