//! Typed update-expression builder.
//!
//! Attribute names and values never enter the expression string directly;
//! both go through `#nN`/`:vN` placeholder maps, so field content cannot
//! alter the expression.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use userdir_core::user::UserUpdate;

/// Collects `attribute = value` pairs and renders them as a `SET`
/// expression with placeholder maps.
#[derive(Debug, Default)]
pub struct UpdateBuilder {
    assignments: Vec<(String, AttributeValue)>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `attribute = value` for the SET clause.
    pub fn set(mut self, attribute: impl Into<String>, value: AttributeValue) -> Self {
        self.assignments.push((attribute.into(), value));
        self
    }

    /// Render the `SET` expression, e.g. `SET #n0 = :v0, #n1 = :v1`.
    pub fn expression(&self) -> String {
        let clauses: Vec<String> = (0..self.assignments.len())
            .map(|i| format!("#n{i} = :v{i}"))
            .collect();
        format!("SET {}", clauses.join(", "))
    }

    /// Placeholder-to-attribute-name map for `expression_attribute_names`.
    pub fn attribute_names(&self) -> HashMap<String, String> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (format!("#n{i}"), name.clone()))
            .collect()
    }

    /// Placeholder-to-value map for `expression_attribute_values`.
    pub fn attribute_values(&self) -> HashMap<String, AttributeValue> {
        self.assignments
            .iter()
            .enumerate()
            .map(|(i, (_, value))| (format!(":v{i}"), value.clone()))
            .collect()
    }
}

/// Build the SET expression for a user field update.
///
/// `updatedAt` is always part of the clause; the optional fields only when
/// the update carries them.
pub fn user_update(update: &UserUpdate) -> UpdateBuilder {
    let mut builder = UpdateBuilder::new();
    if let Some(fullname) = &update.fullname {
        builder = builder.set("fullname", AttributeValue::S(fullname.clone()));
    }
    if let Some(verified) = update.verified {
        builder = builder.set("verified", AttributeValue::Bool(verified));
    }
    if let Some(date) = update.verified_date {
        builder = builder.set("verifiedDate", AttributeValue::S(date.to_rfc3339()));
    }
    builder.set(
        "updatedAt",
        AttributeValue::S(update.updated_at.to_rfc3339()),
    )
}
