// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A named group of state properties.

use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, Result};
use crate::schema::{ObjectSchema, PropKind, PropType, PropValue, ValueMap};

/// A state package: the schema of its properties and their current values.
///
/// Every declared property always has a value. It starts as the property's
/// default or, without one, as the empty value of its kind (`0`, `0.0`,
/// `false`, `""`, `[]` or an object of its own defaults).
///
/// # Examples
///
/// ```
/// use devcap_lib::state::StatePackage;
/// use serde_json::json;
///
/// let mut package = StatePackage::new("power");
/// package
///     .add_schema_from_json(json!({"level": {"minimum": 0, "maximum": 100}}).as_object().unwrap())
///     .unwrap();
///
/// package.set_property_value("level", &json!(42)).unwrap();
/// assert_eq!(package.get_values_as_json(), json!({"level": 42}));
/// assert!(package.set_property_value("level", &json!(420)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StatePackage {
    name: String,
    schema: ObjectSchema,
    values: ValueMap,
}

impl StatePackage {
    /// Creates an empty package.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: ObjectSchema::new(),
            values: ValueMap::new(),
        }
    }

    /// Returns the package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema of the declared properties.
    #[must_use]
    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    /// Declares new properties.
    ///
    /// # Errors
    ///
    /// Returns the schema parse error, or `property_redefinition` if a
    /// property is already declared. Nothing is declared on error.
    pub fn add_schema_from_json(&mut self, json: &Map<String, Value>) -> Result<()> {
        let schema = ObjectSchema::from_json(json, None)?;
        if let Some((name, _)) = schema.props().find(|(name, _)| self.schema.prop(name).is_some()) {
            return Err(Error::state(
                ErrorCode::PropertyRedefinition,
                format!("State property '{}.{name}' is already defined", self.name),
            ));
        }
        for (name, prop) in schema.props() {
            self.values.insert(name.to_string(), initial_value(prop));
            self.schema.add_prop(name, prop.clone());
        }
        Ok(())
    }

    /// Sets several property values at once, without recording changes.
    ///
    /// # Errors
    ///
    /// Returns `property_not_defined` or the value's validation error.
    /// Nothing is changed on error.
    pub fn add_values_from_json(&mut self, json: &Map<String, Value>) -> Result<()> {
        let values = json
            .iter()
            .map(|(name, value)| Ok((name.clone(), self.validate_property_value(name, value)?)))
            .collect::<Result<Vec<_>>>()?;
        self.values.extend(values);
        Ok(())
    }

    /// Returns the current values as a JSON object.
    #[must_use]
    pub fn get_values_as_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Returns the property definitions as JSON.
    #[must_use]
    pub fn get_definitions_as_json(&self, full_schema: bool) -> Value {
        self.schema.to_json(full_schema)
    }

    /// Returns the current value of a property.
    #[must_use]
    pub fn get_property_value(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    /// Validates a value for a property without storing it.
    ///
    /// # Errors
    ///
    /// Returns `property_not_defined` for an undeclared property, or the
    /// value's validation error.
    pub fn validate_property_value(&self, name: &str, value: &Value) -> Result<PropValue> {
        let prop = self.schema.prop(name).ok_or_else(|| {
            Error::state(
                ErrorCode::PropertyNotDefined,
                format!("State property '{}.{name}' is not defined", self.name),
            )
        })?;
        prop.create_value(value)
    }

    /// Validates and stores a property value, returning the stored value.
    ///
    /// # Errors
    ///
    /// See [`validate_property_value`](Self::validate_property_value).
    pub fn set_property_value(&mut self, name: &str, value: &Value) -> Result<PropValue> {
        let value = self.validate_property_value(name, value)?;
        self.values.insert(name.to_string(), value.clone());
        Ok(value)
    }

    pub(crate) fn store(&mut self, name: &str, value: PropValue) {
        self.values.insert(name.to_string(), value);
    }
}

fn initial_value(prop: &PropType) -> PropValue {
    if let Some(default) = prop.default_value() {
        return default.clone();
    }
    match prop.kind() {
        PropKind::Int(_) => PropValue::Int(0),
        PropKind::Double(_) => PropValue::Double(0.0),
        PropKind::Boolean => PropValue::Boolean(false),
        PropKind::String(_) => PropValue::String(String::new()),
        PropKind::Array(_) => PropValue::Array(Vec::new()),
        PropKind::Object(object) => PropValue::Object(
            object
                .schema()
                .props()
                .map(|(name, prop)| (name.to_string(), initial_value(prop)))
                .collect(),
        ),
    }
}
