// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object schemas: named property types.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, ErrorDomain, Result};

use super::{PropType, PropValue, ValueMap};

/// A set of named property types describing an object.
///
/// # Examples
///
/// ```
/// use devcap_lib::schema::ObjectSchema;
/// use serde_json::json;
///
/// let definition = json!({"delay": {"minimum": 10, "default": 30}, "force": "boolean"});
/// let schema = ObjectSchema::from_json(definition.as_object().unwrap(), None).unwrap();
///
/// let values = schema.validate(&json!({"force": true})).unwrap();
/// assert_eq!(values["delay"].as_int(), Some(30));
/// assert!(schema.validate(&json!({"delay": 5})).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    properties: BTreeMap<String, PropType>,
    extra_properties_allowed: bool,
}

impl ObjectSchema {
    /// Creates an empty schema that rejects unknown properties.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty schema that accepts any property.
    #[must_use]
    pub fn accepting_any() -> Self {
        Self {
            properties: BTreeMap::new(),
            extra_properties_allowed: true,
        }
    }

    /// Parses a schema from a map of property definitions.
    ///
    /// Each property present in `properties` is parsed against the
    /// same-named property of `base`, if there is one. Properties of `base`
    /// that are not mentioned are not part of the result.
    ///
    /// # Errors
    ///
    /// Returns `invalid_parameter_definition` naming the offending property,
    /// with the property's own error as the inner error.
    pub fn from_json(properties: &Map<String, Value>, base: Option<&ObjectSchema>) -> Result<Self> {
        let mut schema = Self {
            properties: BTreeMap::new(),
            extra_properties_allowed: base.is_some_and(ObjectSchema::extra_properties_allowed),
        };
        for (name, definition) in properties {
            let base_prop = base.and_then(|b| b.prop(name));
            let prop = PropType::from_json(definition, base_prop).map_err(|e| {
                e.wrap(
                    ErrorDomain::Commands,
                    ErrorCode::InvalidPropDef,
                    format!("Error in definition of property '{name}'"),
                )
            })?;
            schema.properties.insert(name.clone(), prop);
        }
        Ok(schema)
    }

    /// Serializes every property with [`PropType::to_json`].
    #[must_use]
    pub fn to_json(&self, full_schema: bool) -> Value {
        Value::Object(
            self.properties
                .iter()
                .map(|(name, prop)| (name.clone(), prop.to_json(full_schema)))
                .collect(),
        )
    }

    /// Adds or replaces a property.
    pub fn add_prop(&mut self, name: impl Into<String>, prop: PropType) {
        self.properties.insert(name.into(), prop);
    }

    /// Returns a property type by name.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&PropType> {
        self.properties.get(name)
    }

    /// Iterates over the properties in name order.
    pub fn props(&self) -> impl Iterator<Item = (&str, &PropType)> {
        self.properties.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    /// Marks a property as required.
    ///
    /// # Errors
    ///
    /// Returns `unknown_property` if the schema has no such property.
    pub fn mark_prop_required(&mut self, name: &str) -> Result<()> {
        let prop = self.properties.get_mut(name).ok_or_else(|| {
            Error::commands(ErrorCode::UnknownProperty, format!("Unknown property '{name}'"))
        })?;
        prop.set_required(true);
        Ok(())
    }

    /// Returns `true` if properties outside the schema are accepted.
    #[must_use]
    pub fn extra_properties_allowed(&self) -> bool {
        self.extra_properties_allowed
    }

    /// Sets whether properties outside the schema are accepted.
    pub fn set_extra_properties_allowed(&mut self, allowed: bool) {
        self.extra_properties_allowed = allowed;
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the schema has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Validates a JSON object against the schema.
    ///
    /// Missing properties take their default. Properties outside the schema
    /// are kept as untyped values when extra properties are allowed.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if `value` is not an object
    /// - `invalid_parameter_value` wrapping the property's error
    /// - `parameter_missing` for a required property without value or default
    /// - `unknown_property` for a property outside the schema
    pub fn validate(&self, value: &Value) -> Result<ValueMap> {
        let Value::Object(object) = value else {
            return Err(Error::commands(
                ErrorCode::TypeMismatch,
                format!("Unable to convert value {value} into object"),
            ));
        };

        let mut values = ValueMap::new();
        for (name, prop) in &self.properties {
            match object.get(name) {
                Some(v) => {
                    let converted = prop.create_value(v).map_err(|e| {
                        e.wrap(
                            ErrorDomain::Commands,
                            ErrorCode::InvalidPropValue,
                            format!("Invalid value for property '{name}'"),
                        )
                    })?;
                    values.insert(name.clone(), converted);
                }
                None => {
                    if let Some(default) = prop.default_value() {
                        values.insert(name.clone(), default.clone());
                    } else if prop.is_required() {
                        return Err(Error::commands(
                            ErrorCode::PropertyMissing,
                            format!("Required parameter missing: {name}"),
                        ));
                    }
                }
            }
        }

        for (name, v) in object {
            if self.properties.contains_key(name) {
                continue;
            }
            if !self.extra_properties_allowed {
                return Err(Error::commands(
                    ErrorCode::UnknownProperty,
                    format!("Unrecognized parameter '{name}'"),
                ));
            }
            let converted = PropValue::from_json(v).ok_or_else(|| {
                Error::commands(
                    ErrorCode::TypeMismatch,
                    format!("Unsupported value for property '{name}': {v}"),
                )
            })?;
            values.insert(name.clone(), converted);
        }
        Ok(values)
    }
}
