// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed property values.
//!
//! A [`PropValue`] is a JSON value that has been checked against a
//! [`PropType`](super::PropType). Values are produced by
//! [`PropType::create_value`](super::PropType::create_value) and converted
//! back to JSON with [`PropValue::to_json`].

use std::collections::BTreeMap;

use serde_json::Value;

use super::ValueType;

/// Property name to typed value mapping, used for object values.
pub type ValueMap = BTreeMap<String, PropValue>;

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Integer value.
    Int(i64),
    /// Double value.
    Double(f64),
    /// Boolean value.
    Boolean(bool),
    /// String value.
    String(String),
    /// Object value.
    Object(ValueMap),
    /// Array value.
    Array(Vec<PropValue>),
}

impl PropValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Double(_) => ValueType::Double,
            Self::Boolean(_) => ValueType::Boolean,
            Self::String(_) => ValueType::String,
            Self::Object(_) => ValueType::Object,
            Self::Array(_) => ValueType::Array,
        }
    }

    /// Converts the value to JSON.
    ///
    /// Non-finite doubles have no JSON representation and become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::Double(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::Boolean(v) => Value::Bool(*v),
            Self::String(v) => Value::String(v.clone()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Converts JSON into a value using the JSON's own kinds, without a
    /// schema. Returns `None` if the value is or contains `null`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(v) => Some(Self::Boolean(*v)),
            Value::Number(n) if n.is_f64() => n.as_f64().map(Self::Double),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Double)),
            Value::String(v) => Some(Self::String(v.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::Array),
            Value::Object(map) => map
                .iter()
                .map(|(name, value)| Self::from_json(value).map(|v| (name.clone(), v)))
                .collect::<Option<ValueMap>>()
                .map(Self::Object),
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the numeric value as a double, for integers and doubles.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the object properties, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[PropValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
