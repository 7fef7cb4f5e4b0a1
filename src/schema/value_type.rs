// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property kinds and type names.
//!
//! A [`ValueType`] is one of the six property kinds understood by the schema
//! engine. A [`TypeName`] is a kind plus, for arrays, the type name of the
//! items, written in dotted form (`"array.integer"`).

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, ErrorCode};

/// The kind of a property.
///
/// # Examples
///
/// ```
/// use devcap_lib::schema::ValueType;
///
/// let kind: ValueType = "number".parse().unwrap();
/// assert_eq!(kind, ValueType::Double);
/// assert_eq!(ValueType::Int.as_str(), "integer");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 64-bit signed integer (`"integer"`).
    Int,
    /// Double precision floating point number (`"number"`).
    Double,
    /// Boolean (`"boolean"`).
    Boolean,
    /// UTF-8 string (`"string"`).
    String,
    /// Object described by an object schema (`"object"`).
    Object,
    /// Homogeneous array (`"array"`).
    Array,
}

impl ValueType {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Int,
        Self::Double,
        Self::Boolean,
        Self::String,
        Self::Object,
        Self::Array,
    ];

    /// Returns the type string used in schema definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Double => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns the kind matching the JSON value's own kind.
    ///
    /// Numbers written with a fractional part or an exponent are doubles,
    /// every other number is an integer. Returns `None` for `null`.
    #[must_use]
    pub fn of_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(n) if n.is_f64() => Some(Self::Double),
            Value::Number(_) => Some(Self::Int),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::commands(ErrorCode::UnknownType, format!("Unknown type {s}")))
    }
}

/// A full type name: a kind plus the item type name for arrays.
///
/// # Examples
///
/// ```
/// use devcap_lib::schema::{TypeName, ValueType};
///
/// let name: TypeName = "array.integer".parse().unwrap();
/// assert_eq!(name.kind, ValueType::Array);
/// assert_eq!(name.to_string(), "array.integer");
///
/// assert!("array.widget".parse::<TypeName>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// The property kind.
    pub kind: ValueType,
    /// Item type name, only meaningful for arrays.
    pub items: Option<Box<TypeName>>,
}

impl TypeName {
    /// Creates a type name without an item type.
    #[must_use]
    pub const fn new(kind: ValueType) -> Self {
        Self { kind, items: None }
    }

    /// Creates an array type name with the given item type.
    #[must_use]
    pub fn array_of(items: TypeName) -> Self {
        Self {
            kind: ValueType::Array,
            items: Some(Box::new(items)),
        }
    }
}

impl From<ValueType> for TypeName {
    fn from(kind: ValueType) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if let Some(items) = &self.items {
            write!(f, ".{items}")?;
        }
        Ok(())
    }
}

impl FromStr for TypeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::commands(ErrorCode::UnknownType, format!("Unknown type {s}"));
        let (primary, rest) = match s.split_once('.') {
            Some((primary, rest)) => (primary, Some(rest)),
            None => (s, None),
        };
        let kind: ValueType = primary.parse().map_err(|_| unknown())?;
        match rest {
            None | Some("") => Ok(Self::new(kind)),
            Some(rest) if kind == ValueType::Array => {
                let items: TypeName = rest.parse().map_err(|_| unknown())?;
                Ok(Self::array_of(items))
            }
            Some(_) => Err(unknown()),
        }
    }
}
