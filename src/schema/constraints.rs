// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Kind-specific property constraints.
//!
//! Every constraint value is wrapped in an [`Inheritable`] that remembers
//! whether the value was given by the definition being parsed or copied from
//! the base schema. Minimal serialization only emits the former.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, Result};

use super::{ValueType, attr};

/// A constraint value together with its origin.
///
/// Equality compares the values only: where a value came from does not
/// change what it means.
#[derive(Debug, Clone)]
pub(crate) struct Inheritable<T> {
    pub(crate) value: T,
    pub(crate) inherited: bool,
}

impl<T> Inheritable<T> {
    /// A value set by the definition itself.
    pub(crate) fn own(value: T) -> Self {
        Self {
            value,
            inherited: false,
        }
    }

    /// A value taken from the base schema (or an implicit default).
    pub(crate) fn inherited(value: T) -> Self {
        Self {
            value,
            inherited: true,
        }
    }
}

impl<T: Clone> Inheritable<T> {
    /// Returns a copy of this value marked as inherited.
    pub(crate) fn inherit(&self) -> Self {
        Self::inherited(self.value.clone())
    }
}

impl<T: PartialEq> PartialEq for Inheritable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// Reads a JSON number as an integer.
///
/// Doubles without a fractional part are accepted, so `10.0` reads as `10`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn json_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Numeric types that can carry `minimum`/`maximum` constraints.
pub trait Numeric: Copy + PartialOrd + fmt::Display {
    /// The property kind using this numeric type.
    const KIND: ValueType;

    /// Reads the number from JSON.
    fn from_json(value: &Value) -> Option<Self>;

    /// Writes the number as JSON.
    fn to_json(self) -> Value;
}

impl Numeric for i64 {
    const KIND: ValueType = ValueType::Int;

    fn from_json(value: &Value) -> Option<Self> {
        json_as_i64(value)
    }

    fn to_json(self) -> Value {
        Value::from(self)
    }
}

impl Numeric for f64 {
    const KIND: ValueType = ValueType::Double;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_json(self) -> Value {
        serde_json::Number::from_f64(self).map_or(Value::Null, Value::Number)
    }
}

/// `minimum`/`maximum` constraints of integer and double properties.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericConstraints<T> {
    pub(crate) minimum: Option<Inheritable<T>>,
    pub(crate) maximum: Option<Inheritable<T>>,
}

impl<T> Default for NumericConstraints<T> {
    fn default() -> Self {
        Self {
            minimum: None,
            maximum: None,
        }
    }
}

impl<T: Numeric> NumericConstraints<T> {
    /// Returns the lower bound (inclusive), if any.
    #[must_use]
    pub fn minimum(&self) -> Option<T> {
        self.minimum.as_ref().map(|m| m.value)
    }

    /// Returns the upper bound (inclusive), if any.
    #[must_use]
    pub fn maximum(&self) -> Option<T> {
        self.maximum.as_ref().map(|m| m.value)
    }

    pub(crate) fn inherit(&self) -> Self {
        Self {
            minimum: self.minimum.as_ref().map(Inheritable::inherit),
            maximum: self.maximum.as_ref().map(Inheritable::inherit),
        }
    }

    /// Consumes `key` if it is a numeric constraint. Returns `false` for
    /// keys that do not belong to numeric properties.
    pub(crate) fn read(&mut self, key: &str, value: &Value) -> Result<bool> {
        let slot = match key {
            attr::MINIMUM => &mut self.minimum,
            attr::MAXIMUM => &mut self.maximum,
            _ => return Ok(false),
        };
        let number = T::from_json(value).ok_or_else(|| {
            Error::commands(
                ErrorCode::TypeMismatch,
                format!("Unable to convert value {value} into {} for '{key}'", T::KIND),
            )
        })?;
        *slot = Some(Inheritable::own(number));
        Ok(true)
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.minimum(), self.maximum())
            && min > max
        {
            return Err(Error::commands(
                ErrorCode::InvalidPropValue,
                format!("Invalid range: minimum {min} is greater than maximum {max}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn check(&self, value: T) -> Result<()> {
        if let Some(min) = self.minimum()
            && value < min
        {
            return Err(Error::commands(
                ErrorCode::OutOfRange,
                format!("Value {value} is out of range. It must not be less than {min}"),
            ));
        }
        if let Some(max) = self.maximum()
            && value > max
        {
            return Err(Error::commands(
                ErrorCode::OutOfRange,
                format!("Value {value} is out of range. It must not be greater than {max}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn has_overridden(&self) -> bool {
        is_own(self.minimum.as_ref()) || is_own(self.maximum.as_ref())
    }

    pub(crate) fn write(&self, dict: &mut Map<String, Value>, full_schema: bool) {
        write_if(dict, attr::MINIMUM, self.minimum.as_ref(), full_schema, |v| v.to_json());
        write_if(dict, attr::MAXIMUM, self.maximum.as_ref(), full_schema, |v| v.to_json());
    }
}

/// `minLength`/`maxLength` constraints of string properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    pub(crate) min_length: Option<Inheritable<usize>>,
    pub(crate) max_length: Option<Inheritable<usize>>,
}

impl StringConstraints {
    /// Returns the minimum length in characters, if any.
    #[must_use]
    pub fn min_length(&self) -> Option<usize> {
        self.min_length.as_ref().map(|m| m.value)
    }

    /// Returns the maximum length in characters, if any.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length.as_ref().map(|m| m.value)
    }

    pub(crate) fn inherit(&self) -> Self {
        Self {
            min_length: self.min_length.as_ref().map(Inheritable::inherit),
            max_length: self.max_length.as_ref().map(Inheritable::inherit),
        }
    }

    pub(crate) fn read(&mut self, key: &str, value: &Value) -> Result<bool> {
        let slot = match key {
            attr::MIN_LENGTH => &mut self.min_length,
            attr::MAX_LENGTH => &mut self.max_length,
            _ => return Ok(false),
        };
        let length = json_as_i64(value).ok_or_else(|| {
            Error::commands(
                ErrorCode::TypeMismatch,
                format!("Unable to convert value {value} into integer for '{key}'"),
            )
        })?;
        let length = usize::try_from(length).map_err(|_| {
            Error::commands(
                ErrorCode::InvalidPropValue,
                format!("'{key}' must not be negative, got {length}"),
            )
        })?;
        *slot = Some(Inheritable::own(length));
        Ok(true)
    }

    pub(crate) fn verify(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_length(), self.max_length())
            && min > max
        {
            return Err(Error::commands(
                ErrorCode::InvalidPropValue,
                format!("Invalid length range: minLength {min} is greater than maxLength {max}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn check(&self, value: &str) -> Result<()> {
        let length = value.chars().count();
        if let Some(min) = self.min_length()
            && length < min
        {
            return Err(Error::commands(
                ErrorCode::OutOfRange,
                format!("String '{value}' is too short. Expected at least {min} characters"),
            ));
        }
        if let Some(max) = self.max_length()
            && length > max
        {
            return Err(Error::commands(
                ErrorCode::OutOfRange,
                format!("String '{value}' is too long. Expected at most {max} characters"),
            ));
        }
        Ok(())
    }

    pub(crate) fn has_overridden(&self) -> bool {
        is_own(self.min_length.as_ref()) || is_own(self.max_length.as_ref())
    }

    pub(crate) fn write(&self, dict: &mut Map<String, Value>, full_schema: bool) {
        write_if(dict, attr::MIN_LENGTH, self.min_length.as_ref(), full_schema, |v| Value::from(*v));
        write_if(dict, attr::MAX_LENGTH, self.max_length.as_ref(), full_schema, |v| Value::from(*v));
    }
}

pub(crate) fn is_own<T>(value: Option<&Inheritable<T>>) -> bool {
    value.is_some_and(|v| !v.inherited)
}

/// Writes `value` under `key` when it is set and either a full schema is
/// requested or the value was not inherited.
pub(crate) fn write_if<T>(
    dict: &mut Map<String, Value>,
    key: &str,
    value: Option<&Inheritable<T>>,
    full_schema: bool,
    to_json: impl FnOnce(&T) -> Value,
) {
    if let Some(value) = value
        && (full_schema || !value.inherited)
    {
        dict.insert(key.to_string(), to_json(&value.value));
    }
}
