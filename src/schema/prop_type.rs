// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property type definitions.
//!
//! A [`PropType`] is parsed from one of three JSON shapes:
//!
//! - a type name string: `"integer"`, `"array.string"`
//! - an enum shorthand array: `["on", "off"]`
//! - a definition object: `{"minimum": 0, "maximum": 100, "default": 50}`
//!
//! A definition can be parsed against a base type. The result starts as a
//! copy of the base, keeps the base's kind and marks everything it did not
//! set itself as inherited.
//!
//! # Examples
//!
//! ```
//! use devcap_lib::schema::PropType;
//! use serde_json::json;
//!
//! let base = PropType::from_json(&json!({"type": "integer", "maximum": 100}), None).unwrap();
//! let derived = PropType::from_json(&json!({"minimum": 10}), Some(&base)).unwrap();
//!
//! assert!(derived.create_value(&json!(50)).is_ok());
//! assert!(derived.create_value(&json!(5)).is_err());
//! assert!(derived.create_value(&json!(500)).is_err());
//!
//! // Only what the derived definition changed is kept in minimal form.
//! assert_eq!(derived.to_json(false), json!({"minimum": 10}));
//! ```

use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, ErrorDomain, Result};

use super::constraints::{Inheritable, NumericConstraints, StringConstraints, is_own, json_as_i64, write_if};
use super::detect::{detect_array_type, detect_object_type};
use super::{ObjectSchema, PropValue, TypeName, ValueType, attr};

/// Kind of a property together with its kind-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKind {
    /// Integer with optional range.
    Int(NumericConstraints<i64>),
    /// Double with optional range.
    Double(NumericConstraints<f64>),
    /// Boolean, no constraints.
    Boolean,
    /// String with optional length limits.
    String(StringConstraints),
    /// Object described by a nested schema.
    Object(ObjectConstraints),
    /// Array of a single item type.
    Array(ArrayConstraints),
}

impl PropKind {
    fn new(kind: ValueType) -> Self {
        match kind {
            ValueType::Int => Self::Int(NumericConstraints::default()),
            ValueType::Double => Self::Double(NumericConstraints::default()),
            ValueType::Boolean => Self::Boolean,
            ValueType::String => Self::String(StringConstraints::default()),
            ValueType::Object => Self::Object(ObjectConstraints {
                // Implicit: an object without `properties` accepts anything.
                schema: Inheritable::inherited(ObjectSchema::accepting_any()),
            }),
            ValueType::Array => Self::Array(ArrayConstraints::default()),
        }
    }

    /// Returns the value type of this kind.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Double(_) => ValueType::Double,
            Self::Boolean => ValueType::Boolean,
            Self::String(_) => ValueType::String,
            Self::Object(_) => ValueType::Object,
            Self::Array(_) => ValueType::Array,
        }
    }

    fn inherit(&self) -> Self {
        match self {
            Self::Int(c) => Self::Int(c.inherit()),
            Self::Double(c) => Self::Double(c.inherit()),
            Self::Boolean => Self::Boolean,
            Self::String(c) => Self::String(c.inherit()),
            Self::Object(c) => Self::Object(ObjectConstraints {
                schema: c.schema.inherit(),
            }),
            Self::Array(c) => Self::Array(ArrayConstraints {
                items: c.items.as_ref().map(Inheritable::inherit),
            }),
        }
    }

    fn has_overridden(&self) -> bool {
        match self {
            Self::Int(c) => c.has_overridden(),
            Self::Double(c) => c.has_overridden(),
            Self::Boolean => false,
            Self::String(c) => c.has_overridden(),
            Self::Object(c) => !c.schema.inherited,
            Self::Array(c) => is_own(c.items.as_ref()),
        }
    }

    fn verify(&self) -> Result<()> {
        match self {
            Self::Int(c) => c.verify(),
            Self::Double(c) => c.verify(),
            Self::String(c) => c.verify(),
            Self::Array(c) if c.items.is_none() => Err(Error::commands(
                ErrorCode::NoTypeInfo,
                "Unable to determine the item type of an array",
            )),
            Self::Boolean | Self::Object(_) | Self::Array(_) => Ok(()),
        }
    }

    fn write(&self, dict: &mut Map<String, Value>, full_schema: bool) {
        match self {
            Self::Int(c) => c.write(dict, full_schema),
            Self::Double(c) => c.write(dict, full_schema),
            Self::Boolean => {}
            Self::String(c) => c.write(dict, full_schema),
            Self::Object(c) => {
                write_if(dict, attr::PROPERTIES, Some(&c.schema), full_schema, |s| {
                    s.to_json(full_schema)
                });
                if c.schema.value.extra_properties_allowed() && (full_schema || !c.schema.inherited) {
                    dict.insert(attr::ADDITIONAL_PROPERTIES.to_string(), Value::Bool(true));
                }
            }
            Self::Array(c) => {
                write_if(dict, attr::ITEMS, c.items.as_ref(), full_schema, |items| {
                    items.to_json(full_schema)
                });
            }
        }
    }
}

/// Constraints of object properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectConstraints {
    schema: Inheritable<ObjectSchema>,
}

impl ObjectConstraints {
    /// Returns the schema object values are validated against.
    #[must_use]
    pub fn schema(&self) -> &ObjectSchema {
        &self.schema.value
    }
}

/// Constraints of array properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayConstraints {
    items: Option<Inheritable<Box<PropType>>>,
}

impl ArrayConstraints {
    /// Returns the item type.
    #[must_use]
    pub fn item_type(&self) -> Option<&PropType> {
        self.items.as_ref().map(|items| items.value.as_ref())
    }
}

/// A property type: kind, constraints, allowed values, default and the
/// required flag.
#[derive(Debug, Clone)]
pub struct PropType {
    kind: PropKind,
    one_of: Option<Inheritable<Vec<PropValue>>>,
    default: Option<Inheritable<PropValue>>,
    required: Inheritable<bool>,
    based_on_schema: bool,
}

/// Two types are equal when they accept the same values with the same
/// default, wherever their attributes came from.
impl PartialEq for PropType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.one_of == other.one_of
            && self.default == other.default
            && self.required == other.required
    }
}

impl PropType {
    /// Creates an unconstrained type for a type name.
    ///
    /// Array type names with an item type (`"array.integer"`) also create
    /// the item type.
    #[must_use]
    pub fn new(type_name: &TypeName) -> Self {
        let mut kind = PropKind::new(type_name.kind);
        if let (PropKind::Array(array), Some(items)) = (&mut kind, type_name.items.as_deref()) {
            array.items = Some(Inheritable::own(Box::new(Self::new(items))));
        }
        Self {
            kind,
            one_of: None,
            default: None,
            required: Inheritable::inherited(false),
            based_on_schema: false,
        }
    }

    /// Parses a definition in any of its three shapes.
    ///
    /// With `base`, the definition may only refine the base: changing its
    /// kind fails with `param_type_changed`.
    ///
    /// # Errors
    ///
    /// - `unknown_type` for an unknown type name or an unsupported JSON kind
    /// - `no_type_info` when no type can be determined
    /// - `param_type_changed` when the definition changes the base's kind
    /// - `unexpected_parameter` for keys the kind does not understand
    /// - `type_mismatch`, `invalid_parameter_value` or `out_of_range` for
    ///   bad constraint, enum or default values
    pub fn from_json(value: &Value, base: Option<&PropType>) -> Result<Self> {
        match value {
            Value::String(name) => {
                let type_name: TypeName = name.parse()?;
                Self::from_definition(&type_name, &Map::new(), base)
            }
            Value::Array(values) => {
                let type_name = detect_array_type(values, base, true).ok_or_else(|| {
                    Error::commands(
                        ErrorCode::NoTypeInfo,
                        "Unable to determine the type of the enum values",
                    )
                })?;
                let mut dict = Map::new();
                dict.insert(attr::ENUM.to_string(), value.clone());
                Self::from_definition(&type_name, &dict, base)
            }
            Value::Object(dict) => {
                let type_name = match dict.get(attr::TYPE) {
                    Some(Value::String(name)) => name.parse()?,
                    Some(other) => {
                        return Err(Error::commands(
                            ErrorCode::TypeMismatch,
                            format!("Expected a type name string, got {other}"),
                        ));
                    }
                    None => detect_object_type(dict, base).ok_or_else(|| {
                        Error::commands(
                            ErrorCode::NoTypeInfo,
                            "Unable to determine parameter type",
                        )
                    })?,
                };
                Self::from_definition(&type_name, dict, base)
            }
            other => Err(Error::commands(
                ErrorCode::UnknownType,
                format!("Unexpected JSON value type: {}", json_kind_name(other)),
            )),
        }
    }

    fn from_definition(type_name: &TypeName, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<Self> {
        let mut prop = Self::new(type_name);
        if let Some(base) = base {
            prop.inherit_from(base)?;
        }
        prop.read_definition(dict, base)?;
        Ok(prop)
    }

    fn inherit_from(&mut self, base: &PropType) -> Result<()> {
        if base.value_type() != self.value_type() {
            return Err(type_changed(&base.type_name(), &self.type_name()));
        }

        let kind = match (&self.kind, &base.kind) {
            (PropKind::Array(own), PropKind::Array(inherited)) => {
                match (own.item_type(), inherited.item_type()) {
                    (Some(own_items), Some(base_items)) if own_items.type_name() != base_items.type_name() => {
                        return Err(type_changed(&base.type_name(), &self.type_name()));
                    }
                    (Some(_), None) => self.kind.clone(),
                    _ => base.kind.inherit(),
                }
            }
            _ => base.kind.inherit(),
        };

        self.kind = kind;
        self.one_of = base.one_of.as_ref().map(Inheritable::inherit);
        self.default = base.default.as_ref().map(Inheritable::inherit);
        self.required = base.required.inherit();
        self.based_on_schema = true;
        Ok(())
    }

    fn read_definition(&mut self, dict: &Map<String, Value>, base: Option<&PropType>) -> Result<()> {
        let mut one_of = None;
        let mut default = None;
        let mut additional_properties = None;

        for (key, value) in dict {
            match key.as_str() {
                attr::TYPE => {}
                attr::ENUM => one_of = Some(value),
                attr::DEFAULT => default = Some(value),
                attr::REQUIRED | attr::IS_REQUIRED => {
                    let required = value.as_bool().ok_or_else(|| expected_bool(key, value))?;
                    self.required = Inheritable::own(required);
                }
                attr::ADDITIONAL_PROPERTIES if self.value_type() == ValueType::Object => {
                    additional_properties = Some(value.as_bool().ok_or_else(|| expected_bool(key, value))?);
                }
                _ => {
                    if !self.read_kind_constraint(key, value, base)? {
                        return Err(Error::commands(
                            ErrorCode::UnexpectedParameter,
                            format!("Unexpected property '{key}' in a {} definition", self.type_name()),
                        ));
                    }
                }
            }
        }

        if let (Some(allowed), PropKind::Object(object)) = (additional_properties, &mut self.kind) {
            let mut schema = object.schema.value.clone();
            schema.set_extra_properties_allowed(allowed);
            object.schema = Inheritable::own(schema);
        }

        self.kind.verify()?;

        if let Some(values) = one_of {
            self.read_enum(values)?;
        }

        if let Some(value) = default {
            let value = self.create_value(value).map_err(|e| {
                e.wrap(
                    ErrorDomain::Commands,
                    ErrorCode::InvalidPropValue,
                    "Invalid parameter value for 'default'",
                )
            })?;
            self.default = Some(Inheritable::own(value));
        }
        Ok(())
    }

    fn read_kind_constraint(&mut self, key: &str, value: &Value, base: Option<&PropType>) -> Result<bool> {
        match &mut self.kind {
            PropKind::Int(c) => c.read(key, value),
            PropKind::Double(c) => c.read(key, value),
            PropKind::String(c) => c.read(key, value),
            PropKind::Boolean => Ok(false),
            PropKind::Object(object) if key == attr::PROPERTIES => {
                let Value::Object(properties) = value else {
                    return Err(Error::commands(
                        ErrorCode::TypeMismatch,
                        format!("Expected an object for '{key}', got {value}"),
                    ));
                };
                let schema = ObjectSchema::from_json(properties, base.and_then(PropType::object_schema))?;
                object.schema = Inheritable::own(schema);
                Ok(true)
            }
            PropKind::Array(array) if key == attr::ITEMS => {
                let items = Self::from_json(value, base.and_then(PropType::item_type))?;
                array.items = Some(Inheritable::own(Box::new(items)));
                Ok(true)
            }
            PropKind::Object(_) | PropKind::Array(_) => Ok(false),
        }
    }

    fn read_enum(&mut self, value: &Value) -> Result<()> {
        let Value::Array(values) = value else {
            return Err(Error::commands(
                ErrorCode::TypeMismatch,
                format!("Expected an array for 'enum', got {value}"),
            ));
        };
        if values.is_empty() {
            return Err(Error::commands(
                ErrorCode::InvalidPropValue,
                "The list of allowed values must not be empty",
            ));
        }
        // A redefined enum replaces the inherited one instead of narrowing it.
        self.one_of = None;
        let values = values
            .iter()
            .map(|v| self.create_value(v))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                e.wrap(
                    ErrorDomain::Commands,
                    ErrorCode::InvalidPropValue,
                    "Invalid parameter value for 'enum'",
                )
            })?;
        self.one_of = Some(Inheritable::own(values));
        Ok(())
    }

    // ========== Accessors ==========

    /// Returns the kind and its constraints.
    #[must_use]
    pub fn kind(&self) -> &PropKind {
        &self.kind
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    /// Returns the full type name, including the item type for arrays.
    #[must_use]
    pub fn type_name(&self) -> TypeName {
        match &self.kind {
            PropKind::Array(array) => match array.item_type() {
                Some(items) => TypeName::array_of(items.type_name()),
                None => TypeName::new(ValueType::Array),
            },
            kind => TypeName::new(kind.value_type()),
        }
    }

    /// Returns the nested schema of an object type.
    #[must_use]
    pub fn object_schema(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            PropKind::Object(object) => Some(object.schema()),
            _ => None,
        }
    }

    /// Returns the item type of an array type.
    #[must_use]
    pub fn item_type(&self) -> Option<&PropType> {
        match &self.kind {
            PropKind::Array(array) => array.item_type(),
            _ => None,
        }
    }

    /// Returns the allowed values, if the type is an enum.
    #[must_use]
    pub fn enum_values(&self) -> Option<&[PropValue]> {
        self.one_of.as_ref().map(|values| values.value.as_slice())
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&PropValue> {
        self.default.as_ref().map(|d| &d.value)
    }

    /// Returns `true` if a value must be provided when there is no default.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.value
    }

    /// Returns `true` if this type was parsed against a base type.
    #[must_use]
    pub fn is_based_on_schema(&self) -> bool {
        self.based_on_schema
    }

    /// Sets the required flag.
    pub fn set_required(&mut self, required: bool) {
        self.required = Inheritable::own(required);
    }

    /// Returns `true` if the type sets any attribute of its own, beyond
    /// what it inherited from its base.
    #[must_use]
    pub fn has_overridden_attributes(&self) -> bool {
        self.kind.has_overridden()
            || is_own(self.one_of.as_ref())
            || is_own(self.default.as_ref())
            || !self.required.inherited
    }

    // ========== Values ==========

    /// Validates a JSON value against this type and converts it.
    ///
    /// Integers are accepted for double types. Doubles without a fractional
    /// part are accepted for integer types.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` when the value has the wrong kind
    /// - `out_of_range` when it violates a range or length constraint
    /// - `invalid_parameter_value` when it is not one of the enum values
    /// - the errors of [`ObjectSchema::validate`] for object values
    pub fn create_value(&self, value: &Value) -> Result<PropValue> {
        let converted = match &self.kind {
            PropKind::Int(c) => {
                let v = json_as_i64(value).ok_or_else(|| self.mismatch(value))?;
                c.check(v)?;
                PropValue::Int(v)
            }
            PropKind::Double(c) => {
                let v = value.as_f64().ok_or_else(|| self.mismatch(value))?;
                c.check(v)?;
                PropValue::Double(v)
            }
            PropKind::Boolean => PropValue::Boolean(value.as_bool().ok_or_else(|| self.mismatch(value))?),
            PropKind::String(c) => {
                let v = value.as_str().ok_or_else(|| self.mismatch(value))?;
                c.check(v)?;
                PropValue::String(v.to_string())
            }
            PropKind::Object(object) => PropValue::Object(object.schema().validate(value)?),
            PropKind::Array(array) => {
                let Value::Array(items) = value else {
                    return Err(self.mismatch(value));
                };
                let item_type = array.item_type().ok_or_else(|| {
                    Error::commands(ErrorCode::NoTypeInfo, "Array item type is not specified")
                })?;
                PropValue::Array(
                    items
                        .iter()
                        .map(|item| item_type.create_value(item))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
        };

        if let Some(one_of) = self.enum_values()
            && !one_of.contains(&converted)
        {
            let allowed: Vec<String> = one_of.iter().map(|v| v.to_json().to_string()).collect();
            return Err(Error::commands(
                ErrorCode::InvalidPropValue,
                format!("Value {value} is invalid. Expected one of [{}]", allowed.join(",")),
            ));
        }
        Ok(converted)
    }

    fn mismatch(&self, value: &Value) -> Error {
        Error::commands(
            ErrorCode::TypeMismatch,
            format!("Unable to convert value {value} into {}", self.type_name()),
        )
    }

    // ========== Serialization ==========

    /// Serializes the definition.
    ///
    /// A full schema lists the type and every attribute. A minimal schema
    /// lists only what this definition sets itself and collapses to the
    /// shortest equivalent form: `{}` for an untouched base property, the
    /// type name string for a plain type, or the bare enum array.
    #[must_use]
    pub fn to_json(&self, full_schema: bool) -> Value {
        if !full_schema && !self.has_overridden_attributes() {
            return if self.based_on_schema {
                Value::Object(Map::new())
            } else {
                Value::String(self.type_name().to_string())
            };
        }

        if !full_schema
            && self.only_enum_overridden()
            && let Some(values) = self.enum_values()
        {
            return Value::Array(values.iter().map(PropValue::to_json).collect());
        }

        let mut dict = Map::new();
        if full_schema {
            dict.insert(attr::TYPE.to_string(), Value::from(self.value_type().as_str()));
        }
        self.kind.write(&mut dict, full_schema);
        write_if(&mut dict, attr::ENUM, self.one_of.as_ref(), full_schema, |values| {
            Value::Array(values.iter().map(PropValue::to_json).collect())
        });
        write_if(&mut dict, attr::DEFAULT, self.default.as_ref(), full_schema, PropValue::to_json);
        if full_schema {
            if self.required.value {
                dict.insert(attr::REQUIRED.to_string(), Value::Bool(true));
            }
        } else if !self.required.inherited {
            dict.insert(attr::REQUIRED.to_string(), Value::Bool(self.required.value));
        }

        if !full_schema && !self.based_on_schema {
            let detected = detect_object_type(&dict, None).map(|t| t.kind);
            if detected != Some(self.value_type()) {
                dict.insert(attr::TYPE.to_string(), Value::from(self.value_type().as_str()));
            }
        }
        Value::Object(dict)
    }

    fn only_enum_overridden(&self) -> bool {
        is_own(self.one_of.as_ref())
            && !self.kind.has_overridden()
            && !is_own(self.default.as_ref())
            && self.required.inherited
    }
}

fn type_changed(from: &TypeName, to: &TypeName) -> Error {
    Error::commands(
        ErrorCode::PropTypeChanged,
        format!("Redefining a property of type {from} as {to}"),
    )
}

fn expected_bool(key: &str, value: &Value) -> Error {
    Error::commands(
        ErrorCode::TypeMismatch,
        format!("Expected a boolean for '{key}', got {value}"),
    )
}

fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Double",
        Value::Number(_) => "Integer",
        Value::String(_) => "String",
        Value::Array(_) => "List",
        Value::Object(_) => "Dictionary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> PropType {
        PropType::from_json(&value, None).unwrap()
    }

    fn parse_err(value: Value) -> Error {
        PropType::from_json(&value, None).unwrap_err()
    }

    // ========== Parsing ==========

    #[test]
    fn parse_type_name_string() {
        let prop = parse(json!("integer"));
        assert_eq!(prop.value_type(), ValueType::Int);
        assert!(!prop.is_required());
        assert!(prop.default_value().is_none());

        let prop = parse(json!("array.string"));
        assert_eq!(prop.type_name().to_string(), "array.string");
    }

    #[test]
    fn parse_enum_shorthand() {
        let prop = parse(json!(["on", "standby", "off"]));
        assert_eq!(prop.value_type(), ValueType::String);
        assert_eq!(prop.enum_values().map(<[PropValue]>::len), Some(3));
    }

    #[test]
    fn parse_object_definition() {
        let prop = parse(json!({"minimum": 0, "maximum": 100, "default": 50}));
        let PropKind::Int(range) = prop.kind() else {
            panic!("expected integer, got {:?}", prop.kind());
        };
        assert_eq!(range.minimum(), Some(0));
        assert_eq!(range.maximum(), Some(100));
        assert_eq!(prop.default_value(), Some(&PropValue::Int(50)));
    }

    #[test]
    fn unsupported_json_kind() {
        let err = parse_err(json!(5));
        assert_eq!(err.code(), ErrorCode::UnknownType);
        assert_eq!(err.message(), "Unexpected JSON value type: Integer");
        assert_eq!(parse_err(json!(null)).code(), ErrorCode::UnknownType);
    }

    #[test]
    fn unknown_type_name() {
        assert_eq!(parse_err(json!("widget")).code(), ErrorCode::UnknownType);
        assert_eq!(parse_err(json!({"type": "widget"})).code(), ErrorCode::UnknownType);
    }

    #[test]
    fn no_type_info() {
        assert_eq!(parse_err(json!({})).code(), ErrorCode::NoTypeInfo);
        assert_eq!(parse_err(json!([])).code(), ErrorCode::NoTypeInfo);
        assert_eq!(parse_err(json!({"type": "array"})).code(), ErrorCode::NoTypeInfo);
    }

    #[test]
    fn unexpected_key() {
        let err = parse_err(json!({"type": "boolean", "minimum": 0}));
        assert_eq!(err.code(), ErrorCode::UnexpectedParameter);
        let err = parse_err(json!({"type": "integer", "color": "red"}));
        assert_eq!(err.code(), ErrorCode::UnexpectedParameter);
    }

    #[test]
    fn integer_bounds_must_be_integral() {
        let err = parse_err(json!({"type": "integer", "minimum": 0.5}));
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
        assert!(PropType::from_json(&json!({"type": "integer", "minimum": 1.0}), None).is_ok());
    }

    #[test]
    fn inverted_range() {
        let err = parse_err(json!({"minimum": 10, "maximum": 1}));
        assert_eq!(err.code(), ErrorCode::InvalidPropValue);
    }

    #[test]
    fn default_must_satisfy_constraints() {
        let err = parse_err(json!({"minimum": 0, "maximum": 10, "default": 11}));
        assert_eq!(err.code(), ErrorCode::InvalidPropValue);
        assert_eq!(err.first_error().code(), ErrorCode::OutOfRange);

        let err = parse_err(json!({"enum": ["a", "b"], "default": "c"}));
        assert_eq!(err.code(), ErrorCode::InvalidPropValue);
    }

    #[test]
    fn enum_values_must_match_kind() {
        let err = parse_err(json!({"type": "integer", "enum": [1, "two"]}));
        assert_eq!(err.code(), ErrorCode::InvalidPropValue);
        assert_eq!(err.first_error().code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn object_without_properties_accepts_anything() {
        let prop = parse(json!("object"));
        let value = prop.create_value(&json!({"anything": [1, 2]})).unwrap();
        assert!(value.as_object().unwrap().contains_key("anything"));
    }

    #[test]
    fn required_flag() {
        assert!(parse(json!({"type": "string", "required": true})).is_required());
        assert!(parse(json!({"type": "string", "isRequired": true})).is_required());
        let err = parse_err(json!({"type": "string", "required": "yes"}));
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
    }

    // ========== Base schemas ==========

    #[test]
    fn derived_type_cannot_change_kind() {
        let base = parse(json!("integer"));
        let err = PropType::from_json(&json!("string"), Some(&base)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PropTypeChanged);
        assert_eq!(err.message(), "Redefining a property of type integer as string");
    }

    #[test]
    fn range_against_double_base() {
        let base = parse(json!("number"));
        let derived = PropType::from_json(&json!({"minimum": 1}), Some(&base)).unwrap();
        assert_eq!(derived.value_type(), ValueType::Double);
        assert!(derived.is_based_on_schema());
    }

    #[test]
    fn derived_enum_shorthand_uses_base_type() {
        let base = parse(json!("array.integer"));
        let derived = PropType::from_json(&json!([[1, 2], [3]]), Some(&base)).unwrap();
        assert_eq!(derived.type_name().to_string(), "array.integer");
    }

    #[test]
    fn derived_enum_replaces_base_enum() {
        let base = parse(json!(["a", "b"]));
        let derived = PropType::from_json(&json!(["a", "b", "c"]), Some(&base)).unwrap();
        assert!(derived.create_value(&json!("c")).is_ok());
    }

    #[test]
    fn derived_array_item_type_must_match() {
        let base = parse(json!("array.integer"));
        let err = PropType::from_json(&json!("array.string"), Some(&base)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PropTypeChanged);
    }

    // ========== Values ==========

    #[test]
    fn create_scalar_values() {
        assert_eq!(parse(json!("integer")).create_value(&json!(5)).unwrap(), PropValue::Int(5));
        assert_eq!(parse(json!("number")).create_value(&json!(5)).unwrap(), PropValue::Double(5.0));
        assert_eq!(
            parse(json!("integer")).create_value(&json!(1.5)).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
        assert_eq!(
            parse(json!("boolean")).create_value(&json!("true")).unwrap_err().code(),
            ErrorCode::TypeMismatch
        );
    }

    #[test]
    fn create_value_checks_string_length() {
        let prop = parse(json!({"minLength": 2, "maxLength": 4}));
        assert!(prop.create_value(&json!("abc")).is_ok());
        assert_eq!(prop.create_value(&json!("a")).unwrap_err().code(), ErrorCode::OutOfRange);
    }

    #[test]
    fn create_value_checks_enum() {
        let prop = parse(json!(["on", "off"]));
        let err = prop.create_value(&json!("dim")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPropValue);
    }

    #[test]
    fn create_array_values() {
        let prop = parse(json!({"items": {"minimum": 0}}));
        assert!(prop.create_value(&json!([0, 1, 2])).is_ok());
        assert_eq!(prop.create_value(&json!([0, -1])).unwrap_err().code(), ErrorCode::OutOfRange);
        assert_eq!(prop.create_value(&json!(1)).unwrap_err().code(), ErrorCode::TypeMismatch);
    }

    // ========== Serialization ==========

    #[test]
    fn full_schema_output() {
        let prop = parse(json!({"minimum": 10, "maximum": 100}));
        assert_eq!(
            prop.to_json(true),
            json!({"maximum": 100, "minimum": 10, "type": "integer"})
        );
    }

    #[test]
    fn minimal_output_shortcuts() {
        assert_eq!(parse(json!("integer")).to_json(false), json!("integer"));
        assert_eq!(parse(json!(["on", "off"])).to_json(false), json!(["on", "off"]));

        let base = parse(json!("integer"));
        let derived = PropType::from_json(&json!({}), Some(&base)).unwrap();
        assert_eq!(derived.to_json(false), json!({}));
    }

    #[test]
    fn minimal_output_adds_type_when_not_detectable() {
        let prop = parse(json!({"type": "string", "default": "x", "required": true}));
        assert_eq!(prop.to_json(false), json!({"default": "x", "required": true}));

        let prop = parse(json!({"type": "number", "minimum": 0}));
        assert_eq!(prop.to_json(false), json!({"minimum": 0.0}));

        let prop = parse(json!({"type": "number", "default": 1}));
        assert_eq!(prop.to_json(false), json!({"default": 1.0}));

        let prop = parse(json!({"type": "integer", "required": true}));
        assert_eq!(prop.to_json(false), json!({"required": true, "type": "integer"}));
    }

    #[test]
    fn full_schema_round_trips() {
        for definition in [
            json!({"minimum": 0, "maximum": 10, "default": 3}),
            json!({"type": "number", "minimum": -1.5}),
            json!({"minLength": 1, "maxLength": 8, "required": true}),
            json!(["auto", "manual"]),
            json!({"properties": {"x": "integer", "y": {"default": 0.5}}}),
            json!({"type": "object"}),
            json!({"items": {"properties": {"id": "string"}}}),
        ] {
            let prop = parse(definition.clone());
            let reparsed = PropType::from_json(&prop.to_json(true), None).unwrap();
            assert_eq!(reparsed, prop, "round trip of {definition}");
        }
    }

    #[test]
    fn minimal_schema_round_trips() {
        let base = parse(json!({"minimum": 0, "maximum": 100}));
        let derived = PropType::from_json(&json!({"minimum": 10, "default": 20}), Some(&base)).unwrap();
        let minimal = derived.to_json(false);
        assert_eq!(minimal, json!({"default": 20, "minimum": 10}));
        let reparsed = PropType::from_json(&minimal, Some(&base)).unwrap();
        assert_eq!(reparsed, derived);
    }
}
