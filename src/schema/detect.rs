// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type detection for definitions without an explicit `"type"`.

use serde_json::{Map, Value};

use super::{PropType, TypeName, ValueType, attr};

fn is_double(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_f64)
}

/// Detects the type of an object-form definition.
///
/// The first matching rule wins:
///
/// 1. `minimum`/`maximum` present and the base is a double: double
/// 2. `minimum` or `maximum` written as a double: double
/// 3. `minimum` or `maximum` present: integer
/// 4. `minLength`/`maxLength` present: string
/// 5. `properties` present: object
/// 6. `items` present: array
/// 7. `enum` present: detected from the enum values
/// 8. `default` present: detected from the default's own kind
/// 9. otherwise the base's type, if any
pub(crate) fn detect_object_type(dict: &Map<String, Value>, base: Option<&PropType>) -> Option<TypeName> {
    let minimum = dict.get(attr::MINIMUM);
    let maximum = dict.get(attr::MAXIMUM);
    let has_range = minimum.is_some() || maximum.is_some();

    if has_range && base.is_some_and(|b| b.value_type() == ValueType::Double) {
        return Some(ValueType::Double.into());
    }
    if is_double(minimum) || is_double(maximum) {
        return Some(ValueType::Double.into());
    }
    if has_range {
        return Some(ValueType::Int.into());
    }
    if dict.contains_key(attr::MIN_LENGTH) || dict.contains_key(attr::MAX_LENGTH) {
        return Some(ValueType::String.into());
    }
    if dict.contains_key(attr::PROPERTIES) {
        return Some(ValueType::Object.into());
    }
    if dict.contains_key(attr::ITEMS) {
        return Some(ValueType::Array.into());
    }
    if let Some(Value::Array(values)) = dict.get(attr::ENUM) {
        return detect_array_type(values, base, true);
    }
    if let Some(default) = dict.get(attr::DEFAULT) {
        return match default {
            Value::Array(items) => detect_array_type(items, None, false).map(TypeName::array_of),
            other => ValueType::of_json(other).map(TypeName::new),
        };
    }
    base.map(PropType::type_name)
}

/// Detects the type shared by a list of values (an enum shorthand or an
/// array default) from its first element.
///
/// With a base the base's type is used unchanged. Nested arrays are
/// detected only when `allow_arrays` is set, and only one level deep.
pub(crate) fn detect_array_type(values: &[Value], base: Option<&PropType>, allow_arrays: bool) -> Option<TypeName> {
    if let Some(base) = base {
        return Some(base.type_name());
    }
    match values.first()? {
        Value::Array(items) if allow_arrays => detect_array_type(items, None, false).map(TypeName::array_of),
        Value::Array(_) => None,
        first => ValueType::of_json(first).map(TypeName::new),
    }
}
