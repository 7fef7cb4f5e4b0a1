// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed property schemas.
//!
//! This module parses property definitions written in a JSON-schema-like
//! notation and validates values against them. It is shared by command
//! parameters, progress and results and by state properties.
//!
//! - [`PropType`] - one property definition: kind, constraints, enum, default
//! - [`ObjectSchema`] - named property types
//! - [`PropValue`] - a value that passed validation
//! - [`ValueType`] / [`TypeName`] - property kinds and dotted type names
//!
//! # Examples
//!
//! ```
//! use devcap_lib::schema::{ObjectSchema, PropValue};
//! use serde_json::json;
//!
//! let definition = json!({
//!     "brightness": {"minimum": 0, "maximum": 100},
//!     "mode": ["auto", "manual"],
//! });
//! let schema = ObjectSchema::from_json(definition.as_object().unwrap(), None).unwrap();
//!
//! let values = schema.validate(&json!({"brightness": 40, "mode": "auto"})).unwrap();
//! assert_eq!(values["brightness"], PropValue::Int(40));
//!
//! // Values outside the constraints are rejected.
//! assert!(schema.validate(&json!({"brightness": 140})).is_err());
//! ```

mod constraints;
mod detect;
mod object_schema;
mod prop_type;
mod prop_value;
mod value_type;

pub use constraints::{Numeric, NumericConstraints, StringConstraints};
pub use object_schema::ObjectSchema;
pub use prop_type::{ArrayConstraints, ObjectConstraints, PropKind, PropType};
pub use prop_value::{PropValue, ValueMap};
pub use value_type::{TypeName, ValueType};

/// Keys understood in property definitions.
pub(crate) mod attr {
    pub const TYPE: &str = "type";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const ENUM: &str = "enum";
    pub const DEFAULT: &str = "default";
    pub const PROPERTIES: &str = "properties";
    pub const ITEMS: &str = "items";
    pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";
    pub const REQUIRED: &str = "required";
    pub const IS_REQUIRED: &str = "isRequired";
}
