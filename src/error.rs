// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `devcap` library.
//!
//! Every failure is reported as a structured [`Error`]: a domain, a symbolic
//! code, a human readable message and an optional inner error that describes
//! the underlying cause. Errors are chained from the outermost context (for
//! example `invalid_object_schema`) down to the root cause (for example
//! `param_type_changed`).
//!
//! # Examples
//!
//! ```
//! use devcap_lib::error::{Error, ErrorCode, ErrorDomain};
//!
//! let cause = Error::commands(ErrorCode::PropTypeChanged, "Redefining a property of type integer as string");
//! let err = cause.wrap(
//!     ErrorDomain::Commands,
//!     ErrorCode::InvalidPropDef,
//!     "Error in definition of property 'delay'",
//! );
//!
//! assert_eq!(err.code(), ErrorCode::InvalidPropDef);
//! assert_eq!(err.first_error().code(), ErrorCode::PropTypeChanged);
//! assert!(err.has_code(ErrorCode::PropTypeChanged));
//! ```

use std::fmt;

use thiserror::Error;

/// The subsystem an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorDomain {
    /// Property types, object schemas and the command dictionary.
    Commands,
    /// The state manager and its change queue.
    State,
    /// Malformed JSON text handed to one of the `*_from_json` helpers.
    Json,
}

impl ErrorDomain {
    /// Returns the domain name as reported to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::State => "state",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic error codes.
///
/// The string form returned by [`ErrorCode::as_str`] is part of the wire
/// contract with local and cloud clients and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A type name does not name a known property type.
    UnknownType,
    /// The type of a property could not be determined from its definition.
    NoTypeInfo,
    /// A JSON value has the wrong kind for where it is used.
    TypeMismatch,
    /// A derived definition changes the type established by the base schema.
    PropTypeChanged,
    /// A value (or a token such as a role name) is not acceptable.
    InvalidPropValue,
    /// A property definition is invalid.
    InvalidPropDef,
    /// A parameters/progress/results schema is invalid.
    InvalidObjectSchema,
    /// A command name is empty, unknown or violates the custom naming rule.
    InvalidCommandName,
    /// The `visibility` attribute of a command is invalid.
    InvalidCommandVisibility,
    /// The `minimalRole` attribute of a command is invalid.
    InvalidMinimalRole,
    /// A property is not part of the schema.
    UnknownProperty,
    /// A definition contains a key that is not understood.
    UnexpectedParameter,
    /// A required property has no value and no default.
    PropertyMissing,
    /// A value violates a range or length constraint.
    OutOfRange,
    /// A command name is already owned by another category.
    DuplicateCommandDefinition,
    /// The caller may not see or invoke the command.
    AccessDenied,
    /// The property part of a qualified state property name is missing.
    PropertyNameMissing,
    /// The package part of a qualified state property name is missing.
    PackageNameMissing,
    /// The state property (or its package) is not defined.
    PropertyNotDefined,
    /// A state property is defined twice.
    PropertyRedefinition,
    /// A state package name is invalid.
    InvalidPackage,
    /// A state category name is invalid.
    InvalidCategory,
    /// A JSON object was expected.
    ObjectExpected,
    /// JSON text could not be parsed.
    JsonParse,
}

impl ErrorCode {
    /// Returns the symbolic code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownType => "unknown_type",
            Self::NoTypeInfo => "no_type_info",
            Self::TypeMismatch => "type_mismatch",
            Self::PropTypeChanged => "param_type_changed",
            Self::InvalidPropValue => "invalid_parameter_value",
            Self::InvalidPropDef => "invalid_parameter_definition",
            Self::InvalidObjectSchema => "invalid_object_schema",
            Self::InvalidCommandName => "invalid_command_name",
            Self::InvalidCommandVisibility => "invalid_command_visibility",
            Self::InvalidMinimalRole => "invalid_minimal_role",
            Self::UnknownProperty => "unknown_property",
            Self::UnexpectedParameter => "unexpected_parameter",
            Self::PropertyMissing => "parameter_missing",
            Self::OutOfRange => "out_of_range",
            Self::DuplicateCommandDefinition => "duplicate_command_definition",
            Self::AccessDenied => "access_denied",
            Self::PropertyNameMissing => "property_name_missing",
            Self::PackageNameMissing => "package_name_missing",
            Self::PropertyNotDefined => "property_not_defined",
            Self::PropertyRedefinition => "property_redefinition",
            Self::InvalidPackage => "invalid_package",
            Self::InvalidCategory => "invalid_category",
            Self::ObjectExpected => "object_expected",
            Self::JsonParse => "json_parse_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type for this library.
///
/// An error carries its [`ErrorDomain`], its [`ErrorCode`], a message and,
/// when it was raised as the consequence of another failure, that inner
/// error. The inner error is also exposed through
/// [`std::error::Error::source`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{domain}.{code}: {message}")]
pub struct Error {
    domain: ErrorDomain,
    code: ErrorCode,
    message: String,
    #[source]
    inner: Option<Box<Error>>,
}

impl Error {
    /// Creates a new error without an inner cause.
    #[must_use]
    pub fn new(domain: ErrorDomain, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            domain,
            code,
            message: message.into(),
            inner: None,
        }
    }

    /// Creates an error in the `commands` domain.
    #[must_use]
    pub fn commands(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::Commands, code, message)
    }

    /// Creates an error in the `state` domain.
    #[must_use]
    pub fn state(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(ErrorDomain::State, code, message)
    }

    /// Wraps this error into a new outer error.
    ///
    /// The returned error reports `code` and keeps `self` as its inner error.
    #[must_use]
    pub fn wrap(self, domain: ErrorDomain, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            domain,
            code,
            message: message.into(),
            inner: Some(Box::new(self)),
        }
    }

    /// Returns the error domain.
    #[must_use]
    pub fn domain(&self) -> ErrorDomain {
        self.domain
    }

    /// Returns the symbolic error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the error this one was raised from, if any.
    #[must_use]
    pub fn inner(&self) -> Option<&Error> {
        self.inner.as_deref()
    }

    /// Returns the innermost error of the chain (the root cause).
    #[must_use]
    pub fn first_error(&self) -> &Error {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// Returns `true` if any error in the chain has the given code.
    #[must_use]
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.chain().any(|e| e.code == code)
    }

    /// Iterates over the chain, outermost error first.
    pub fn chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |e| e.inner())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorDomain::Json, ErrorCode::JsonParse, err.to_string())
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
