// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single command definition.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::schema::{ObjectSchema, ValueMap};

use super::{CommandVisibility, UserRole};

/// Parameter, progress and result schemas plus access metadata of one
/// command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    category: String,
    parameters: ObjectSchema,
    progress: ObjectSchema,
    results: ObjectSchema,
    visibility: CommandVisibility,
    minimal_role: UserRole,
}

impl CommandDefinition {
    /// Creates a definition visible everywhere and invocable by users.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        parameters: ObjectSchema,
        progress: ObjectSchema,
        results: ObjectSchema,
    ) -> Self {
        Self {
            category: category.into(),
            parameters,
            progress,
            results,
            visibility: CommandVisibility::default(),
            minimal_role: UserRole::default(),
        }
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: CommandVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the minimal role.
    #[must_use]
    pub fn with_minimal_role(mut self, role: UserRole) -> Self {
        self.minimal_role = role;
        self
    }

    /// Returns the category the definition was loaded under.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the parameters schema.
    #[must_use]
    pub fn parameters(&self) -> &ObjectSchema {
        &self.parameters
    }

    /// Returns the progress schema.
    #[must_use]
    pub fn progress(&self) -> &ObjectSchema {
        &self.progress
    }

    /// Returns the results schema.
    #[must_use]
    pub fn results(&self) -> &ObjectSchema {
        &self.results
    }

    /// Returns the channels the command is visible on.
    #[must_use]
    pub fn visibility(&self) -> CommandVisibility {
        self.visibility
    }

    /// Returns the lowest role allowed to invoke the command.
    #[must_use]
    pub fn minimal_role(&self) -> UserRole {
        self.minimal_role
    }

    /// Serializes the definition.
    ///
    /// `parameters` and `minimalRole` are always present, `progress` and
    /// `results` only when they declare properties.
    #[must_use]
    pub fn to_json(&self, full_schema: bool) -> Value {
        let mut dict = Map::new();
        dict.insert("parameters".to_string(), self.parameters.to_json(full_schema));
        if !self.progress.is_empty() {
            dict.insert("progress".to_string(), self.progress.to_json(full_schema));
        }
        if !self.results.is_empty() {
            dict.insert("results".to_string(), self.results.to_json(full_schema));
        }
        dict.insert("minimalRole".to_string(), Value::from(self.minimal_role.as_str()));
        Value::Object(dict)
    }

    /// Validates command parameters and fills in defaults.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the parameters schema.
    pub fn validate_parameters(&self, parameters: &Value) -> Result<ValueMap> {
        self.parameters.validate(parameters)
    }

    /// Validates a progress report.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the progress schema.
    pub fn validate_progress(&self, progress: &Value) -> Result<ValueMap> {
        self.progress.validate(progress)
    }

    /// Validates command results.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the results schema.
    pub fn validate_results(&self, results: &Value) -> Result<ValueMap> {
        self.results.validate(results)
    }
}
