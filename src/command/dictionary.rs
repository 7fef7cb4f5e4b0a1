// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The command dictionary.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, ErrorDomain, Result};
use crate::schema::ObjectSchema;

use super::{CommandDefinition, CommandVisibility, UserRole};

const PARAMETERS: &str = "parameters";
const PROGRESS: &str = "progress";
const RESULTS: &str = "results";
const VISIBILITY: &str = "visibility";
const MINIMAL_ROLE: &str = "minimalRole";

/// Command definitions keyed by full name (`"package.command"`).
///
/// A dictionary is filled by [`load_commands`](Self::load_commands) from a
/// JSON tree of the form `{package: {command: definition}}`. When a base
/// dictionary is supplied, every command either refines a base command of
/// the same name or is a custom command whose name starts with `_`.
///
/// # Examples
///
/// ```
/// use devcap_lib::command::CommandDictionary;
/// use serde_json::json;
///
/// let mut base = CommandDictionary::new();
/// base.load_commands(
///     &json!({"base": {"reboot": {"parameters": {"delay": {"maximum": 100}}}}}),
///     "standard",
///     None,
/// ).unwrap();
///
/// let mut dict = CommandDictionary::new();
/// dict.load_commands(
///     &json!({"base": {"reboot": {"parameters": {"delay": {"minimum": 10}}}}}),
///     "vendor",
///     Some(&base),
/// ).unwrap();
///
/// let json = dict.get_commands_as_json(|_| true, true);
/// assert_eq!(
///     json["base"]["reboot"]["parameters"]["delay"],
///     json!({"type": "integer", "minimum": 10, "maximum": 100})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandDictionary {
    definitions: BTreeMap<String, CommandDefinition>,
}

impl CommandDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a tree of command definitions under `category`.
    ///
    /// The load is all-or-nothing: on error the dictionary is unchanged.
    /// Loading a category again replaces all of its commands.
    ///
    /// # Errors
    ///
    /// - `type_mismatch` if the tree, a package or a command is not an object
    /// - `invalid_command_name` for an empty name, or a name that is neither
    ///   in `base` nor starts with `_`
    /// - `invalid_object_schema` wrapping a schema error
    /// - `invalid_command_visibility` / `invalid_minimal_role`
    /// - `duplicate_command_definition` if a name belongs to another category
    pub fn load_commands(&mut self, json: &Value, category: &str, base: Option<&CommandDictionary>) -> Result<()> {
        tracing::debug!(category = %category, "Loading command definitions");

        let loaded = match build_definitions(json, category, base) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "Rejected command definitions");
                return Err(e);
            }
        };

        for name in loaded.keys() {
            if let Some(existing) = self.definitions.get(name)
                && existing.category() != category
            {
                tracing::error!(
                    command = %name,
                    category = %category,
                    previous = %existing.category(),
                    "Command redefined in a different category"
                );
                return Err(Error::commands(
                    ErrorCode::DuplicateCommandDefinition,
                    format!("Definition for command '{name}' overrides an earlier definition in category '{}'", existing.category()),
                ));
            }
        }

        self.definitions.retain(|_, def| def.category() != category);
        let count = loaded.len();
        self.definitions.extend(loaded);

        tracing::info!(category = %category, count, "Loaded command definitions");
        Ok(())
    }

    /// Parses `json` and loads it with [`load_commands`](Self::load_commands).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`load_commands`](Self::load_commands).
    pub fn load_commands_from_json(&mut self, json: &str, category: &str, base: Option<&CommandDictionary>) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        self.load_commands(&value, category, base)
    }

    /// Returns a command by full name.
    #[must_use]
    pub fn find_command(&self, name: &str) -> Option<&CommandDefinition> {
        self.definitions.get(name)
    }

    /// Iterates over the full command names in order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Returns the number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if no command is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Removes every command.
    pub fn clear(&mut self) {
        self.definitions.clear();
    }

    /// Serializes the commands accepted by `filter` as
    /// `{package: {command: definition}}`.
    pub fn get_commands_as_json(&self, filter: impl Fn(&CommandDefinition) -> bool, full_schema: bool) -> Value {
        let mut packages: Map<String, Value> = Map::new();
        for (name, definition) in &self.definitions {
            if !filter(definition) {
                continue;
            }
            let Some((package, command)) = name.split_once('.') else {
                continue;
            };
            let commands = packages
                .entry(package.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(commands) = commands {
                commands.insert(command.to_string(), definition.to_json(full_schema));
            }
        }
        Value::Object(packages)
    }
}

fn build_definitions(
    json: &Value,
    category: &str,
    base: Option<&CommandDictionary>,
) -> Result<BTreeMap<String, CommandDefinition>> {
    let Value::Object(packages) = json else {
        return Err(Error::commands(
            ErrorCode::TypeMismatch,
            format!("Expecting an object of command packages, got {json}"),
        ));
    };

    let mut loaded = BTreeMap::new();
    for (package, commands) in packages {
        let Value::Object(commands) = commands else {
            return Err(Error::commands(
                ErrorCode::TypeMismatch,
                format!("Expecting an object for package '{package}'"),
            ));
        };
        for (command, definition) in commands {
            let full_name = format!("{package}.{command}");
            let definition = build_definition(&full_name, package, command, definition, category, base)?;
            loaded.insert(full_name, definition);
        }
    }
    Ok(loaded)
}

fn build_definition(
    full_name: &str,
    package: &str,
    command: &str,
    json: &Value,
    category: &str,
    base: Option<&CommandDictionary>,
) -> Result<CommandDefinition> {
    if package.is_empty() || package.contains('.') {
        return Err(Error::commands(
            ErrorCode::InvalidCommandName,
            format!("Invalid package name '{package}'"),
        ));
    }
    if command.is_empty() {
        return Err(Error::commands(
            ErrorCode::InvalidCommandName,
            format!("Unnamed command encountered in package '{package}'"),
        ));
    }
    if command.contains('.') {
        return Err(Error::commands(
            ErrorCode::InvalidCommandName,
            format!("Command name '{command}' in package '{package}' must not contain '.'"),
        ));
    }
    let Value::Object(json) = json else {
        return Err(Error::commands(
            ErrorCode::TypeMismatch,
            format!("Expecting an object for command '{full_name}'"),
        ));
    };

    let base_def = base.and_then(|b| b.find_command(full_name));
    if base.is_some() && base_def.is_none() && !command.starts_with('_') {
        return Err(Error::commands(
            ErrorCode::InvalidCommandName,
            format!("The name of custom command '{command}' in package '{package}' must start with '_'"),
        ));
    }

    let parameters = read_schema(json, PARAMETERS, base_def.map(CommandDefinition::parameters), full_name)?;
    let progress = read_schema(json, PROGRESS, base_def.map(CommandDefinition::progress), full_name)?;
    let results = read_schema(json, RESULTS, base_def.map(CommandDefinition::results), full_name)?;

    let visibility = match json.get(VISIBILITY) {
        Some(value) => read_token::<CommandVisibility>(value).map_err(|e| {
            e.wrap(
                ErrorDomain::Commands,
                ErrorCode::InvalidCommandVisibility,
                format!("Error parsing command visibility for '{full_name}'"),
            )
        })?,
        None => base_def.map(CommandDefinition::visibility).unwrap_or_default(),
    };
    let minimal_role = match json.get(MINIMAL_ROLE) {
        Some(value) => read_token::<UserRole>(value).map_err(|e| {
            e.wrap(
                ErrorDomain::Commands,
                ErrorCode::InvalidMinimalRole,
                format!("Error parsing command minimal role for '{full_name}'"),
            )
        })?,
        None => base_def.map(CommandDefinition::minimal_role).unwrap_or_default(),
    };

    Ok(CommandDefinition::new(category, parameters, progress, results)
        .with_visibility(visibility)
        .with_minimal_role(minimal_role))
}

/// Reads one of the schema sections. A missing section is a copy of the
/// base command's section, or empty.
fn read_schema(
    json: &Map<String, Value>,
    key: &str,
    base: Option<&ObjectSchema>,
    full_name: &str,
) -> Result<ObjectSchema> {
    let wrap = |e: Error| {
        e.wrap(
            ErrorDomain::Commands,
            ErrorCode::InvalidObjectSchema,
            format!("Invalid definition for command '{full_name}'"),
        )
    };
    match json.get(key) {
        None => Ok(base.cloned().unwrap_or_default()),
        Some(Value::Object(properties)) => ObjectSchema::from_json(properties, base).map_err(wrap),
        Some(other) => Err(wrap(Error::commands(
            ErrorCode::TypeMismatch,
            format!("Expecting an object for '{key}', got {other}"),
        ))),
    }
}

fn read_token<T>(value: &Value) -> Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    match value {
        Value::String(s) => s.parse(),
        other => Err(Error::commands(
            ErrorCode::TypeMismatch,
            format!("Expecting a string, got {other}"),
        )),
    }
}
