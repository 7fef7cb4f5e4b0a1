// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device facade.
//!
//! A [`Device`] ties the engine together: an immutable base (standard)
//! command dictionary, the device's own dictionary loaded against it, the
//! [`StateManager`] and, with the `events` feature, an
//! [`EventBus`](crate::event::EventBus) that reports every accepted change.
//!
//! ```
//! use devcap_lib::{Channel, Device, DeviceConfig};
//! use devcap_lib::command::UserRole;
//! use serde_json::json;
//!
//! # fn example() -> devcap_lib::Result<()> {
//! let device = Device::new(
//!     DeviceConfig::new()
//!         .with_base_commands(json!({"base": {"reboot": {"parameters": {"delay": "integer"}}}}))
//!         .with_base_state(json!({"base": {"firmwareVersion": "string"}})),
//! )?;
//!
//! device.add_command_definitions(
//!     &json!({"base": {"reboot": {"parameters": {"delay": {"minimum": 10}}}}}),
//!     "vendor",
//! )?;
//!
//! let params = device.validate_command("base.reboot", &json!({"delay": 15}), UserRole::Owner, Channel::Local)?;
//! assert_eq!(params["delay"].as_int(), Some(15));
//! assert!(device.validate_command("base.reboot", &json!({"delay": 5}), UserRole::Owner, Channel::Local).is_err());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod config;

pub use config::DeviceConfig;

use std::fmt;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;

use crate::command::{CommandDefinition, CommandDictionary, CommandVisibility, UserRole};
use crate::error::{Error, ErrorCode, Result};
use crate::schema::ValueMap;
use crate::state::{DEFAULT_CATEGORY, StateChange, StateManager, UpdateId};
use crate::subscription::SubscriptionId;

#[cfg(feature = "events")]
use crate::event::{EngineEvent, EventBus};

/// The channel a client reaches the device through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A client on the local network.
    Local,
    /// The cloud service.
    Cloud,
    /// Either channel; a command only needs to be visible somewhere.
    Any,
}

impl Channel {
    /// Returns true if a command with `visibility` can be reached through
    /// this channel.
    #[must_use]
    pub fn allows(self, visibility: CommandVisibility) -> bool {
        match self {
            Self::Local => visibility.local,
            Self::Cloud => visibility.cloud,
            Self::Any => visibility.local || visibility.cloud,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
            Self::Any => "any",
        })
    }
}

/// A device's command and state engine.
///
/// All methods take `&self`; the device can be shared across threads in an
/// `Arc`.
pub struct Device {
    base_commands: CommandDictionary,
    commands: RwLock<CommandDictionary>,
    state: StateManager,
    #[cfg(feature = "events")]
    events: EventBus,
}

impl Device {
    /// Creates a device from a configuration, loading its base commands and
    /// base state.
    ///
    /// # Errors
    ///
    /// Returns the error of loading `base_commands`, `base_state` or
    /// `base_state_defaults`.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        let mut base_commands = CommandDictionary::new();
        if let Some(commands) = &config.base_commands {
            base_commands.load_commands(commands, DEFAULT_CATEGORY, None)?;
        }

        let state = StateManager::new(config.state_queue_capacity);
        if let Some(definitions) = &config.base_state {
            state.load_base_state_definition(definitions)?;
        }
        if let Some(defaults) = &config.base_state_defaults {
            state.load_state_defaults(defaults)?;
        }

        tracing::debug!(
            base_commands = base_commands.len(),
            queue_capacity = config.state_queue_capacity,
            "Device engine created"
        );

        Ok(Self {
            base_commands,
            commands: RwLock::new(CommandDictionary::new()),
            state,
            #[cfg(feature = "events")]
            events: EventBus::with_capacity(config.event_capacity),
        })
    }

    // ========== Commands ==========

    /// Returns the base (standard) command dictionary.
    #[must_use]
    pub fn base_commands(&self) -> &CommandDictionary {
        &self.base_commands
    }

    /// Loads command definitions under `category`, checked against the base
    /// dictionary.
    ///
    /// # Errors
    ///
    /// See [`CommandDictionary::load_commands`].
    pub fn add_command_definitions(&self, json: &Value, category: &str) -> Result<()> {
        self.commands
            .write()
            .load_commands(json, category, Some(&self.base_commands))?;
        #[cfg(feature = "events")]
        self.events.publish(EngineEvent::CommandDefinitionsChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    /// Parses `json` and loads it with
    /// [`add_command_definitions`](Self::add_command_definitions).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`add_command_definitions`](Self::add_command_definitions).
    pub fn add_command_definitions_from_json(&self, json: &str, category: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        self.add_command_definitions(&value, category)
    }

    /// Returns a copy of a loaded command definition.
    #[must_use]
    pub fn find_command(&self, name: &str) -> Option<CommandDefinition> {
        self.commands.read().find_command(name).cloned()
    }

    /// Serializes the commands visible on `channel`.
    #[must_use]
    pub fn commands_for(&self, channel: Channel, full_schema: bool) -> Value {
        self.commands
            .read()
            .get_commands_as_json(|def| channel.allows(def.visibility()), full_schema)
    }

    /// Checks that a caller may run a command and validates its parameters.
    ///
    /// Returns the typed parameters, with defaults filled in.
    ///
    /// # Errors
    ///
    /// - `invalid_command_name` if the command is not loaded
    /// - `access_denied` if the command is not visible on `channel` or
    ///   `role` is below its minimal role
    /// - the parameter validation error
    pub fn validate_command(
        &self,
        name: &str,
        parameters: &Value,
        role: UserRole,
        channel: Channel,
    ) -> Result<ValueMap> {
        let commands = self.commands.read();
        let definition = commands.find_command(name).ok_or_else(|| {
            Error::commands(ErrorCode::InvalidCommandName, format!("Unknown command '{name}'"))
        })?;

        if !channel.allows(definition.visibility()) {
            tracing::debug!(command = %name, channel = %channel, "Command not visible on channel");
            return Err(Error::commands(
                ErrorCode::AccessDenied,
                format!("Command '{name}' is not available through the {channel} channel"),
            ));
        }
        if role < definition.minimal_role() {
            tracing::debug!(command = %name, role = %role, "Role below command's minimal role");
            return Err(Error::commands(
                ErrorCode::AccessDenied,
                format!(
                    "User role '{role}' less than minimal: '{}'",
                    definition.minimal_role()
                ),
            ));
        }
        definition.validate_parameters(parameters)
    }

    // ========== State ==========

    /// Returns the state manager.
    #[must_use]
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Loads state definitions under `category`.
    ///
    /// # Errors
    ///
    /// See [`StateManager::load_state_definition`].
    pub fn add_state_definitions(&self, json: &Value, category: &str) -> Result<()> {
        self.state.load_state_definition(json, category)?;
        #[cfg(feature = "events")]
        self.events.publish(EngineEvent::StateDefinitionsChanged {
            category: category.to_string(),
        });
        Ok(())
    }

    /// Parses `json` and loads it with
    /// [`add_state_definitions`](Self::add_state_definitions).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`add_state_definitions`](Self::add_state_definitions).
    pub fn add_state_definitions_from_json(&self, json: &str, category: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        self.add_state_definitions(&value, category)
    }

    /// Sets several state properties `{package: {property: value}}` at once.
    ///
    /// # Errors
    ///
    /// See [`StateManager::set_properties`].
    pub fn set_state_properties(&self, properties: &Value) -> Result<UpdateId> {
        match self.state.apply_properties(properties)? {
            Some(id) => {
                self.state_changed(id);
                Ok(id)
            }
            None => Ok(self.state.state_change_queue().last_state_change_id()),
        }
    }

    /// Parses `json` and applies it with
    /// [`set_state_properties`](Self::set_state_properties).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`set_state_properties`](Self::set_state_properties).
    pub fn set_state_properties_from_json(&self, json: &str) -> Result<UpdateId> {
        let value: Value = serde_json::from_str(json)?;
        self.set_state_properties(&value)
    }

    /// Sets one state property (`"package.property"`) stamped with the
    /// current time.
    ///
    /// # Errors
    ///
    /// See [`StateManager::set_property_value`].
    pub fn set_state_property(&self, name: &str, value: &Value) -> Result<UpdateId> {
        let id = self.state.set_property_value(name, value, Utc::now())?;
        self.state_changed(id);
        Ok(id)
    }

    /// Registers a callback invoked after every state change, and once right
    /// away.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.state.add_changed_callback(callback)
    }

    /// Removes a callback registered with
    /// [`on_state_changed`](Self::on_state_changed).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.remove_changed_callback(id)
    }

    /// Drains the recorded state changes for synchronization.
    pub fn take_state_changes(&self) -> (UpdateId, Vec<StateChange>) {
        self.state.get_and_clear_recorded_state_changes()
    }

    /// Reports that the server has applied the state up to `id`.
    pub fn notify_state_updated_on_server(&self, id: UpdateId) {
        self.state.notify_state_updated_on_server(id);
        #[cfg(feature = "events")]
        self.events.publish(EngineEvent::StateUpdatedOnServer { update_id: id });
    }

    #[cfg_attr(not(feature = "events"), allow(clippy::unused_self))]
    fn state_changed(&self, id: UpdateId) {
        tracing::trace!(update_id = id, "State changed");
        #[cfg(feature = "events")]
        self.events.publish(EngineEvent::StateChanged { update_id: id });
    }

    // ========== Events ==========

    /// Subscribes to engine events.
    #[cfg(feature = "events")]
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Returns the event bus.
    #[cfg(feature = "events")]
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("base_commands", &self.base_commands.len())
            .field("commands", &self.commands.read().len())
            .field("state_categories", &self.state.categories())
            .finish_non_exhaustive()
    }
}
