// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::state::DEFAULT_QUEUE_CAPACITY;

#[cfg(feature = "events")]
use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// Configuration of a [`Device`](super::Device).
///
/// Every field has a default, so a configuration document only lists what it
/// changes. Reading the document from disk is up to the host.
///
/// # Examples
///
/// ```
/// use devcap_lib::DeviceConfig;
/// use serde_json::json;
///
/// let config = DeviceConfig::new()
///     .with_state_queue_capacity(10)
///     .with_base_commands(json!({"base": {"reboot": {}}}));
/// assert_eq!(config.state_queue_capacity, 10);
///
/// let parsed = DeviceConfig::from_json(r#"{"state_queue_capacity": 10}"#).unwrap();
/// assert_eq!(parsed.state_queue_capacity, 10);
/// assert!(parsed.base_commands.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Maximum number of pending state change records.
    pub state_queue_capacity: usize,
    /// Number of buffered engine events per subscriber.
    #[cfg(feature = "events")]
    pub event_capacity: usize,
    /// Base (standard) command definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_commands: Option<Value>,
    /// Base state definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_state: Option<Value>,
    /// Initial values of the base state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_state_defaults: Option<Value>,
}

impl DeviceConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` if the document is malformed or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the state change queue capacity.
    #[must_use]
    pub fn with_state_queue_capacity(mut self, capacity: usize) -> Self {
        self.state_queue_capacity = capacity;
        self
    }

    /// Sets the event channel capacity.
    #[cfg(feature = "events")]
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the base command definitions.
    #[must_use]
    pub fn with_base_commands(mut self, commands: Value) -> Self {
        self.base_commands = Some(commands);
        self
    }

    /// Sets the base state definitions.
    #[must_use]
    pub fn with_base_state(mut self, definitions: Value) -> Self {
        self.base_state = Some(definitions);
        self
    }

    /// Sets the initial values of the base state.
    #[must_use]
    pub fn with_base_state_defaults(mut self, defaults: Value) -> Self {
        self.base_state_defaults = Some(defaults);
        self
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            state_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            #[cfg(feature = "events")]
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            base_commands: None,
            base_state: None,
            base_state_defaults: None,
        }
    }
}
