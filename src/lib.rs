// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `devcap_lib` - a schema-driven command dictionary and state engine for
//! IoT devices.
//!
//! A device describes what it can do with JSON documents: a dictionary of
//! commands, each with typed parameters, progress and results, and a set of
//! state packages holding typed properties. This library parses those
//! documents, lets vendor definitions refine a standard base dictionary,
//! validates command parameters and state updates against them, and records
//! accepted state updates for synchronization with a cloud service.
//!
//! # Supported Features
//!
//! - **Property types**: integer, number, boolean, string, object and array
//!   with ranges, lengths, enums, defaults and required flags
//! - **Schema inheritance**: vendor definitions refine base definitions and
//!   serialize only what they override
//! - **Command dictionary**: categories, visibility, minimal user roles
//! - **State**: packages, atomic updates, a bounded change queue and change
//!   callbacks
//! - **Events**: a broadcast bus of engine events (feature `events`)
//!
//! # Quick Start
//!
//! ```
//! use devcap_lib::{Channel, Device, DeviceConfig};
//! use devcap_lib::command::UserRole;
//! use serde_json::json;
//!
//! fn main() -> devcap_lib::Result<()> {
//!     let device = Device::new(
//!         DeviceConfig::new()
//!             .with_base_commands(json!({
//!                 "base": {"reboot": {"parameters": {"delay": {"minimum": 0, "maximum": 100}}}}
//!             }))
//!             .with_base_state(json!({"base": {"firmwareVersion": "string"}})),
//!     )?;
//!
//!     // Vendor commands refine the base ones or use a `_` prefix.
//!     device.add_command_definitions(
//!         &json!({"robot": {"_jump": {"parameters": {"height": "number"}}}}),
//!         "robotd",
//!     )?;
//!     let params = device.validate_command(
//!         "robot._jump",
//!         &json!({"height": 1.5}),
//!         UserRole::User,
//!         Channel::Local,
//!     )?;
//!     assert_eq!(params["height"].as_double(), Some(1.5));
//!
//!     // State updates are validated and recorded.
//!     device.set_state_property("base.firmwareVersion", &json!("2.0"))?;
//!     let (last_id, changes) = device.take_state_changes();
//!     assert_eq!((last_id, changes.len()), (1, 1));
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The library logs through [`tracing`]. It never installs a subscriber;
//! that is left to the application.

pub mod command;
mod device;
pub mod error;
#[cfg(feature = "events")]
pub mod event;
pub mod schema;
pub mod state;
pub mod subscription;

pub use command::{CommandDefinition, CommandDictionary, CommandVisibility, UserRole};
pub use device::{Channel, Device, DeviceConfig};
pub use error::{Error, ErrorCode, ErrorDomain, Result};
#[cfg(feature = "events")]
pub use event::{EngineEvent, EventBus};
pub use schema::{ObjectSchema, PropType, PropValue, TypeName, ValueMap, ValueType};
pub use state::{StateChange, StateChangeQueue, StateManager, UpdateId};
pub use subscription::{CallbackRegistry, SubscriptionId};
