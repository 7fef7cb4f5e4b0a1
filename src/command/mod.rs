// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command definitions and the command dictionary.
//!
//! A device advertises the commands it accepts as a JSON tree:
//!
//! ```json
//! {
//!   "base": {
//!     "reboot": {
//!       "parameters": {"delay": {"minimum": 10}},
//!       "visibility": "local,cloud",
//!       "minimalRole": "user"
//!     }
//!   }
//! }
//! ```
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`CommandDictionary`] | All definitions, keyed by `package.command` |
//! | [`CommandDefinition`] | Parameters, progress and results schemas of one command |
//! | [`CommandVisibility`] | Channels the command is visible on |
//! | [`UserRole`] | Lowest caller role allowed to invoke the command |
//!
//! # Examples
//!
//! ```
//! use devcap_lib::command::{CommandDictionary, UserRole};
//! use serde_json::json;
//!
//! let mut dict = CommandDictionary::new();
//! dict.load_commands(
//!     &json!({"robot": {"jump": {"parameters": {"height": "integer"}, "minimalRole": "manager"}}}),
//!     "robot",
//!     None,
//! ).unwrap();
//!
//! let jump = dict.find_command("robot.jump").unwrap();
//! assert_eq!(jump.minimal_role(), UserRole::Manager);
//! assert!(jump.validate_parameters(&json!({"height": 3})).is_ok());
//! ```

mod definition;
mod dictionary;
mod role;
mod visibility;

pub use definition::CommandDefinition;
pub use dictionary::CommandDictionary;
pub use role::UserRole;
pub use visibility::CommandVisibility;
