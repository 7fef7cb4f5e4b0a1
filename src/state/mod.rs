// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management.
//!
//! The device state is a set of named [`StatePackage`]s, each holding typed
//! properties declared with the same definition language as command
//! parameters. The [`StateManager`] owns the packages, validates updates and
//! records every accepted update as a [`StateChange`] in a bounded
//! [`StateChangeQueue`] that a synchronization layer drains.
//!
//! # Examples
//!
//! ```
//! use devcap_lib::state::StateManager;
//! use serde_json::json;
//!
//! let manager = StateManager::default();
//! manager
//!     .load_state_definition(&json!({"power": {"battery_level": {"minimum": 0, "maximum": 100}}}), "powerd")
//!     .unwrap();
//!
//! let id = manager.set_properties(&json!({"power": {"battery_level": 44}})).unwrap();
//! assert_eq!(id, 1);
//! assert!(manager.set_properties(&json!({"power": {"battery_level": 101}})).is_err());
//! assert_eq!(manager.get_state(), json!({"power": {"battery_level": 44}}));
//! ```

mod change_queue;
mod manager;
mod package;
mod state_change;

pub use change_queue::{DEFAULT_QUEUE_CAPACITY, StateChangeQueue};
pub use manager::{DEFAULT_CATEGORY, StateManager};
pub use package::StatePackage;
pub use state_change::{StateChange, UpdateId};
