// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for state change notifications.
//!
//! Every registration returns a [`SubscriptionId`] that the subscriber can
//! later hand back to revoke it. Callbacks are owned by the
//! [`CallbackRegistry`] of the object that fires them and are invoked
//! synchronously from the operation that produced the change.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use devcap_lib::state::StateManager;
//! use serde_json::json;
//!
//! let manager = StateManager::new(16);
//! let calls = Arc::new(AtomicU32::new(0));
//!
//! let calls_clone = calls.clone();
//! let sub_id = manager.add_changed_callback(move || {
//!     calls_clone.fetch_add(1, Ordering::SeqCst);
//! });
//! // Invoked once on registration so the subscriber can read the state.
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//!
//! manager.remove_changed_callback(sub_id);
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
