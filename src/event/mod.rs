// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for engine changes.
//!
//! The [`Device`](crate::Device) facade publishes an [`EngineEvent`] on its
//! [`EventBus`] whenever definitions are loaded or the state changes. The
//! bus uses tokio's broadcast channel, so any number of async tasks can
//! follow the engine without the engine itself running async code.
//!
//! # Examples
//!
//! ```
//! use devcap_lib::event::{EngineEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(EngineEvent::StateChanged { update_id: 1 });
//! assert_eq!(rx.try_recv().unwrap(), EngineEvent::StateChanged { update_id: 1 });
//! ```

mod engine_event;
mod event_bus;

pub use engine_event::EngineEvent;
pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
