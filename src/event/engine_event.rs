// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine event types.

use crate::state::UpdateId;

/// Events emitted by the device facade.
///
/// # Examples
///
/// ```
/// use devcap_lib::event::EngineEvent;
///
/// let event = EngineEvent::CommandDefinitionsChanged { category: "robot".into() };
/// assert_eq!(event.category(), Some("robot"));
/// assert_eq!(event.update_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Command definitions of a category were loaded or replaced.
    CommandDefinitionsChanged {
        /// The category that was loaded.
        category: String,
    },

    /// State definitions of a category were loaded.
    StateDefinitionsChanged {
        /// The category that was loaded.
        category: String,
    },

    /// State properties changed and were recorded in the change queue.
    StateChanged {
        /// ID of the recorded state change.
        update_id: UpdateId,
    },

    /// The server acknowledged the state up to an update.
    StateUpdatedOnServer {
        /// The acknowledged update ID.
        update_id: UpdateId,
    },
}

impl EngineEvent {
    /// Returns the category of a definitions event.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::CommandDefinitionsChanged { category }
            | Self::StateDefinitionsChanged { category } => Some(category),
            Self::StateChanged { .. } | Self::StateUpdatedOnServer { .. } => None,
        }
    }

    /// Returns the update ID of a state event.
    #[must_use]
    pub fn update_id(&self) -> Option<UpdateId> {
        match self {
            Self::StateChanged { update_id } | Self::StateUpdatedOnServer { update_id } => {
                Some(*update_id)
            }
            Self::CommandDefinitionsChanged { .. } | Self::StateDefinitionsChanged { .. } => None,
        }
    }

    /// Returns true for events about the device state.
    #[must_use]
    pub fn is_state_event(&self) -> bool {
        !matches!(self, Self::CommandDefinitionsChanged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors() {
        let event = EngineEvent::StateUpdatedOnServer { update_id: 7 };
        assert_eq!(event.update_id(), Some(7));
        assert_eq!(event.category(), None);
        assert!(event.is_state_event());

        let event = EngineEvent::CommandDefinitionsChanged { category: "a".into() };
        assert!(!event.is_state_event());
    }

    #[test]
    fn serializes_with_tag() {
        let event = EngineEvent::StateDefinitionsChanged { category: "powerd".into() };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "state_definitions_changed", "category": "powerd"})
        );
    }
}
