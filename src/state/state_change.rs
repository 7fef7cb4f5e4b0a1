// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recorded state changes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Identifier of a recorded state change. IDs start at 1 and increase by one
/// per record; 0 means "nothing recorded yet".
pub type UpdateId = u64;

/// A timestamped batch of property updates.
///
/// `changed_properties` is keyed by the qualified `package.property` name.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use chrono::Utc;
/// use devcap_lib::state::StateChange;
/// use serde_json::json;
///
/// let mut props = BTreeMap::new();
/// props.insert("power.level".to_string(), json!(42));
/// let change = StateChange::new(1, Utc::now(), props);
///
/// let json = serde_json::to_value(&change).unwrap();
/// assert_eq!(json["changed_properties"]["power.level"], 42);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateChange {
    /// Record ID.
    pub id: UpdateId,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
    /// New values, keyed by qualified property name.
    pub changed_properties: BTreeMap<String, Value>,
}

impl StateChange {
    /// Creates a state change record.
    #[must_use]
    pub fn new(id: UpdateId, timestamp: DateTime<Utc>, changed_properties: BTreeMap<String, Value>) -> Self {
        Self {
            id,
            timestamp,
            changed_properties,
        }
    }

    /// Folds an older record into this one. Values already present here are
    /// newer and win; ID and timestamp stay those of this record.
    pub(crate) fn absorb_older(&mut self, older: StateChange) {
        for (name, value) in older.changed_properties {
            self.changed_properties.entry(name).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absorb_older_keeps_newer_values() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(1);

        let mut older_props = BTreeMap::new();
        older_props.insert("a.x".to_string(), json!(1));
        older_props.insert("a.y".to_string(), json!(1));
        let older = StateChange::new(1, t0, older_props);

        let mut newer_props = BTreeMap::new();
        newer_props.insert("a.x".to_string(), json!(2));
        let mut newer = StateChange::new(2, t1, newer_props);

        newer.absorb_older(older);
        assert_eq!(newer.id, 2);
        assert_eq!(newer.timestamp, t1);
        assert_eq!(newer.changed_properties["a.x"], json!(2));
        assert_eq!(newer.changed_properties["a.y"], json!(1));
    }

    #[test]
    fn serde_round_trip() {
        let mut props = BTreeMap::new();
        props.insert("base.name".to_string(), json!("lamp"));
        let change = StateChange::new(7, Utc::now(), props);

        let text = serde_json::to_string(&change).unwrap();
        let parsed: StateChange = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, change);
    }
}
