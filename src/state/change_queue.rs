// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded log of state changes awaiting synchronization.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use crate::subscription::{CallbackRegistry, SubscriptionId};

use super::{StateChange, UpdateId};

/// Default number of records kept before old records are merged.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

type StateUpdatedCallback = dyn Fn(UpdateId) + Send + Sync;

#[derive(Debug, Default)]
struct QueueInner {
    changes: VecDeque<StateChange>,
    last_id: UpdateId,
}

/// A bounded queue of [`StateChange`] records.
///
/// The state manager writes to the queue and a sync layer drains it. The
/// queue is internally locked so both sides can share it through an `Arc`.
///
/// When the queue grows past its capacity the two oldest records are merged
/// into one, so the latest value of every property is kept.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use chrono::Utc;
/// use devcap_lib::state::StateChangeQueue;
/// use serde_json::json;
///
/// let queue = StateChangeQueue::new(10);
/// let mut props = BTreeMap::new();
/// props.insert("power.level".to_string(), json!(1));
///
/// assert_eq!(queue.notify_properties_updated(Utc::now(), props.clone()), 1);
/// assert_eq!(queue.notify_properties_updated(Utc::now(), props), 2);
///
/// let (last_id, changes) = queue.drain();
/// assert_eq!(last_id, 2);
/// assert_eq!(changes.len(), 2);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug)]
pub struct StateChangeQueue {
    capacity: usize,
    inner: Mutex<QueueInner>,
    on_state_updated: CallbackRegistry<StateUpdatedCallback>,
}

impl StateChangeQueue {
    /// Creates a queue holding at most `capacity` records (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(QueueInner::default()),
            on_state_updated: CallbackRegistry::new(),
        }
    }

    /// Creates a queue already wrapped in an `Arc`.
    #[must_use]
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    /// Records a batch of updated properties and returns its ID.
    pub fn notify_properties_updated(
        &self,
        timestamp: DateTime<Utc>,
        changed_properties: BTreeMap<String, Value>,
    ) -> UpdateId {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        let id = inner.last_id;
        inner
            .changes
            .push_back(StateChange::new(id, timestamp, changed_properties));

        while inner.changes.len() > self.capacity {
            let Some(oldest) = inner.changes.pop_front() else {
                break;
            };
            match inner.changes.front_mut() {
                Some(next) => next.absorb_older(oldest),
                None => inner.changes.push_front(oldest),
            }
        }
        tracing::trace!(id, pending = inner.changes.len(), "Recorded state change");
        id
    }

    /// Removes and returns every recorded change, oldest first.
    pub fn get_and_clear_recorded_state_changes(&self) -> Vec<StateChange> {
        self.drain().1
    }

    /// Removes every recorded change and returns it together with the ID
    /// of the last record ever made, in one step.
    pub fn drain(&self) -> (UpdateId, Vec<StateChange>) {
        let mut inner = self.inner.lock();
        let changes: Vec<StateChange> = inner.changes.drain(..).collect();
        (inner.last_id, changes)
    }

    /// Returns the ID of the last record made, or 0.
    #[must_use]
    pub fn last_state_change_id(&self) -> UpdateId {
        self.inner.lock().last_id
    }

    /// Returns the number of pending records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().changes.len()
    }

    /// Returns `true` if no record is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().changes.is_empty()
    }

    /// Returns the maximum number of pending records.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers a callback invoked when the server acknowledges the state up
    /// to an update ID.
    pub fn add_on_state_updated_callback<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(UpdateId) + Send + Sync + 'static,
    {
        self.on_state_updated.register(Arc::new(callback))
    }

    /// Removes a callback registered with
    /// [`add_on_state_updated_callback`](Self::add_on_state_updated_callback).
    pub fn remove_on_state_updated_callback(&self, id: SubscriptionId) -> bool {
        self.on_state_updated.unsubscribe(id)
    }

    /// Reports that the server has applied the state up to `id`.
    pub fn notify_state_updated_on_server(&self, id: UpdateId) {
        tracing::debug!(id, "State acknowledged by server");
        self.on_state_updated.dispatch(|callback| callback(id));
    }
}

impl Default for StateChangeQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
