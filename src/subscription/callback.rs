// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for change notifications.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing callbacks of one signature and
//!   dispatching to them

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Unique identifier for a subscription.
///
/// This ID is returned when registering a callback and is used to
/// unsubscribe later. IDs are unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Registry of callbacks sharing one signature `F`, usually a
/// `dyn Fn(..) + Send + Sync`.
///
/// Dispatch takes a snapshot of the registered callbacks and invokes them
/// after the lock is released, so a callback may unsubscribe itself or
/// others without deadlocking. Callbacks run in registration order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use devcap_lib::subscription::CallbackRegistry;
///
/// let registry: CallbackRegistry<dyn Fn(u64) + Send + Sync> = CallbackRegistry::new();
/// let last = Arc::new(AtomicU64::new(0));
///
/// let last_clone = last.clone();
/// let id = registry.register(Arc::new(move |v| last_clone.store(v, Ordering::SeqCst)));
///
/// registry.dispatch(|callback| callback(7));
/// assert_eq!(last.load(Ordering::SeqCst), 7);
///
/// assert!(registry.unsubscribe(id));
/// assert!(registry.is_empty());
/// ```
pub struct CallbackRegistry<F: ?Sized> {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    callbacks: RwLock<BTreeMap<SubscriptionId, Arc<F>>>,
}

impl<F: ?Sized> CallbackRegistry<F> {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback.
    pub fn register(&self, callback: Arc<F>) -> SubscriptionId {
        let id = self.next_id();
        self.callbacks.write().insert(id, callback);
        id
    }

    /// Removes a callback. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    /// Returns the registered callbacks, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.callbacks.read().values().cloned().collect()
    }

    /// Invokes `call` once for every registered callback.
    pub fn dispatch(&self, mut call: impl FnMut(&F)) {
        for callback in self.snapshot() {
            call(&callback);
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl<F: ?Sized> Default for CallbackRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> std::fmt::Debug for CallbackRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.len())
            .finish()
    }
}
