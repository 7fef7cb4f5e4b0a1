// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The state manager.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorCode, Result};
use crate::schema::PropValue;
use crate::subscription::{CallbackRegistry, SubscriptionId};

use super::{DEFAULT_QUEUE_CAPACITY, StateChange, StateChangeQueue, StatePackage, UpdateId};

/// Category of the base (standard) state definition.
pub const DEFAULT_CATEGORY: &str = "default";

type ChangedCallback = dyn Fn() + Send + Sync;

#[derive(Debug, Clone, Default)]
struct StateStore {
    packages: BTreeMap<String, StatePackage>,
    categories: BTreeSet<String>,
}

/// Live device state, grouped in packages.
///
/// State properties are addressed by qualified names (`"package.property"`).
/// Every successful set records a [`StateChange`] in the shared
/// [`StateChangeQueue`] and then notifies the changed callbacks.
///
/// The manager is internally locked. Callbacks run after the lock is
/// released, so they may read the state; they must not set it.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use devcap_lib::state::StateManager;
/// use serde_json::json;
///
/// let manager = StateManager::new(100);
/// manager
///     .load_base_state_definition(&json!({"base": {"firmwareVersion": "string"}}))
///     .unwrap();
///
/// manager
///     .set_property_value("base.firmwareVersion", &json!("1.0.2"), Utc::now())
///     .unwrap();
/// assert_eq!(manager.get_state(), json!({"base": {"firmwareVersion": "1.0.2"}}));
///
/// let (last_id, changes) = manager.get_and_clear_recorded_state_changes();
/// assert_eq!(last_id, 1);
/// assert_eq!(changes.len(), 1);
/// ```
#[derive(Debug)]
pub struct StateManager {
    store: RwLock<StateStore>,
    queue: Arc<StateChangeQueue>,
    on_changed: CallbackRegistry<ChangedCallback>,
}

impl StateManager {
    /// Creates a manager with its own change queue of the given capacity.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        Self::with_queue(StateChangeQueue::shared(queue_capacity))
    }

    /// Creates a manager recording into an existing change queue.
    #[must_use]
    pub fn with_queue(queue: Arc<StateChangeQueue>) -> Self {
        Self {
            store: RwLock::new(StateStore::default()),
            queue,
            on_changed: CallbackRegistry::new(),
        }
    }

    // ========== Definitions ==========

    /// Loads state definitions `{package: {property: definition}}` under a
    /// category.
    ///
    /// # Errors
    ///
    /// - `invalid_category` for an empty category
    /// - `object_expected` if `json` or a package is not an object
    /// - `invalid_package` for an empty package name
    /// - `property_redefinition` or a schema error from the package
    ///
    /// Nothing is loaded on error.
    pub fn load_state_definition(&self, json: &Value, category: &str) -> Result<()> {
        tracing::debug!(category = %category, "Loading state definitions");
        let result = self.try_load_state_definition(json, category);
        match &result {
            Ok(count) => tracing::info!(category = %category, count, "Loaded state definitions"),
            Err(e) => tracing::warn!(category = %category, error = %e, "Rejected state definitions"),
        }
        result.map(|_| ())
    }

    fn try_load_state_definition(&self, json: &Value, category: &str) -> Result<usize> {
        if category.is_empty() {
            return Err(Error::state(ErrorCode::InvalidCategory, "State category name is empty"));
        }
        let packages = packages_of(json)?;

        let mut store = self.store.write();
        let mut updated = store.clone();
        for (name, definitions) in packages {
            let definitions = package_object(name, definitions)?;
            updated
                .packages
                .entry(name.clone())
                .or_insert_with(|| StatePackage::new(name.clone()))
                .add_schema_from_json(definitions)?;
        }
        updated.categories.insert(category.to_string());
        *store = updated;
        Ok(packages.len())
    }

    /// Loads the base (standard) state definitions under
    /// [`DEFAULT_CATEGORY`].
    ///
    /// # Errors
    ///
    /// See [`load_state_definition`](Self::load_state_definition).
    pub fn load_base_state_definition(&self, json: &Value) -> Result<()> {
        self.load_state_definition(json, DEFAULT_CATEGORY)
    }

    /// Parses `json` and loads it with
    /// [`load_state_definition`](Self::load_state_definition).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`load_state_definition`](Self::load_state_definition).
    pub fn load_state_definition_from_json(&self, json: &str, category: &str) -> Result<()> {
        let value: Value = serde_json::from_str(json)?;
        self.load_state_definition(&value, category)
    }

    /// Sets initial values `{package: {property: value}}` without recording
    /// state changes.
    ///
    /// # Errors
    ///
    /// - `object_expected` if `json` or a package is not an object
    /// - `invalid_package` for an empty package name
    /// - `property_not_defined` for an undefined package or property
    /// - the validation error of a value
    ///
    /// Nothing is changed on error.
    pub fn load_state_defaults(&self, json: &Value) -> Result<()> {
        let packages = packages_of(json)?;

        let mut store = self.store.write();
        let mut updated = store.packages.clone();
        for (name, values) in packages {
            let values = package_object(name, values)?;
            let package = updated.get_mut(name).ok_or_else(|| {
                Error::state(
                    ErrorCode::PropertyNotDefined,
                    format!("Providing values for undefined state package '{name}'"),
                )
            })?;
            package.add_values_from_json(values)?;
        }
        store.packages = updated;
        tracing::debug!(packages = packages.len(), "Loaded state defaults");
        Ok(())
    }

    /// Returns the loaded categories.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<String> {
        self.store.read().categories.clone()
    }

    /// Returns the state definitions as `{package: {property: definition}}`.
    #[must_use]
    pub fn get_state_definitions_as_json(&self, full_schema: bool) -> Value {
        let store = self.store.read();
        Value::Object(
            store
                .packages
                .iter()
                .map(|(name, package)| (name.clone(), package.get_definitions_as_json(full_schema)))
                .collect(),
        )
    }

    // ========== Values ==========

    /// Returns a snapshot of all values as `{package: {property: value}}`.
    #[must_use]
    pub fn get_state(&self) -> Value {
        let store = self.store.read();
        Value::Object(
            store
                .packages
                .iter()
                .map(|(name, package)| (name.clone(), package.get_values_as_json()))
                .collect(),
        )
    }

    /// Same as [`get_state`](Self::get_state).
    #[must_use]
    pub fn get_state_values_as_json(&self) -> Value {
        self.get_state()
    }

    /// Returns the current value of a qualified property.
    ///
    /// # Errors
    ///
    /// Returns the name errors of
    /// [`set_property_value`](Self::set_property_value), or
    /// `property_not_defined`.
    pub fn get_property(&self, name: &str) -> Result<PropValue> {
        let (package_name, property) = split_property_name(name)?;
        let store = self.store.read();
        let package = find_package(&store, package_name)?;
        package.get_property_value(property).cloned().ok_or_else(|| {
            Error::state(
                ErrorCode::PropertyNotDefined,
                format!("State property '{name}' is not defined"),
            )
        })
    }

    /// Sets one property and records the change with `timestamp`.
    ///
    /// Returns the ID of the recorded change. Changed callbacks are invoked
    /// before returning.
    ///
    /// # Errors
    ///
    /// - `property_name_missing` for an empty name or an empty property part
    /// - `package_name_missing` if the name has no package part
    /// - `property_not_defined` for an unknown package or property
    /// - the validation error of the value
    pub fn set_property_value(&self, name: &str, value: &Value, timestamp: DateTime<Utc>) -> Result<UpdateId> {
        let result = self.try_set_property_value(name, value, timestamp);
        match result {
            Ok(id) => {
                self.notify_changed();
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(property = %name, error = %e, "Rejected state property update");
                Err(e)
            }
        }
    }

    fn try_set_property_value(&self, name: &str, value: &Value, timestamp: DateTime<Utc>) -> Result<UpdateId> {
        let (package_name, property) = split_property_name(name)?;
        let mut store = self.store.write();
        let package = find_package_mut(&mut store, package_name)?;
        let stored = package.set_property_value(property, value)?;

        let mut changed = BTreeMap::new();
        changed.insert(name.to_string(), stored.to_json());
        Ok(self.queue.notify_properties_updated(timestamp, changed))
    }

    /// Sets several properties `{package: {property: value}}` at once.
    ///
    /// All values are validated before any is stored. The update is recorded
    /// as one state change stamped with the current time and the changed
    /// callbacks are invoked once. Returns the ID of the recorded change, or
    /// the last ID if `properties` is empty.
    ///
    /// # Errors
    ///
    /// - `object_expected` if `properties` or a package is not an object
    /// - `property_not_defined` for an unknown package or property
    /// - the validation error of a value
    ///
    /// Nothing is changed on error.
    pub fn set_properties(&self, properties: &Value) -> Result<UpdateId> {
        match self.apply_properties(properties)? {
            Some(id) => Ok(id),
            None => Ok(self.queue.last_state_change_id()),
        }
    }

    /// Like [`set_properties`](Self::set_properties), but returns `None`
    /// when nothing was recorded.
    pub(crate) fn apply_properties(&self, properties: &Value) -> Result<Option<UpdateId>> {
        match self.try_set_properties(properties) {
            Ok(recorded) => {
                if recorded.is_some() {
                    self.notify_changed();
                }
                Ok(recorded)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected state update");
                Err(e)
            }
        }
    }

    fn try_set_properties(&self, properties: &Value) -> Result<Option<UpdateId>> {
        let packages = packages_of(properties)?;

        let mut store = self.store.write();
        let mut validated = Vec::new();
        for (package_name, values) in packages {
            let values = package_object(package_name, values)?;
            let package = find_package(&store, package_name)?;
            for (property, value) in values {
                let value = package.validate_property_value(property, value)?;
                validated.push((package_name.as_str(), property.as_str(), value));
            }
        }
        if validated.is_empty() {
            return Ok(None);
        }

        let mut changed = BTreeMap::new();
        for (package_name, property, value) in validated {
            changed.insert(format!("{package_name}.{property}"), value.to_json());
            if let Some(package) = store.packages.get_mut(package_name) {
                package.store(property, value);
            }
        }
        Ok(Some(self.queue.notify_properties_updated(Utc::now(), changed)))
    }

    /// Parses `json` and applies it with
    /// [`set_properties`](Self::set_properties).
    ///
    /// # Errors
    ///
    /// Returns `json_parse_error` for malformed JSON, otherwise the errors of
    /// [`set_properties`](Self::set_properties).
    pub fn set_properties_from_json(&self, json: &str) -> Result<UpdateId> {
        let value: Value = serde_json::from_str(json)?;
        self.set_properties(&value)
    }

    // ========== Notifications ==========

    /// Registers a callback invoked after every state change.
    ///
    /// The callback is also invoked once right away so the subscriber can
    /// read the current state.
    pub fn add_changed_callback<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: Arc<ChangedCallback> = Arc::new(callback);
        let id = self.on_changed.register(callback.clone());
        callback();
        id
    }

    /// Removes a changed callback. Returns `true` if it was registered.
    pub fn remove_changed_callback(&self, id: SubscriptionId) -> bool {
        self.on_changed.unsubscribe(id)
    }

    fn notify_changed(&self) {
        self.on_changed.dispatch(|callback| callback());
    }

    // ========== Change queue ==========

    /// Drains the change queue, returning the last recorded ID and the
    /// pending changes.
    pub fn get_and_clear_recorded_state_changes(&self) -> (UpdateId, Vec<StateChange>) {
        self.queue.drain()
    }

    /// Reports that the server has applied the state up to `id`.
    pub fn notify_state_updated_on_server(&self, id: UpdateId) {
        self.queue.notify_state_updated_on_server(id);
    }

    /// Returns the change queue.
    #[must_use]
    pub fn state_change_queue(&self) -> &Arc<StateChangeQueue> {
        &self.queue
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Splits `package.property` at the first dot.
fn split_property_name(name: &str) -> Result<(&str, &str)> {
    let split = name.split_once('.');
    if name.is_empty() || split.is_some_and(|(_, property)| property.is_empty()) {
        return Err(Error::state(ErrorCode::PropertyNameMissing, "Property name is missing"));
    }
    match split {
        Some((package, property)) if !package.is_empty() => Ok((package, property)),
        _ => Err(Error::state(
            ErrorCode::PackageNameMissing,
            "Package name is missing in the property name",
        )),
    }
}

fn find_package<'a>(store: &'a StateStore, name: &str) -> Result<&'a StatePackage> {
    store.packages.get(name).ok_or_else(|| unknown_package(name))
}

fn find_package_mut<'a>(store: &'a mut StateStore, name: &str) -> Result<&'a mut StatePackage> {
    store.packages.get_mut(name).ok_or_else(|| unknown_package(name))
}

fn unknown_package(name: &str) -> Error {
    Error::state(
        ErrorCode::PropertyNotDefined,
        format!("Unknown state property package '{name}'"),
    )
}

fn packages_of(json: &Value) -> Result<&Map<String, Value>> {
    match json {
        Value::Object(packages) => Ok(packages),
        other => Err(Error::state(
            ErrorCode::ObjectExpected,
            format!("Expecting an object of state packages, got {other}"),
        )),
    }
}

fn package_object<'a>(name: &str, value: &'a Value) -> Result<&'a Map<String, Value>> {
    if name.is_empty() {
        return Err(Error::state(ErrorCode::InvalidPackage, "State package name is empty"));
    }
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::state(
            ErrorCode::ObjectExpected,
            format!("State package '{name}' must be an object"),
        )),
    }
}
