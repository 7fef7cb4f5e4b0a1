// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the state manager and its change queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use chrono::{Duration, Utc};
use devcap_lib::state::{StateChangeQueue, StateManager};
use devcap_lib::{ErrorCode, ErrorDomain, PropValue};
use serde_json::json;

fn manager() -> StateManager {
    let manager = StateManager::new(100);
    manager
        .load_state_definition_from_json(
            r#"{
                "base": {"firmwareVersion": "string", "localAccessEnabled": "boolean"},
                "power": {"battery_level": {"minimum": 0, "maximum": 100}}
            }"#,
            "default",
        )
        .unwrap();
    manager
}

// ============================================================================
// Property Name Tests
// ============================================================================

mod property_names {
    use super::*;

    #[test]
    fn set_errors() {
        let manager = StateManager::new(10);
        manager
            .load_base_state_definition(&json!({"base": {"name": "string"}}))
            .unwrap();

        let err = manager.set_property_value("", &json!(1), Utc::now()).unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::State);
        assert_eq!(err.code(), ErrorCode::PropertyNameMissing);

        let err = manager.set_property_value("nopkg", &json!(1), Utc::now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PackageNameMissing);

        let err = manager
            .set_property_value("power.level", &json!(1), Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PropertyNotDefined);
    }

    #[test]
    fn get_property() {
        let manager = manager();
        assert_eq!(
            manager.get_property("power.battery_level").unwrap(),
            PropValue::Int(0)
        );
        assert_eq!(
            manager.get_property("power.voltage").unwrap_err().code(),
            ErrorCode::PropertyNotDefined
        );
        assert_eq!(
            manager.get_property("voltage").unwrap_err().code(),
            ErrorCode::PackageNameMissing
        );
    }
}

// ============================================================================
// Change Queue Tests
// ============================================================================

mod change_queue {
    use super::*;

    #[test]
    fn records_each_set_in_order() {
        let manager = manager();
        let start = Utc::now();
        for level in 1..=5 {
            manager
                .set_property_value(
                    "power.battery_level",
                    &json!(level),
                    start + Duration::seconds(level),
                )
                .unwrap();
        }

        let (last_id, changes) = manager.get_and_clear_recorded_state_changes();
        assert_eq!(last_id, 5);
        assert_eq!(changes.len(), 5);
        assert!(changes.windows(2).all(|w| w[0].id < w[1].id));
        assert!(changes.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(changes[4].changed_properties["power.battery_level"], json!(5));

        let (last_id, changes) = manager.get_and_clear_recorded_state_changes();
        assert_eq!(last_id, 5);
        assert!(changes.is_empty());
    }

    #[test]
    fn rejected_values_are_not_recorded() {
        let manager = manager();
        let err = manager
            .set_property_value("power.battery_level", &json!(101), Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfRange);
        assert!(manager.state_change_queue().is_empty());
        assert_eq!(manager.get_state()["power"]["battery_level"], json!(0));
    }

    #[test]
    fn small_queue_keeps_latest_values() {
        let queue = StateChangeQueue::shared(2);
        let manager = StateManager::with_queue(queue.clone());
        manager
            .load_base_state_definition(&json!({"a": {"x": "integer", "y": "integer"}}))
            .unwrap();

        manager.set_property_value("a.x", &json!(1), Utc::now()).unwrap();
        manager.set_property_value("a.y", &json!(2), Utc::now()).unwrap();
        manager.set_property_value("a.x", &json!(3), Utc::now()).unwrap();

        let (last_id, changes) = queue.drain();
        assert_eq!(last_id, 3);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].changed_properties["a.x"], json!(1));
        assert_eq!(changes[0].changed_properties["a.y"], json!(2));
        assert_eq!(changes[1].changed_properties["a.x"], json!(3));
    }

    #[test]
    fn server_acknowledgements() {
        let manager = manager();
        let acked = Arc::new(AtomicU64::new(0));
        let acked_clone = acked.clone();
        manager
            .state_change_queue()
            .add_on_state_updated_callback(move |id| acked_clone.store(id, Ordering::SeqCst));

        let id = manager
            .set_property_value("base.firmwareVersion", &json!("2.0"), Utc::now())
            .unwrap();
        manager.notify_state_updated_on_server(id);
        assert_eq!(acked.load(Ordering::SeqCst), id);
    }
}

// ============================================================================
// Bulk Update Tests
// ============================================================================

mod bulk_updates {
    use super::*;

    #[test]
    fn set_properties_records_one_change() {
        let manager = manager();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        manager.add_changed_callback(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let id = manager
            .set_properties_from_json(
                r#"{"base": {"firmwareVersion": "2.0", "localAccessEnabled": true},
                    "power": {"battery_level": 80}}"#,
            )
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(
            manager.get_state(),
            json!({
                "base": {"firmwareVersion": "2.0", "localAccessEnabled": true},
                "power": {"battery_level": 80}
            })
        );
        let (_, changes) = manager.get_and_clear_recorded_state_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].changed_properties.len(), 3);
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let manager = manager();
        assert_eq!(manager.set_properties(&json!({})).unwrap(), 0);
        assert!(manager.state_change_queue().is_empty());
    }

    #[test]
    fn one_bad_value_rejects_the_batch() {
        let manager = manager();
        let err = manager
            .set_properties(&json!({
                "base": {"firmwareVersion": "2.0"},
                "power": {"battery_level": "full"}
            }))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
        assert_eq!(manager.get_state()["base"]["firmwareVersion"], json!(""));
    }
}

// ============================================================================
// Definition Tests
// ============================================================================

mod definitions {
    use super::*;

    #[test]
    fn categories_and_defaults() {
        let manager = manager();
        manager
            .load_state_definition(
                &json!({"power": {"charging": {"type": "boolean", "default": true}}}),
                "powerd",
            )
            .unwrap();
        assert_eq!(
            manager.categories().into_iter().collect::<Vec<_>>(),
            vec!["default", "powerd"]
        );
        assert_eq!(manager.get_state()["power"]["charging"], json!(true));

        manager
            .load_state_defaults(&json!({"power": {"charging": false}}))
            .unwrap();
        assert_eq!(manager.get_state()["power"]["charging"], json!(false));
        assert!(manager.state_change_queue().is_empty());
    }

    #[test]
    fn full_definitions() {
        let manager = manager();
        let definitions = manager.get_state_definitions_as_json(true);
        assert_eq!(
            definitions["power"]["battery_level"],
            json!({"type": "integer", "minimum": 0, "maximum": 100})
        );
        assert_eq!(
            manager.get_state_definitions_as_json(false)["base"]["firmwareVersion"],
            json!("string")
        );
    }

    #[test]
    fn bad_definitions() {
        let manager = manager();
        let err = manager
            .load_state_definition_from_json(r#"{"base": {"firmwareVersion": "string"}}"#, "x")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PropertyRedefinition);

        let err = manager
            .load_state_definition_from_json(r#"{"base": "string"}"#, "x")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ObjectExpected);

        let err = manager.load_state_definition_from_json("[", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::JsonParse);
    }
}
