// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for property types and the command dictionary.

use devcap_lib::command::{CommandDictionary, CommandVisibility, UserRole};
use devcap_lib::schema::{ObjectSchema, PropType, ValueType};
use devcap_lib::{ErrorCode, ErrorDomain};
use serde_json::{Value, json};

fn base_dictionary() -> CommandDictionary {
    let mut base = CommandDictionary::new();
    base.load_commands(
        &json!({
            "base": {
                "reboot": {
                    "parameters": {"delay": {"maximum": 100}},
                    "results": {}
                },
                "shutdown": {"parameters": {}, "minimalRole": "owner"}
            }
        }),
        "base",
        None,
    )
    .unwrap();
    base
}

// ============================================================================
// Type Detection Tests
// ============================================================================

mod detection {
    use super::*;

    fn kind(definition: Value, base: Option<&PropType>) -> ValueType {
        PropType::from_json(&definition, base).unwrap().value_type()
    }

    #[test]
    fn integral_range_is_integer() {
        assert_eq!(kind(json!({"minimum": 0, "maximum": 100}), None), ValueType::Int);
    }

    #[test]
    fn fractional_range_is_double() {
        assert_eq!(kind(json!({"minimum": 0.0, "maximum": 1.0}), None), ValueType::Double);
    }

    #[test]
    fn double_base_wins_over_integral_range() {
        let base = PropType::from_json(&json!("number"), None).unwrap();
        assert_eq!(
            kind(json!({"minimum": 0, "maximum": 0}), Some(&base)),
            ValueType::Double
        );
    }

    #[test]
    fn other_keys() {
        assert_eq!(kind(json!({"maxLength": 4}), None), ValueType::String);
        assert_eq!(kind(json!({"properties": {}}), None), ValueType::Object);
        assert_eq!(kind(json!({"items": "integer"}), None), ValueType::Array);
        assert_eq!(kind(json!({"enum": [true, false]}), None), ValueType::Boolean);
        assert_eq!(kind(json!({"default": "x"}), None), ValueType::String);
        assert_eq!(kind(json!(["a", "b"]), None), ValueType::String);
        assert_eq!(kind(json!([[1, 2], [3]]), None), ValueType::Array);
    }

    #[test]
    fn nothing_to_detect() {
        let err = PropType::from_json(&json!({}), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoTypeInfo);
        let err = PropType::from_json(&json!([]), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoTypeInfo);
    }
}

// ============================================================================
// Schema Inheritance Tests
// ============================================================================

mod inheritance {
    use super::*;

    #[test]
    fn narrowing_keeps_kind_and_merges_constraints() {
        let base = PropType::from_json(&json!({"minimum": 0, "maximum": 100}), None).unwrap();
        let derived = PropType::from_json(&json!({"maximum": 50}), Some(&base)).unwrap();

        assert_eq!(derived.value_type(), ValueType::Int);
        assert!(derived.is_based_on_schema());
        assert_eq!(derived.to_json(false), json!({"maximum": 50}));
        assert_eq!(
            derived.to_json(true),
            json!({"type": "integer", "minimum": 0, "maximum": 50})
        );
        assert!(derived.create_value(&json!(70)).is_err());
    }

    #[test]
    fn changing_kind_fails() {
        let base = PropType::from_json(&json!("integer"), None).unwrap();
        let err = PropType::from_json(&json!({"type": "string"}), Some(&base)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PropTypeChanged);
    }

    #[test]
    fn full_round_trip() {
        for definition in [
            json!({"minimum": 1, "maximum": 5, "default": 2}),
            json!({"type": "number", "enum": [0.5, 1.5]}),
            json!({"minLength": 1, "maxLength": 8, "required": true}),
            json!({"properties": {"x": "integer", "y": {"default": 0.5}}}),
            json!({"items": {"enum": ["a", "b"]}}),
            json!("array.array.boolean"),
        ] {
            let parsed = PropType::from_json(&definition, None).unwrap();
            let reparsed = PropType::from_json(&parsed.to_json(true), None).unwrap();
            assert_eq!(reparsed, parsed, "round trip of {definition}");
        }
    }

    #[test]
    fn clone_is_independent() {
        let mut schema = ObjectSchema::from_json(
            json!({"a": "integer", "b": "string"}).as_object().unwrap(),
            None,
        )
        .unwrap();
        let original = schema.to_json(true);
        let copy = schema.clone();

        schema.mark_prop_required("a").unwrap();
        assert_eq!(copy.to_json(true), original);
        assert_ne!(schema.to_json(true), original);
    }
}

// ============================================================================
// CommandDictionary Tests
// ============================================================================

mod dictionary {
    use super::*;

    #[test]
    fn overlay_refines_base_definition() {
        let base = base_dictionary();
        let mut dict = CommandDictionary::new();
        dict.load_commands(
            &json!({"base": {"reboot": {"parameters": {"delay": {"minimum": 10}}}}}),
            "vendor",
            Some(&base),
        )
        .unwrap();

        let json = dict.get_commands_as_json(|_| true, true);
        assert_eq!(
            json["base"]["reboot"]["parameters"]["delay"],
            json!({"type": "integer", "minimum": 10, "maximum": 100})
        );

        let minimal = dict.get_commands_as_json(|_| true, false);
        assert_eq!(
            minimal["base"]["reboot"]["parameters"]["delay"],
            json!({"minimum": 10})
        );
    }

    #[test]
    fn custom_commands_need_underscore() {
        let base = base_dictionary();
        let mut dict = CommandDictionary::new();

        let err = dict
            .load_commands(&json!({"base": {"jump": {"parameters": {}}}}), "vendor", Some(&base))
            .unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Commands);
        assert_eq!(err.code(), ErrorCode::InvalidCommandName);
        assert!(dict.is_empty());

        dict.load_commands(&json!({"base": {"_jump": {"parameters": {}}}}), "vendor", Some(&base))
            .unwrap();
        assert!(dict.find_command("base._jump").is_some());
    }

    #[test]
    fn parameter_kind_change_is_wrapped() {
        let base = base_dictionary();
        let mut dict = CommandDictionary::new();
        let err = dict
            .load_commands(
                &json!({"base": {"reboot": {"parameters": {"delay": {"type": "string"}}}}}),
                "vendor",
                Some(&base),
            )
            .unwrap_err();

        let codes: Vec<ErrorCode> = err.chain().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::InvalidObjectSchema,
                ErrorCode::InvalidPropDef,
                ErrorCode::PropTypeChanged
            ]
        );
    }

    #[test]
    fn visibility_and_role() {
        let base = base_dictionary();
        let mut dict = CommandDictionary::new();
        dict.load_commands(
            &json!({
                "base": {
                    "reboot": {"visibility": "local,cloud"},
                    "shutdown": {"visibility": "local"}
                }
            }),
            "vendor",
            Some(&base),
        )
        .unwrap();

        let reboot = dict.find_command("base.reboot").unwrap();
        assert_eq!(reboot.visibility().to_string(), "all");
        assert_eq!(reboot.minimal_role(), UserRole::User);

        let shutdown = dict.find_command("base.shutdown").unwrap();
        assert_eq!(shutdown.visibility(), CommandVisibility::LOCAL);
        assert_eq!(shutdown.minimal_role(), UserRole::Owner);

        let cloud = dict.get_commands_as_json(|def| def.visibility().cloud, false);
        assert_eq!(cloud["base"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn invalid_tokens() {
        let mut dict = CommandDictionary::new();
        let err = dict
            .load_commands(&json!({"base": {"a": {"visibility": "public"}}}), "c", None)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCommandVisibility);
        assert_eq!(err.first_error().code(), ErrorCode::InvalidPropValue);

        let err = dict
            .load_commands(&json!({"base": {"a": {"minimalRole": "admin"}}}), "c", None)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidMinimalRole);
        assert_eq!(err.first_error().code(), ErrorCode::InvalidPropValue);
    }

    #[test]
    fn non_object_entries() {
        let mut dict = CommandDictionary::new();
        let err = dict.load_commands(&json!({"base": 1}), "c", None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
        let err = dict.load_commands(&json!({"base": {"a": []}}), "c", None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn categories_own_their_commands() {
        let mut dict = CommandDictionary::new();
        dict.load_commands(&json!({"robot": {"a": {}, "b": {}}}), "one", None)
            .unwrap();

        let err = dict
            .load_commands(&json!({"robot": {"b": {}}}), "two", None)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateCommandDefinition);

        dict.load_commands(&json!({"robot": {"c": {}}}), "one", None)
            .unwrap();
        assert_eq!(dict.command_names().collect::<Vec<_>>(), vec!["robot.c"]);
    }

    #[test]
    fn validates_command_payloads() {
        let base = base_dictionary();
        let reboot = base.find_command("base.reboot").unwrap();

        let params = reboot.validate_parameters(&json!({"delay": 20})).unwrap();
        assert_eq!(params["delay"].as_int(), Some(20));

        let err = reboot.validate_parameters(&json!({"delay": 200})).unwrap_err();
        assert!(err.has_code(ErrorCode::OutOfRange));

        let err = reboot.validate_parameters(&json!({"speed": 2})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownProperty);

        assert!(reboot.validate_results(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn dotted_names_cannot_collide() {
        let mut dict = CommandDictionary::new();
        let err = dict
            .load_commands(
                &json!({
                    "a.b": {"c": {}},
                    "a": {"b.c": {"parameters": {"x": "integer"}}}
                }),
                "v",
                None,
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCommandName);
        assert!(dict.is_empty());

        let err = dict
            .load_commands(&json!({"a": {"b.c": {}}}), "v", None)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCommandName);

        let err = dict
            .load_commands(&json!({"": {"jump": {}}}), "v", None)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCommandName);
        assert!(dict.find_command(".jump").is_none());
    }

    #[test]
    fn load_from_text() {
        let mut dict = CommandDictionary::new();
        let err = dict.load_commands_from_json("{", "c", None).unwrap_err();
        assert_eq!(err.domain(), ErrorDomain::Json);
        assert_eq!(err.code(), ErrorCode::JsonParse);

        dict.load_commands_from_json(r#"{"robot": {"dance": {}}}"#, "c", None)
            .unwrap();
        assert_eq!(dict.len(), 1);
    }
}
