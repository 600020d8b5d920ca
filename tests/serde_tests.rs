#![cfg(feature = "serde")]

//! JSON exchange with the editing layer

use termos::{compile, decompile, Configuration, EncodeError, SensorId};

const SINGLE_FUNCTION: &str = r#"{
    "timer": [null, null, null, null, null, null, null],
    "watchdogRelays": 0,
    "functions": [
        {
            "sensor": "0102030405AA",
            "critical": true,
            "relays": 1,
            "programs": ["1", "1", "1", "1", "1", "1", "1"]
        }
    ],
    "formulas": [],
    "thermalPrograms": {
        "1": [{ "hour": 6, "minute": 0, "temperature": 21.0, "hysteresis": 0.5 }]
    },
    "timerPrograms": {}
}"#;

#[test]
fn test_parse_and_compile() {
    let config: Configuration = serde_json::from_str(SINGLE_FUNCTION).unwrap();

    assert_eq!(config.functions[0].sensor.to_string(), "0102030405AA");
    assert!(config.functions[0].critical);
    assert!(!config.functions[0].cooling);
    assert_eq!(config.functions[0].formula_index, None);
    assert_eq!(compile(&config).unwrap().len(), 30);
}

#[test]
fn test_empty_strings_are_empty_slots() {
    let json = r#"{ "timer": ["", "", "", "", "", "", ""] }"#;
    let config: Configuration = serde_json::from_str(json).unwrap();

    assert!(config.timer.is_empty());
    assert_eq!(compile(&config).unwrap(), vec![0u8; 9]);
}

#[test]
fn test_timer_entry_field_names() {
    let json = r#"{
        "timer": ["a", null, null, null, null, null, null],
        "timerPrograms": {
            "a": [{ "hour": 7, "minute": 30, "relaysOn": 1, "relaysOff": 2, "relaysOnce": 4 }]
        }
    }"#;
    let config: Configuration = serde_json::from_str(json).unwrap();
    let entry = &config.timer_programs["a"].entries()[0];

    assert_eq!((entry.time.hour, entry.time.minute), (7, 30));
    assert_eq!((entry.relays_on, entry.relays_off, entry.relays_once), (1, 2, 4));
}

#[test]
fn test_invalid_sensor_rejected() {
    let json = r#"{ "functions": [{ "sensor": "not-a-sensor" }] }"#;
    let err = serde_json::from_str::<Configuration>(json).unwrap_err();
    let expected = EncodeError::InvalidSensorId {
        value: "not-a-sensor".into(),
    };
    assert!(err.to_string().contains(&expected.to_string()));
}

#[test]
fn test_decompiled_serializes() {
    let config: Configuration = serde_json::from_str(SINGLE_FUNCTION).unwrap();
    let decoded = decompile(&compile(&config).unwrap()).unwrap();

    let value = serde_json::to_value(&decoded).unwrap();
    assert_eq!(value["functions"][0]["sensor"], "0102030405AA");
    assert_eq!(value["functions"][0]["programs"][0], "025");
    assert_eq!(value["thermalPrograms"]["025"][0]["temperature"], 21.0);

    let back: Configuration = serde_json::from_value(value).unwrap();
    assert_eq!(back, decoded);
}

#[test]
fn test_sensor_id_string_form() {
    let id: SensorId = serde_json::from_str(r#""a1b2c3d4e5f6""#).unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""A1B2C3D4E5F6""#);
}
