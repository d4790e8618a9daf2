//! Device status snapshot as returned by `GET /api/devices/status`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One poll's worth of device states.
///
/// The backend owns the shape, so every field is optional and kept as a raw
/// JSON value; rendering decides how to read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusSnapshot {
    #[serde(default)]
    pub motion_sensor: Option<Value>,
    #[serde(default)]
    pub distance_sensor: Option<Value>,
    #[serde(default)]
    pub rfid_reader: Option<Value>,
    #[serde(default)]
    pub front_door: Option<Value>,
    #[serde(default)]
    pub back_door: Option<Value>,
    #[serde(default)]
    pub window1: Option<Value>,
    #[serde(default)]
    pub led_light: Option<Value>,
}

/// Text form of a snapshot value. `null`, missing and empty strings read as `None`.
pub fn value_text(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Bool(false)) => None,
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_snapshot() {
        let snapshot: DeviceStatusSnapshot = serde_json::from_value(json!({
            "motionSensor": "active",
            "distanceSensor": 2.5,
            "rfidReader": "CARD-0042",
            "frontDoor": "locked",
            "backDoor": "unlocked",
            "window1": "locked",
            "ledLight": "on"
        }))
        .unwrap();

        assert_eq!(value_text(&snapshot.motion_sensor).as_deref(), Some("active"));
        assert_eq!(value_text(&snapshot.distance_sensor).as_deref(), Some("2.5"));
        assert_eq!(value_text(&snapshot.window1).as_deref(), Some("locked"));
    }

    #[test]
    fn test_decode_partial_snapshot() {
        let snapshot: DeviceStatusSnapshot =
            serde_json::from_value(json!({ "ledLight": "off", "extra": 1 })).unwrap();
        assert_eq!(snapshot.motion_sensor, None);
        assert_eq!(value_text(&snapshot.led_light).as_deref(), Some("off"));
    }

    #[test]
    fn test_value_text_blank_values() {
        assert_eq!(value_text(&None), None);
        assert_eq!(value_text(&Some(Value::Null)), None);
        assert_eq!(value_text(&Some(json!(""))), None);
        assert_eq!(value_text(&Some(json!(false))), None);
        assert_eq!(value_text(&Some(json!(0))).as_deref(), Some("0"));
    }
}
