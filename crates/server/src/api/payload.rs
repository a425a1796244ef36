//! Lenient JSON request bodies.
//!
//! A body that is not a JSON object is read as `{}`, and a field holding
//! the wrong JSON type is read as absent. Validation of what is left
//! happens in the service.

use serde_json::{Map, Value};

use mediaconv_core::FrameRequest;

pub fn parse_object(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn integer_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(Value::as_i64)
}

pub fn url_field(map: &Map<String, Value>) -> Option<String> {
    string_field(map, "url")
}

pub fn frame_request(map: &Map<String, Value>) -> FrameRequest {
    FrameRequest {
        width: integer_field(map, "width"),
        height: integer_field(map, "height"),
        format: string_field(map, "format"),
        quality: integer_field(map, "quality"),
        sws_flags: string_field(map, "sws_flags"),
    }
}
