//! YAML and JSON data handling utilities.

use edgeguard_types::{bug, KeygenError, Result};
use serde_json::Value;
use std::path::Path;
use std::fs;

/// Load YAML from string.
pub fn load_yaml(content: &str) -> Result<Value> {
    serde_yaml::from_str(content).map_err(KeygenError::Yaml)
}

/// Load YAML from file.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(KeygenError::Io)?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    load_yaml(&content)
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    match (&mut base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.remove(&key) {
                    Some(base_val) => {
                        base_map.insert(key, deep_merge(base_val, overlay_val));
                    }
                    None => {
                        base_map.insert(key, overlay_val);
                    }
                }
            }
            base
        }
        (_, overlay_val) => overlay_val,
    }
}

/// Get value at a path in dotted notation.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// Set value at a path in dotted notation, creating intermediate objects.
pub fn set_path(data: &mut Value, path: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = path.split('.').filter(|p| !p.is_empty()).collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(KeygenError::Config("Empty configuration key".to_string()));
    };

    let mut current = data;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        let Value::Object(map) = current else {
            bug!("Configuration path {} did not become an object", path);
        };
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
    }

    if !current.is_object() {
        *current = Value::Object(Default::default());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge() {
        let base = json!({"doppler": {"project": "a", "binary": "doppler"}, "keys": {"size": 32}});
        let overlay = json!({"doppler": {"project": "b"}, "log": {"level": "debug"}});

        let merged = deep_merge(base, overlay);
        assert_eq!(
            merged,
            json!({
                "doppler": {"project": "b", "binary": "doppler"},
                "keys": {"size": 32},
                "log": {"level": "debug"}
            })
        );
    }

    #[test]
    fn test_get_and_set_path() {
        let mut data = json!({});
        set_path(&mut data, "keys.prefix", json!("SESSION_KEY")).unwrap();
        set_path(&mut data, "keys.size", json!(48)).unwrap();

        assert_eq!(get_path(&data, "keys.prefix"), Some(&json!("SESSION_KEY")));
        assert_eq!(get_path(&data, "keys.size"), Some(&json!(48)));
        assert_eq!(get_path(&data, "keys.missing"), None);
        assert!(set_path(&mut data, "", json!(1)).is_err());
    }

    #[test]
    fn test_set_path_replaces_scalar_parent() {
        let mut data = json!({"keys": "flat"});
        set_path(&mut data, "keys.max_age.hours", json!(720)).unwrap();
        assert_eq!(data, json!({"keys": {"max_age": {"hours": 720}}}));

        let mut data = json!(7);
        set_path(&mut data, "log.level", json!("warn")).unwrap();
        assert_eq!(get_path(&data, "log.level"), Some(&json!("warn")));
    }
}
