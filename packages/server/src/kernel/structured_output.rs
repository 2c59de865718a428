//! JSON schema generation for OpenAI strict structured outputs.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Types that can be requested from the model as a strict `json_schema`
/// response.
///
/// Strict mode wants every object closed (`additionalProperties: false`),
/// every property listed in `required` (nullable ones included), no `$ref`,
/// and no numeric `format` keywords.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        close_objects(&mut value);
        inline_refs(&mut value);
        strip_numeric_formats(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }
        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let keys = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }
            for (_, v) in map.iter_mut() {
                close_objects(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };
    if let Some(defs) = definitions {
        inline_refs_with(value, &defs);
    }
}

fn inline_refs_with(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(path)) = map.get("$ref").cloned() {
                if let Some(def) = path
                    .strip_prefix("#/definitions/")
                    .and_then(|name| definitions.get(name))
                {
                    *value = def.clone();
                    inline_refs_with(value, definitions);
                    return;
                }
            }
            for (_, v) in map.iter_mut() {
                inline_refs_with(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_with(item, definitions);
            }
        }
        _ => {}
    }
}

// schemars emits "double"/"int64" etc., which strict mode rejects.
fn strip_numeric_formats(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_numeric_type(map.get("type")) {
                map.remove("format");
                map.remove("minimum");
            }
            for (_, v) in map.iter_mut() {
                strip_numeric_formats(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_numeric_formats),
        _ => {}
    }
}

fn is_numeric_type(ty: Option<&Value>) -> bool {
    let numeric = |t: &str| t == "number" || t == "integer";
    match ty {
        Some(Value::String(t)) => numeric(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(numeric),
        _ => false,
    }
}
