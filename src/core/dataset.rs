use crate::utils::error::Result;
use serde_json::{Map, Value};

/// Load/save contract the catalog drives every dataset through.
pub trait Dataset {
    type Data;

    fn load(&self) -> Result<Self::Data>;
    fn save(&self, data: &Self::Data) -> Result<()>;
    fn exists(&self) -> Result<bool>;

    /// Drops cached state such as resolved versions.
    fn release(&self);

    fn describe(&self) -> Map<String, Value>;
}

/// Renders `TypeName(key=value, ...)`, omitting unset entries.
pub fn describe_to_string(type_name: &str, description: &Map<String, Value>) -> String {
    let parts: Vec<String> = description
        .iter()
        .filter(|(_, value)| !value.is_null())
        .filter(|(_, value)| !matches!(value, Value::Object(map) if map.is_empty()))
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect();
    format!("{}({})", type_name, parts.join(", "))
}
