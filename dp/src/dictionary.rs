//! Dictionary value model and YAML codec glue
//!
//! The merged definitions text is deserialized into a [`Dictionary`] on every
//! convergence pass. Values are a closed set of variants so the template
//! engine can look fields up by name without dealing in untyped data.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Top-level key/value mapping produced from definitions text
pub type Dictionary = BTreeMap<String, Value>;

/// A single definitions value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Dictionary),
}

impl Value {
    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Dictionary> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut dict = Dictionary::new();
        // Repeated keys: the last occurrence wins
        while let Some((key, value)) = map.next_entry::<Key, Value>()? {
            dict.insert(key.0, value);
        }
        Ok(Value::Mapping(dict))
    }
}

/// Mapping key; scalar keys are stringified, anything else is rejected
struct Key(String);

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Key, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyVisitor)
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Key, E> {
        Ok(Key(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Key, E> {
        Ok(Key(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Key, E> {
        Ok(Key(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Key, E> {
        Ok(Key(serde_yaml::Number::from(v).to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Key, E> {
        Ok(Key(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Key, E> {
        Ok(Key(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Key, E> {
        Ok(Key("null".to_string()))
    }
}

/// True when the text holds no YAML content at all
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Parse definitions text into a fresh dictionary
///
/// Text with only comments and blank lines yields an empty dictionary; any
/// document whose root is not a mapping is rejected.
pub fn parse(text: &str) -> Result<Dictionary> {
    debug!(text_len = text.len(), "dictionary::parse: called");
    if is_blank_document(text) {
        debug!("dictionary::parse: blank document");
        return Ok(Dictionary::new());
    }

    let value: Value = serde_yaml::from_str(text)?;

    match value {
        Value::Mapping(dict) => {
            debug!(keys = dict.len(), "dictionary::parse: parsed mapping");
            Ok(dict)
        }
        Value::Null => Ok(Dictionary::new()),
        other => Err(Error::NotAMapping { found: other.kind() }),
    }
}

/// Render a dictionary back to YAML text
pub fn to_yaml(dict: &Dictionary) -> Result<String> {
    debug!(keys = dict.len(), "dictionary::to_yaml: called");
    serde_yaml::to_string(dict).map_err(Error::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        let dict = parse("a: 1\nb: two\nc: true\nd: ~\ne: 1.5\n").unwrap();
        assert_eq!(dict["a"], Value::from(1));
        assert_eq!(dict["b"], Value::from("two"));
        assert_eq!(dict["c"], Value::Bool(true));
        assert_eq!(dict["d"], Value::Null);
        assert_eq!(dict["e"].kind(), "number");
    }

    #[test]
    fn test_parse_nested() {
        let dict = parse("server:\n  host: localhost\n  ports: [80, 443]\n").unwrap();
        let server = dict["server"].as_mapping().unwrap();
        assert_eq!(server["host"].as_str(), Some("localhost"));
        assert_eq!(
            server["ports"],
            Value::Sequence(vec![Value::from(80), Value::from(443)])
        );
    }

    #[test]
    fn test_parse_last_key_wins() {
        let dict = parse("x: 1\ny: 5\nx: 2\n").unwrap();
        assert_eq!(dict["x"], Value::from(2));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_parse_scalar_keys_stringified() {
        let dict = parse("1: one\ntrue: yes\n").unwrap();
        assert_eq!(dict["1"].as_str(), Some("one"));
        assert_eq!(dict["true"].as_str(), Some("yes"));
    }

    #[test]
    fn test_parse_comments_only() {
        let dict = parse("#!! header !!\n\n# nothing here\n").unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let err = parse("- a\n- b\n").unwrap_err();
        assert!(matches!(err, Error::NotAMapping { found: "sequence" }));
    }

    #[test]
    fn test_parse_rejects_invalid_yaml() {
        let err = parse("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_to_yaml_sorted_and_reparseable() {
        let dict = parse("b: \"1\"\na: 1\n").unwrap();
        let yaml = to_yaml(&dict).unwrap();
        assert!(yaml.find("a:").unwrap() < yaml.find("b:").unwrap());
        assert_eq!(parse(&yaml).unwrap(), dict);
    }
}
