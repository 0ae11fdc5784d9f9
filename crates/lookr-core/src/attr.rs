// ── Dynamic attribute values ──
//
// The loosely-typed side of the bridge: what an orchestrating host holds in
// state. Maps keep insertion order so that observed state prints in the
// order the schema declares it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lookr_api::DecodeError;

/// Ordered, string-keyed attribute map.
pub type AttrMap = IndexMap<String, AttrValue>;

/// One dynamically-typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(AttrMap),
}

impl AttrValue {
    /// Short kind name, as used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<AttrMap> for AttrValue {
    fn from(m: AttrMap) -> Self {
        Self::Map(m)
    }
}

// ── JSON conversion ─────────────────────────────────────────────────

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(obj) => Self::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<AttrValue> for Value {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Null => Value::Null,
            AttrValue::Bool(b) => Value::Bool(b),
            AttrValue::Number(n) => number_to_json(n),
            AttrValue::String(s) => Value::String(s),
            AttrValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            AttrValue::Map(map) => Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

/// Integral values are written without a fractional part.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Convert a JSON document into an attribute map. The top level must be an
/// object.
pub fn attr_map_from_json(value: Value) -> Result<AttrMap, DecodeError> {
    match AttrValue::from(value) {
        AttrValue::Map(map) => Ok(map),
        other => Err(DecodeError::TypeMismatch {
            field: "<root>".into(),
            expected: "map",
            found: other.kind(),
        }),
    }
}

pub fn attr_map_to_json(map: AttrMap) -> Value {
    AttrValue::Map(map).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn json_round_trip_keeps_integers_integral() {
        let doc = json!({
            "zeta": 1,
            "alpha": [true, null, 2.5],
            "nested": { "b": "x", "a": "y" }
        });

        let map = attr_map_from_json(doc.clone()).unwrap();
        assert_eq!(map["zeta"], AttrValue::Number(1.0));
        assert_eq!(attr_map_to_json(map), doc);
    }

    #[test]
    fn map_keeps_insertion_order() {
        let mut map = AttrMap::new();
        map.insert("zeta".into(), true.into());
        map.insert("alpha".into(), "a".into());

        let rendered = serde_json::to_string(&AttrValue::Map(map)).unwrap();
        assert_eq!(rendered, r#"{"zeta":true,"alpha":"a"}"#);
    }

    #[test]
    fn top_level_must_be_a_map() {
        let err = attr_map_from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TypeMismatch { expected: "map", found: "list", .. }
        ));
    }

    #[test]
    fn deserializes_untagged_from_yaml_like_input() {
        let value: AttrValue = serde_json::from_str(r#"{"a": null, "b": [1, "two"]}"#).unwrap();
        let map = value.as_map().unwrap();
        assert!(map["a"].is_null());
        assert_eq!(
            map["b"],
            AttrValue::List(vec![AttrValue::Number(1.0), "two".into()])
        );
    }
}
