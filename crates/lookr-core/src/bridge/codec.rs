// Scalar conversions between `AttrValue` and typed field values.
//
// No coercion across kinds: a bool where a string is declared is a
// mismatch, never a silent `"true"`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use lookr_api::DecodeError;
use lookr_api::models::ComparisonType;

use crate::attr::AttrValue;

/// A value type a schema field can hold.
pub trait AttrCodec: Sized {
    /// Kind name reported when decoding fails.
    const EXPECTED: &'static str;

    fn to_attr(&self) -> AttrValue;

    /// `value` is never `Null`; the schema handles that before calling in.
    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError>;
}

pub(crate) fn mismatch(path: &str, expected: &'static str, found: &AttrValue) -> DecodeError {
    DecodeError::TypeMismatch {
        field: path.to_owned(),
        expected,
        found: found.kind(),
    }
}

impl AttrCodec for String {
    const EXPECTED: &'static str = "string";

    fn to_attr(&self) -> AttrValue {
        AttrValue::String(self.clone())
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        match value {
            AttrValue::String(s) => Ok(s.clone()),
            other => Err(mismatch(path, Self::EXPECTED, other)),
        }
    }
}

impl AttrCodec for bool {
    const EXPECTED: &'static str = "bool";

    fn to_attr(&self) -> AttrValue {
        AttrValue::Bool(*self)
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        match value {
            AttrValue::Bool(b) => Ok(*b),
            other => Err(mismatch(path, Self::EXPECTED, other)),
        }
    }
}

impl AttrCodec for f64 {
    const EXPECTED: &'static str = "number";

    fn to_attr(&self) -> AttrValue {
        AttrValue::Number(*self)
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        match value {
            AttrValue::Number(n) => Ok(*n),
            other => Err(mismatch(path, Self::EXPECTED, other)),
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::as_conversions)]
impl AttrCodec for i64 {
    const EXPECTED: &'static str = "integer";

    fn to_attr(&self) -> AttrValue {
        AttrValue::Number(*self as f64)
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        match value {
            AttrValue::Number(n) if n.fract() == 0.0 && n.abs() <= 9_007_199_254_740_992.0 => {
                Ok(*n as i64)
            }
            AttrValue::Number(n) => Err(DecodeError::InvalidValue {
                field: path.to_owned(),
                message: format!("{n} is not an integer"),
            }),
            other => Err(mismatch(path, Self::EXPECTED, other)),
        }
    }
}

/// Timestamps travel as RFC 3339 strings in both directions.
impl AttrCodec for DateTime<FixedOffset> {
    const EXPECTED: &'static str = "timestamp";

    fn to_attr(&self) -> AttrValue {
        AttrValue::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        let AttrValue::String(raw) = value else {
            return Err(mismatch(path, Self::EXPECTED, value));
        };
        DateTime::parse_from_rfc3339(raw).map_err(|e| DecodeError::InvalidValue {
            field: path.to_owned(),
            message: format!("{raw:?} is not an RFC 3339 timestamp: {e}"),
        })
    }
}

/// Capability maps (`can`).
impl AttrCodec for BTreeMap<String, bool> {
    const EXPECTED: &'static str = "map of bool";

    fn to_attr(&self) -> AttrValue {
        AttrValue::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), AttrValue::Bool(*v)))
                .collect(),
        )
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        let AttrValue::Map(map) = value else {
            return Err(mismatch(path, Self::EXPECTED, value));
        };
        map.iter()
            .map(|(k, v)| {
                let entry = format!("{path}.{k}");
                bool::from_attr(v, &entry).map(|b| (k.clone(), b))
            })
            .collect()
    }
}

impl AttrCodec for ComparisonType {
    const EXPECTED: &'static str = "comparison type";

    fn to_attr(&self) -> AttrValue {
        AttrValue::String(self.to_string())
    }

    fn from_attr(value: &AttrValue, path: &str) -> Result<Self, DecodeError> {
        let AttrValue::String(raw) = value else {
            return Err(mismatch(path, Self::EXPECTED, value));
        };
        raw.parse().map_err(|_| DecodeError::InvalidValue {
            field: path.to_owned(),
            message: format!("unknown comparison type {raw:?}"),
        })
    }
}
