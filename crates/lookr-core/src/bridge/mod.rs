// ── Field-sync bridge ──
//
// Converts between dynamic attribute maps and typed models through a
// per-model field registry. Each registry is a table of external key →
// getter/setter closures, built once on first use.
//
// Keys match after normalization (ASCII lowercase, `_` and `-` dropped), so
// `font_color`, `Font_color` and `FontColor` all bind to the same field.
// Keys with no matching field are collected in `Decoded::ignored` instead
// of failing the decode. Two keys binding to the same field are an error.

mod codec;

use std::collections::HashMap;

use tracing::debug;

use lookr_api::{DecodeError, Field};

use crate::attr::{AttrMap, AttrValue};

pub use codec::AttrCodec;

/// A model with a field registry.
pub trait Record: Default + Sized + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// Result of a dynamic → typed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<M> {
    pub value: M,
    /// Dotted paths of keys that matched no field.
    pub ignored: Vec<String>,
}

/// Normalized form used for key matching.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Decode an attribute map into `M`.
pub fn decode<M: Record>(attrs: &AttrMap) -> Result<Decoded<M>, DecodeError> {
    let mut ignored = Vec::new();
    let value = decode_at(attrs, "", &mut ignored)?;
    Ok(Decoded { value, ignored })
}

/// Encode every non-absent field of `model`, in registry order.
pub fn encode<M: Record>(model: &M) -> AttrMap {
    M::schema()
        .fields
        .iter()
        .filter_map(|f| (f.get)(model).map(|v| (f.key.to_owned(), v)))
        .collect()
}

fn decode_at<M: Record>(
    attrs: &AttrMap,
    prefix: &str,
    ignored: &mut Vec<String>,
) -> Result<M, DecodeError> {
    let schema = M::schema();
    let mut model = M::default();
    let mut bound: HashMap<&'static str, &str> = HashMap::new();

    for (key, value) in attrs {
        let path = join_path(prefix, key);
        match schema.lookup(key) {
            Some(field) => {
                if let Some(first) = bound.insert(field.key, key.as_str()) {
                    return Err(DecodeError::InvalidValue {
                        field: path,
                        message: format!("sets `{}` again (already set by {first:?})", field.key),
                    });
                }
                (field.set)(&mut model, value, &path, ignored)?;
            }
            None => {
                debug!(key = %path, "no field for attribute, ignoring");
                ignored.push(path);
            }
        }
    }

    Ok(model)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

// ── Registry ────────────────────────────────────────────────────────

type Getter<M> = Box<dyn Fn(&M) -> Option<AttrValue> + Send + Sync>;
type Setter<M> =
    Box<dyn Fn(&mut M, &AttrValue, &str, &mut Vec<String>) -> Result<(), DecodeError> + Send + Sync>;

/// One entry of a field registry.
pub struct FieldDef<M> {
    key: &'static str,
    aliases: Vec<&'static str>,
    /// `None` when the field is absent.
    get: Getter<M>,
    set: Setter<M>,
}

impl<M: 'static> FieldDef<M> {
    /// A field holding a single [`AttrCodec`] value.
    pub fn scalar<V: AttrCodec + 'static>(
        key: &'static str,
        get: fn(&M) -> &Field<V>,
        get_mut: fn(&mut M) -> &mut Field<V>,
    ) -> Self {
        Self {
            key,
            aliases: Vec::new(),
            get: Box::new(move |m| match get(m) {
                Field::Absent => None,
                Field::Null => Some(AttrValue::Null),
                Field::Present(v) => Some(v.to_attr()),
            }),
            set: Box::new(move |m, value, path, _| {
                *get_mut(m) = match value {
                    AttrValue::Null => Field::Null,
                    v => Field::Present(V::from_attr(v, path)?),
                };
                Ok(())
            }),
        }
    }

    /// A nested block. Accepts a map, or a list holding at most one map.
    pub fn nested<V: Record>(
        key: &'static str,
        get: fn(&M) -> &Field<V>,
        get_mut: fn(&mut M) -> &mut Field<V>,
    ) -> Self {
        Self {
            key,
            aliases: Vec::new(),
            get: Box::new(move |m| match get(m) {
                Field::Absent => None,
                Field::Null => Some(AttrValue::Null),
                Field::Present(v) => Some(AttrValue::Map(encode(v))),
            }),
            set: Box::new(move |m, value, path, ignored| {
                let block = match value {
                    AttrValue::Null => None,
                    AttrValue::Map(map) => Some(map),
                    AttrValue::List(items) => match items.as_slice() {
                        [] => None,
                        [AttrValue::Map(map)] => Some(map),
                        [other] => return Err(codec::mismatch(path, "map", other)),
                        _ => {
                            return Err(DecodeError::InvalidValue {
                                field: path.to_owned(),
                                message: format!("expected at most one block, got {}", items.len()),
                            });
                        }
                    },
                    other => return Err(codec::mismatch(path, "map", other)),
                };
                *get_mut(m) = match block {
                    None => Field::Null,
                    Some(map) => Field::Present(decode_at(map, path, ignored)?),
                };
                Ok(())
            }),
        }
    }

    /// A list of nested blocks.
    pub fn nested_list<V: Record>(
        key: &'static str,
        get: fn(&M) -> &Field<Vec<V>>,
        get_mut: fn(&mut M) -> &mut Field<Vec<V>>,
    ) -> Self {
        Self {
            key,
            aliases: Vec::new(),
            get: Box::new(move |m| match get(m) {
                Field::Absent => None,
                Field::Null => Some(AttrValue::Null),
                Field::Present(items) => Some(AttrValue::List(
                    items.iter().map(|v| AttrValue::Map(encode(v))).collect(),
                )),
            }),
            set: Box::new(move |m, value, path, ignored| {
                let items = match value {
                    AttrValue::Null => {
                        *get_mut(m) = Field::Null;
                        return Ok(());
                    }
                    AttrValue::List(items) => items,
                    other => return Err(codec::mismatch(path, "list", other)),
                };
                let decoded = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = format!("{path}[{i}]");
                        match item {
                            AttrValue::Map(map) => decode_at(map, &item_path, ignored),
                            other => Err(codec::mismatch(&item_path, "map", other)),
                        }
                    })
                    .collect::<Result<Vec<V>, _>>()?;
                *get_mut(m) = Field::Present(decoded);
                Ok(())
            }),
        }
    }

    /// Also bind this field to `alias` when decoding. Encoding always uses
    /// the primary key.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

/// The field registry of one model.
pub struct Schema<M> {
    fields: Vec<FieldDef<M>>,
    index: HashMap<String, usize>,
}

impl<M> Schema<M> {
    pub fn new(fields: Vec<FieldDef<M>>) -> Self {
        let mut index = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            for name in std::iter::once(field.key).chain(field.aliases.iter().copied()) {
                let previous = index.insert(normalize_key(name), i);
                debug_assert!(
                    previous.is_none_or(|p| p == i),
                    "{name} collides with another field after normalization"
                );
            }
        }
        Self { fields, index }
    }

    fn lookup(&self, key: &str) -> Option<&FieldDef<M>> {
        self.index
            .get(&normalize_key(key))
            .and_then(|&i| self.fields.get(i))
    }

    /// Primary keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }
}
