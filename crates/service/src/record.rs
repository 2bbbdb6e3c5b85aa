//! Schemaless records.
//!
//! A record is a JSON object. The only field the store interprets is `id`,
//! an integer assigned on create and never changed afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field holding the store-assigned identifier.
pub const ID_FIELD: &str = "id";

/// Caller-supplied field set for create and update.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Build a record with `id` first, followed by `fields`.
    /// A caller `id` inside `fields` is dropped; the assigned one wins.
    pub fn new(id: i64, fields: Fields) -> Self {
        let mut map = Map::with_capacity(fields.len() + 1);
        map.insert(ID_FIELD.to_string(), Value::from(id));
        for (k, v) in fields {
            if k != ID_FIELD {
                map.insert(k, v);
            }
        }
        Self(map)
    }

    /// Integer id, if the record carries one. Integral floats such as `2.0`
    /// count as integers.
    pub fn id(&self) -> Option<i64> {
        match self.0.get(ID_FIELD)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= -9_223_372_036_854_775_808.0 && *f < 9_223_372_036_854_775_808.0)
                    .map(|f| f as i64)
            }),
            _ => None,
        }
    }

    pub fn has_id(&self, id: i64) -> bool {
        self.id() == Some(id)
    }

    /// Shallow merge: patch fields overwrite, absent fields are kept, `id` is immutable.
    pub fn merge(&mut self, patch: &Fields) {
        for (k, v) in patch {
            if k == ID_FIELD {
                continue;
            }
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }
}

impl From<Fields> for Record {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}
