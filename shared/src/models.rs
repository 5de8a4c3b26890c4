//! Event models shared by the store and the HTTP layer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Logical fields of an event, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Day,
    H1,
    M1,
    H2,
    M2,
    Category,
}

impl Field {
    /// All fields in canonical order `[id, title, day, h1, m1, h2, m2, category]`.
    pub const ALL: [Field; 8] = [
        Field::Id,
        Field::Title,
        Field::Day,
        Field::H1,
        Field::M1,
        Field::H2,
        Field::M2,
        Field::Category,
    ];

    /// Header name of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Day => "day",
            Field::H1 => "h1",
            Field::M1 => "m1",
            Field::H2 => "h2",
            Field::M2 => "m2",
            Field::Category => "category",
        }
    }

    /// Position in the canonical order.
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// An event decoded from a grid row. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Event {
    pub fn set(&mut self, field: Field, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Day => &mut self.day,
            Field::H1 => &mut self.h1,
            Field::M1 => &mut self.m1,
            Field::H2 => &mut self.h2,
            Field::M2 => &mut self.m2,
            Field::Category => &mut self.category,
        }
    }
}

/// A fully validated event: every field present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    values: [String; 8],
}

impl EventRecord {
    pub fn id(&self) -> &str {
        self.value(Field::Id)
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.ordinal()]
    }
}

/// Create/update request body.
///
/// Strings are taken as-is, numbers and booleans are kept in textual form.
/// `null`, `""`, `false` and `0` count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub day: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub h1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub m1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub h2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub m2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
}

impl EventPayload {
    /// Validate the seven non-id fields and stamp the record with `id`.
    ///
    /// Any `id` present in the payload is ignored.
    pub fn into_new_record(self, id: String) -> Result<EventRecord> {
        let mut values = self.into_values();
        values[Field::Id.ordinal()] = Some(id);
        finish(values)
    }

    /// Validate all eight fields, including the client-supplied `id`.
    pub fn into_record(self) -> Result<EventRecord> {
        finish(self.into_values())
    }

    fn into_values(self) -> [Option<String>; 8] {
        [
            self.id,
            self.title,
            self.day,
            self.h1,
            self.m1,
            self.h2,
            self.m2,
            self.category,
        ]
    }
}

fn finish(values: [Option<String>; 8]) -> Result<EventRecord> {
    let missing: Vec<&'static str> = Field::ALL
        .into_iter()
        .zip(values.iter())
        .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
        .map(|(field, _)| field.name())
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingFields(missing));
    }

    Ok(EventRecord {
        values: values.map(Option::unwrap_or_default),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// `{"message": ...}` success body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"error": ...}` failure body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
