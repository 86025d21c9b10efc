pub mod events;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Globally unique identifier of a kill event, as assigned by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl EventId {
    /// Read an identifier out of a JSON value.
    ///
    /// The source is not consistent about the type: integers, integral
    /// floats and numeric strings are all accepted.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .map(EventId)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A full event document as delivered by the source.
///
/// Only a handful of fields are interpreted (`EventId`, `TimeStamp`,
/// `Killer.Name`, `Victim.Name`); everything else is carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDocument(Map<String, Value>);

impl EventDocument {
    pub const EVENT_ID: &'static str = "EventId";
    pub const TIME_STAMP: &'static str = "TimeStamp";
    pub const KILLER: &'static str = "Killer";
    pub const VICTIM: &'static str = "Victim";
    pub const NAME: &'static str = "Name";

    /// Wrap a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn event_id(&self) -> Option<EventId> {
        self.0.get(Self::EVENT_ID).and_then(EventId::from_json)
    }

    pub fn set_event_id(&mut self, id: EventId) {
        self.0.insert(Self::EVENT_ID.to_string(), Value::from(id.0));
    }

    pub fn time_stamp(&self) -> Option<&Value> {
        self.0.get(Self::TIME_STAMP)
    }

    /// `TimeStamp` as a string, when it is one. Used as the store's sort key.
    pub fn time_stamp_str(&self) -> Option<&str> {
        self.time_stamp().and_then(Value::as_str)
    }

    pub fn killer_name(&self) -> Option<&str> {
        self.participant_name(Self::KILLER)
    }

    pub fn victim_name(&self) -> Option<&str> {
        self.participant_name(Self::VICTIM)
    }

    fn participant_name(&self, role: &str) -> Option<&str> {
        self.0.get(role)?.get(Self::NAME)?.as_str()
    }

    /// Overwrite top-level fields with those of `other`.
    ///
    /// Fields absent from `other` are left as they were.
    pub fn merge(&mut self, other: EventDocument) {
        self.0.extend(other.0);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
