//! Partial ticket updates and the falsy-field filter applied to update bodies.
//!
//! Any field whose value is null, `false`, zero or the empty string is treated
//! as "not provided" and dropped before the update is applied. The consequence
//! is that an update can never clear a field back to empty.
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<u8>,
}

impl TicketPatch {
    /// Filter a raw update body, then read the fields a patch can carry.
    /// Keys the patch does not know, `status` included, are ignored.
    pub fn from_json(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(pick_truthy(body))
    }

    /// Same filtering rule as [`pick_truthy`], for patches built in code.
    pub fn without_falsy(self) -> Self {
        Self {
            title: self.title.filter(|s| !s.is_empty()),
            description: self.description.filter(|s| !s.is_empty()),
            assignee: self.assignee.filter(|s| !s.is_empty()),
            priority: self.priority.filter(|p| *p != 0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.priority.is_none()
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        // empty arrays and objects still count as provided
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Drop every falsy top-level field of an object. Non-objects pass through.
pub fn pick_truthy(body: Value) -> Value {
    match body {
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, v)| is_truthy(v)).collect())
        }
        other => other,
    }
}
