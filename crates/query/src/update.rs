use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Update document made of field-level operators.
///
/// Only the fields named in an operator are touched when the update is
/// applied; everything else in the stored document is left as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    set: Map<String, Value>,
    add_to_set: Map<String, Value>,
    pull: Map<String, Value>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Append `value` to the array at `field` unless already present.
    pub fn add_to_set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_to_set.insert(field.into(), value.into());
        self
    }

    /// Remove every occurrence of `value` from the array at `field`.
    pub fn pull(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.pull.insert(field.into(), value.into());
        self
    }

    pub fn set_fields(&self) -> &Map<String, Value> {
        &self.set
    }

    pub fn add_to_set_fields(&self) -> &Map<String, Value> {
        &self.add_to_set
    }

    pub fn pull_fields(&self) -> &Map<String, Value> {
        &self.pull
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add_to_set.is_empty() && self.pull.is_empty()
    }

    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for (op, fields) in [
            ("$set", &self.set),
            ("$addToSet", &self.add_to_set),
            ("$pull", &self.pull),
        ] {
            if !fields.is_empty() {
                doc.insert(op.to_string(), Value::Object(fields.clone()));
            }
        }
        Value::Object(doc)
    }
}

impl Serialize for UpdateSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}
