//! Filter predicates.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// A single-field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `{field: value}`
    Eq(Value),
    /// `{field: {$ne: value}}`
    Ne(Value),
    /// Substring match, rendered as an escaped `$regex` so the text is
    /// matched literally.
    Contains { text: String, case_insensitive: bool },
}

impl Predicate {
    pub fn to_document(&self) -> Value {
        match self {
            Predicate::Eq(value) => value.clone(),
            Predicate::Ne(value) => json!({ "$ne": value }),
            Predicate::Contains {
                text,
                case_insensitive,
            } => {
                let mut doc = Map::new();
                doc.insert("$regex".to_string(), Value::String(escape_regex(text)));
                if *case_insensitive {
                    doc.insert("$options".to_string(), Value::String("i".to_string()));
                }
                Value::Object(doc)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted field path (e.g. `seller.id`).
    pub field: String,
    pub predicate: Predicate,
}

/// Conjunction of field conditions. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, Predicate::Eq(value.into()))
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, Predicate::Ne(value.into()))
    }

    pub fn contains(
        self,
        field: impl Into<String>,
        text: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        self.with(
            field,
            Predicate::Contains {
                text: text.into(),
                case_insensitive,
            },
        )
    }

    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn to_document(&self) -> Value {
        let doc = self
            .conditions
            .iter()
            .map(|c| (c.field.clone(), c.predicate.to_document()))
            .collect::<Map<_, _>>();
        Value::Object(doc)
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Escape regex metacharacters so `text` matches itself.
pub fn escape_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
                | '#' | '&' | '-' | '~'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
