//! Aggregation pipeline stages.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::filter::Filter;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Ordered sort keys (first key is most significant).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl SortSpec {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::default().then(field, direction)
    }

    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    pub fn to_document(&self) -> Value {
        let doc = self
            .keys
            .iter()
            .map(|(field, dir)| (field.clone(), Value::from(dir.as_i32())))
            .collect::<Map<_, _>>();
        Value::Object(doc)
    }
}

/// Project value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectField {
    Include,
    Exclude,
    /// Copy the value found at another field path.
    FieldRef(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<(String, ProjectField)>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), ProjectField::Include));
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), ProjectField::Exclude));
        self
    }

    pub fn field_ref(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.fields
            .push((field.into(), ProjectField::FieldRef(source.into())));
        self
    }

    pub fn fields(&self) -> &[(String, ProjectField)] {
        &self.fields
    }

    pub fn to_document(&self) -> Value {
        let doc = self
            .fields
            .iter()
            .map(|(field, value)| {
                let rendered = match value {
                    ProjectField::Include => json!(1),
                    ProjectField::Exclude => json!(0),
                    ProjectField::FieldRef(source) => Value::String(format!("${source}")),
                };
                (field.clone(), rendered)
            })
            .collect::<Map<_, _>>();
        Value::Object(doc)
    }
}

/// Group key: a single field, or `null` to fold everything into one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Null,
    Field(String),
}

/// Accumulator operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulator {
    /// Distinct values of a field.
    AddToSet(String),
    /// All values of a field, in input order.
    Push(String),
}

impl Accumulator {
    pub fn to_document(&self) -> Value {
        match self {
            Accumulator::AddToSet(field) => json!({ "$addToSet": format!("${field}") }),
            Accumulator::Push(field) => json!({ "$push": format!("${field}") }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    pub accumulators: Vec<(String, Accumulator)>,
}

impl Group {
    pub fn by(key: GroupKey) -> Self {
        Self {
            key,
            accumulators: Vec::new(),
        }
    }

    pub fn accumulate(mut self, output: impl Into<String>, accumulator: Accumulator) -> Self {
        self.accumulators.push((output.into(), accumulator));
        self
    }

    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        let key = match &self.key {
            GroupKey::Null => Value::Null,
            GroupKey::Field(field) => Value::String(format!("${field}")),
        };
        doc.insert("_id".to_string(), key);
        for (output, acc) in &self.accumulators {
            doc.insert(output.clone(), acc.to_document());
        }
        Value::Object(doc)
    }
}

/// Pipeline stage types
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Random sample without replacement.
    Sample { size: u64 },
    Project(Projection),
    Group(Group),
    Sort(SortSpec),
    Skip(u64),
    Limit(u64),
    /// Emit one document per element of the array at this field path.
    Unwind(String),
}

impl Stage {
    /// Wire operator name (e.g. `$match`).
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Sample { .. } => "$sample",
            Stage::Project(_) => "$project",
            Stage::Group(_) => "$group",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
            Stage::Unwind(_) => "$unwind",
        }
    }

    pub fn to_document(&self) -> Value {
        let body = match self {
            Stage::Match(filter) => filter.to_document(),
            Stage::Sample { size } => json!({ "size": size }),
            Stage::Project(projection) => projection.to_document(),
            Stage::Group(group) => group.to_document(),
            Stage::Sort(sort) => sort.to_document(),
            Stage::Skip(n) | Stage::Limit(n) => json!(n),
            Stage::Unwind(field) => Value::String(format!("${field}")),
        };
        let mut doc = Map::new();
        doc.insert(self.name().to_string(), body);
        Value::Object(doc)
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Ordered sequence of stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub fn to_documents(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.stages)
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
