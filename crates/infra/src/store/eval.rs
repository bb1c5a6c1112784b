//! In-process evaluation of filters, find-specs, pipelines and updates.
//!
//! Semantics follow the document store the queries are written for:
//! - a dotted path walks nested objects; anything else is "missing"
//! - equality against `null` matches missing fields
//! - equality against a scalar matches an array containing it
//! - numbers compare numerically regardless of integer/float encoding

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde_json::{Map, Value};

use toyshelf_query::{
    Accumulator, Condition, Filter, FindSpec, Group, GroupKey, Pipeline, Predicate, ProjectField,
    Projection, SortDirection, SortSpec, Stage, UpdateSpec,
};

use super::r#trait::StoreError;

pub(crate) fn resolve<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

fn resolve_mut<'a>(doc: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object_mut()?.get_mut(segment))
}

/// Set `path`, creating intermediate objects as needed.
fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<(), StoreError> {
    let map = doc.as_object_mut().ok_or_else(|| {
        StoreError::InvalidUpdate(format!("cannot set `{path}` inside a non-object value"))
    })?;
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(child, rest, value)
        }
    }
}

fn remove_path(doc: &mut Value, path: &str) {
    let Some(map) = doc.as_object_mut() else {
        return;
    };
    match path.split_once('.') {
        None => {
            map.shift_remove(path);
        }
        Some((head, rest)) => {
            if let Some(child) = map.get_mut(head) {
                remove_path(child, rest);
            }
        }
    }
}

pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

fn field_equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(actual) => values_equal(actual, expected),
    }
}

fn condition_matches(doc: &Value, condition: &Condition) -> bool {
    let actual = resolve(doc, &condition.field);
    match &condition.predicate {
        Predicate::Eq(expected) => field_equals(actual, expected),
        Predicate::Ne(expected) => !field_equals(actual, expected),
        Predicate::Contains {
            text,
            case_insensitive,
        } => match actual.and_then(Value::as_str) {
            Some(haystack) if *case_insensitive => {
                haystack.to_lowercase().contains(&text.to_lowercase())
            }
            Some(haystack) => haystack.contains(text.as_str()),
            None => false,
        },
    }
}

pub(crate) fn matches(doc: &Value, filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|condition| condition_matches(doc, condition))
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order across mixed types: missing/null, numbers, strings, objects,
/// arrays, booleans.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(xs)), Some(Value::Array(ys))) => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| compare_values(Some(x), Some(y)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| xs.len().cmp(&ys.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Stable multi-key sort: equal keys keep their input order.
fn sort_documents(docs: &mut [Value], spec: &SortSpec) {
    docs.sort_by(|a, b| {
        spec.keys()
            .iter()
            .map(|(field, direction)| {
                let ord = compare_values(resolve(a, field), resolve(b, field));
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn to_count(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

pub(crate) fn run_find<'a>(docs: impl Iterator<Item = &'a Value>, spec: &FindSpec) -> Vec<Value> {
    let mut out: Vec<Value> = docs.filter(|doc| matches(doc, &spec.filter)).cloned().collect();
    if let Some(sort) = &spec.sort {
        sort_documents(&mut out, sort);
    }
    let skip = to_count(spec.skip);
    let limit = spec.limit.map(to_count).unwrap_or(usize::MAX);
    out.into_iter().skip(skip).take(limit).collect()
}

pub(crate) fn run_pipeline(docs: Vec<Value>, pipeline: &Pipeline) -> Result<Vec<Value>, StoreError> {
    pipeline
        .stages()
        .iter()
        .try_fold(docs, |docs, stage| execute_stage(docs, stage))
}

fn execute_stage(mut docs: Vec<Value>, stage: &Stage) -> Result<Vec<Value>, StoreError> {
    match stage {
        Stage::Match(filter) => {
            docs.retain(|doc| matches(doc, filter));
            Ok(docs)
        }
        Stage::Sample { size } => Ok(sample(docs, to_count(*size))),
        Stage::Project(projection) => docs.iter().map(|doc| project(doc, projection)).collect(),
        Stage::Group(group) => Ok(group_documents(&docs, group)),
        Stage::Sort(spec) => {
            sort_documents(&mut docs, spec);
            Ok(docs)
        }
        Stage::Skip(n) => Ok(docs.into_iter().skip(to_count(*n)).collect()),
        Stage::Limit(n) => {
            docs.truncate(to_count(*n));
            Ok(docs)
        }
        Stage::Unwind(field) => {
            let mut out = Vec::with_capacity(docs.len());
            for doc in docs {
                unwind(doc, field, &mut out)?;
            }
            Ok(out)
        }
    }
}

/// Uniform sample without replacement. Returns every document, shuffled,
/// when fewer than `size` are available.
fn sample(mut docs: Vec<Value>, size: usize) -> Vec<Value> {
    let take = size.min(docs.len());
    let (picked, _) = docs.partial_shuffle(&mut rand::thread_rng(), take);
    picked.to_vec()
}

fn project(doc: &Value, projection: &Projection) -> Result<Value, StoreError> {
    let fields = projection.fields();
    let inclusion = fields
        .iter()
        .any(|(_, field)| !matches!(field, ProjectField::Exclude));

    if !inclusion {
        let mut out = doc.clone();
        for (name, _) in fields {
            remove_path(&mut out, name);
        }
        return Ok(out);
    }

    let id_excluded = fields
        .iter()
        .any(|(name, field)| name == "_id" && matches!(field, ProjectField::Exclude));

    let mut out = Value::Object(Map::new());
    if !id_excluded {
        if let Some(id) = doc.get("_id") {
            set_path(&mut out, "_id", id.clone())?;
        }
    }
    for (name, field) in fields {
        let value = match field {
            ProjectField::Exclude => continue,
            ProjectField::Include => resolve(doc, name),
            ProjectField::FieldRef(source) => resolve(doc, source),
        };
        if let Some(value) = value {
            set_path(&mut out, name, value.clone())?;
        }
    }
    Ok(out)
}

/// Groups appear in order of first appearance. No input rows, no output rows.
fn group_documents(docs: &[Value], group: &Group) -> Vec<Value> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Map<String, Value>> = Vec::new();

    for doc in docs {
        let key = match &group.key {
            GroupKey::Null => Value::Null,
            GroupKey::Field(field) => resolve(doc, field).cloned().unwrap_or(Value::Null),
        };
        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            let mut row = Map::new();
            row.insert("_id".to_string(), key.clone());
            for (output, _) in &group.accumulators {
                row.insert(output.clone(), Value::Array(Vec::new()));
            }
            rows.push(row);
            rows.len() - 1
        });

        for (output, accumulator) in &group.accumulators {
            let (source, distinct) = match accumulator {
                Accumulator::AddToSet(source) => (source, true),
                Accumulator::Push(source) => (source, false),
            };
            let Some(value) = resolve(doc, source) else {
                continue;
            };
            if let Some(Value::Array(items)) = rows[slot].get_mut(output) {
                if !distinct || !items.iter().any(|item| values_equal(item, value)) {
                    items.push(value.clone());
                }
            }
        }
    }

    rows.into_iter().map(Value::Object).collect()
}

/// One output per array element. Missing, null and empty arrays produce
/// nothing; non-array values pass through unchanged.
fn unwind(doc: Value, field: &str, out: &mut Vec<Value>) -> Result<(), StoreError> {
    match resolve(&doc, field) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Array(items)) => {
            for item in items {
                let mut copy = doc.clone();
                set_path(&mut copy, field, item.clone())?;
                out.push(copy);
            }
            Ok(())
        }
        Some(_) => {
            out.push(doc);
            Ok(())
        }
    }
}

/// Apply `$set`, `$addToSet` and `$pull` in that order. Returns whether the
/// document changed.
pub(crate) fn apply_update(doc: &mut Value, update: &UpdateSpec) -> Result<bool, StoreError> {
    let before = doc.clone();

    for (field, value) in update.set_fields() {
        set_path(doc, field, value.clone())?;
    }

    for (field, value) in update.add_to_set_fields() {
        match resolve_mut(doc, field) {
            None | Some(Value::Null) => set_path(doc, field, Value::Array(vec![value.clone()]))?,
            Some(Value::Array(items)) => {
                if !items.iter().any(|item| values_equal(item, value)) {
                    items.push(value.clone());
                }
            }
            Some(_) => {
                return Err(StoreError::InvalidUpdate(format!(
                    "cannot apply $addToSet to non-array field `{field}`"
                )));
            }
        }
    }

    for (field, value) in update.pull_fields() {
        match resolve_mut(doc, field) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => items.retain(|item| !values_equal(item, value)),
            Some(_) => {
                return Err(StoreError::InvalidUpdate(format!(
                    "cannot apply $pull to non-array field `{field}`"
                )));
            }
        }
    }

    Ok(*doc != before)
}

/// Starting document for an upsert: the filter's equality conditions.
pub(crate) fn upsert_seed(filter: &Filter) -> Result<Value, StoreError> {
    let mut doc = Value::Object(Map::new());
    for condition in filter.conditions() {
        if let Predicate::Eq(value) = &condition.predicate {
            set_path(&mut doc, &condition.field, value.clone())?;
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_walks_dotted_paths() {
        let doc = json!({ "seller": { "id": "s1" }, "title": "Kite" });
        assert_eq!(resolve(&doc, "seller.id"), Some(&json!("s1")));
        assert_eq!(resolve(&doc, "title.length"), None);
        assert_eq!(resolve(&doc, "missing"), None);
    }

    #[test]
    fn equality_treats_numbers_numerically_and_null_as_missing() {
        let doc = json!({ "price": 10, "tags": ["a", "b"] });
        assert!(matches(&doc, &Filter::new().eq("price", 10.0)));
        assert!(matches(&doc, &Filter::new().eq("stars", Value::Null)));
        assert!(!matches(&doc, &Filter::new().ne("stars", Value::Null)));
        assert!(matches(&doc, &Filter::new().eq("tags", "b")));
    }

    #[test]
    fn contains_is_a_literal_substring_match() {
        let doc = json!({ "title": "Red Kite (XL)" });
        assert!(matches(&doc, &Filter::new().contains("title", "kite (x", true)));
        assert!(!matches(&doc, &Filter::new().contains("title", "kite", false)));
        assert!(!matches(&doc, &Filter::new().contains("title", "k.te", true)));
    }

    #[test]
    fn mixed_types_order_null_numbers_strings() {
        let mut docs = vec![json!({ "v": "a" }), json!({ "v": 2 }), json!({}), json!({ "v": 1.5 })];
        sort_documents(&mut docs, &SortSpec::by("v", SortDirection::Ascending));
        assert_eq!(docs, vec![json!({}), json!({ "v": 1.5 }), json!({ "v": 2 }), json!({ "v": "a" })]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut docs = vec![
            json!({ "k": 1, "n": "first" }),
            json!({ "k": 0, "n": "zero" }),
            json!({ "k": 1, "n": "second" }),
        ];
        sort_documents(&mut docs, &SortSpec::by("k", SortDirection::Descending));
        let names: Vec<_> = docs.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(names, vec![json!("first"), json!("second"), json!("zero")]);
    }

    #[test]
    fn sample_never_exceeds_available_documents() {
        let docs: Vec<Value> = (0..3).map(|i| json!({ "_id": i })).collect();
        assert_eq!(sample(docs.clone(), 10).len(), 3);
        let picked = sample(docs, 2);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
    }

    #[test]
    fn inclusion_projection_keeps_id_unless_excluded() {
        let doc = json!({ "_id": "p1", "title": "Kite", "price": 3 });
        let kept = project(&doc, &Projection::new().include("title")).unwrap();
        assert_eq!(kept, json!({ "_id": "p1", "title": "Kite" }));

        let no_id = project(&doc, &Projection::new().exclude("_id").include("title")).unwrap();
        assert_eq!(no_id, json!({ "title": "Kite" }));

        let renamed = project(&doc, &Projection::new().include("_id").field_ref("name", "title")).unwrap();
        assert_eq!(renamed, json!({ "_id": "p1", "name": "Kite" }));
    }

    #[test]
    fn exclusion_projection_drops_listed_fields() {
        let doc = json!({ "_id": "p1", "title": "Kite", "seller": { "id": "s", "name": "n" } });
        let out = project(&doc, &Projection::new().exclude("seller.name")).unwrap();
        assert_eq!(out, json!({ "_id": "p1", "title": "Kite", "seller": { "id": "s" } }));
    }

    #[test]
    fn group_add_to_set_is_distinct_and_skips_missing() {
        let docs = vec![json!({ "c": "x" }), json!({ "c": "y" }), json!({ "c": "x" }), json!({})];
        let group = Group::by(GroupKey::Null).accumulate("all", Accumulator::AddToSet("c".into()));
        assert_eq!(
            group_documents(&docs, &group),
            vec![json!({ "_id": null, "all": ["x", "y"] })]
        );
        assert!(group_documents(&[], &group).is_empty());
    }

    #[test]
    fn group_by_field_keeps_first_appearance_order() {
        let docs = vec![json!({ "c": "b" }), json!({ "c": "a" }), json!({ "c": "b" })];
        let rows = group_documents(&docs, &Group::by(GroupKey::Field("c".into())));
        assert_eq!(rows, vec![json!({ "_id": "b" }), json!({ "_id": "a" })]);
    }

    #[test]
    fn unwind_skips_empty_and_missing() {
        let mut out = Vec::new();
        unwind(json!({ "xs": [1, 2] }), "xs", &mut out).unwrap();
        unwind(json!({ "xs": [] }), "xs", &mut out).unwrap();
        unwind(json!({}), "xs", &mut out).unwrap();
        unwind(json!({ "xs": 7 }), "xs", &mut out).unwrap();
        assert_eq!(out, vec![json!({ "xs": 1 }), json!({ "xs": 2 }), json!({ "xs": 7 })]);
    }

    #[test]
    fn updates_report_whether_anything_changed() {
        let mut doc = json!({ "_id": "u", "blogs": ["b1"] });
        assert!(!apply_update(&mut doc, &UpdateSpec::new().add_to_set("blogs", "b1")).unwrap());
        assert!(apply_update(&mut doc, &UpdateSpec::new().add_to_set("blogs", "b2")).unwrap());
        assert!(apply_update(&mut doc, &UpdateSpec::new().pull("blogs", "b1")).unwrap());
        assert_eq!(doc, json!({ "_id": "u", "blogs": ["b2"] }));

        assert!(apply_update(&mut doc, &UpdateSpec::new().set("seller.id", "s")).unwrap());
        assert_eq!(doc["seller"], json!({ "id": "s" }));
    }

    #[test]
    fn add_to_set_on_scalar_is_rejected() {
        let mut doc = json!({ "blogs": "oops" });
        let err = apply_update(&mut doc, &UpdateSpec::new().add_to_set("blogs", "b")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));
    }

    #[test]
    fn upsert_seed_uses_equality_conditions_only() {
        let filter = Filter::new().eq("_id", "u1").ne("x", 1);
        assert_eq!(upsert_seed(&filter).unwrap(), json!({ "_id": "u1" }));
    }
}
