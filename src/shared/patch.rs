//! JSON Patch (RFC 6902) applied to fixed-shape records.
//!
//! Targets are typed views serialized to JSON, so object members are never
//! created or dropped:
//!
//! - `add`/`replace` on a member that is not part of the shape fail with
//!   [`PatchError::PathNotFound`]
//! - `remove` on an object member clears it to `null`; on an array element it
//!   removes the element
//! - `add` with the `-` index appends to an array
//!
//! A document is applied all-or-nothing: the first failing operation aborts
//! the batch and the target is left untouched.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// One patch operation as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        value: Value,
    },
    Remove {
        path: String,
    },
    Replace {
        path: String,
        value: Value,
    },
    Move {
        from: String,
        path: String,
    },
    Copy {
        from: String,
        path: String,
    },
    Test {
        path: String,
        value: Value,
    },
}

impl PatchOperation {
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
            PatchOperation::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("operation {index} ({op}): path '{path}' does not exist")]
    PathNotFound {
        index: usize,
        op: &'static str,
        path: String,
    },

    #[error("operation {index} (test): value at '{path}' does not match the expected value")]
    TestFailed { index: usize, path: String },

    #[error("operation {index} ({op}): invalid path '{path}': {reason}")]
    InvalidPath {
        index: usize,
        op: &'static str,
        path: String,
        reason: String,
    },

    /// The patched document no longer fits the target type
    #[error("{0}")]
    Decode(String),

    #[error("patch target could not be serialized: {0}")]
    Encode(String),
}

/// Failure of a single step, before it is tagged with the operation index
enum StepError {
    NotFound(String),
    Invalid(String, String),
    TestFailed(String),
}

/// An ordered list of patch operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Apply every operation in order; on failure `target` is unchanged
    pub fn apply(&self, target: &mut Value) -> Result<(), PatchError> {
        let mut working = target.clone();

        for (index, operation) in self.0.iter().enumerate() {
            apply_operation(&mut working, operation).map_err(|e| match e {
                StepError::NotFound(path) => PatchError::PathNotFound {
                    index,
                    op: operation.name(),
                    path,
                },
                StepError::Invalid(path, reason) => PatchError::InvalidPath {
                    index,
                    op: operation.name(),
                    path,
                    reason,
                },
                StepError::TestFailed(path) => PatchError::TestFailed { index, path },
            })?;
        }

        *target = working;
        Ok(())
    }

    /// Patch a copy of a typed record and decode the result back into `T`
    pub fn apply_to<T>(&self, target: &T) -> Result<T, PatchError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut value =
            serde_json::to_value(target).map_err(|e| PatchError::Encode(e.to_string()))?;
        self.apply(&mut value)?;
        serde_json::from_value(value).map_err(|e| PatchError::Decode(e.to_string()))
    }
}

fn apply_operation(doc: &mut Value, operation: &PatchOperation) -> Result<(), StepError> {
    match operation {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOperation::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOperation::Move { from, path } => {
            if from == path {
                return lookup(doc, from).map(|_| ());
            }
            if path.starts_with(&format!("{}/", from)) {
                return Err(StepError::Invalid(
                    path.clone(),
                    "cannot move a value into one of its own children".to_string(),
                ));
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = lookup(doc, from)?.clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            let actual = lookup(doc, path)?;
            if values_equal(actual, value) {
                Ok(())
            } else {
                Err(StepError::TestFailed(path.clone()))
            }
        }
    }
}

/// Split a JSON Pointer (RFC 6901) into unescaped reference tokens
fn parse_pointer(path: &str) -> Result<Vec<String>, StepError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(StepError::Invalid(
            path.to_string(),
            "pointer must start with '/'".to_string(),
        ));
    };

    rest.split('/')
        .map(|token| unescape_token(token).ok_or_else(|| {
            StepError::Invalid(path.to_string(), format!("bad escape in '{}'", token))
        }))
        .collect()
}

fn unescape_token(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Array index per RFC 6901: no sign, no leading zeros
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn child<'a>(value: &'a Value, token: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(token),
        Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, token: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(token),
        Value::Array(items) => parse_index(token).and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Result<&'a Value, StepError> {
    let tokens = parse_pointer(path)?;
    tokens
        .iter()
        .try_fold(doc, |current, token| child(current, token))
        .ok_or_else(|| StepError::NotFound(path.to_string()))
}

/// Resolve the container holding the last token of `path`
fn parent_mut<'a>(
    doc: &'a mut Value,
    path: &str,
) -> Result<Option<(&'a mut Value, String)>, StepError> {
    let mut tokens = parse_pointer(path)?;
    let Some(last) = tokens.pop() else {
        return Ok(None);
    };

    let mut current = doc;
    for token in &tokens {
        current = child_mut(current, token).ok_or_else(|| StepError::NotFound(path.to_string()))?;
    }
    Ok(Some((current, last)))
}

fn add(doc: &mut Value, path: &str, value: Value) -> Result<(), StepError> {
    let Some((parent, last)) = parent_mut(doc, path)? else {
        *doc = value;
        return Ok(());
    };

    match parent {
        Value::Object(map) => match map.get_mut(&last) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(StepError::NotFound(path.to_string())),
        },
        Value::Array(items) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            match parse_index(&last) {
                Some(i) if i <= items.len() => {
                    items.insert(i, value);
                    Ok(())
                }
                _ => Err(StepError::NotFound(path.to_string())),
            }
        }
        _ => Err(StepError::NotFound(path.to_string())),
    }
}

fn replace(doc: &mut Value, path: &str, value: Value) -> Result<(), StepError> {
    let Some((parent, last)) = parent_mut(doc, path)? else {
        *doc = value;
        return Ok(());
    };

    let slot = child_mut(parent, &last).ok_or_else(|| StepError::NotFound(path.to_string()))?;
    *slot = value;
    Ok(())
}

/// Clear an object member or drop an array element, returning the old value
fn remove(doc: &mut Value, path: &str) -> Result<Value, StepError> {
    let Some((parent, last)) = parent_mut(doc, path)? else {
        return Err(StepError::Invalid(
            path.to_string(),
            "cannot remove the document root".to_string(),
        ));
    };

    match parent {
        Value::Object(map) => map
            .get_mut(&last)
            .map(Value::take)
            .ok_or_else(|| StepError::NotFound(path.to_string())),
        Value::Array(items) => match parse_index(&last) {
            Some(i) if i < items.len() => Ok(items.remove(i)),
            _ => Err(StepError::NotFound(path.to_string())),
        },
        _ => Err(StepError::NotFound(path.to_string())),
    }
}

/// Structural equality where numbers compare by value (`100` == `100.0`).
/// Two integers compare exactly, floats only come in when either side is one.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &serde_json::Number, y: &serde_json::Number) -> bool {
    if x.is_f64() || y.is_f64() {
        return matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y);
    }
    match (x.as_i64(), y.as_i64()) {
        (Some(x), Some(y)) => x == y,
        // At least one side is above i64::MAX
        _ => x.as_u64().is_some() && x.as_u64() == y.as_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(ops: Value) -> PatchDocument {
        serde_json::from_value(ops).unwrap()
    }

    fn record() -> Value {
        json!({
            "id": 1,
            "name": "Pool View",
            "details": "Sea side",
            "rate": 100.0,
            "occupancy": 4,
            "tags": ["pool", "garden"]
        })
    }

    #[test]
    fn test_deserialize_operations() {
        let patch = doc(json!([
            {"op": "replace", "path": "/occupancy", "value": 6},
            {"op": "move", "from": "/details", "path": "/name"},
            {"op": "remove", "path": "/tags/0"}
        ]));
        assert_eq!(patch.operations().len(), 3);
        assert_eq!(
            patch.operations()[1],
            PatchOperation::Move {
                from: "/details".to_string(),
                path: "/name".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{"op": "merge", "path": "/name", "value": 1}]));
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_scalar() {
        let mut target = record();
        doc(json!([{"op": "replace", "path": "/occupancy", "value": 6}]))
            .apply(&mut target)
            .unwrap();
        assert_eq!(target["occupancy"], json!(6));
        assert_eq!(target["name"], json!("Pool View"));
    }

    #[test]
    fn test_replace_unknown_member_fails() {
        let mut target = record();
        let err = doc(json!([{"op": "replace", "path": "/colour", "value": "red"}]))
            .apply(&mut target)
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::PathNotFound {
                index: 0,
                op: "replace",
                path: "/colour".to_string()
            }
        );
    }

    #[test]
    fn test_add_scalar_behaves_like_replace() {
        let mut target = record();
        doc(json!([{"op": "add", "path": "/details", "value": "Hill side"}]))
            .apply(&mut target)
            .unwrap();
        assert_eq!(target["details"], json!("Hill side"));
    }

    #[test]
    fn test_add_unknown_member_fails() {
        let mut target = record();
        let err = doc(json!([{"op": "add", "path": "/floors", "value": 2}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::PathNotFound { op: "add", .. }));
    }

    #[test]
    fn test_add_inserts_and_appends_into_arrays() {
        let mut target = record();
        doc(json!([
            {"op": "add", "path": "/tags/1", "value": "bbq"},
            {"op": "add", "path": "/tags/-", "value": "wifi"}
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target["tags"], json!(["pool", "bbq", "garden", "wifi"]));
    }

    #[test]
    fn test_add_past_array_end_fails() {
        let mut target = record();
        let err = doc(json!([{"op": "add", "path": "/tags/5", "value": "x"}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::PathNotFound { .. }));
    }

    #[test]
    fn test_remove_clears_member_and_drops_element() {
        let mut target = record();
        doc(json!([
            {"op": "remove", "path": "/details"},
            {"op": "remove", "path": "/tags/0"}
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target["details"], Value::Null);
        assert_eq!(target["tags"], json!(["garden"]));
        assert!(target.as_object().unwrap().contains_key("details"));
    }

    #[test]
    fn test_remove_root_is_invalid() {
        let mut target = record();
        let err = doc(json!([{"op": "remove", "path": ""}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { op: "remove", .. }));
    }

    #[test]
    fn test_move_relocates_value() {
        let mut target = record();
        doc(json!([{"op": "move", "from": "/details", "path": "/name"}]))
            .apply(&mut target)
            .unwrap();
        assert_eq!(target["name"], json!("Sea side"));
        assert_eq!(target["details"], Value::Null);
    }

    #[test]
    fn test_move_into_own_child_is_invalid() {
        let mut target = record();
        let err = doc(json!([{"op": "move", "from": "/tags", "path": "/tags/0"}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { op: "move", .. }));
    }

    #[test]
    fn test_copy_duplicates_value() {
        let mut target = record();
        doc(json!([{"op": "copy", "from": "/name", "path": "/details"}]))
            .apply(&mut target)
            .unwrap();
        assert_eq!(target["details"], json!("Pool View"));
        assert_eq!(target["name"], json!("Pool View"));
    }

    #[test]
    fn test_test_compares_numbers_by_value() {
        let mut target = record();
        doc(json!([{"op": "test", "path": "/rate", "value": 100}]))
            .apply(&mut target)
            .unwrap();
    }

    #[test]
    fn test_test_keeps_large_integers_exact() {
        let mut target = json!({"ref": 9_007_199_254_740_992_u64, "max": u64::MAX});
        let err = doc(json!([{"op": "test", "path": "/ref", "value": 9_007_199_254_740_993_u64}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::TestFailed { index: 0, .. }));

        doc(json!([
            {"op": "test", "path": "/ref", "value": 9_007_199_254_740_992_i64},
            {"op": "test", "path": "/max", "value": u64::MAX}
        ]))
        .apply(&mut target)
        .unwrap();

        let err = doc(json!([{"op": "test", "path": "/max", "value": -1}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::TestFailed { .. }));
    }

    #[test]
    fn test_failed_test_aborts_batch_without_changes() {
        let mut target = record();
        let err = doc(json!([
            {"op": "replace", "path": "/occupancy", "value": 8},
            {"op": "test", "path": "/name", "value": "Another View"},
            {"op": "replace", "path": "/rate", "value": 1}
        ]))
        .apply(&mut target)
        .unwrap_err();

        assert_eq!(
            err,
            PatchError::TestFailed {
                index: 1,
                path: "/name".to_string()
            }
        );
        assert_eq!(target, record());
    }

    #[test]
    fn test_pointer_escapes() {
        let mut target = json!({"a/b": 1, "m~n": 2});
        doc(json!([
            {"op": "replace", "path": "/a~1b", "value": 10},
            {"op": "replace", "path": "/m~0n", "value": 20}
        ]))
        .apply(&mut target)
        .unwrap();
        assert_eq!(target, json!({"a/b": 10, "m~n": 20}));
    }

    #[test]
    fn test_malformed_pointer() {
        let mut target = record();
        let err = doc(json!([{"op": "replace", "path": "name", "value": "x"}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { .. }));

        let err = doc(json!([{"op": "replace", "path": "/na~2me", "value": "x"}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::InvalidPath { .. }));
    }

    #[test]
    fn test_leading_zero_index_not_found() {
        let mut target = record();
        let err = doc(json!([{"op": "replace", "path": "/tags/01", "value": "x"}]))
            .apply(&mut target)
            .unwrap_err();
        assert!(matches!(err, PatchError::PathNotFound { .. }));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Room {
        name: String,
        beds: u32,
    }

    #[test]
    fn test_apply_to_typed_record() {
        let room = Room {
            name: "Suite".to_string(),
            beds: 2,
        };
        let patched = doc(json!([{"op": "replace", "path": "/beds", "value": 3}]))
            .apply_to(&room)
            .unwrap();
        assert_eq!(
            patched,
            Room {
                name: "Suite".to_string(),
                beds: 3
            }
        );
    }

    #[test]
    fn test_apply_to_reports_decode_errors() {
        let room = Room {
            name: "Suite".to_string(),
            beds: 2,
        };
        let err = doc(json!([{"op": "replace", "path": "/beds", "value": "many"}]))
            .apply_to(&room)
            .unwrap_err();
        assert!(matches!(err, PatchError::Decode(_)));
    }
}
