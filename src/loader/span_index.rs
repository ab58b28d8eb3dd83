//! Converts span-annotated YAML into a plain JSON tree plus a span index

use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use yaml_spanned::{Spanned, Value as YamlValue};

use crate::models::FieldPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanInfo {
    pub start: usize,
    pub end: usize,
}

/// Byte ranges keyed by JSON pointer (`""` is the document root)
pub type SpanIndex = HashMap<String, SpanInfo>;

/// Strip spans from a parsed YAML tree, recording each node's span by path
pub fn strip_spans_and_index(spanned: &Spanned<YamlValue>) -> (Value, SpanIndex) {
    let mut spans = SpanIndex::new();
    let value = strip(spanned, &FieldPath::root(), &mut spans);
    (value, spans)
}

fn strip(spanned: &Spanned<YamlValue>, path: &FieldPath, spans: &mut SpanIndex) -> Value {
    let span = spanned.span();
    spans.insert(
        path.to_pointer(),
        SpanInfo {
            start: span.start.unwrap_or_default().byte_index,
            end: span.end.unwrap_or_default().byte_index,
        },
    );

    match spanned.as_ref() {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(Number::from(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(Number::from(u))
            } else if let Some(f) = n.as_f64() {
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            } else {
                Value::Null
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(seq) => Value::Array(
            seq.iter()
                .enumerate()
                .map(|(i, item)| strip(item, &path.index(i), spans))
                .collect(),
        ),
        YamlValue::Mapping(map) => {
            let mut obj = Map::new();
            for (key_spanned, value_spanned) in map {
                // Non-string keys cannot be addressed by field paths
                if let YamlValue::String(key) = key_spanned.as_ref() {
                    let value = strip(value_spanned, &path.key(key), spans);
                    obj.insert(key.clone(), value);
                }
            }
            Value::Object(obj)
        }
        YamlValue::Tagged(tagged_value) => strip(&tagged_value.value, path, spans),
    }
}
