//! Archive decoding for the in-memory engine.
//!
//! An archive is base64 encoded JSON, either a flat array of records or
//! an object mapping file names to record arrays. Only scalar fields
//! (numbers and strings) are kept. Records that are not objects and
//! file entries that are not arrays are skipped.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Field {
    Number(Number),
    Text(String),
}

impl Field {
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

pub(crate) type Record = BTreeMap<String, Field>;

/// A decoded dataset.
#[derive(Debug, Default)]
pub(crate) struct Dataset {
    pub records: Vec<Record>,
    /// Union of field names across all records.
    pub fields: BTreeSet<String>,
}

/// Decode a base64 archive into a dataset.
///
/// The error string is the rejection reason reported to the client.
pub(crate) fn decode(content: &str) -> Result<Dataset, String> {
    let bytes = STANDARD
        .decode(content.trim())
        .map_err(|e| format!("archive is not valid base64: {e}"))?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| format!("archive is not valid JSON: {e}"))?;

    let mut dataset = Dataset::default();
    match value {
        Value::Array(items) => collect(&mut dataset, items),
        Value::Object(files) => {
            for (_, file) in files {
                if let Value::Array(items) = file {
                    collect(&mut dataset, items);
                }
            }
        }
        _ => {
            return Err(
                "archive must be an array of records or an object of record arrays".to_owned(),
            );
        }
    }

    if dataset.records.is_empty() {
        return Err("archive contains no valid records".to_owned());
    }
    Ok(dataset)
}

fn collect(dataset: &mut Dataset, items: Vec<Value>) {
    for item in items {
        let Value::Object(map) = item else { continue };
        let record: Record = map
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::Number(n) => Some((k, Field::Number(n))),
                Value::String(s) => Some((k, Field::Text(s))),
                _ => None,
            })
            .collect();
        if record.is_empty() {
            continue;
        }
        dataset.fields.extend(record.keys().cloned());
        dataset.records.push(record);
    }
}
