//! Query parsing and evaluation for the in-memory engine.
//!
//! A query has a `WHERE` filter and an `OPTIONS` block:
//!
//! ```json
//! {
//!   "WHERE": { "EQ": { "rooms_seats": 20 } },
//!   "OPTIONS": { "COLUMNS": ["rooms_number", "rooms_seats"], "ORDER": "rooms_seats", "FORM": "TABLE" }
//! }
//! ```
//!
//! Keys are `<dataset>_<field>`. All keys of one query must name the same
//! loaded dataset.

use super::archive::{Dataset, Field, Record};
use crate::{QueryOutcome, Row};
use compact_str::CompactString;
use serde_json::{Map, Value};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

/// A `<dataset>_<field>` reference.
#[derive(Debug)]
struct Key {
    raw: String,
    dataset: String,
    field: String,
}

impl Key {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once('_') {
            Some((dataset, field)) if !dataset.is_empty() && !field.is_empty() => Ok(Self {
                raw: raw.to_owned(),
                dataset: dataset.to_owned(),
                field: field.to_owned(),
            }),
            _ => Err(format!("invalid key `{raw}`, expected <dataset>_<field>")),
        }
    }
}

/// String match for `IS`, with `*` allowed at either end.
#[derive(Debug)]
enum Pattern {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl Pattern {
    fn parse(input: &str) -> Result<Self, String> {
        let (leading, rest) = match input.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (trailing, core) = match rest.strip_suffix('*') {
            Some(core) => (true, core),
            None => (false, rest),
        };
        if core.contains('*') {
            return Err(format!("wildcards are only allowed at the ends of `{input}`"));
        }
        let core = core.to_owned();
        Ok(match (leading, trailing) {
            (false, false) => Self::Exact(core),
            (false, true) => Self::Prefix(core),
            (true, false) => Self::Suffix(core),
            (true, true) => Self::Contains(core),
        })
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Self::Exact(p) => text == p,
            Self::Prefix(p) => text.starts_with(p.as_str()),
            Self::Suffix(p) => text.ends_with(p.as_str()),
            Self::Contains(p) => text.contains(p.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    Gt,
    Lt,
    Eq,
}

#[derive(Debug)]
enum Filter {
    All,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Compare(Comparison, Key, f64),
    Is(Key, Pattern),
}

impl Filter {
    fn parse(value: &Value) -> Result<Self, String> {
        let Value::Object(map) = value else {
            return Err("filter must be an object".to_owned());
        };
        let mut entries = map.iter();
        let (Some((op, body)), None) = (entries.next(), entries.next()) else {
            return Err("filter must contain exactly one operator".to_owned());
        };

        match op.as_str() {
            "AND" | "OR" => {
                let items = match body {
                    Value::Array(items) if !items.is_empty() => items,
                    _ => return Err(format!("{op} expects a non-empty array")),
                };
                let filters = items.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "AND" {
                    Self::And(filters)
                } else {
                    Self::Or(filters)
                })
            }
            "NOT" => Ok(Self::Not(Box::new(Self::parse(body)?))),
            "GT" | "LT" | "EQ" => {
                let (key, operand) = single_operand(op, body)?;
                let Some(number) = operand.as_f64() else {
                    return Err(format!("{op} expects a number for `{}`", key.raw));
                };
                let comparison = match op.as_str() {
                    "GT" => Comparison::Gt,
                    "LT" => Comparison::Lt,
                    _ => Comparison::Eq,
                };
                Ok(Self::Compare(comparison, key, number))
            }
            "IS" => {
                let (key, operand) = single_operand(op, body)?;
                let Some(text) = operand.as_str() else {
                    return Err(format!("IS expects a string for `{}`", key.raw));
                };
                Ok(Self::Is(key, Pattern::parse(text)?))
            }
            other => Err(format!("unknown filter `{other}`")),
        }
    }

    fn keys<'a>(&'a self, out: &mut Vec<&'a Key>) {
        match self {
            Self::All => {}
            Self::And(filters) | Self::Or(filters) => {
                for filter in filters {
                    filter.keys(out);
                }
            }
            Self::Not(inner) => inner.keys(out),
            Self::Compare(_, key, _) | Self::Is(key, _) => out.push(key),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::And(filters) => filters.iter().all(|f| f.matches(record)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(record)),
            Self::Not(inner) => !inner.matches(record),
            Self::Compare(comparison, key, operand) => {
                let Some(Field::Number(n)) = record.get(&key.field) else {
                    return false;
                };
                let Some(value) = n.as_f64() else {
                    return false;
                };
                match comparison {
                    Comparison::Gt => value > *operand,
                    Comparison::Lt => value < *operand,
                    Comparison::Eq => value == *operand,
                }
            }
            Self::Is(key, pattern) => match record.get(&key.field) {
                Some(Field::Text(text)) => pattern.matches(text),
                _ => false,
            },
        }
    }
}

fn single_operand<'a>(op: &str, body: &'a Value) -> Result<(Key, &'a Value), String> {
    let Value::Object(map) = body else {
        return Err(format!("{op} expects an object"));
    };
    let mut entries = map.iter();
    let (Some((key, operand)), None) = (entries.next(), entries.next()) else {
        return Err(format!("{op} expects exactly one key"));
    };
    Ok((Key::parse(key)?, operand))
}

#[derive(Debug)]
struct Query {
    filter: Filter,
    columns: Vec<Key>,
    order: Option<Key>,
}

impl Query {
    fn parse(document: &Value) -> Result<Self, String> {
        let Value::Object(document) = document else {
            return Err("query must be an object".to_owned());
        };
        if let Some(section) = document
            .keys()
            .find(|k| !matches!(k.as_str(), "WHERE" | "OPTIONS"))
        {
            return Err(format!("unexpected section `{section}`"));
        }

        let filter = match document.get("WHERE") {
            Some(Value::Object(map)) if map.is_empty() => Filter::All,
            Some(filter) => Filter::parse(filter)?,
            None => return Err("query is missing WHERE".to_owned()),
        };
        let Some(Value::Object(options)) = document.get("OPTIONS") else {
            return Err("query is missing OPTIONS".to_owned());
        };
        Self::parse_options(filter, options)
    }

    fn parse_options(filter: Filter, options: &Map<String, Value>) -> Result<Self, String> {
        if let Some(option) = options
            .keys()
            .find(|k| !matches!(k.as_str(), "COLUMNS" | "ORDER" | "FORM"))
        {
            return Err(format!("unexpected option `{option}`"));
        }

        let columns = match options.get("COLUMNS") {
            Some(Value::Array(columns)) if !columns.is_empty() => columns
                .iter()
                .map(|c| {
                    c.as_str()
                        .ok_or_else(|| "COLUMNS entries must be strings".to_owned())
                        .and_then(Key::parse)
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err("COLUMNS must be a non-empty array".to_owned()),
        };

        let order = match options.get("ORDER") {
            None => None,
            Some(Value::String(order)) => {
                if !columns.iter().any(|c| c.raw == *order) {
                    return Err(format!("ORDER key `{order}` is not in COLUMNS"));
                }
                Some(Key::parse(order)?)
            }
            Some(_) => return Err("ORDER must be a string".to_owned()),
        };

        match options.get("FORM") {
            Some(Value::String(form)) if form == "TABLE" => {}
            _ => return Err("FORM must be \"TABLE\"".to_owned()),
        }

        Ok(Self {
            filter,
            columns,
            order,
        })
    }
}

/// Run `document` against `datasets`.
pub(crate) fn run(document: &Value, datasets: &BTreeMap<CompactString, Dataset>) -> QueryOutcome {
    let query = match Query::parse(document) {
        Ok(query) => query,
        Err(reason) => return QueryOutcome::MalformedQuery(reason),
    };

    let mut keys = Vec::new();
    query.filter.keys(&mut keys);
    keys.extend(query.columns.iter());

    let referenced: BTreeSet<&str> = keys.iter().map(|k| k.dataset.as_str()).collect();
    let missing: Vec<&str> = referenced
        .iter()
        .copied()
        .filter(|id| !datasets.contains_key(*id))
        .collect();
    if !missing.is_empty() {
        return QueryOutcome::UnresolvedDependency(format!(
            "query references datasets that are not loaded: {}",
            missing.join(", ")
        ));
    }
    if referenced.len() > 1 {
        let ids: Vec<&str> = referenced.into_iter().collect();
        return QueryOutcome::MalformedQuery(format!(
            "query spans more than one dataset: {}",
            ids.join(", ")
        ));
    }

    let Some(dataset) = referenced.first().and_then(|id| datasets.get(*id)) else {
        return QueryOutcome::MalformedQuery("query names no dataset".to_owned());
    };
    if let Some(key) = keys.iter().find(|k| !dataset.fields.contains(&k.field)) {
        return QueryOutcome::MalformedQuery(format!("unknown column `{}`", key.raw));
    }

    let mut matched: Vec<&Record> = dataset
        .records
        .iter()
        .filter(|r| query.filter.matches(r))
        .collect();
    if let Some(order) = &query.order {
        matched.sort_by(|a, b| compare(a.get(&order.field), b.get(&order.field)));
    }

    let rows = matched
        .into_iter()
        .map(|record| {
            query
                .columns
                .iter()
                .map(|c| {
                    let value = record.get(&c.field).map_or(Value::Null, Field::to_value);
                    (c.raw.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();
    QueryOutcome::Success(rows)
}

/// Ascending order: absent fields first, numbers before strings.
fn compare(a: Option<&Field>, b: Option<&Field>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Field::Number(x)), Some(Field::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Field::Text(x)), Some(Field::Text(y))) => x.cmp(y),
        (Some(Field::Number(_)), Some(Field::Text(_))) => Ordering::Less,
        (Some(Field::Text(_)), Some(Field::Number(_))) => Ordering::Greater,
    }
}
