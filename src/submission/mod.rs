use crate::error::{Result, TurkError};
use crate::store::Record;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static INDEXED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)__(\d+)$").expect("indexed field regex"));

/// A submitted form split into per-index fields and broadcast fields.
#[derive(Debug, Default)]
struct Fields {
    by_index: BTreeMap<usize, Record>,
    broadcast: Record,
}

fn split_fields<'a>(form: impl IntoIterator<Item = (&'a String, &'a String)>) -> Result<Fields> {
    let mut fields = Fields::default();
    for (name, value) in form {
        match INDEXED_FIELD.captures(name) {
            Some(caps) => {
                let index: usize = caps[2].parse().map_err(|_| {
                    TurkError::SchemaGap(format!("index suffix of field '{name}' is out of range"))
                })?;
                fields
                    .by_index
                    .entry(index)
                    .or_default()
                    .insert(caps[1].to_string(), value.clone());
            }
            None => {
                fields.broadcast.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(fields)
}

fn task_count(fields: &Fields) -> Result<usize> {
    match fields.by_index.keys().next_back() {
        None => Ok(0),
        Some(&max) => max.checked_add(1).ok_or_else(|| {
            TurkError::SchemaGap(format!("index suffix {max} is out of range"))
        }),
    }
}

fn assemble(fields: Fields, count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let mut task = fields.broadcast.clone();
            if let Some(indexed) = fields.by_index.get(&i) {
                for (k, v) in indexed {
                    task.insert(k.clone(), v.clone());
                }
            }
            task
        })
        .collect()
}

/// Rebuild per-task records from a flat submitted field set.
///
/// `name__N` belongs to task `N`; any other field is copied into every task,
/// with indexed values winning on conflict. The result has `1 + max(N)`
/// entries, and an index with no fields of its own still gets a
/// broadcast-only record.
pub fn decode(form: &Record) -> Result<Vec<Record>> {
    let fields = split_fields(form)?;
    let count = task_count(&fields)?;
    debug!(indexed = fields.by_index.len(), broadcast = fields.broadcast.len(), "Decoded submission");
    Ok(assemble(fields, count))
}

/// Like [`decode`], but rejects submissions that carry no indexed fields,
/// skip an index, or hold more than `limit` tasks.
pub fn decode_complete(form: &Record, limit: usize) -> Result<Vec<Record>> {
    let fields = split_fields(form)?;
    let count = task_count(&fields)?;
    if count == 0 {
        return Err(TurkError::SchemaGap("submission has no indexed fields".to_string()));
    }
    if count > limit {
        return Err(TurkError::SchemaGap(format!(
            "submission has {count} tasks but only {limit} remain"
        )));
    }
    if let Some(missing) = (0..count).find(|i| !fields.by_index.contains_key(i)) {
        return Err(TurkError::SchemaGap(format!("no fields for task {missing} of {count}")));
    }
    Ok(assemble(fields, count))
}
