//! Common record types.

use serde_json::{Map, Value};

/// One SObject record: field name to JSON value, in response order.
pub type Record = Map<String, Value>;

/// Look up a record's identifier.
///
/// Tries `Id`, then `id`, then any other casing. Only string values count.
pub fn record_id(record: &Record) -> Option<&str> {
    record
        .get("Id")
        .or_else(|| record.get("id"))
        .or_else(|| {
            record
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("id"))
                .map(|(_, value)| value)
        })
        .and_then(Value::as_str)
}
