use crate::value::Value;

///
/// Canonical Value Rank
///
/// Stable rank used for cross-variant ordering:
/// null < bool < number < text < list < map.
///
/// IMPORTANT:
/// Rank order decides index-key collation; changing it reorders every
/// persisted listing.
///
#[must_use]
pub const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::Text(_) => 3,
        Value::List(_) => 4,
        Value::Map(_) => 5,
    }
}
