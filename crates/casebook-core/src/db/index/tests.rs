use crate::{
    db::{
        Direction,
        index::{IndexKey, KeyPart, KeyRange, ViewIndex, status},
    },
    index_key,
    record::Record,
    types::{Actor, RecordId, ShortId},
    value::Value,
};
use std::collections::BTreeMap;

fn record(id: &str, fields: &[(&str, Value)]) -> Record {
    let mut record = Record::new(
        RecordId::new(id),
        format!("uid-{id}"),
        ShortId::new(id),
        &Actor::new("fakefieldworker", "org"),
        "2010-01-17 14:05:32UTC",
    );
    for (name, value) in fields {
        record.set(*name, value.clone()).expect("set field");
    }
    record
}

// ----------------------------------------------------------------------
// Key collation
// ----------------------------------------------------------------------

#[test]
fn prefix_sorts_before_extension_and_open_after() {
    let prefix = index_key!["all"];
    let entry = index_key!["all", "zzz", "r1"];
    let open = index_key!["all"].with_open();

    assert!(prefix < entry);
    assert!(entry < open);
}

#[test]
fn open_sorts_after_every_value_kind() {
    for value in [
        Value::Null,
        Value::Bool(true),
        Value::Int(i64::MAX),
        Value::from("~~~~"),
        Value::List(vec![Value::from("z")]),
    ] {
        assert!(KeyPart::Value(value) < KeyPart::Open);
    }
}

#[test]
fn open_sentinel_serializes_as_empty_object() {
    let key = index_key!["all", "fakefieldworker"].with_open();

    let json = serde_json::to_string(&key).expect("encode key");
    assert_eq!(json, r#"["all","fakefieldworker",{}]"#);

    let back: IndexKey = serde_json::from_str(&json).expect("decode key");
    assert_eq!(back, key);
    assert!(back.ends_open());
}

#[test]
fn display_quotes_text_and_braces_open() {
    let key = index_key!["all", 2_i64].with_open();

    assert_eq!(key.to_string(), r#"["all", 2, {}]"#);
}

// ----------------------------------------------------------------------
// Ranges
// ----------------------------------------------------------------------

#[test]
fn ascending_range_contains_prefixed_entries_only() {
    let range = KeyRange::new(
        index_key!["all", "fw"],
        index_key!["all", "fw"].with_open(),
        Direction::Asc,
    );

    assert!(range.contains(&index_key!["all", "fw", "timmy", "r1"]));
    assert!(!range.contains(&index_key!["all", "fx", "timmy", "r1"]));
    assert!(!range.contains(&index_key!["active", "fw", "timmy", "r1"]));
    assert!(!range.is_empty());
}

#[test]
fn descending_range_swaps_bounds() {
    let range = KeyRange::new(
        index_key!["all", "fw"].with_open(),
        index_key!["all", "fw"],
        Direction::Desc,
    );

    assert!(range.contains(&index_key!["all", "fw", "2010-01-17 14:05:32UTC", "r1"]));
    assert!(!range.is_empty());
}

#[test]
fn inverted_range_is_empty() {
    let range = KeyRange::new(
        index_key!["all"].with_open(),
        index_key!["all"],
        Direction::Asc,
    );

    assert!(range.is_empty());
}

#[test]
fn exclusive_end_drops_equal_key() {
    let key = index_key!["all"];
    let range = KeyRange::new(key.clone(), key.clone(), Direction::Asc).exclusive_end();

    assert!(range.is_empty());
    assert!(!range.contains(&key));
}

// ----------------------------------------------------------------------
// Emission
// ----------------------------------------------------------------------

#[test]
fn active_record_is_listed_under_all_and_active() {
    let record = record("r1", &[("name", Value::from("timmy"))]);

    assert_eq!(status::statuses(&record), vec![status::ALL, status::ACTIVE]);
}

#[test]
fn reunited_flagged_record_is_listed_under_all_three() {
    let record = record(
        "r1",
        &[("reunited", Value::Bool(true)), ("flag", Value::from("true"))],
    );

    assert_eq!(
        status::statuses(&record),
        vec![status::ALL, status::REUNITED, status::FLAGGED]
    );
}

#[test]
fn duplicate_record_is_hidden_from_listings() {
    let record = record(
        "r1",
        &[
            ("duplicate", Value::Bool(true)),
            ("duplicate_of", Value::from("r0")),
        ],
    );

    assert!(ViewIndex::ByStatus.emit(&record).is_empty());
    assert_eq!(
        ViewIndex::ByDuplicateOf.emit(&record),
        vec![index_key!["r0", "r1"]]
    );
}

#[test]
fn creator_views_embed_creator_and_tail_id() {
    let record = record("r1", &[("name", Value::from("timmy"))]);

    assert_eq!(
        ViewIndex::ByStatusCreatorName.emit(&record),
        vec![
            index_key!["all", "fakefieldworker", "timmy", "r1"],
            index_key!["active", "fakefieldworker", "timmy", "r1"],
        ]
    );
    assert_eq!(
        ViewIndex::ByStatusCreatorCreatedAt.emit(&record)[0],
        index_key!["all", "fakefieldworker", "2010-01-17 14:05:32UTC", "r1"]
    );
    assert_eq!(
        ViewIndex::ByStatusAndCreator.emit(&record)[1],
        index_key!["active", "fakefieldworker", "r1"]
    );
}

#[test]
fn nameless_record_keys_on_null_name() {
    let record = record("r1", &[]);

    assert_eq!(
        ViewIndex::ByStatus.emit(&record)[0],
        index_key!["all", Value::Null, "r1"]
    );
}

#[test]
fn structured_name_keys_on_null_and_stays_inside_the_status_range() {
    let record = record("r1", &[("name", Value::Map(BTreeMap::new()))]);

    let key = &ViewIndex::ByStatus.emit(&record)[0];

    assert_eq!(key, &index_key!["all", Value::Null, "r1"]);
    assert!(key < &index_key!["all"].with_open());
}
