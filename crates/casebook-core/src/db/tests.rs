use crate::{
    db::{AccessScope, RecordDraft, SortField, ViewQueryPlanner},
    history::{Change, HistoryEntry, HistoryPolicy},
    obs::sink::{MetricsEvent, MetricsSink},
    record::{Attachment, AttachmentKey},
    test_support::{admin, fields, store, worker},
    types::{RecordId, ShortId},
    value::Value,
};
use std::sync::Mutex;

// ----------------------------------------------------------------------
// Creation and reads
// ----------------------------------------------------------------------

#[test]
fn create_assigns_identity_and_records_creation_history() {
    let store = store();

    let record = store
        .create(
            fields(&[("name", Value::from("Fred")), ("age", Value::Int(7))]),
            &worker("fw1"),
        )
        .expect("create");

    assert_eq!(record.created_by(), "fw1");
    assert_eq!(record.created_by_organisation(), "UNICEF");
    assert_eq!(record.created_at(), "2010-01-17 14:05:32UTC");
    assert_eq!(record.revision(), 1);
    assert_eq!(
        record.short_id().as_str(),
        &record.unique_identifier()[record.unique_identifier().len() - 7..]
    );

    let entry = &record.histories()[0];
    assert_eq!(record.histories().len(), 1);
    assert_eq!(entry.user_name, "fw1");
    assert_eq!(
        entry.changes.get("name"),
        Some(&Change::value(Value::Null, Value::from("Fred")))
    );
}

#[test]
fn create_with_id_keeps_caller_id_and_rejects_reuse() {
    let store = store();
    let id = RecordId::new("8a126c33d0e6ea1e3d7d5b5a1cd3ff4d");

    let record = store
        .create_with_id(id.clone(), fields(&[("name", Value::from("Ann"))]), &admin())
        .expect("create");
    let err = store
        .create_with_id(id.clone(), fields(&[("name", Value::from("Ann"))]), &admin())
        .expect_err("id already taken");

    assert_eq!(record.id(), &id);
    assert_eq!(record.created_by_full_name(), Some("Registry Admin"));
    assert!(err.is_retryable());
}

#[test]
fn create_from_draft_uses_supplied_unique_identifier() {
    let store = store();
    let draft = RecordDraft::new(fields(&[("name", Value::from("Ann"))]))
        .with_unique_identifier("fw1xxx1234567")
        .with_attachment(
            AttachmentKey::new("photo-1-2010-01-17T140532"),
            Attachment::new("image/jpeg", vec![1]),
        );

    let record = store.create_from(draft, &worker("fw1")).expect("create");

    assert_eq!(record.short_id(), &ShortId::new("1234567"));
    assert_eq!(
        record.histories()[0].changes.get("attachments"),
        Some(&Change::set(
            vec!["photo-1-2010-01-17T140532".to_string()],
            Vec::new()
        ))
    );
}

#[test]
fn short_id_read_matches_id_read() {
    let store = store();
    let created = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");

    let by_id = store.get(created.id()).expect("get");
    let by_short = store.get_by_short_id(created.short_id()).expect("get");

    assert_eq!(by_id, Some(created));
    assert_eq!(by_id, by_short);
}

#[test]
fn absent_ids_read_as_none() {
    let store = store();

    assert!(store.get(&RecordId::new("missing")).expect("get").is_none());
    assert!(
        store
            .get_by_short_id(&ShortId::new("missing"))
            .expect("get")
            .is_none()
    );
}

// ----------------------------------------------------------------------
// Saves
// ----------------------------------------------------------------------

#[test]
fn unchanged_save_appends_nothing() {
    let store = store();
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");

    let outcome = store.save(&mut record, &worker("fw1")).expect("save");

    assert!(!outcome.history_appended);
    assert_eq!(outcome.revision, 2);
    assert_eq!(record.histories().len(), 1);
    assert_eq!(record.last_updated_by(), None);
}

#[test]
fn changed_save_appends_diff_and_stamps_update() {
    let store = store();
    let editor = admin();
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");

    record.set("last_known_location", "London").expect("set");
    record.set("name", "Anne").expect("set");
    let outcome = store.save(&mut record, &editor).expect("save");

    let entry = record.histories().last().expect("entry");
    assert!(outcome.history_appended);
    assert_eq!(record.histories().len(), 2);
    assert_eq!(entry.user_name, "admin");
    assert_eq!(entry.datetime, "2010-01-17 14:05:33UTC");
    assert_eq!(entry.changes.len(), 2);
    assert_eq!(
        entry.changes.get("name"),
        Some(&Change::value(Value::from("Ann"), Value::from("Anne")))
    );
    assert_eq!(record.last_updated_by(), Some("admin"));
    assert_eq!(record.last_updated_by_full_name(), Some("Registry Admin"));
    assert_eq!(record.last_updated_at(), Some("2010-01-17 14:05:33UTC"));
}

#[test]
fn removed_field_is_recorded_as_nulled() {
    let store = store();
    let mut record = store
        .create(
            fields(&[("name", Value::from("Ann")), ("nickname", Value::from("A"))]),
            &worker("fw1"),
        )
        .expect("create");

    record.remove("nickname");
    store.save(&mut record, &worker("fw1")).expect("save");

    let entry = record.histories().last().expect("entry");
    assert_eq!(
        entry.changes.get("nickname"),
        Some(&Change::value(Value::from("A"), Value::Null))
    );
    assert!(record.removed_fields().is_empty());
}

#[test]
fn successive_saves_diff_against_their_own_predecessor() {
    let store = store();
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");

    record.set("name", "Bea").expect("set");
    store.save(&mut record, &worker("fw1")).expect("save 1");
    record.set("name", "Cat").expect("set");
    store.save(&mut record, &worker("fw1")).expect("save 2");

    let last = record.histories().last().expect("entry");
    assert_eq!(record.histories().len(), 3);
    assert_eq!(
        last.changes.get("name"),
        Some(&Change::value(Value::from("Bea"), Value::from("Cat")))
    );
}

#[test]
fn stale_copy_conflicts_and_is_left_untouched() {
    let store = store();
    let created = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");
    let mut first = created.clone();
    let mut second = created;

    first.set("name", "Bea").expect("set");
    store.save(&mut first, &worker("fw1")).expect("first writer");
    second.set("name", "Cat").expect("set");
    let err = store
        .save(&mut second, &worker("fw2"))
        .expect_err("second writer is stale");

    assert!(err.is_retryable());
    assert_eq!(second.revision(), 1);
    assert_eq!(second.histories().len(), 1);

    let stored = store.get(second.id()).expect("get").expect("present");
    assert_eq!(stored.get_text("name"), Some("Bea"));
}

#[test]
fn orientation_only_edit_appends_nothing() {
    let store = store();
    let key = AttachmentKey::new("photo-671592136-2013-02-01T101929");
    let draft = RecordDraft::new(fields(&[("name", Value::from("Ann"))]))
        .with_attachment(key.clone(), Attachment::new("image/jpeg", vec![1, 2, 3]));
    let mut record = store.create_from(draft, &worker("fw1")).expect("create");

    record
        .replace_attachment_data(&key, vec![3, 2, 1])
        .expect("rotate");
    record.set("photo_orientation", Value::Int(90)).expect("set");
    let outcome = store.save(&mut record, &worker("fw1")).expect("save");

    assert!(!outcome.history_appended);
    assert_eq!(record.histories().len(), 1);
}

#[test]
fn custom_policy_suppresses_listed_fields() {
    let store = store().with_policy(HistoryPolicy::new(["internal_note"]));
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");

    record.set("internal_note", "checked").expect("set");
    let outcome = store.save(&mut record, &worker("fw1")).expect("save");

    assert!(!outcome.history_appended);
}

fn client_entry(datetime: &str, changes: &[(&str, Change)]) -> HistoryEntry {
    HistoryEntry {
        datetime: datetime.to_string(),
        user_name: "fw1".to_string(),
        user_organisation: "UNICEF".to_string(),
        changes: changes
            .iter()
            .map(|(name, change)| ((*name).to_string(), change.clone()))
            .collect(),
    }
}

static MERGE_CAPTURE: CaptureSink = CaptureSink(Mutex::new(Vec::new()));

#[test]
fn client_history_is_merged_without_server_diff() {
    let store = store().metrics_sink(&MERGE_CAPTURE);
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");
    let rename = client_entry(
        "2010-01-17 15:00:00UTC",
        &[("name", Change::value(Value::from("Ann"), Value::from("Anna")))],
    );
    let relocate = client_entry(
        "2010-01-17 15:01:00UTC",
        &[
            ("name", Change::value(Value::from("Anna"), Value::from("Annie"))),
            ("last_known_location", Change::value(Value::Null, Value::from("London"))),
        ],
    );

    record.set("name", "Annie").expect("set");
    record.set("last_known_location", "London").expect("set");
    let first = store
        .save_with_client_history(
            &mut record,
            &worker("fw1"),
            vec![rename.clone(), relocate.clone()],
        )
        .expect("sync");
    let again = store
        .save_with_client_history(&mut record, &worker("fw1"), vec![rename, relocate.clone()])
        .expect("resync");

    assert!(first.history_appended);
    assert!(!again.history_appended);
    assert_eq!(record.histories().len(), 3);
    assert_eq!(record.histories().last(), Some(&relocate));

    let events = MERGE_CAPTURE.0.lock().expect("lock").clone();
    let appended: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            MetricsEvent::HistoryAppended { changes } => Some(*changes),
            _ => None,
        })
        .collect();
    assert_eq!(appended, vec![1, 1, 2]);
    assert!(events.contains(&MetricsEvent::HistorySkipped));
}

#[test]
fn resent_client_history_does_not_hide_new_changes() {
    let store = store();
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");
    let rename = client_entry(
        "2010-01-17 15:00:00UTC",
        &[("name", Change::value(Value::from("Ann"), Value::from("Anna")))],
    );
    record.set("name", "Anna").expect("set");
    store
        .save_with_client_history(&mut record, &worker("fw1"), vec![rename.clone()])
        .expect("sync");

    record.set("name", "Annie").expect("set");
    let outcome = store
        .save_with_client_history(&mut record, &worker("fw2"), vec![rename])
        .expect("resync");

    assert!(outcome.history_appended);
    assert_eq!(record.histories().len(), 3);

    let entry = record.histories().last().expect("entry");
    assert_eq!(entry.user_name, "fw2");
    assert_eq!(entry.changes.len(), 1);
    assert_eq!(
        entry.changes.get("name"),
        Some(&Change::value(Value::from("Anna"), Value::from("Annie")))
    );
    assert_eq!(record.last_updated_by(), Some("fw2"));
}

#[test]
fn create_with_client_history_writes_only_the_client_entries_once() {
    let store = store();
    let entry = client_entry(
        "2010-01-17 13:00:00UTC",
        &[("name", Change::value(Value::Null, Value::from("Ann")))],
    );

    let record = store
        .create_from_with_client_history(
            RecordDraft::new(fields(&[("name", Value::from("Ann"))])),
            &worker("fw1"),
            vec![entry.clone()],
        )
        .expect("create");

    assert_eq!(record.revision(), 1);
    assert_eq!(record.histories(), &[entry][..]);
    assert_eq!(store.get(record.id()).expect("get"), Some(record));
}

#[test]
fn create_with_empty_client_history_records_the_creation_diff() {
    let store = store();

    let record = store
        .create_from_with_client_history(
            RecordDraft::new(fields(&[("name", Value::from("Ann"))])),
            &worker("fw1"),
            Vec::new(),
        )
        .expect("create");

    assert_eq!(record.histories().len(), 1);
    assert_eq!(record.histories()[0].user_name, "fw1");
    assert!(record.histories()[0].changes.contains_key("name"));
}

// ----------------------------------------------------------------------
// Duplicates
// ----------------------------------------------------------------------

#[test]
fn marked_duplicate_leaves_listings_and_is_found_by_original() {
    let store = store();
    let original = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");
    let copy = store
        .create(fields(&[("name", Value::from("Ann B"))]), &worker("fw2"))
        .expect("create");

    let marked = store
        .mark_duplicate(copy.id(), original.id(), &admin())
        .expect("mark")
        .expect("present");
    let listing = store
        .list(&ViewQueryPlanner::default().plan(
            &AccessScope::AllRecords,
            "all",
            SortField::Default,
            None,
        ))
        .expect("list");
    let duplicates = store.duplicates_of(original.id()).expect("duplicates");

    assert_eq!(
        marked.histories().last().expect("entry").changes.get("duplicate"),
        Some(&Change::value(Value::Null, Value::from(true)))
    );
    assert_eq!(listing.total, 1);
    assert_eq!(listing.records[0].id(), original.id());
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].id(), copy.id());
}

#[test]
fn marking_absent_record_is_none() {
    let store = store();

    let marked = store
        .mark_duplicate(&RecordId::new("missing"), &RecordId::new("other"), &admin())
        .expect("mark");

    assert!(marked.is_none());
}

// ----------------------------------------------------------------------
// Metrics
// ----------------------------------------------------------------------

struct CaptureSink(Mutex<Vec<MetricsEvent>>);

impl MetricsSink for CaptureSink {
    fn record(&self, event: MetricsEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event);
        }
    }
}

static SESSION_CAPTURE: CaptureSink = CaptureSink(Mutex::new(Vec::new()));

#[test]
fn session_routes_events_to_its_sink() {
    let store = store().metrics_sink(&SESSION_CAPTURE);
    let mut record = store
        .create(fields(&[("name", Value::from("Ann"))]), &worker("fw1"))
        .expect("create");
    store.save(&mut record, &worker("fw1")).expect("save");

    let events = SESSION_CAPTURE.0.lock().expect("lock").clone();

    assert!(events.contains(&MetricsEvent::RecordCreated));
    assert!(events.contains(&MetricsEvent::RecordSaved));
    assert!(events.contains(&MetricsEvent::HistorySkipped));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, MetricsEvent::HistoryAppended { .. }))
            .count(),
        1
    );
}

#[test]
fn attachment_keys_come_from_the_session_clock() {
    let store = store();

    let key = store.new_attachment_key("photo").expect("key");

    assert!(key.matches_role("photo"));
    assert_eq!(key.timestamp_suffix(), Some("2010-01-17T140532"));
}
