//! Module: export
//! Responsibility: dispatch a record set to the exporter registered for a
//! format, name the bundle, optionally seal it, and log who exported what.
//! Does not own: rendering; exporters are external collaborators.

use casebook_core::{
    record::Record,
    types::{Actor, RecordId},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// ExportError
///

#[derive(Debug, ThisError)]
pub enum ExportError {
    #[error("No Records Available!")]
    NoRecords,

    #[error("unknown export format '{0}'")]
    UnknownFormat(String),

    #[error("exporter '{format}' failed: {message}")]
    Render { format: String, message: String },

    #[error("sealing export bundle failed: {0}")]
    Seal(String),
}

///
/// Exporter
///
/// One export format. `id` is the format tag callers request and the
/// suffix of the bundle filename.
///

pub trait Exporter: Send + Sync {
    fn id(&self) -> &str;

    fn export(&self, records: &[Record]) -> Result<Vec<u8>, ExportError>;
}

///
/// BundleSealer
///
/// Wraps exported bytes before they leave the registry (password-protected
/// archives, in practice).
///

pub trait BundleSealer: Send + Sync {
    fn seal(&self, bytes: Vec<u8>, filename: &str) -> Result<Vec<u8>, ExportError>;
}

///
/// JsonExporter
///
/// Built-in format: the records as a JSON array.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn id(&self) -> &str {
        "json"
    }

    fn export(&self, records: &[Record]) -> Result<Vec<u8>, ExportError> {
        serde_json::to_vec(records).map_err(|err| ExportError::Render {
            format: self.id().to_string(),
            message: err.to_string(),
        })
    }
}

///
/// ExportLogEntry
///
/// Audit row written for every successful export.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExportLogEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_name: String,
    pub organisation: String,
    pub record_ids: Vec<RecordId>,
}

///
/// ExportBundle
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExportBundle {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub log: ExportLogEntry,
}

///
/// ExportRegistry
///
/// Format tag → exporter. Built once at startup and shared read-only.
///

#[derive(Default)]
pub struct ExportRegistry {
    exporters: BTreeMap<String, Box<dyn Exporter>>,
    sealer: Option<Box<dyn BundleSealer>>,
}

impl ExportRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exporter; a later registration for the same tag wins.
    #[must_use]
    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.exporters
            .insert(exporter.id().to_string(), Box::new(exporter));
        self
    }

    #[must_use]
    pub fn with_sealer(mut self, sealer: impl BundleSealer + 'static) -> Self {
        self.sealer = Some(Box::new(sealer));
        self
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.exporters.keys().map(String::as_str)
    }

    #[must_use]
    pub fn supports(&self, format: &str) -> bool {
        self.exporters.contains_key(format)
    }

    pub fn export(
        &self,
        format: &str,
        records: &[Record],
        actor: &Actor,
    ) -> Result<ExportBundle, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoRecords);
        }
        let exporter = self
            .exporters
            .get(format)
            .ok_or_else(|| ExportError::UnknownFormat(format.to_string()))?;

        let filename = export_filename(records, exporter.id(), &actor.user_name);
        let mut bytes = exporter.export(records)?;
        if let Some(sealer) = &self.sealer {
            bytes = sealer.seal(bytes, &filename)?;
        }

        let log = ExportLogEntry {
            kind: exporter.id().to_string(),
            user_name: actor.user_name.clone(),
            organisation: actor.organisation.clone(),
            record_ids: records.iter().map(|record| record.id().clone()).collect(),
        };
        tracing::info!(
            format = exporter.id(),
            user = %actor.user_name,
            records = records.len(),
            file = %filename,
            "records exported"
        );

        Ok(ExportBundle {
            filename,
            bytes,
            log,
        })
    }
}

/// `<short_id>_<format>.zip` for a single record, `<user>_<format>.zip`
/// otherwise.
#[must_use]
pub fn export_filename(records: &[Record], format: &str, user_name: &str) -> String {
    match records {
        [record] => format!("{}_{format}.zip", record.short_id()),
        _ => format!("{user_name}_{format}.zip"),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_core::types::ShortId;

    fn record(id: &str, short_id: &str) -> Record {
        Record::new(
            RecordId::new(id),
            format!("uid{short_id}"),
            ShortId::new(short_id),
            &Actor::new("fw1", "STC"),
            "2010-01-17 14:05:32UTC",
        )
    }

    struct Fixed(&'static str);

    impl Exporter for Fixed {
        fn id(&self) -> &str {
            self.0
        }

        fn export(&self, _records: &[Record]) -> Result<Vec<u8>, ExportError> {
            Ok(b"data".to_vec())
        }
    }

    struct Reverse;

    impl BundleSealer for Reverse {
        fn seal(&self, mut bytes: Vec<u8>, _filename: &str) -> Result<Vec<u8>, ExportError> {
            bytes.reverse();
            Ok(bytes)
        }
    }

    #[test]
    fn single_record_bundle_is_named_by_short_id() {
        let records = [record("r1", "test_short_id")];

        assert_eq!(
            export_filename(&records, "photowall", "test_user"),
            "test_short_id_photowall.zip"
        );
    }

    #[test]
    fn multi_record_bundle_is_named_by_user() {
        let records = [record("r1", "a"), record("r2", "b")];

        assert_eq!(export_filename(&records, "pdf", "test_user"), "test_user_pdf.zip");
    }

    #[test]
    fn empty_export_reports_no_records() {
        let registry = ExportRegistry::new().with_exporter(Fixed("csv"));

        let err = registry
            .export("csv", &[], &Actor::new("fakeuser", "STC"))
            .expect_err("empty");

        assert_eq!(err.to_string(), "No Records Available!");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let registry = ExportRegistry::new().with_exporter(Fixed("csv"));

        let err = registry
            .export("mock", &[record("r1", "a")], &Actor::new("fakeuser", "STC"))
            .expect_err("unknown");

        assert!(matches!(err, ExportError::UnknownFormat(format) if format == "mock"));
    }

    #[test]
    fn export_dispatches_seals_and_logs() {
        let registry = ExportRegistry::new()
            .with_exporter(Fixed("cpims"))
            .with_sealer(Reverse);
        let records = [record("r1", "a"), record("r2", "b")];

        let bundle = registry
            .export("cpims", &records, &Actor::new("fakeuser", "STC"))
            .expect("export");

        assert_eq!(bundle.filename, "fakeuser_cpims.zip");
        assert_eq!(bundle.bytes, b"atad");
        assert_eq!(
            bundle.log,
            ExportLogEntry {
                kind: "cpims".to_string(),
                user_name: "fakeuser".to_string(),
                organisation: "STC".to_string(),
                record_ids: vec![RecordId::new("r1"), RecordId::new("r2")],
            }
        );
    }

    #[test]
    fn json_exporter_writes_an_array() {
        let registry = ExportRegistry::new().with_exporter(JsonExporter);

        let bundle = registry
            .export("json", &[record("r1", "a")], &Actor::new("fw1", "STC"))
            .expect("export");
        let decoded: Vec<Record> = serde_json::from_slice(&bundle.bytes).expect("decode");

        assert_eq!(decoded, [record("r1", "a")]);
        assert_eq!(registry.formats().collect::<Vec<_>>(), ["json"]);
    }

    #[test]
    fn log_entry_serializes_kind_as_type() {
        let entry = ExportLogEntry {
            kind: "cpims".to_string(),
            user_name: "fakeuser".to_string(),
            organisation: "STC".to_string(),
            record_ids: vec![RecordId::new("r1")],
        };

        let json = serde_json::to_value(&entry).expect("encode");

        assert_eq!(json["type"], "cpims");
        assert_eq!(json["record_ids"][0], "r1");
    }
}
