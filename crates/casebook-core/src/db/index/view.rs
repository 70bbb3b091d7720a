use crate::{
    db::index::{IndexKey, status},
    record::{Record, field},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ViewIndex
///
/// The pre-declared sorted views. Each one emits zero or more keys per
/// record; every emitted key ends with the record id so equal logical keys
/// still have a total order.
///
/// | view                          | emitted key                        |
/// |-------------------------------|------------------------------------|
/// | by_status                     | [status, name, id]                 |
/// | by_status_and_creator         | [status, created_by, id]           |
/// | by_status_creator_name        | [status, created_by, name, id]     |
/// | by_status_creator_created_at  | [status, created_by, created_at, id] |
/// | by_duplicate_of               | [duplicate_of, id]                 |
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViewIndex {
    ByStatus,
    ByStatusAndCreator,
    ByStatusCreatorName,
    ByStatusCreatorCreatedAt,
    ByDuplicateOf,
}

impl ViewIndex {
    pub const ALL: [Self; 5] = [
        Self::ByStatus,
        Self::ByStatusAndCreator,
        Self::ByStatusCreatorName,
        Self::ByStatusCreatorCreatedAt,
        Self::ByDuplicateOf,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ByStatus => "by_status",
            Self::ByStatusAndCreator => "by_status_and_creator",
            Self::ByStatusCreatorName => "by_status_creator_name",
            Self::ByStatusCreatorCreatedAt => "by_status_creator_created_at",
            Self::ByDuplicateOf => "by_duplicate_of",
        }
    }

    /// Map function: every key this view holds for `record`.
    #[must_use]
    pub fn emit(self, record: &Record) -> Vec<IndexKey> {
        let id = record.id().as_str();

        if let Self::ByDuplicateOf = self {
            return record
                .get_text(field::DUPLICATE_OF)
                .map(|of| vec![IndexKey::default().with(of).with(id)])
                .unwrap_or_default();
        }

        // Keys hold scalars only; a structured name would collide with `{}`.
        let name = record
            .get(field::NAME)
            .filter(|value| value.is_scalar())
            .cloned()
            .unwrap_or(Value::Null);
        status::statuses(record)
            .into_iter()
            .map(|status| {
                let key = IndexKey::default().with(status);
                let key = match self {
                    Self::ByStatus => key.with(name.clone()),
                    Self::ByStatusAndCreator => key.with(record.created_by()),
                    Self::ByStatusCreatorName => key.with(record.created_by()).with(name.clone()),
                    Self::ByStatusCreatorCreatedAt => {
                        key.with(record.created_by()).with(record.created_at())
                    }
                    Self::ByDuplicateOf => key,
                };

                key.with(id)
            })
            .collect()
    }
}

impl fmt::Display for ViewIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
