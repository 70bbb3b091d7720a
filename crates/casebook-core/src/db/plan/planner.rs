use crate::{
    DEFAULT_PER_PAGE,
    db::{
        Direction,
        index::{IndexKey, KeyRange, ViewIndex},
    },
    obs::sink::{MetricsEvent, record as record_metric},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

///
/// AccessScope
///
/// Visibility class of the caller. Field workers only ever see records they
/// created; the creator is injected into the key prefix, not filtered after.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AccessScope {
    AllRecords,
    OwnedBy(String),
}

///
/// SortField
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Default,
    Name,
    CreatedAt,
}

impl SortField {
    /// Parse a caller-supplied `order_by`; anything unrecognised keeps the
    /// default order.
    #[must_use]
    pub fn parse(order_by: Option<&str>) -> Self {
        match order_by.map(str::trim) {
            Some("name") => Self::Name,
            Some("created_at") => Self::CreatedAt,
            _ => Self::Default,
        }
    }
}

///
/// KeyShape
///
/// `Forward`: start = prefix, end = prefix + [open], ascending.
/// `Reversed`: start = prefix + [open], end = prefix, descending.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum KeyShape {
    Forward,
    Reversed,
}

// Selection table. Every (scope, sort) pair has exactly one row; a new sort
// or scope variant fails to compile here until it is given one.
const fn select(owned: bool, sort: SortField) -> (ViewIndex, KeyShape) {
    match (owned, sort) {
        (false, SortField::Default | SortField::Name) => (ViewIndex::ByStatus, KeyShape::Forward),
        (false, SortField::CreatedAt) => (ViewIndex::ByStatus, KeyShape::Reversed),
        (true, SortField::Default) => (ViewIndex::ByStatusAndCreator, KeyShape::Forward),
        (true, SortField::Name) => (ViewIndex::ByStatusCreatorName, KeyShape::Forward),
        (true, SortField::CreatedAt) => (ViewIndex::ByStatusCreatorCreatedAt, KeyShape::Reversed),
    }
}

///
/// ViewQueryPlan
///
/// Compiled description of one range scan. Immutable once built.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ViewQueryPlan {
    index: ViewIndex,
    start_key: IndexKey,
    end_key: IndexKey,
    descending: bool,
    page: u32,
    per_page: NonZeroU32,
}

impl ViewQueryPlan {
    #[must_use]
    pub const fn index(&self) -> ViewIndex {
        self.index
    }

    #[must_use]
    pub const fn start_key(&self) -> &IndexKey {
        &self.start_key
    }

    #[must_use]
    pub const fn end_key(&self) -> &IndexKey {
        &self.end_key
    }

    #[must_use]
    pub const fn descending(&self) -> bool {
        self.descending
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page.get()
    }

    /// Same scan with a caller-visible page size.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: NonZeroU32) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub fn range(&self) -> KeyRange {
        KeyRange::new(
            self.start_key.clone(),
            self.end_key.clone(),
            Direction::from_descending(self.descending),
        )
    }
}

///
/// ViewQueryPlanner
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewQueryPlanner {
    per_page: NonZeroU32,
}

impl ViewQueryPlanner {
    #[must_use]
    pub const fn new(per_page: NonZeroU32) -> Self {
        Self { per_page }
    }

    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page.get()
    }

    /// Compile one listing request. `page` defaults to 1; 0 is treated as 1.
    #[must_use]
    pub fn plan(
        &self,
        scope: &AccessScope,
        status: &str,
        sort: SortField,
        page: Option<u32>,
    ) -> ViewQueryPlan {
        let (index, shape) = select(matches!(scope, AccessScope::OwnedBy(_)), sort);

        let prefix = match scope {
            AccessScope::AllRecords => IndexKey::default().with(status),
            AccessScope::OwnedBy(user_name) => {
                IndexKey::default().with(status).with(user_name.as_str())
            }
        };
        let open = prefix.clone().with_open();

        let (start_key, end_key, descending) = match shape {
            KeyShape::Forward => (prefix, open, false),
            KeyShape::Reversed => (open, prefix, true),
        };

        let plan = ViewQueryPlan {
            index,
            start_key,
            end_key,
            descending,
            page: page.unwrap_or(1).max(1),
            per_page: self.per_page,
        };

        record_metric(MetricsEvent::ListingPlanned { index });
        tracing::debug!(
            index = %plan.index,
            start = %plan.start_key,
            end = %plan.end_key,
            descending = plan.descending,
            page = plan.page,
            "listing planned"
        );

        plan
    }
}

impl Default for ViewQueryPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}
