//! Module: listing
//! Responsibility: map a caller's listing parameters onto a view plan and
//! shape the realised page for presentation.

use casebook_core::{
    db::{AccessScope, Page, SortField, ViewQueryPlan, ViewQueryPlanner, index::status},
    record::Record,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

///
/// ListingRequest
///
/// Raw listing parameters. Every field is optional; an absent or blank
/// status lists everything, an unrecognised order keeps the default order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListingRequest {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub order_by: Option<String>,

    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub per_page: Option<u32>,
}

impl ListingRequest {
    #[must_use]
    pub fn status(&self) -> &str {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .unwrap_or(status::ALL)
    }

    #[must_use]
    pub fn sort(&self) -> SortField {
        SortField::parse(self.order_by.as_deref())
    }

    #[must_use]
    pub fn plan(&self, planner: &ViewQueryPlanner, scope: &AccessScope) -> ViewQueryPlan {
        let plan = planner.plan(scope, self.status(), self.sort(), self.page);

        match self.per_page.and_then(NonZeroU32::new) {
            Some(per_page) => plan.with_per_page(per_page),
            None => plan,
        }
    }
}

///
/// ListingPage
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingPage {
    pub total: u64,
    pub total_pages: u64,
    pub page: u32,
    pub per_page: u32,
    pub records: Vec<Record>,
}

impl From<Page> for ListingPage {
    fn from(page: Page) -> Self {
        Self {
            total: page.total,
            total_pages: page.total_pages(),
            page: page.page,
            per_page: page.per_page,
            records: page.records,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_core::db::ViewIndex;

    #[test]
    fn empty_request_lists_all_in_default_order() {
        let request = ListingRequest::default();

        let plan = request.plan(&ViewQueryPlanner::default(), &AccessScope::AllRecords);

        assert_eq!(request.status(), "all");
        assert_eq!(plan.index(), ViewIndex::ByStatus);
        assert_eq!(plan.page(), 1);
        assert_eq!(plan.per_page(), 20);
        assert!(!plan.descending());
    }

    #[test]
    fn blank_status_falls_back_to_all() {
        let request = ListingRequest {
            status: Some("  ".to_string()),
            ..ListingRequest::default()
        };

        assert_eq!(request.status(), "all");
    }

    #[test]
    fn unknown_order_keeps_default_sort() {
        let request = ListingRequest {
            order_by: Some("age".to_string()),
            ..ListingRequest::default()
        };

        assert_eq!(request.sort(), SortField::Default);
    }

    #[test]
    fn per_page_override_applies_and_zero_is_ignored() {
        let planner = ViewQueryPlanner::default();
        let scope = AccessScope::OwnedBy("fakefieldworker".to_string());
        let wide = ListingRequest {
            per_page: Some(50),
            ..ListingRequest::default()
        };
        let zero = ListingRequest {
            per_page: Some(0),
            ..ListingRequest::default()
        };

        assert_eq!(wide.plan(&planner, &scope).per_page(), 50);
        assert_eq!(zero.plan(&planner, &scope).per_page(), 20);
    }

    #[test]
    fn request_decodes_from_query_parameters() {
        let request: ListingRequest =
            serde_json::from_str(r#"{"status":"reunited","order_by":"created_at","page":2}"#)
                .expect("decode");

        let plan = request.plan(
            &ViewQueryPlanner::default(),
            &AccessScope::OwnedBy("fw1".to_string()),
        );

        assert_eq!(plan.index(), ViewIndex::ByStatusCreatorCreatedAt);
        assert!(plan.descending());
        assert_eq!(plan.page(), 2);
    }
}
