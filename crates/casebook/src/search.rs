//! Module: search
//! Responsibility: validate free-text search input and route it to the
//! external text-search capability by access scope.
//! Does not own: matching or ranking; `TextSearch` implementations do.

use casebook_core::{error::InternalError, record::Record, types::RecordId};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

pub const QUERY_FIELD: &str = "query";

///
/// ValidationErrors
///
/// Field name → messages, for redisplay next to the offending input.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, messages)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field} {}", messages.join(", "))?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

///
/// SearchQuery
///
/// Validated search input. Construction is the only validation point.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchQuery {
    query: String,
    page: u32,
}

impl SearchQuery {
    pub fn parse(query: &str, page: Option<u32>, max_len: usize) -> Result<Self, ValidationErrors> {
        let query = query.trim();
        let mut errors = ValidationErrors::default();

        if query.is_empty() {
            errors.add(QUERY_FIELD, "can't be blank");
        } else if query.chars().count() > max_len {
            errors.add(
                QUERY_FIELD,
                format!("is too long (maximum is {max_len} characters)"),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            query: query.to_string(),
            page: page.unwrap_or(1).max(1),
        })
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }
}

///
/// SearchHits
///
/// One page of matching ids plus the size of the whole match set.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchHits {
    pub total: u64,
    pub ids: Vec<RecordId>,
}

///
/// TextSearch
///
/// External full-text capability. Field workers only ever search records
/// they created, so the creator filter is part of the contract.
///

pub trait TextSearch {
    fn search(&self, query: &SearchQuery, per_page: u32) -> Result<SearchHits, InternalError>;

    fn search_by_created_user(
        &self,
        query: &SearchQuery,
        user_name: &str,
        per_page: u32,
    ) -> Result<SearchHits, InternalError>;
}

///
/// SearchOutcome
///
/// Invalid input is not a failure: the outcome carries the errors and no
/// results, and the caller redisplays the search form.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SearchOutcome {
    pub errors: ValidationErrors,
    pub total: u64,
    pub records: Vec<Record>,
}

impl SearchOutcome {
    #[must_use]
    pub fn invalid(errors: ValidationErrors) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

///
/// TESTS
///
