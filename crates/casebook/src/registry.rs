//! Module: registry
//! Responsibility: the configured entry point mutation and listing
//! endpoints call; wires config into the store, planner and search limits.

use crate::{
    Error, ErrorKind,
    listing::{ListingPage, ListingRequest},
    search::{SearchOutcome, SearchQuery, TextSearch},
    sync::{Reconciler, SyncOutcome, SyncPayload},
    update::{self, RecordUpdate, UpdateError},
};
use casebook_config::RegistryConfig;
use casebook_core::{
    db::{AccessScope, OrderedIndex, RecordBackend, RecordStore, ViewQueryPlanner},
    history::HistoryPolicy,
    record::{AttachmentKey, Record},
    types::{Actor, RecordId, ShortId},
    value::Value,
};
use std::{collections::BTreeMap, num::NonZeroU32};

///
/// Registry
///

pub struct Registry<B> {
    store: RecordStore<B>,
    planner: ViewQueryPlanner,
    max_query_len: usize,
}

impl<B> Registry<B> {
    /// Apply `config` onto `store`. The store keeps its clock, ids and
    /// metrics sink.
    pub fn new(store: RecordStore<B>, config: &RegistryConfig) -> Result<Self, Error> {
        config.validate()?;
        let per_page = NonZeroU32::new(config.listing.per_page).ok_or_else(|| {
            Error::new(
                ErrorKind::Misconfigured,
                "listing.per_page must be at least 1",
            )
        })?;

        let store = store
            .with_policy(HistoryPolicy::new(config.history.suppressed_fields.iter().cloned()))
            .with_short_id_len(config.sync.short_id_len);

        Ok(Self {
            store,
            planner: ViewQueryPlanner::new(per_page),
            max_query_len: config.search.max_query_len,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    #[must_use]
    pub const fn planner(&self) -> &ViewQueryPlanner {
        &self.planner
    }

    #[must_use]
    pub const fn max_query_len(&self) -> usize {
        self.max_query_len
    }
}

impl<B: RecordBackend> Registry<B> {
    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn get(&self, id: &RecordId) -> Result<Option<Record>, Error> {
        Ok(self.store.get(id)?)
    }

    pub fn get_by_short_id(&self, short_id: &ShortId) -> Result<Option<Record>, Error> {
        Ok(self.store.get_by_short_id(short_id)?)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Create from a form post. A post naming a known unique identifier
    /// updates that record instead.
    pub fn create(&self, payload: SyncPayload, actor: &Actor) -> Result<SyncOutcome, Error> {
        self.reconcile(payload, actor)
    }

    /// Mobile push: update by short id or create, marking `verified` from
    /// the actor on creation.
    pub fn reconcile(&self, payload: SyncPayload, actor: &Actor) -> Result<SyncOutcome, Error> {
        Ok(Reconciler::new(&self.store).reconcile(payload, actor)?)
    }

    pub fn update(
        &self,
        id: &RecordId,
        update: RecordUpdate,
        actor: &Actor,
    ) -> Result<Record, Error> {
        let mut record = self.load(id)?;
        update.apply(&self.store, &mut record)?;
        self.store.save(&mut record, actor)?;

        Ok(record)
    }

    /// Update `id`, or create it under that id when absent.
    pub fn upsert(
        &self,
        id: &RecordId,
        update: RecordUpdate,
        actor: &Actor,
    ) -> Result<Record, Error> {
        if self.store.get(id)?.is_some() {
            return self.update(id, update, actor);
        }

        let mut record = self
            .store
            .create_with_id(id.clone(), BTreeMap::new(), actor)?;
        update.apply(&self.store, &mut record)?;
        self.store.save(&mut record, actor)?;

        Ok(record)
    }

    pub fn rotate_photo(
        &self,
        id: &RecordId,
        key: &AttachmentKey,
        orientation: impl Into<Value>,
        rotated: Vec<u8>,
        actor: &Actor,
    ) -> Result<Record, Error> {
        let mut record = self.load(id)?;
        update::rotate_photo(&mut record, key, orientation, rotated)?;
        self.store.save(&mut record, actor)?;

        Ok(record)
    }

    pub fn select_primary_photo(
        &self,
        id: &RecordId,
        key: &AttachmentKey,
        actor: &Actor,
    ) -> Result<Record, Error> {
        let mut record = self.load(id)?;
        update::select_primary_photo(&mut record, key)?;
        self.store.save(&mut record, actor)?;

        Ok(record)
    }

    pub fn mark_duplicate(
        &self,
        id: &RecordId,
        of: &RecordId,
        actor: &Actor,
    ) -> Result<Record, Error> {
        self.store
            .mark_duplicate(id, of, actor)?
            .ok_or_else(|| UpdateError::NotFound(id.clone()).into())
    }

    fn load(&self, id: &RecordId) -> Result<Record, Error> {
        self.store
            .get(id)?
            .ok_or_else(|| UpdateError::NotFound(id.clone()).into())
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Invalid input completes with zero results and the validation errors.
    pub fn search<S>(
        &self,
        engine: &S,
        scope: &AccessScope,
        query: &str,
        page: Option<u32>,
    ) -> Result<SearchOutcome, Error>
    where
        S: TextSearch + ?Sized,
    {
        let query = match SearchQuery::parse(query, page, self.max_query_len) {
            Ok(query) => query,
            Err(errors) => {
                tracing::debug!(%errors, "search rejected");
                return Ok(SearchOutcome::invalid(errors));
            }
        };

        let per_page = self.planner.per_page();
        let hits = match scope {
            AccessScope::AllRecords => engine.search(&query, per_page)?,
            AccessScope::OwnedBy(user_name) => {
                engine.search_by_created_user(&query, user_name, per_page)?
            }
        };

        // A hit whose record has since gone is dropped from the page.
        let mut records = Vec::with_capacity(hits.ids.len());
        for id in &hits.ids {
            if let Some(record) = self.store.get(id)? {
                records.push(record);
            }
        }

        Ok(SearchOutcome {
            total: hits.total,
            records,
            ..SearchOutcome::default()
        })
    }
}

impl<B: RecordBackend + OrderedIndex> Registry<B> {
    pub fn list(
        &self,
        scope: &AccessScope,
        request: &ListingRequest,
    ) -> Result<ListingPage, Error> {
        let plan = request.plan(&self.planner, scope);

        Ok(self.store.list(&plan)?.into())
    }

    pub fn duplicates_of(&self, id: &RecordId) -> Result<Vec<Record>, Error> {
        Ok(self.store.duplicates_of(id)?)
    }
}
