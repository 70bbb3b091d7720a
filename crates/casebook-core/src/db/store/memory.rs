use crate::{
    db::{
        index::{IndexKey, KeyRange, OrderedIndex, ScanRequest, ViewIndex},
        store::RecordBackend,
    },
    error::InternalError,
    record::Record,
    types::{RecordId, ShortId},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

type ViewEntries = BTreeMap<IndexKey, RecordId>;

#[derive(Default)]
struct MemoryState {
    records: BTreeMap<RecordId, Record>,
    short_ids: BTreeMap<ShortId, RecordId>,
    views: BTreeMap<ViewIndex, ViewEntries>,
}

///
/// MemoryStore
///
/// Process-local document store with maintained sorted views. Used as the
/// reference backend and in tests; production deployments plug their own
/// `RecordBackend + OrderedIndex` into `RecordStore`.
///

pub struct MemoryStore {
    declared: BTreeSet<ViewIndex>,
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Store maintaining every view.
    #[must_use]
    pub fn new() -> Self {
        Self::with_views(ViewIndex::ALL)
    }

    /// Store maintaining only `views`.
    #[must_use]
    pub fn with_views(views: impl IntoIterator<Item = ViewIndex>) -> Self {
        let declared: BTreeSet<_> = views.into_iter().collect();
        let state = MemoryState {
            views: declared.iter().map(|view| (*view, ViewEntries::new())).collect(),
            ..MemoryState::default()
        };

        Self {
            declared,
            state: RwLock::new(state),
        }
    }

    pub fn len(&self) -> Result<usize, InternalError> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, InternalError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, InternalError> {
        self.state
            .read()
            .map_err(|_| InternalError::store_internal("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, InternalError> {
        self.state
            .write()
            .map_err(|_| InternalError::store_internal("memory store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn unindex(&mut self, record: &Record) {
        for (view, entries) in &mut self.views {
            for key in view.emit(record) {
                entries.remove(&key);
            }
        }
    }

    fn index(&mut self, record: &Record) {
        for (view, entries) in &mut self.views {
            for key in view.emit(record) {
                entries.insert(key, record.id().clone());
            }
        }
    }

    fn entries(&self, index: ViewIndex) -> Result<&ViewEntries, InternalError> {
        self.views.get(&index).ok_or_else(|| {
            InternalError::index_invariant(format!("index '{index}' is not declared"))
        })
    }
}

impl RecordBackend for MemoryStore {
    fn load(&self, id: &RecordId) -> Result<Option<Record>, InternalError> {
        Ok(self.read()?.records.get(id).cloned())
    }

    fn load_by_short_id(&self, short_id: &ShortId) -> Result<Option<Record>, InternalError> {
        let state = self.read()?;

        Ok(state
            .short_ids
            .get(short_id)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    fn put(&self, record: &Record, expected: Option<u64>) -> Result<u64, InternalError> {
        let mut state = self.write()?;
        let id = record.id();

        // Phase 1: revision check against what is stored right now.
        let current = state.records.get(id).cloned();
        match (&current, expected) {
            (None, None) => {}
            (Some(stored), Some(rev)) if stored.revision() == rev => {}
            (Some(stored), _) => {
                return Err(InternalError::store_conflict(format!(
                    "record {id} is at revision {}, writer expected {expected:?}",
                    stored.revision()
                )));
            }
            (None, Some(rev)) => {
                return Err(InternalError::store_conflict(format!(
                    "record {id} vanished; writer expected revision {rev}"
                )));
            }
        }

        // Phase 2: identity invariants.
        if let Some(owner) = state.short_ids.get(record.short_id())
            && owner != id
        {
            return Err(InternalError::store_conflict(format!(
                "short id {} already belongs to {owner}",
                record.short_id()
            )));
        }
        if let Some(stored) = &current
            && (stored.short_id() != record.short_id()
                || stored.created_by() != record.created_by()
                || stored.created_by_organisation() != record.created_by_organisation())
        {
            return Err(InternalError::store_invariant(format!(
                "record {id} identity changed after creation"
            )));
        }

        // Phase 3: swap views and row.
        let revision = expected.unwrap_or(0).saturating_add(1);
        let mut stored = record.clone();
        stored.set_revision(revision);
        stored.clear_removals();

        if let Some(previous) = &current {
            state.unindex(previous);
        }
        state.index(&stored);
        state.short_ids.insert(stored.short_id().clone(), id.clone());
        state.records.insert(id.clone(), stored);

        Ok(revision)
    }
}

impl OrderedIndex for MemoryStore {
    fn declares(&self, index: ViewIndex) -> bool {
        self.declared.contains(&index)
    }

    fn scan(&self, request: &ScanRequest) -> Result<Vec<Record>, InternalError> {
        let state = self.read()?;
        let entries = state.entries(request.index)?;
        if request.range.is_empty() || request.limit == 0 {
            return Ok(Vec::new());
        }

        let range = entries.range::<IndexKey, _>(request.range.bounds());
        let ids: Vec<&RecordId> = if request.range.direction.is_descending() {
            range
                .rev()
                .skip(request.skip)
                .take(request.limit)
                .map(|(_, id)| id)
                .collect()
        } else {
            range
                .skip(request.skip)
                .take(request.limit)
                .map(|(_, id)| id)
                .collect()
        };

        ids.into_iter()
            .map(|id| {
                state.records.get(id).cloned().ok_or_else(|| {
                    InternalError::index_corruption(format!(
                        "index '{}' points at missing record {id}",
                        request.index
                    ))
                })
            })
            .collect()
    }

    fn count(&self, index: ViewIndex, range: &KeyRange) -> Result<u64, InternalError> {
        let state = self.read()?;
        let entries = state.entries(index)?;
        if range.is_empty() {
            return Ok(0);
        }

        Ok(entries.range::<IndexKey, _>(range.bounds()).count() as u64)
    }
}
