use crate::{
    db::{MemoryStore, RecordStore},
    types::{Actor, Clock, SequenceIds},
    value::Value,
};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};
use time::{Duration, OffsetDateTime, macros::datetime};

///
/// StepClock
///
/// Advances one second per reading so creation order is observable.
///

pub(crate) struct StepClock {
    start: OffsetDateTime,
    ticks: AtomicI64,
}

impl StepClock {
    pub(crate) const fn new(start: OffsetDateTime) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> OffsetDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);

        self.start + Duration::seconds(tick)
    }
}

pub(crate) const START: OffsetDateTime = datetime!(2010-01-17 14:05:32 UTC);

pub(crate) fn store_over(backend: MemoryStore) -> RecordStore<MemoryStore> {
    RecordStore::new(backend)
        .with_clock(StepClock::new(START))
        .with_ids(SequenceIds::starting_at(1))
}

pub(crate) fn store() -> RecordStore<MemoryStore> {
    store_over(MemoryStore::new())
}

pub(crate) fn worker(user_name: &str) -> Actor {
    Actor::new(user_name, "UNICEF")
}

pub(crate) fn admin() -> Actor {
    Actor::new("admin", "UNICEF").with_full_name("Registry Admin")
}

pub(crate) fn fields(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}
