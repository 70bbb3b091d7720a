use time::{OffsetDateTime, UtcOffset};

///
/// Clock
///
/// Injectable time source. Returned instants carry the registry's local
/// offset; history formatting converts to UTC itself.
///

pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

///
/// SystemClock
///

#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    #[must_use]
    pub const fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset(UtcOffset::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

///
/// FixedClock
///
/// Deterministic clock for tests and replays.
///

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
