use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    accumulator::IdentifierAccumulator, aggregation::AggregatedStatsMap, types::Event, Hasher,
};

const DEFAULT_SHARDS: usize = 16;

/// What happened to an observed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The event was counted
    Accepted,
    /// The event was dropped
    Rejected(Rejection),
}

/// Why an event was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// There was no event
    Absent,
    /// The id was empty or only whitespace
    BlankId,
    /// The value was NaN, infinite or negative
    InvalidValue,
    /// Another event with the same id and timestamp was accepted first
    Duplicate,
}

/// A concurrent keyed store of per-identifier accumulators.
///
/// Share it by reference (or in an Arc) between as many workers as you like and
/// [`observe`](Aggregator::observe) from all of them. No external locking is needed.
/// When every worker is done, [`finish`](Aggregator::finish) turns it into the result.
///
/// Identifiers live in a sharded [`DashMap`]. Observing an identifier that already has
/// state only takes a shard read lock; the first event for a new identifier takes the
/// shard write lock once to insert it.
#[derive(Debug)]
pub struct Aggregator {
    accumulators: DashMap<String, Arc<IdentifierAccumulator>, Hasher>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Create an empty aggregator with the default shard count.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create an empty aggregator with a particular shard count.
    ///
    /// More shards mean less contention when many new identifiers show up at once.
    /// The count is rounded up to a power of two, and is at least 2.
    pub fn with_shards(shards: usize) -> Self {
        Self {
            accumulators: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                Hasher::default(),
                shards.max(2).next_power_of_two(),
            ),
        }
    }

    /// Filter, deduplicate and accumulate one event.
    ///
    /// ```
    /// # use event_aggregator::{Aggregator, Event, Observation, Rejection};
    /// let aggregator = Aggregator::new();
    /// let event = Event::new("a", 100, 10.0);
    /// assert_eq!(Observation::Accepted, aggregator.observe(&event));
    /// assert_eq!(Observation::Rejected(Rejection::Duplicate), aggregator.observe(&event));
    /// assert_eq!(Observation::Rejected(Rejection::Absent), aggregator.observe(None::<&Event>));
    /// ```
    pub fn observe<'a>(&self, event: impl Into<Option<&'a Event>>) -> Observation {
        let Some(event) = event.into() else {
            log::trace!("rejected absent event");
            return Observation::Rejected(Rejection::Absent);
        };
        let rejection = if !event.has_id() {
            Rejection::BlankId
        } else if !event.has_valid_value() {
            Rejection::InvalidValue
        } else if self
            .accumulator(&event.id)
            .try_observe(event.timestamp, event.value)
        {
            return Observation::Accepted;
        } else {
            Rejection::Duplicate
        };
        log::trace!("rejected {event}: {rejection:?}");
        Observation::Rejected(rejection)
    }

    /// Observe every event from an iterator on the calling thread.
    pub fn observe_all(&self, events: impl IntoIterator<Item = impl Into<Option<Event>>>) {
        for event in events {
            let event: Option<Event> = event.into();
            self.observe(event.as_ref());
        }
    }

    /// The number of identifiers with at least one accepted event.
    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    /// Whether nothing has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the aggregator and produce the summary of every identifier.
    ///
    /// Taking self by value means no worker can still be observing.
    pub fn finish(self) -> AggregatedStatsMap {
        let aggregated: AggregatedStatsMap = self
            .accumulators
            .into_iter()
            .filter_map(|(id, accumulator)| accumulator.snapshot().map(|stats| (id, stats)))
            .collect();
        log::debug!("aggregated {} identifiers", aggregated.len());
        aggregated
    }

    /// Get or create the accumulator for an identifier.
    ///
    /// Creation goes through the map's entry api, which holds the shard write lock, so
    /// workers racing on a new identifier all end up with the same accumulator.
    fn accumulator(&self, id: &str) -> Arc<IdentifierAccumulator> {
        let existing = self
            .accumulators
            .get(id)
            .map(|accumulator| accumulator.value().clone());
        match existing {
            Some(existing) => existing,
            None => self.accumulators.entry(id.to_owned()).or_default().clone(),
        }
    }
}
