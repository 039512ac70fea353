use std::sync::atomic::{AtomicI64, AtomicU64};

use dashmap::DashSet;

use crate::{aggregation::AggregatedStats, Hasher};

const ORDERING: std::sync::atomic::Ordering = std::sync::atomic::Ordering::Relaxed;

/// Running state for one identifier.
///
/// Everything here is safe to share between workers. Numbers are kept in platform atomics,
/// so accumulation never blocks. Duplicate detection uses a [`DashSet`], whose insert
/// tells exactly one of several racing callers that it was first.
///
/// The sum is an f64 stored as bits in an AtomicU64 and updated with compare-and-swap, so
/// concurrent additions are never lost. Addition order is not fixed, so the last bits of
/// the sum can vary between runs with concurrent workers.
#[derive(Debug)]
pub(crate) struct IdentifierAccumulator {
    seen: DashSet<i64, Hasher>,
    count: AtomicU64,
    sum: AtomicU64,
    min: AtomicI64,
    max: AtomicI64,
}

impl Default for IdentifierAccumulator {
    fn default() -> Self {
        Self {
            seen: DashSet::with_hasher(Hasher::default()),
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0.0_f64.to_bits()),
            min: AtomicI64::new(i64::MAX),
            max: AtomicI64::new(i64::MIN),
        }
    }
}

impl IdentifierAccumulator {
    /// Register the timestamp and, if nobody registered it before, accumulate the value.
    ///
    /// Returns false when the timestamp was already taken. When two workers race on the
    /// same timestamp exactly one of them gets true.
    #[inline]
    pub fn try_observe(&self, timestamp: i64, value: f64) -> bool {
        if !self.seen.insert(timestamp) {
            return false;
        }
        self.observe(timestamp, value);
        true
    }

    #[inline]
    fn observe(&self, timestamp: i64, value: f64) {
        self.count.fetch_add(1, ORDERING);
        add_f64(&self.sum, value);
        self.min.fetch_min(timestamp, ORDERING);
        self.max.fetch_max(timestamp, ORDERING);
    }

    /// Read the accumulated numbers. None if nothing was accepted.
    ///
    /// This is not a consistent cut while workers are still observing; the aggregator only
    /// calls it once every worker is done.
    pub fn snapshot(&self) -> Option<AggregatedStats> {
        let count = self.count.load(ORDERING);
        if count == 0 {
            return None;
        }
        Some(AggregatedStats::new(
            count,
            f64::from_bits(self.sum.load(ORDERING)),
            self.min.load(ORDERING),
            self.max.load(ORDERING),
        ))
    }
}

fn add_f64(cell: &AtomicU64, value: f64) {
    // The closure never declines, so this cannot fail.
    let _ = cell.fetch_update(ORDERING, ORDERING, |bits| {
        Some((f64::from_bits(bits) + value).to_bits())
    });
}
