//! Types for the finished, immutable side of an aggregation

use std::collections::HashMap;

mod aggregated_stats;

pub use aggregated_stats::AggregatedStats;

/// The result of an aggregation: one summary per identifier that had at least one accepted event.
pub type AggregatedStatsMap = HashMap<String, AggregatedStats>;
