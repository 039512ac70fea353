//! Per-identifier aggregation of timestamped numeric events.
//!
//! Feed [`Event`]s in, in any order and from as many workers as you like, and get back one
//! [`AggregatedStats`] per identifier: how many events were accepted, the earliest and
//! latest timestamp, and the mean value.
//!
//! Events are filtered before they are counted:
//! * absent events, blank identifiers and values that are NaN, infinite or negative are dropped.
//! * an event whose identifier and timestamp were already accepted is a duplicate and is
//!   dropped. Which of several duplicates is kept is not defined under concurrency.
//!
//! Nothing is reported about dropped events. The only failure an aggregation can have is one
//! raised by the event source itself, and the `try_` drivers return it untouched.
//!
//! # Examples
//!
//! ```
//! use event_aggregator::{aggregate, aggregate_parallel, Event};
//!
//! let events = vec![
//!     Event::new("b", 300, 2.0),
//!     Event::new("b", 100, 4.0),
//!     Event::new("b", 200, 6.0),
//! ];
//! let result = aggregate(events.clone());
//! assert_eq!(3, result["b"].count);
//! assert_eq!(100, result["b"].min_timestamp);
//! assert_eq!(300, result["b"].max_timestamp);
//! assert_eq!(4.0, result["b"].average);
//!
//! let partitions = events.chunks(2).map(<[Event]>::to_vec);
//! assert_eq!(result, aggregate_parallel(partitions));
//! ```
//!
//! If you drive the workers yourself, share an [`Aggregator`] and call
//! [`Aggregator::finish`] once they are all done.
//!
//! # Feature Flags
//!
//! * `ahash-hasher`: use ahash for the identifier shards and the duplicate sets.

#[cfg(not(feature = "ahash-hasher"))]
use std::collections::hash_map::RandomState;

#[cfg(feature = "ahash-hasher")]
use ahash::RandomState;

/// Alias for the default hasher, selected by the ahash-hasher crate feature
pub(crate) type Hasher = RandomState;

mod accumulator;
pub mod aggregation;
pub mod aggregator;
pub mod drive;
pub mod sink;
pub mod types;

pub use aggregation::{AggregatedStats, AggregatedStatsMap};
pub use aggregator::{Aggregator, Observation, Rejection};
pub use drive::{
    aggregate, aggregate_channel, aggregate_parallel, aggregate_stream, aggregate_streams,
    try_aggregate, try_aggregate_parallel, try_aggregate_stream,
};
pub use sink::Sink;
pub use types::Event;
