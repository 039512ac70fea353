//! Ways to run an aggregation over a whole event source.
//!
//! Each driver creates one [`Aggregator`], feeds it everything the source produces and
//! returns the finished map. Invalid and duplicate events are dropped silently. Only the
//! fallible drivers can fail, and only with the source's own error.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicBool, Ordering},
};

use futures::{future, Stream, StreamExt, TryStream, TryStreamExt};
use tokio::sync::mpsc;

use crate::{aggregation::AggregatedStatsMap, aggregator::Aggregator, types::Event};

/// Aggregate a finite sequence of events on the calling thread.
///
/// ```
/// # use event_aggregator::{aggregate, Event};
/// let result = aggregate([
///     Event::new("x", 10, 1.0),
///     Event::new("x", 10, 999.0),
///     Event::new("x", 20, 3.0),
/// ]);
/// assert_eq!(2, result["x"].count);
/// assert_eq!(2.0, result["x"].average);
/// ```
pub fn aggregate<TEvents>(events: TEvents) -> AggregatedStatsMap
where
    TEvents: IntoIterator,
    TEvents::Item: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    aggregator.observe_all(events);
    aggregator.finish()
}

/// Aggregate a sequence whose items can fail.
///
/// The first error is returned as-is and whatever was accumulated before it is dropped.
pub fn try_aggregate<TEvents, TEvent, TError>(events: TEvents) -> Result<AggregatedStatsMap, TError>
where
    TEvents: IntoIterator<Item = Result<TEvent, TError>>,
    TEvent: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    for event in events {
        let event: Option<Event> = event?.into();
        aggregator.observe(event.as_ref());
    }
    Ok(aggregator.finish())
}

/// Aggregate disjoint partitions of one logical sequence on scoped threads, all
/// contributing to one shared result.
///
/// At most one thread per available core is spawned. With more partitions than that,
/// each thread works through several partitions one after another.
///
/// A panic in a partition's iterator propagates to the caller.
pub fn aggregate_parallel<TPartitions>(partitions: TPartitions) -> AggregatedStatsMap
where
    TPartitions: IntoIterator,
    TPartitions::Item: IntoIterator + Send,
    <TPartitions::Item as IntoIterator>::Item: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    std::thread::scope(|scope| {
        for group in spread(partitions, worker_limit()) {
            let aggregator = &aggregator;
            scope.spawn(move || {
                for (_, partition) in group {
                    aggregator.observe_all(partition);
                }
            });
        }
    });
    aggregator.finish()
}

/// Aggregate partitions in parallel where the partitions' items can fail.
///
/// Threads are bounded the same way as [`aggregate_parallel`]. When one partition fails
/// the others stop at their next event. Of the partitions that failed, the error of the
/// earliest one in partition order is returned.
pub fn try_aggregate_parallel<TPartitions, TPartition, TEvent, TError>(
    partitions: TPartitions,
) -> Result<AggregatedStatsMap, TError>
where
    TPartitions: IntoIterator<Item = TPartition>,
    TPartition: IntoIterator<Item = Result<TEvent, TError>> + Send,
    TEvent: Into<Option<Event>>,
    TError: Send,
{
    let aggregator = Aggregator::new();
    let failed = AtomicBool::new(false);
    let first_failure = std::thread::scope(|scope| {
        let workers: Vec<_> = spread(partitions, worker_limit())
            .into_iter()
            .map(|group| {
                let aggregator = &aggregator;
                let failed = &failed;
                scope.spawn(move || {
                    for (index, partition) in group {
                        for event in partition {
                            if failed.load(Ordering::Relaxed) {
                                log::debug!("abandoning partition {index} after upstream failure");
                                return None;
                            }
                            match event {
                                Ok(event) => {
                                    let event: Option<Event> = event.into();
                                    aggregator.observe(event.as_ref());
                                }
                                Err(e) => {
                                    failed.store(true, Ordering::Relaxed);
                                    return Some((index, e));
                                }
                            }
                        }
                    }
                    None
                })
            })
            .collect();
        workers
            .into_iter()
            .filter_map(|worker| match worker.join() {
                Ok(failure) => failure,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .min_by_key(|(index, _)| *index)
    });
    match first_failure {
        Some((_, e)) => Err(e),
        None => Ok(aggregator.finish()),
    }
}

fn worker_limit() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Deal partitions round-robin into at most `workers` groups, keeping each partition's
/// position in the input.
fn spread<TPartitions>(
    partitions: TPartitions,
    workers: usize,
) -> Vec<Vec<(usize, TPartitions::Item)>>
where
    TPartitions: IntoIterator,
{
    let workers = workers.max(1);
    let mut groups: Vec<Vec<_>> = Vec::new();
    for (index, partition) in partitions.into_iter().enumerate() {
        match groups.get_mut(index % workers) {
            Some(group) => group.push((index, partition)),
            None => groups.push(vec![(index, partition)]),
        }
    }
    groups
}

/// Aggregate an async stream of events.
pub async fn aggregate_stream<TEvents>(events: TEvents) -> AggregatedStatsMap
where
    TEvents: Stream,
    TEvents::Item: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    events
        .for_each(|event| {
            let event: Option<Event> = event.into();
            aggregator.observe(event.as_ref());
            future::ready(())
        })
        .await;
    aggregator.finish()
}

/// Aggregate several async streams concurrently into one result.
///
/// The streams are polled together on the calling task.
pub async fn aggregate_streams<TStreams>(streams: TStreams) -> AggregatedStatsMap
where
    TStreams: IntoIterator,
    TStreams::Item: Stream,
    <TStreams::Item as Stream>::Item: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    future::join_all(streams.into_iter().map(|events| {
        let aggregator = &aggregator;
        events.for_each(move |event| {
            let event: Option<Event> = event.into();
            aggregator.observe(event.as_ref());
            future::ready(())
        })
    }))
    .await;
    aggregator.finish()
}

/// Aggregate an async stream whose items can fail. The first error is returned as-is.
pub async fn try_aggregate_stream<TEvents, TEvent, TError>(
    events: TEvents,
) -> Result<AggregatedStatsMap, TError>
where
    TEvents: TryStream<Ok = TEvent, Error = TError>,
    TEvent: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    events
        .try_for_each(|event| {
            let event: Option<Event> = event.into();
            aggregator.observe(event.as_ref());
            future::ready(Ok(()))
        })
        .await?;
    Ok(aggregator.finish())
}

/// Aggregate everything sent on a channel. Completes once every sender is dropped.
///
/// This suits producers that are spread over many tasks: give each one a clone of the
/// sender, then drop your own.
pub async fn aggregate_channel<TEvent>(mut receiver: mpsc::Receiver<TEvent>) -> AggregatedStatsMap
where
    TEvent: Into<Option<Event>>,
{
    let aggregator = Aggregator::new();
    while let Some(event) = receiver.recv().await {
        let event: Option<Event> = event.into();
        aggregator.observe(event.as_ref());
    }
    aggregator.finish()
}
