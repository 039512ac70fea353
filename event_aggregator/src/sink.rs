//! Push-style entry into an aggregation

use std::sync::Arc;

use crate::{aggregator::Aggregator, types::Event};

/// A drain that accepts Sunk
pub trait Sink<Sunk> {
    /// Take ownership of a value
    fn accept(&self, to_sink: Sunk);
}

impl Sink<Event> for Aggregator {
    #[inline]
    fn accept(&self, event: Event) {
        self.observe(&event);
    }
}

impl Sink<Option<Event>> for Aggregator {
    #[inline]
    fn accept(&self, event: Option<Event>) {
        self.observe(event.as_ref());
    }
}

impl<'a> Sink<&'a Event> for Aggregator {
    #[inline]
    fn accept(&self, event: &'a Event) {
        self.observe(event);
    }
}

impl<TSink, Sunk> Sink<Sunk> for Arc<TSink>
where
    TSink: Sink<Sunk> + ?Sized,
{
    #[inline]
    fn accept(&self, to_sink: Sunk) {
        self.as_ref().accept(to_sink)
    }
}

impl<TSink, Sunk> Sink<Sunk> for &TSink
where
    TSink: Sink<Sunk> + ?Sized,
{
    #[inline]
    fn accept(&self, to_sink: Sunk) {
        (**self).accept(to_sink)
    }
}
