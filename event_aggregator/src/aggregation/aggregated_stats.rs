/// The summary of every accepted event for one identifier.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct AggregatedStats {
    /// Count of accepted events
    pub count: u64,
    /// Smallest accepted timestamp
    pub min_timestamp: i64,
    /// Largest accepted timestamp
    pub max_timestamp: i64,
    /// Arithmetic mean of accepted values
    pub average: f64,
}

impl std::fmt::Display for AggregatedStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entry(&"count", &self.count)
            .entry(&"min_timestamp", &self.min_timestamp)
            .entry(&"max_timestamp", &self.max_timestamp)
            .entry(&"average", &self.average)
            .finish()
    }
}

impl AggregatedStats {
    pub(crate) fn new(count: u64, sum: f64, min_timestamp: i64, max_timestamp: i64) -> Self {
        let average = if count == 0 { 0.0 } else { sum / count as f64 };
        Self {
            count,
            min_timestamp,
            max_timestamp,
            average,
        }
    }

    /// The sum of accepted values, reconstructed from the average.
    ///
    /// Useful when merging summaries from separate aggregations.
    pub fn sum(&self) -> f64 {
        self.average * self.count as f64
    }
}
