use std::fmt::Display;

/// One timestamped measurement for an identifier.
///
/// Events are supplied by the caller and only ever borrowed by the aggregator.
/// An absent event is expressed as `None` wherever the drivers accept
/// `Option<Event>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// What this event is about. Must contain something other than whitespace.
    pub id: String,
    /// When it happened. Only compared for ordering and equality.
    pub timestamp: i64,
    /// The measurement. Must be finite and not negative.
    pub value: f64,
}

impl Event {
    /// Create a new event
    ///
    /// ```
    /// # use event_aggregator::Event;
    /// let event = Event::new("sensor-1", 1_700_000_000, 21.5);
    /// assert!(event.is_valid());
    /// ```
    pub fn new(id: impl Into<String>, timestamp: i64, value: f64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            value,
        }
    }

    /// Whether this event passes the validity filter.
    ///
    /// ```
    /// # use event_aggregator::Event;
    /// assert!(!Event::new("  ", 1, 1.0).is_valid());
    /// assert!(!Event::new("a", 1, -1.0).is_valid());
    /// assert!(!Event::new("a", 1, f64::NAN).is_valid());
    /// assert!(!Event::new("a", 1, f64::INFINITY).is_valid());
    /// assert!(Event::new("a", 1, 0.0).is_valid());
    /// ```
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.has_id() && self.has_valid_value()
    }

    #[inline]
    pub(crate) fn has_id(&self) -> bool {
        !self.id.chars().all(is_blank_char)
    }

    #[inline]
    pub(crate) fn has_valid_value(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

/// Whether a character makes an id blank.
///
/// Narrower than [`char::is_whitespace`] in one way and wider in another: the no-break
/// spaces U+00A0, U+2007, U+202F and the next line control U+0085 are id characters,
/// while the information separators U+001C..U+001F are blank.
#[inline]
fn is_blank_char(c: char) -> bool {
    match c {
        '\t'..='\r' | '\u{1C}'..='\u{1F}' => true,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        c => c.is_whitespace(),
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}={}", self.id, self.timestamp, self.value)
    }
}

impl<T> From<(T, i64, f64)> for Event
where
    T: Into<String>,
{
    #[inline]
    fn from((id, timestamp, value): (T, i64, f64)) -> Self {
        Event::new(id, timestamp, value)
    }
}
