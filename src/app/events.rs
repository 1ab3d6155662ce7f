//! Domain values: channels, touch transitions, and outbound bridge events.
//!
//! [`TouchEvent`]s are transient, built by the edge detector and handed
//! straight to the publisher.  [`BridgeEvent`]s go to the
//! [`EventSink`](super::ports::EventSink) port for logging.

use core::fmt;
use core::fmt::Write as _;

/// Number of capacitive sensing pads on the Pi Cap.
pub const CHANNEL_COUNT: u8 = 12;

/// One capacitive pad, guaranteed to lie in `0..CHANNEL_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Returns `None` for indices outside `0..CHANNEL_COUNT`.
    pub const fn new(index: u8) -> Option<Self> {
        if index < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// Bit for this channel in a 12-bit touch mask.
    pub const fn mask(self) -> u16 {
        1 << self.0
    }

    /// Every channel, in ascending index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..CHANNEL_COUNT).map(Self)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a touch transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    /// Untouched → touched.
    Touched,
    /// Touched → untouched.
    Released,
}

impl TouchKind {
    /// Last topic segment for this kind of event.
    pub const fn feed_name(self) -> &'static str {
        match self {
            Self::Touched => "picap-touched",
            Self::Released => "picap-released",
        }
    }
}

/// A single edge on a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub channel: Channel,
    pub kind: TouchKind,
}

impl TouchEvent {
    pub const fn touched(channel: Channel) -> Self {
        Self { channel, kind: TouchKind::Touched }
    }

    pub const fn released(channel: Channel) -> Self {
        Self { channel, kind: TouchKind::Released }
    }

    /// Message body: the channel index in decimal.
    pub fn payload(&self) -> heapless::String<2> {
        let mut s = heapless::String::new();
        // Two digits always fit: the largest index is 11.
        let _ = write!(s, "{}", self.channel.index());
        s
    }
}

/// Counters accumulated by the edge-detection loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Poll cycles executed.
    pub cycles: u64,
    /// Cycles in which the sensor reported a change.
    pub changes: u64,
    /// Events successfully handed to the publisher.
    pub published: u64,
}

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// The loop is about to poll for the first time.
    Started {
        touched_topic: String,
        released_topic: String,
    },

    /// An edge was published.
    Published { event: TouchEvent, topic: String },

    /// The loop observed cancellation and returned.
    Stopped(BridgeStats),
}
