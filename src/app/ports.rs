//! Port traits: the boundary between the bridge core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TouchBridge (domain)
//! ```
//!
//! The MPR121 driver, the MQTT client and the log sink implement these
//! traits.  [`TouchBridge`](super::service::TouchBridge) consumes them via
//! generics, so the core never touches the bus or the network directly.

use crate::error::{PublishError, SensorError};

use super::events::{BridgeEvent, Channel};

// ───────────────────────────────────────────────────────────────
// Touch sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port over a 12-channel capacitive touch controller.
///
/// The adapter keeps a previous and a current touch snapshot.  The two
/// edge predicates compare them, so for any channel at most one of
/// [`is_new_touch`](Self::is_new_touch) and
/// [`is_new_release`](Self::is_new_release) holds between refreshes.
pub trait TouchSensorPort {
    /// Whether the touch state differs from the current snapshot.
    /// Must not advance the snapshot.
    fn did_change(&mut self) -> Result<bool, SensorError>;

    /// Shift current → previous and load a fresh current snapshot.
    fn refresh(&mut self) -> Result<(), SensorError>;

    /// Untouched in the previous snapshot, touched in the current one.
    fn is_new_touch(&self, channel: Channel) -> bool;

    /// Touched in the previous snapshot, untouched in the current one.
    fn is_new_release(&self, channel: Channel) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Publisher port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget message publication.  No acknowledgement is consumed.
pub trait PublisherPort {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), PublishError>;

    /// Fails once the broker link is known to be gone, even if nothing
    /// has been published since.  Called once per poll cycle.
    fn check(&mut self) -> Result<(), PublishError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core reports lifecycle and publish activity through this port.
pub trait EventSink {
    fn emit(&mut self, event: &BridgeEvent);
}
