//! Touch bridge, the hexagonal core.
//!
//! [`TouchBridge`] turns the sensor's per-channel state into touch and
//! release events and forwards each one to the publisher as soon as it
//! is detected.  All I/O flows through port traits passed in at call
//! sites, so the loop runs unchanged against mocks.
//!
//! ```text
//!  TouchSensorPort ──▶ ┌────────────────────────┐ ──▶ PublisherPort
//!                      │      TouchBridge        │
//!                      │  edge detect · topics   │ ──▶ EventSink
//!                      └────────────────────────┘
//! ```

use std::time::Duration;

use log::{debug, info};

use crate::error::Result;

use super::cancel::CancelToken;
use super::events::{BridgeEvent, BridgeStats, Channel, TouchEvent, TouchKind};
use super::ports::{EventSink, PublisherPort, TouchSensorPort};
use super::topics::FeedTopics;

/// Edge for `channel` in the sensor's latest snapshot, if any.
///
/// A new touch wins over a new release: the release check only runs when
/// the touch check is false, so at most one event comes back.
pub fn detect_edge(sensor: &impl TouchSensorPort, channel: Channel) -> Option<TouchEvent> {
    if sensor.is_new_touch(channel) {
        Some(TouchEvent::touched(channel))
    } else if sensor.is_new_release(channel) {
        Some(TouchEvent::released(channel))
    } else {
        None
    }
}

// ───────────────────────────────────────────────────────────────
// TouchBridge
// ───────────────────────────────────────────────────────────────

pub struct TouchBridge {
    topics: FeedTopics,
    stats: BridgeStats,
}

impl TouchBridge {
    pub fn new(topics: FeedTopics) -> Self {
        Self {
            topics,
            stats: BridgeStats::default(),
        }
    }

    // ── Per-cycle ─────────────────────────────────────────────

    /// Run one poll cycle and return how many events were published.
    ///
    /// The publisher's link is checked first, so a dead broker ends the
    /// loop even while no pad is touched.  When the sensor reports no
    /// change the cycle ends there: no refresh, no channel checks.  Any
    /// sensor or publish error aborts the cycle and is returned as-is.
    pub fn poll_once(
        &mut self,
        sensor: &mut impl TouchSensorPort,
        publisher: &mut impl PublisherPort,
        sink: &mut impl EventSink,
    ) -> Result<usize> {
        self.stats.cycles += 1;
        publisher.check()?;

        if !sensor.did_change()? {
            return Ok(0);
        }
        sensor.refresh()?;
        self.stats.changes += 1;

        let mut published = 0;
        for channel in Channel::all() {
            let Some(event) = detect_edge(&*sensor, channel) else {
                continue;
            };
            let topic = self.topics.topic_for(event.kind);
            publisher.publish(topic, event.payload().as_str())?;
            self.stats.published += 1;
            published += 1;
            sink.emit(&BridgeEvent::Published {
                event,
                topic: topic.to_owned(),
            });
        }

        if published == 0 {
            debug!("Touch status changed without a new edge");
        }
        Ok(published)
    }

    // ── Loop ──────────────────────────────────────────────────

    /// Poll until `cancel` is set, resting `interval` between cycles.
    ///
    /// Cancellation is checked before every poll.  The first error ends
    /// the loop; there is no retry.
    pub fn run(
        &mut self,
        sensor: &mut impl TouchSensorPort,
        publisher: &mut impl PublisherPort,
        sink: &mut impl EventSink,
        cancel: &CancelToken,
        interval: Duration,
    ) -> Result<BridgeStats> {
        sink.emit(&BridgeEvent::Started {
            touched_topic: self.topics.topic_for(TouchKind::Touched).to_owned(),
            released_topic: self.topics.topic_for(TouchKind::Released).to_owned(),
        });

        while !cancel.is_cancelled() {
            self.poll_once(sensor, publisher, sink)?;
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }

        info!("Cancellation observed after {} cycles", self.stats.cycles);
        sink.emit(&BridgeEvent::Stopped(self.stats));
        Ok(self.stats)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }
}
