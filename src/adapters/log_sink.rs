//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bridge events to the `log` facade
//! (stderr via `env_logger` in the binary).

use log::info;

use crate::app::events::{BridgeEvent, TouchKind};
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::Started { touched_topic, released_topic } => {
                info!("START | touched={} released={}", touched_topic, released_topic);
            }
            BridgeEvent::Published { event, topic } => {
                let verb = match event.kind {
                    TouchKind::Touched => "touched",
                    TouchKind::Released => "released",
                };
                info!("TOUCH | ch={:>2} {:<8} -> {}", event.channel, verb, topic);
            }
            BridgeEvent::Stopped(stats) => {
                info!(
                    "STOP  | cycles={} changes={} published={}",
                    stats.cycles, stats.changes, stats.published
                );
            }
        }
    }
}
