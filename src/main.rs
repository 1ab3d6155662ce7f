//! picap-mqtt: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  Mpr121<I2cdev>      MqttPublisher      LogEventSink         │
//! │  (TouchSensorPort)   (PublisherPort)    (EventSink)          │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────         │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │           TouchBridge (pure logic)                 │      │
//! │  │  edge detection · feed topics                      │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  CancelToken ◀── SIGINT / SIGTERM                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info, warn};

use picap_mqtt::adapters::log_sink::LogEventSink;
use picap_mqtt::adapters::mqtt::MqttPublisher;
use picap_mqtt::adapters::{picap, signals};
use picap_mqtt::app::cancel::CancelToken;
use picap_mqtt::app::service::TouchBridge;
use picap_mqtt::app::topics::FeedTopics;
use picap_mqtt::config::{self, Invocation};

fn main() -> Result<ExitCode> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ── 2. Arguments (before touching the bus or the broker) ──
    let config = match config::parse_invocation(std::env::args_os()) {
        Invocation::Run(config) => config,
        Invocation::Usage => {
            println!("{}", config::usage());
            return Ok(ExitCode::SUCCESS);
        }
    };

    info!("picap-mqtt v{}", env!("CARGO_PKG_VERSION"));

    // ── 3. Sensor bring-up ────────────────────────────────────
    let mut sensor = match picap::open(&config.i2c_bus, config.i2c_address) {
        Ok(sensor) => sensor,
        Err(e) => {
            error!("Pi Cap initialisation failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    // ── 4. Cancellation ───────────────────────────────────────
    let cancel = CancelToken::new();
    signals::install(&cancel).context("registering SIGINT/SIGTERM handlers")?;

    // ── 5. Broker ─────────────────────────────────────────────
    let mut publisher = MqttPublisher::connect(&config)
        .with_context(|| format!("connecting to MQTT broker {}", config.broker))?;

    // ── 6. Edge-detection loop ────────────────────────────────
    let mut bridge = TouchBridge::new(FeedTopics::new(config.username()));
    let mut sink = LogEventSink::new();

    bridge
        .run(&mut sensor, &mut publisher, &mut sink, &cancel, config.poll_interval)
        .context("touch bridge stopped")?;

    if let Err(e) = publisher.disconnect() {
        warn!("MQTT disconnect failed: {}", e);
    }
    Ok(ExitCode::SUCCESS)
}
