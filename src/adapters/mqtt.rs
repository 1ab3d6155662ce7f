//! MQTT publisher adapter.
//!
//! Implements [`PublisherPort`] on top of the synchronous `rumqttc`
//! client.  `rumqttc` only makes network progress while its
//! [`Connection`] is iterated, so after the broker acknowledges the
//! CONNECT the adapter hands the connection to one background thread.
//! That thread only forwards the first connection error back; the next
//! publish returns it and the loop ends.  Nothing is reconnected.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, trace};
use rumqttc::{Client, Connection, ConnectionError, Event, MqttOptions, Packet, QoS};

use crate::app::ports::PublisherPort;
use crate::config::BridgeConfig;
use crate::error::PublishError;

const KEEP_ALIVE: Duration = Duration::from_secs(60);
/// Outgoing requests buffered between the loop and the network thread.
const QUEUE_CAPACITY: usize = 16;

pub struct MqttPublisher {
    client: Client,
    failure: Receiver<String>,
}

impl MqttPublisher {
    /// Connect to the configured broker and wait for its CONNACK.
    ///
    /// Credentials are sent only when a username is configured.
    pub fn connect(config: &BridgeConfig) -> Result<Self, PublishError> {
        let mut options = MqttOptions::new(
            client_id(),
            config.broker.host.clone(),
            config.broker.port,
        );
        options.set_keep_alive(KEEP_ALIVE);
        if let Some(creds) = &config.credentials {
            options.set_credentials(
                creds.username.clone(),
                creds.password.clone().unwrap_or_default(),
            );
        }

        info!("MQTT: connecting to {}", config.broker);
        let (client, mut connection) = Client::new(options, QUEUE_CAPACITY);
        wait_for_connack(&mut connection)?;
        info!("MQTT: connected");

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("mqtt-io".into())
            .spawn(move || drive(connection, &tx))
            .map_err(|e| PublishError::Connect(format!("network thread: {e}")))?;

        Ok(Self { client, failure: rx })
    }

    /// Send DISCONNECT to the broker.
    pub fn disconnect(&mut self) -> Result<(), PublishError> {
        self.client
            .disconnect()
            .map_err(|e| PublishError::Rejected(e.to_string()))
    }

    fn check_connection(&self) -> Result<(), PublishError> {
        match self.failure.try_recv() {
            Ok(reason) => Err(PublishError::Disconnected(reason)),
            Err(TryRecvError::Empty) => Ok(()),
            Err(TryRecvError::Disconnected) => {
                Err(PublishError::Disconnected("network thread exited".into()))
            }
        }
    }
}

impl PublisherPort for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), PublishError> {
        self.check_connection()?;
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|e| PublishError::Rejected(e.to_string()))
    }

    fn check(&mut self) -> Result<(), PublishError> {
        self.check_connection()
    }
}

fn client_id() -> String {
    format!("picap-{}", std::process::id())
}

fn wait_for_connack(connection: &mut Connection) -> Result<(), PublishError> {
    for notification in connection.iter() {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                debug!("MQTT: {:?}", ack);
                return Ok(());
            }
            Ok(event) => trace!("MQTT: {:?}", event),
            Err(e) => return Err(PublishError::Connect(e.to_string())),
        }
    }
    Err(PublishError::Connect("event loop closed before CONNACK".into()))
}

fn drive(mut connection: Connection, failure: &Sender<String>) {
    for notification in connection.iter() {
        match notification {
            Ok(event) => trace!("MQTT: {:?}", event),
            Err(ConnectionError::RequestsDone) => {
                debug!("MQTT: client dropped, network thread exiting");
                return;
            }
            Err(e) => {
                error!("MQTT: connection error: {}", e);
                let _ = failure.send(e.to_string());
                return;
            }
        }
    }
}
