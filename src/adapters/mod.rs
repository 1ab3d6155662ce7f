//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to               |
//! |------------|------------------|---------------------------|
//! | `picap`    | TouchSensorPort  | MPR121 over Linux I2C     |
//! | `mqtt`     | PublisherPort    | MQTT broker (rumqttc)     |
//! | `log_sink` | EventSink        | `log` facade              |
//! | `signals`  | (CancelToken)    | SIGINT / SIGTERM          |

pub mod log_sink;
pub mod mqtt;
pub mod picap;
#[cfg(feature = "linux")]
pub mod signals;
