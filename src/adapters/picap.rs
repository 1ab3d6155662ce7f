//! Pi Cap adapter: the MPR121 driver behind [`TouchSensorPort`].
//!
//! The port impl is generic over the I2C bus so the simulated bus drives
//! the exact same code path as `/dev/i2c-*`.  Opening the real bus is
//! only compiled with the `linux` feature.

use embedded_hal::i2c::I2c;

use crate::app::events::Channel;
use crate::app::ports::TouchSensorPort;
use crate::error::SensorError;
use crate::sensors::Mpr121;

impl<I2C: I2c> TouchSensorPort for Mpr121<I2C> {
    fn did_change(&mut self) -> Result<bool, SensorError> {
        self.touch_status_changed()
    }

    fn refresh(&mut self) -> Result<(), SensorError> {
        self.update_touch_data()
    }

    fn is_new_touch(&self, channel: Channel) -> bool {
        Mpr121::is_new_touch(self, channel)
    }

    fn is_new_release(&self, channel: Channel) -> bool {
        Mpr121::is_new_release(self, channel)
    }
}

/// Open the Linux I2C device at `bus` and bring up the MPR121 at `address`.
#[cfg(feature = "linux")]
pub fn open(
    bus: &std::path::Path,
    address: u8,
) -> Result<Mpr121<linux_embedded_hal::I2cdev>, SensorError> {
    use log::info;

    let i2c = linux_embedded_hal::I2cdev::new(bus)
        .map_err(|e| SensorError::Unavailable(format!("{}: {}", bus.display(), e)))?;
    info!("Opened {}", bus.display());

    let mut sensor = Mpr121::new(i2c, address);
    sensor.begin(&mut linux_embedded_hal::Delay)?;
    Ok(sensor)
}
