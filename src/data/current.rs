//! Latest known controller state.

use super::series::Sample;

/// The most recent reading reported by the controller.
///
/// Starts at the unknown sentinel (zeroed values, no timestamp) until the
/// first fetch or push arrives, so renderers never have to special-case a
/// missing reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurrentReading {
    /// Measured temperature in degrees Celsius.
    pub temperature: f64,
    /// Fan duty cycle as a percentage (0-100).
    pub fan_speed: u8,
    /// Time of the reading in epoch milliseconds, `None` until known.
    pub timestamp: Option<u64>,
}

impl CurrentReading {
    /// Update the projection from a sample.
    pub fn observe(&mut self, sample: Sample) {
        self.temperature = sample.temperature;
        self.fan_speed = sample.fan_speed;
        self.timestamp = Some(sample.timestamp);
    }

    /// False until the first real reading arrives.
    pub fn is_known(&self) -> bool {
        self.timestamp.is_some()
    }
}
