//! Status LED Control
//!
//! Blink at the LED cadence while the wireless link is down; solid on while
//! it is up. Link-up overrides the blink entirely, clearing the blink timer
//! so a stale expiry cannot toggle the LED the moment the link drops.

use bridge_core::{Bridge, SoftwareTimer};
use tracing::debug;

/// Where the LED state lands. On the board this is a GPIO write; on a host
/// it is a log line.
pub trait StatusLed: Send {
    fn set(&mut self, on: bool);
}

/// Host LED: logs transitions only.
pub struct LogLed {
    last: Option<bool>,
}

impl LogLed {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for LogLed {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLed for LogLed {
    fn set(&mut self, on: bool) {
        if self.last != Some(on) {
            debug!(led = if on { "on" } else { "off" }, "status LED");
            self.last = Some(on);
        }
    }
}

/// Blink/solid decision logic, run once per Core1 loop iteration.
pub struct LedControl {
    on: bool,
}

impl LedControl {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn update(&mut self, bridge: &Bridge, link_up: bool, led: &mut dyn StatusLed) {
        if link_up {
            self.on = true;
            bridge.clear_timer(SoftwareTimer::LedBlink);
        } else if bridge.is_elapsed(SoftwareTimer::LedBlink) {
            self.on = !self.on;
            bridge.clear_timer(SoftwareTimer::LedBlink);
        }
        led.set(self.on);
    }
}

impl Default for LedControl {
    fn default() -> Self {
        Self::new()
    }
}
