//! Software Timer Bank
//!
//! Millisecond countdown-to-threshold counters advanced by the single 1 ms
//! tick producer. A counter saturates at its threshold and stays elapsed
//! until a consumer explicitly clears it.

/// Named software timers and their thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftwareTimer {
    /// Cross-core watchdog guard; expiry forces a reset
    WatchdogGuard,
    /// Post-power-on settling delay before the loops start
    BootStabilization,
    /// Frame-layer deadline for completing a partially received frame
    ReceiveTimeout,
    /// Status LED blink cadence
    LedBlink,
}

impl SoftwareTimer {
    const ALL: [SoftwareTimer; 4] = [
        SoftwareTimer::WatchdogGuard,
        SoftwareTimer::BootStabilization,
        SoftwareTimer::ReceiveTimeout,
        SoftwareTimer::LedBlink,
    ];

    /// Threshold in milliseconds.
    pub const fn threshold_ms(self) -> u32 {
        match self {
            SoftwareTimer::WatchdogGuard => 5000,
            SoftwareTimer::BootStabilization => 50,
            SoftwareTimer::ReceiveTimeout => 500,
            SoftwareTimer::LedBlink => 500,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// The bank of millisecond counters.
///
/// Lives inside `BridgeState`; all access goes through the bridge's critical
/// section, so counter reads are never torn across cores.
pub struct TimerBank {
    counters: [u32; 4],
}

impl TimerBank {
    pub fn new() -> Self {
        Self { counters: [0; 4] }
    }

    /// Advance every non-saturated counter by one millisecond.
    ///
    /// Returns `true` on exactly the tick that brings the watchdog guard to
    /// its threshold, so the caller fires the reset action once and only
    /// once per expiry.
    pub fn tick(&mut self) -> bool {
        let mut watchdog_fired = false;
        for timer in SoftwareTimer::ALL {
            let counter = &mut self.counters[timer.index()];
            if *counter < timer.threshold_ms() {
                *counter += 1;
                if timer == SoftwareTimer::WatchdogGuard && *counter == timer.threshold_ms() {
                    watchdog_fired = true;
                }
            }
        }
        watchdog_fired
    }

    /// Reset the named counter to zero, re-arming it.
    pub fn clear(&mut self, timer: SoftwareTimer) {
        self.counters[timer.index()] = 0;
    }

    /// Whether the named counter has reached its threshold.
    pub fn is_elapsed(&self, timer: SoftwareTimer) -> bool {
        self.counters[timer.index()] >= timer.threshold_ms()
    }
}

impl Default for TimerBank {
    fn default() -> Self {
        Self::new()
    }
}
