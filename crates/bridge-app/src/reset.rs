//! Fatal-Fault Trap and Reset Cause
//!
//! The host analog of the hardware watchdog reboot and the reset-cause
//! register. `AbortReset` drops a sentinel file and takes the process down;
//! the next boot finds the sentinel and raises the WDT-reset error bit.
//! Panics route to the same hook: faults are fatal by design, never
//! recovered.

use bridge_core::ResetHook;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

/// Why the process last went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    /// Normal power-on or explicit restart
    PowerOn,
    /// The fault trap fired: watchdog expiry or a trapped panic
    Watchdog,
}

/// Default sentinel location.
pub fn default_sentinel() -> PathBuf {
    std::env::temp_dir().join("serial-wireless-bridge.wdt")
}

/// Reset hook that records the cause and aborts the process immediately.
/// Abort, not exit: no destructors, no unwinding, the closest a process
/// gets to a hardware reset.
pub struct AbortReset {
    sentinel: PathBuf,
}

impl AbortReset {
    pub fn new(sentinel: PathBuf) -> Self {
        Self { sentinel }
    }

    pub fn sentinel(&self) -> &Path {
        &self.sentinel
    }
}

impl ResetHook for AbortReset {
    fn force_reset(&self) {
        let _ = fs::write(&self.sentinel, b"wdt");
        std::process::abort();
    }
}

/// Determine the prior reset cause and consume the sentinel so one forced
/// reset is reported exactly once.
pub fn take_reset_cause(sentinel: &Path) -> ResetCause {
    if sentinel.exists() {
        let _ = fs::remove_file(sentinel);
        ResetCause::Watchdog
    } else {
        ResetCause::PowerOn
    }
}

/// Route panics on any task or thread into the reset hook.
pub fn install_fault_trap(reset: Arc<dyn ResetHook>) {
    std::panic::set_hook(Box::new(move |info| {
        error!("fatal fault: {info}");
        reset.force_reset();
    }));
}
