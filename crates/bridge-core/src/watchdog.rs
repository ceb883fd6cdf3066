//! Watchdog Supervision
//!
//! The two cores share one watchdog guard timer and take turns clearing it.
//! The turn token only ever moves forward through a core's own loop
//! iteration, so a permanent stall on either core — whichever one it is —
//! leaves the guard running and forces a reset within one timeout period.
//! The protocol is deliberately coarse: it detects that *a* core stalled,
//! not which one. Self-healing is reset, not diagnosis.

/// The two execution cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Core {
    Core0,
    Core1,
}

/// The fatal-fault trap.
///
/// Invoked on watchdog-guard expiry and from the process panic hook. There
/// is no recovery path behind it: implementations record the cause and take
/// the whole device down so it comes back in a known-good state. Test
/// implementations count invocations instead.
pub trait ResetHook: Send + Sync {
    fn force_reset(&self);
}
