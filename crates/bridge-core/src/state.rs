//! Shared Bridge State
//!
//! One `Bridge` instance exists for the lifetime of the process. Both core
//! loops and the tick producer reach the queues, the sticky error mask, and
//! the timer bank only through its single mutex — the global critical
//! section. Every operation takes the lock once, does a small bounded amount
//! of work, and returns immediately; nothing in here blocks on the other
//! core.

use crate::timers::{SoftwareTimer, TimerBank};
use crate::watchdog::{Core, ResetHook};
use ring_queue::RingQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Byte capacity of every queue kind.
pub const QUEUE_CAPACITY: usize = 1024;

/// The queue kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Application bytes destined for the wireless transport
    WirelessSend,
    /// Bytes destined for the UART wire
    UartSend,
    /// Bytes received from the UART wire
    UartRecv,
    /// Bytes received from the wireless transport (reserved in the external
    /// contract; feeds the inbound pump internally)
    WirelessRecv,
}

impl QueueKind {
    const fn index(self) -> usize {
        self as usize
    }
}

/// Everything guarded by the critical section.
struct BridgeState {
    queues: [RingQueue; 4],
    error_bits: u32,
    timers: TimerBank,
}

impl BridgeState {
    fn new() -> Self {
        Self {
            queues: [
                RingQueue::new(QUEUE_CAPACITY),
                RingQueue::new(QUEUE_CAPACITY),
                RingQueue::new(QUEUE_CAPACITY),
                RingQueue::new(QUEUE_CAPACITY),
            ],
            error_bits: 0,
            timers: TimerBank::new(),
        }
    }
}

/// Process-wide bridge state plus the watchdog ownership token and the
/// reset hook.
pub struct Bridge {
    state: Mutex<BridgeState>,
    /// `true` when it is Core1's turn to clear the watchdog guard
    wdt_turn_core1: AtomicBool,
    reset: Arc<dyn ResetHook>,
}

impl Bridge {
    /// Create the bridge state with the given reset hook.
    pub fn new(reset: Arc<dyn ResetHook>) -> Self {
        Self {
            state: Mutex::new(BridgeState::new()),
            wdt_turn_core1: AtomicBool::new(false),
            reset,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BridgeState> {
        // A poisoned lock means a core task panicked mid-operation; the
        // panic hook is already forcing a reset, so keep the state usable
        // until the process goes down.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Enqueue a block of bytes into the named queue, all-or-nothing.
    pub fn enqueue(&self, kind: QueueKind, data: &[u8]) -> bool {
        self.lock().queues[kind.index()].enqueue(data)
    }

    /// Dequeue exactly `out.len()` bytes from the named queue, all-or-nothing.
    pub fn dequeue(&self, kind: QueueKind, out: &mut [u8]) -> bool {
        self.lock().queues[kind.index()].dequeue(out)
    }

    /// Dequeue a single byte from the named queue.
    pub fn dequeue_byte(&self, kind: QueueKind) -> Option<u8> {
        self.lock().queues[kind.index()].dequeue_byte()
    }

    /// Occupied byte count of the named queue.
    pub fn queue_len(&self, kind: QueueKind) -> usize {
        self.lock().queues[kind.index()].len()
    }

    /// OR the given bits into the sticky error mask.
    pub fn set_error_bits(&self, bits: u32) {
        let mut state = self.lock();
        if state.error_bits & bits != bits {
            state.error_bits |= bits;
            info!("error bits now {:#06x}", state.error_bits);
        }
    }

    /// Current sticky error mask.
    pub fn error_bits(&self) -> u32 {
        self.lock().error_bits
    }

    /// Clear the sticky error mask. Only ever called on explicit external
    /// request; the core never clears it on its own.
    pub fn clear_error_bits(&self) {
        self.lock().error_bits = 0;
    }

    /// Advance the timer bank by one millisecond.
    ///
    /// Invoked once per period by the tick producer, on whichever context
    /// runs it. When the watchdog guard reaches its threshold this calls the
    /// reset hook — the hard bounded-time liveness guarantee.
    pub fn tick(&self) {
        let watchdog_fired = self.lock().timers.tick();
        if watchdog_fired {
            error!("watchdog guard expired; forcing reset");
            self.reset.force_reset();
        }
    }

    /// Reset the named timer to zero.
    pub fn clear_timer(&self, timer: SoftwareTimer) {
        self.lock().timers.clear(timer);
    }

    /// Whether the named timer has reached its threshold.
    pub fn is_elapsed(&self, timer: SoftwareTimer) -> bool {
        self.lock().timers.is_elapsed(timer)
    }

    /// Cooperative watchdog clear.
    ///
    /// If the ownership token currently names `core`, clear the watchdog
    /// guard and hand the token to the other core. A core that stops looping
    /// stops both clearing and handing the token onward, so a permanent
    /// stall on either core leaves the guard running to expiry.
    pub fn maybe_clear_watchdog(&self, core: Core) {
        let core1_turn = self.wdt_turn_core1.load(Ordering::Acquire);
        let my_turn = match core {
            Core::Core0 => !core1_turn,
            Core::Core1 => core1_turn,
        };
        if my_turn {
            self.clear_timer(SoftwareTimer::WatchdogGuard);
            // Only the owning core flips the token, never the other one.
            self.wdt_turn_core1
                .store(core == Core::Core0, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    struct CountingReset(AtomicUsize);

    impl ResetHook for CountingReset {
        fn force_reset(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_bridge() -> (Arc<Bridge>, Arc<CountingReset>) {
        let hook = Arc::new(CountingReset(AtomicUsize::new(0)));
        (Arc::new(Bridge::new(hook.clone())), hook)
    }

    #[test]
    fn test_error_bits_are_sticky() {
        let (bridge, _) = test_bridge();
        bridge.set_error_bits(crate::error::ERR_DROP_UART_SEND);
        bridge.set_error_bits(crate::error::ERR_WIRELESS_SEND_FAILED);
        assert_eq!(
            bridge.error_bits(),
            crate::error::ERR_DROP_UART_SEND | crate::error::ERR_WIRELESS_SEND_FAILED
        );
        bridge.clear_error_bits();
        assert_eq!(bridge.error_bits(), 0);
    }

    #[test]
    fn test_watchdog_alternation_never_resets() {
        let (bridge, hook) = test_bridge();
        // Both cores keep looping: clears alternate and the guard never
        // reaches its threshold.
        for _ in 0..12_000 {
            bridge.maybe_clear_watchdog(Core::Core0);
            bridge.maybe_clear_watchdog(Core::Core1);
            bridge.tick();
        }
        assert_eq!(hook.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_watchdog_stall_resets_exactly_once() {
        let (bridge, hook) = test_bridge();
        // Core0 clears once and hands the token over; Core1 never runs.
        bridge.maybe_clear_watchdog(Core::Core0);
        for _ in 0..5000 {
            bridge.maybe_clear_watchdog(Core::Core0);
            bridge.tick();
        }
        assert_eq!(hook.0.load(Ordering::SeqCst), 1);
        // The counter saturates; no second reset without a clear.
        for _ in 0..5000 {
            bridge.tick();
        }
        assert_eq!(hook.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_enqueue_dequeue_no_loss() {
        const TOTAL: usize = 20_000;
        let (bridge, _) = test_bridge();

        let producer = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                let mut sent = 0u32;
                while sent < TOTAL as u32 {
                    let byte = (sent % 251) as u8;
                    if bridge.enqueue(QueueKind::UartSend, &[byte]) {
                        sent += 1;
                    }
                    // Queue full: defer to a later iteration, never block.
                }
            })
        };

        let consumer = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || {
                let mut received = 0u32;
                while received < TOTAL as u32 {
                    if let Some(byte) = bridge.dequeue_byte(QueueKind::UartSend) {
                        assert_eq!(byte, (received % 251) as u8, "byte out of order");
                        received += 1;
                    }
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
        assert_eq!(bridge.queue_len(QueueKind::UartSend), 0);
    }
}
