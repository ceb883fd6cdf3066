//! Fixed-Capacity Ring Queue
//!
//! Provides the circular byte queue used for every data path in the bridge.
//! Block operations are all-or-nothing: a write that does not fit, or a read
//! larger than the occupied count, fails without touching the queue.

mod queue;

pub use queue::RingQueue;
