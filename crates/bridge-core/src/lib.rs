//! Bridge Core
//!
//! The concurrency and liveness substrate shared by both execution cores:
//! - `Bridge` / `BridgeState`: the fixed byte queues, sticky error bits, and
//!   software timers behind one global critical section
//! - the cooperative cross-core watchdog-clearing protocol
//! - the pump operations moving bytes between queues and the active
//!   wireless transport
//!
//! Everything here is polling-based and non-blocking: queue operations
//! report success or failure immediately, overflow drops data and raises a
//! sticky error bit, and the only supervisory action is a forced reset.

pub mod error;
pub mod pump;
pub mod state;
pub mod timers;
pub mod transport;
pub mod watchdog;

pub use error::TransportError;
pub use state::{Bridge, QueueKind, QUEUE_CAPACITY};
pub use timers::SoftwareTimer;
pub use transport::Transport;
pub use watchdog::{Core, ResetHook};
