//! Sandboxed runtime bridge: module loading over a message channel

pub mod bridge;
pub mod clock;
pub mod protocol;

pub use bridge::{BridgeError, LoadState, ModuleBridge};
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use protocol::{CollectingTransport, ModuleMessage, ModuleTransport};
