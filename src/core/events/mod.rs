

pub mod base;
pub mod bus;

pub use base::{Event, EventKind};
pub use bus::{EventBus, EventHandler};
