pub mod listener;
pub mod rates;
pub mod runner;
pub mod trigger;

pub use listener::{listen, spawn_stdin_listener, ListenerExit};
pub use rates::RatesPrinter;
pub use runner::{LoopState, RunSummary, SnapshotApp};
pub use trigger::SnapshotTrigger;
