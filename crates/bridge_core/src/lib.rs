//! Stateful half of the bridge: display mirror, controller state machine and
//! the single-writer loop that drives both.

pub mod bridge;
pub mod controller;
pub mod mirror;
pub mod scheduler;
pub mod sinks;

pub use bridge::Bridge;
pub use controller::{ControllerAction, UiController};
pub use mirror::{CoalescingMirror, MirrorEvent, QUIET_WINDOW};
pub use scheduler::{
    BridgeEvent, CoalesceChannel, CoalesceTimers, ManualTimers, Scheduler, SchedulerHandle,
    TimerToken, TokioTimers,
};
pub use sinks::{DeviceSink, RemoteSink};
