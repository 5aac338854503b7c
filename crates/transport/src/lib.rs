//! I/O edges of the bridge: OSC over UDP toward the remote platform and
//! SysEx over MIDI toward the controller. Everything inbound is posted into
//! the scheduler queue; everything outbound is drained from a channel by a
//! dedicated writer task.

pub mod device;
pub mod error;
pub mod osc;
pub mod remote;

pub use error::TransportError;
