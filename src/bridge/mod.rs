//! Context and notification bridge.
//!
//! Every phase transition and intra-phase event is broadcast as a
//! [`SystemUpdate`]. Keep-alive pings and audio cues travel separately as
//! [`CoachSignal`]s.

mod notifier;
mod update;

pub use notifier::*;
pub use update::*;
