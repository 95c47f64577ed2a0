//! Command router and tool surface.
//!
//! Each tool takes plain JSON in and gives a [`ToolResponse`] out, so the
//! same surface serves the UI, the CLI and a language-model agent.

mod definitions;
mod input;
mod response;
mod router;

pub use definitions::*;
pub use input::*;
pub use response::*;
pub use router::*;
