//! Transcript interpretation
//!
//! Turns final transcripts into typed commands:
//! - normalize: lowercase + trim
//! - parser: ordered rule set, first match wins

mod command;
mod normalize;
mod parser;

pub use command::{Command, Route};
pub use parser::{CommandParser, RouteTable};
