//! Character transports the console can be attached to.
//!
//! A transport delivers received bytes one at a time and accepts response
//! text through [`Emitter`]. Which transport a console serves is decided once,
//! when the driving loop is set up.

mod serial;
mod telnet;

use std::io;

use crate::console::Emitter;

pub use serial::Serial;
pub use telnet::TelnetServer;

pub trait Transport: Emitter {
    /// Next received byte, `None` when no more data is available.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Sends a received byte back unmodified.
    fn echo(&mut self, byte: u8);
}
