//! Telnet transport: one interactive session at a time over TCP.
//!
//! Option negotiation is kept to the minimum a line console needs. The
//! server offers to echo and to suppress go-ahead, so clients switch to
//! character mode and leave echoing to the console. Everything the client
//! sends inside IAC sequences is dropped, as is the NUL a client may send
//! after a carriage return.

use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use crate::console::Emitter;

use super::Transport;

const IAC: u8 = 255;
const DONT: u8 = 254;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;
const OPT_ECHO: u8 = 1;
const OPT_SGA: u8 = 3;

const CR: u8 = 0x0D;

const GREETING: &str = "WMC console. Type help for a list of commands.\r\n";

/// Accepts sessions on a TCP port.
pub struct TelnetServer {
    listener: TcpListener,
}

impl TelnetServer {
    pub fn bind(port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Blocks until a client connects.
    pub fn accept(&self) -> io::Result<TelnetSession<TcpStream>> {
        let (stream, peer) = self.listener.accept()?;
        log::info!("telnet session opened from {peer}");
        stream.set_nodelay(true)?;
        TelnetSession::open(stream)
    }
}

/// Where the receive filter is within the client's byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rx {
    Data,
    AfterCr,
    Command,
    Option,
    Sub,
    SubIac,
}

pub struct TelnetSession<S> {
    stream: BufReader<S>,
    rx: Rx,
}

impl<S: Read + Write> TelnetSession<S> {
    /// Negotiates options and greets the client.
    pub fn open(stream: S) -> io::Result<Self> {
        let mut session = Self {
            stream: BufReader::new(stream),
            rx: Rx::Data,
        };
        let out = session.stream.get_mut();
        out.write_all(&[IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA])?;
        out.write_all(GREETING.as_bytes())?;
        out.flush()?;
        Ok(session)
    }

    fn send(&mut self, bytes: &[u8]) -> usize {
        let out = self.stream.get_mut();
        match out.write_all(bytes).and_then(|()| out.flush()) {
            Ok(()) => bytes.len(),
            Err(e) => {
                log::warn!("telnet output dropped: {e}");
                0
            }
        }
    }

    /// Runs one byte through the IAC filter; `Some` if it is console data.
    fn filter(&mut self, byte: u8) -> Option<u8> {
        let (next, data) = match (self.rx, byte) {
            (Rx::Data | Rx::AfterCr, IAC) => (Rx::Command, None),
            (Rx::AfterCr, 0) => (Rx::Data, None),
            (Rx::Data | Rx::AfterCr, CR) => (Rx::AfterCr, Some(CR)),
            (Rx::Data | Rx::AfterCr, b) => (Rx::Data, Some(b)),
            // Escaped 0xFF is literal data.
            (Rx::Command, IAC) => (Rx::Data, Some(IAC)),
            (Rx::Command, WILL..=DONT) => (Rx::Option, None),
            (Rx::Command, SB) => (Rx::Sub, None),
            (Rx::Command | Rx::Option, _) => (Rx::Data, None),
            (Rx::Sub, IAC) => (Rx::SubIac, None),
            (Rx::Sub, _) => (Rx::Sub, None),
            (Rx::SubIac, SE) => (Rx::Data, None),
            (Rx::SubIac, _) => (Rx::Sub, None),
        };
        self.rx = next;
        data
    }
}

impl<S: Read + Write> Emitter for TelnetSession<S> {
    fn print(&mut self, text: &str) -> usize {
        self.send(text.as_bytes())
    }
}

impl<S: Read + Write> Transport for TelnetSession<S> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    if let Some(data) = self.filter(byte[0]) {
                        return Ok(Some(data));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn echo(&mut self, byte: u8) {
        if byte == IAC {
            self.send(&[IAC, IAC]);
        } else {
            self.send(&[byte]);
        }
    }
}
