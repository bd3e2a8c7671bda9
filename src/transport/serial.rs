//! Serial transport: any byte reader paired with any byte writer.
//!
//! On the host this is stdin/stdout or an opened tty device. A terminal in
//! cooked mode ends lines with LF only, so stdin is read with
//! [`Serial::lf_as_cr`].

use std::io::{self, Read, Write};

use crate::console::{Echo, Emitter};

use super::Transport;

const CR: u8 = 0x0D;
const LF: u8 = 0x0A;

pub struct Serial<R, W> {
    rx: io::Bytes<R>,
    tx: Echo<W>,
    lf_as_cr: bool,
}

impl<R: Read, W: Write> Serial<R, W> {
    pub fn new(rx: R, tx: W) -> Self {
        Self {
            rx: rx.bytes(),
            tx: Echo::new(tx),
            lf_as_cr: false,
        }
    }

    /// Deliver line feeds as carriage returns.
    #[must_use]
    pub fn lf_as_cr(mut self) -> Self {
        self.lf_as_cr = true;
        self
    }
}

impl<R: Read, W: Write> Emitter for Serial<R, W> {
    fn print(&mut self, text: &str) -> usize {
        self.tx.print(text)
    }
}

impl<R: Read, W: Write> Transport for Serial<R, W> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.rx.next() {
                None => return Ok(None),
                Some(Ok(LF)) if self.lf_as_cr => return Ok(Some(CR)),
                Some(Ok(byte)) => return Ok(Some(byte)),
                Some(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
                Some(Err(e)) => return Err(e),
            }
        }
    }

    fn echo(&mut self, byte: u8) {
        self.tx.put_byte(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_until_exhausted() {
        let mut serial = Serial::new(&b"ok"[..], Vec::new());

        assert_eq!(serial.read_byte().unwrap(), Some(b'o'));
        assert_eq!(serial.read_byte().unwrap(), Some(b'k'));
        assert_eq!(serial.read_byte().unwrap(), None);
    }

    #[test]
    fn cooked_terminal_lines_end_with_cr() {
        let mut serial = Serial::new(&b"a\n"[..], Vec::new()).lf_as_cr();

        assert_eq!(serial.read_byte().unwrap(), Some(b'a'));
        assert_eq!(serial.read_byte().unwrap(), Some(CR));
    }

    #[test]
    fn echo_and_print_share_the_writer() {
        let mut serial = Serial::new(io::empty(), Vec::new());
        serial.echo(b'x');
        serial.println("y");

        assert_eq!(serial.tx.get_mut().as_slice(), b"xy\r\n");
    }
}
