//! Transport-agnostic text output.

use std::fmt;
use std::io::Write;

/// Line terminator sent after every `println`.
pub const NEWLINE: &str = "\r\n";

/// Where command responses go.
///
/// Every method returns the number of bytes the sink accepted, which may be
/// less than requested.
pub trait Emitter {
    fn print(&mut self, text: &str) -> usize;

    fn println(&mut self, text: &str) -> usize {
        self.print(text) + self.print(NEWLINE)
    }

    /// Formatted output, used for numbers and composite lines.
    fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> usize {
        match args.as_str() {
            Some(text) => self.print(text),
            None => self.print(&args.to_string()),
        }
    }
}

/// Captures output in memory.
impl Emitter for String {
    fn print(&mut self, text: &str) -> usize {
        self.push_str(text);
        text.len()
    }
}

/// Emits to any byte sink, typically the write half of a transport.
pub struct Echo<W> {
    inner: W,
}

impl<W: Write> Echo<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Writes one raw byte, used to echo input back.
    pub fn put_byte(&mut self, byte: u8) -> usize {
        self.put(&[byte])
    }

    fn put(&mut self, bytes: &[u8]) -> usize {
        match self.inner.write_all(bytes).and_then(|()| self.inner.flush()) {
            Ok(()) => bytes.len(),
            Err(e) => {
                log::warn!("console output dropped: {e}");
                0
            }
        }
    }
}

impl<W: Write> Emitter for Echo<W> {
    fn print(&mut self, text: &str) -> usize {
        self.put(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn println_terminates_with_crlf() {
        let mut out = String::new();
        let n = out.println("Loc function updated.");

        assert_eq!(out, "Loc function updated.\r\n");
        assert_eq!(n, out.len());
    }

    #[test]
    fn print_fmt_formats_numbers() {
        let mut out = String::new();
        out.print_fmt(format_args!("Loc {} deleted.", 4711));

        assert_eq!(out, "Loc 4711 deleted.");
    }

    #[test]
    fn echo_writes_through() {
        let mut echo = Echo::new(Vec::new());
        echo.put_byte(b'a');
        echo.println("dd");

        assert_eq!(echo.get_mut().as_slice(), b"add\r\n");
    }

    #[test]
    fn echo_reports_zero_on_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("unplugged"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut echo = Echo::new(Broken);
        assert_eq!(echo.print("help"), 0);
    }
}
