//! Line assembly: raw bytes in, complete command lines out.

const LF: u8 = 0x0A;
const CR: u8 = 0x0D;

/// Buffer size used when none is configured.
pub const DEFAULT_CAPACITY: usize = 75;

/// Result of feeding one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    /// Byte stored or ignored; no line yet.
    Pending,

    /// Carriage return seen; the buffered line.
    Line(String),

    /// The buffer was full. It has been emptied, and the byte dropped with it.
    Overflow,
}

/// Accumulates bytes into a bounded, CR-terminated line.
#[derive(Debug)]
pub struct LineAssembler {
    buffer: Vec<u8>,
    capacity: usize,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LineAssembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Consumes one received byte. Never blocks.
    pub fn feed(&mut self, byte: u8) -> Assembled {
        match byte {
            LF => Assembled::Pending,
            CR => {
                let line = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.clear();
                Assembled::Line(line)
            }
            _ if self.buffer.len() >= self.capacity => {
                log::debug!("line overflow, {} bytes discarded", self.buffer.len() + 1);
                self.buffer.clear();
                Assembled::Overflow
            }
            _ => {
                self.buffer.push(byte);
                Assembled::Pending
            }
        }
    }

    /// Bytes buffered so far.
    #[cfg(test)]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}
