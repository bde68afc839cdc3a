//! Bounded assembly of bytes into records.
use heapless::String;

#[derive(Debug, PartialEq, Eq)]
pub enum Feed<'a> {
    /// Nothing complete yet.
    Pending,
    /// A terminator closed a non-empty record.
    Record(&'a str),
    /// The record grew past capacity and was discarded.
    Overflow,
}

/// Accumulates printable ASCII until a newline or carriage return.
///
/// Other control bytes and non-ASCII bytes are dropped. A record returned by
/// [`LineAssembler::feed`] stays readable until the next call.
#[derive(Debug, Default)]
pub struct LineAssembler<const N: usize> {
    buf: String<N>,
    complete: bool,
}

impl<const N: usize> LineAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            complete: false,
        }
    }

    pub fn feed(&mut self, byte: u8) -> Feed<'_> {
        if self.complete {
            self.clear();
        }

        match byte {
            b'\n' | b'\r' if !self.buf.is_empty() => {
                self.complete = true;
                Feed::Record(self.buf.as_str())
            }
            b' '..=b'~' => {
                if self.buf.push(char::from(byte)).is_err() {
                    self.clear();
                    return Feed::Overflow;
                }
                Feed::Pending
            }
            _ => Feed::Pending,
        }
    }

    /// Characters buffered towards the next record.
    pub fn len(&self) -> usize {
        if self.complete {
            0
        } else {
            self.buf.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.complete = false;
    }
}
