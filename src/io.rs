use crate::{constants, MemAddr, Word};
use byteorder::ByteOrder;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use util::Endian;

/// Host callback invoked with coalesced terminal output.
pub type WriteCallback = Box<dyn FnMut(MemAddr, &str)>;

/// Bridge between the memory-mapped I/O range and the host.
///
/// The input side is a queue of words fed by [`push_input`]; a read from the
/// I/O range pops the head or reports that input is needed. The output side
/// decodes each written word into text and hands it to the registered
/// callback through a short coalescing window: adjacent writes to the same
/// address within the window are concatenated into a single notification,
/// and notifications always preserve program order.
///
/// [`push_input`]: #method.push_input
pub struct Terminal {
    input: VecDeque<Word>,
    sink: Option<WriteCallback>,
    pending: Option<Pending>,
    flush_delay: Duration,
    next_is_number: bool,
}

struct Pending {
    address: MemAddr,
    text: String,
    last_write: Instant,
}

impl Default for Terminal {
    fn default() -> Terminal {
        Terminal::new()
    }
}

impl Terminal {
    pub fn new() -> Terminal {
        Terminal {
            input: VecDeque::new(),
            sink: None,
            pending: None,
            flush_delay: Duration::from_millis(constants::IO_FLUSH_DELAY_MS),
            next_is_number: false,
        }
    }

    /// Registers the callback receiving coalesced output notifications.
    pub fn set_write_callback<F>(&mut self, callback: F)
    where
        F: FnMut(MemAddr, &str) + 'static,
    {
        self.sink = Some(Box::new(callback));
    }

    /// Queues one word of input. Text that parses as a decimal integer is
    /// stored as that value in two's complement; anything else is packed
    /// from its first eight UTF-8 bytes, little-endian.
    pub fn push_input(&mut self, text: &str) {
        self.input.push_back(encode_input(text));
    }

    pub fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn pop_input(&mut self) -> Option<Word> {
        self.input.pop_front()
    }

    /// Called by the memory system for every write into the I/O range.
    pub fn notify_write(&mut self, address: MemAddr, value: Word) {
        let text = match self.render_value(value) {
            Some(text) => text,
            None => return,
        };
        match &mut self.pending {
            Some(pending) if pending.address == address => {
                pending.text.push_str(&text);
                pending.last_write = Instant::now();
            }
            _ => {
                self.flush_all();
                self.pending = Some(Pending {
                    address,
                    text,
                    last_write: Instant::now(),
                });
            }
        }
    }

    /// Delivers the pending notification if its coalescing window elapsed.
    pub fn flush_due(&mut self) {
        let due = match &self.pending {
            Some(pending) => pending.last_write.elapsed() >= self.flush_delay,
            None => false,
        };
        if due {
            self.flush_all();
        }
    }

    /// Delivers any pending notification immediately.
    pub fn flush_all(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Some(sink) = &mut self.sink {
                sink(pending.address, &pending.text);
            }
        }
    }

    // Decode rules for one output word; `None` means the word was a marker
    // consumed by the terminal itself.
    fn render_value(&mut self, value: Word) -> Option<String> {
        let mut bytes = [0u8; 8];
        Endian::write_u64(&mut bytes, value);

        if bytes[0] == 0xFF && bytes[1] == 0x4E && bytes[7] == 0x02 {
            self.next_is_number = true;
            return None;
        }
        if self.next_is_number {
            self.next_is_number = false;
            return Some(value.to_string());
        }
        if value == constants::IO_NEWLINE_MARKER {
            return Some("\n".to_string());
        }

        let stripped_len = 8 - bytes.iter().rev().take_while(|&&b| b == 0).count();
        let stripped = &bytes[..stripped_len];
        if stripped.is_empty() {
            return Some(String::new());
        }
        if stripped.len() > 1 {
            if stripped.iter().all(|&b| is_printable(b)) {
                if let Ok(text) = std::str::from_utf8(stripped) {
                    return Some(text.to_string());
                }
            }
            return Some(value.to_string());
        }
        let byte = stripped[0];
        if (32..=126).contains(&byte) {
            Some((byte as char).to_string())
        } else {
            Some(value.to_string())
        }
    }

    #[cfg(test)]
    fn set_flush_delay(&mut self, delay: Duration) {
        self.flush_delay = delay;
    }
}

fn is_printable(byte: u8) -> bool {
    (32..=126).contains(&byte) || byte == b'\t' || byte == b'\n' || byte == b'\r'
}

/// Encodes one line of host input as a word (decimal integer, or the first
/// up-to-eight UTF-8 bytes packed little-endian).
pub fn encode_input(text: &str) -> Word {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        if let Ok(number) = trimmed.parse::<i64>() {
            return number as Word;
        }
    }
    let mut bytes = [0u8; 8];
    let raw = text.as_bytes();
    let len = raw.len().min(8);
    bytes[..len].copy_from_slice(&raw[..len]);
    Endian::read_u64(&bytes)
}

/// Packs up to eight bytes of UTF-8 text into a word, little-endian.
pub fn pack_text(chunk: &[u8]) -> Word {
    assert!(chunk.len() <= 8);
    let mut bytes = [0u8; 8];
    bytes[..chunk.len()].copy_from_slice(chunk);
    Endian::read_u64(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collecting_terminal() -> (Terminal, Rc<RefCell<Vec<(MemAddr, String)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut terminal = Terminal::new();
        terminal.set_write_callback(move |address, text| {
            sink.borrow_mut().push((address, text.to_string()));
        });
        (terminal, log)
    }

    #[test]
    fn input_encodes_decimals_and_text() {
        assert_eq!(encode_input("42"), 42);
        assert_eq!(encode_input("-1"), u64::max_value());
        assert_eq!(encode_input("hi"), u64::from(b'h') | u64::from(b'i') << 8);
    }

    #[test]
    fn push_then_pop_is_fifo() {
        let mut terminal = Terminal::new();
        assert!(!terminal.has_input());
        terminal.push_input("1");
        terminal.push_input("2");
        assert_eq!(terminal.pop_input(), Some(1));
        assert_eq!(terminal.pop_input(), Some(2));
        assert_eq!(terminal.pop_input(), None);
    }

    #[test]
    fn adjacent_writes_coalesce() {
        let (mut terminal, log) = collecting_terminal();
        let address = constants::IO_RANGE.0;
        terminal.notify_write(address, pack_text(b"he"));
        terminal.notify_write(address, pack_text(b"llo"));
        terminal.notify_write(address, constants::IO_NEWLINE_MARKER);
        terminal.flush_all();
        assert_eq!(&*log.borrow(), &[(address, "hello\n".to_string())]);
    }

    #[test]
    fn writes_to_distinct_addresses_flush_in_order() {
        let (mut terminal, log) = collecting_terminal();
        let a = constants::IO_RANGE.0;
        let b = a + 1;
        terminal.notify_write(a, pack_text(b"x"));
        terminal.notify_write(b, pack_text(b"y"));
        terminal.flush_all();
        assert_eq!(
            &*log.borrow(),
            &[(a, "x".to_string()), (b, "y".to_string())]
        );
    }

    #[test]
    fn flush_due_honours_the_window() {
        let (mut terminal, log) = collecting_terminal();
        terminal.set_flush_delay(Duration::from_millis(0));
        terminal.notify_write(constants::IO_RANGE.0, pack_text(b"ok"));
        terminal.flush_due();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn numeric_marker_forces_decimal_rendering() {
        let (mut terminal, log) = collecting_terminal();
        let address = constants::IO_RANGE.0;
        terminal.notify_write(address, constants::IO_NUMERIC_MARKER);
        terminal.notify_write(address, 72); // would otherwise print 'H'
        terminal.flush_all();
        assert_eq!(&*log.borrow(), &[(address, "72".to_string())]);
    }

    #[test]
    fn decode_heuristics() {
        let mut terminal = Terminal::new();
        assert_eq!(terminal.render_value(pack_text(b"hola")).unwrap(), "hola");
        assert_eq!(terminal.render_value(u64::from(b'A')).unwrap(), "A");
        assert_eq!(terminal.render_value(7).unwrap(), "7");
        assert_eq!(terminal.render_value(0).unwrap(), "");
        assert_eq!(
            terminal
                .render_value(constants::IO_NEWLINE_MARKER)
                .unwrap(),
            "\n"
        );
        // Non-printable multi-byte values fall back to decimal.
        assert_eq!(terminal.render_value(0x0102).unwrap(), "258");
    }
}
