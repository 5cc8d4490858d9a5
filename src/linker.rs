use crate::machine::Machine;
use crate::{constants, Exception, MemAddr};
use std::error::Error as StdError;
use std::fmt;

/// Errors raised while linking and loading a machine-code image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkError {
    EmptyImage,
    /// A line is blank inside the image.
    BlankLine(usize),
    BaseOutOfRange(MemAddr),
    /// The image does not fit between `base` and the end of the code range.
    DoesNotFit { base: MemAddr, len: usize },
    /// A `{…}` placeholder does not contain a decimal natural number, or the
    /// relocated address does not fit in 24 bits.
    BadPlaceholder { line: usize, text: String },
    /// A line is not exactly 64 bits after placeholder expansion.
    WrongWidth { line: usize, bits: usize },
    /// A line contains a character other than `0`, `1` or a placeholder.
    BadLine { line: usize },
    Memory(Exception),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkError::EmptyImage => f.write_str("Image contains no lines"),
            LinkError::BlankLine(line) => write!(f, "Line {}: blank line inside image", line),
            LinkError::BaseOutOfRange(base) => {
                write!(f, "Base address {} is outside the code range", base)
            }
            LinkError::DoesNotFit { base, len } => write!(
                f,
                "Image of {} words at base {} exceeds the code range (max {})",
                len,
                base,
                constants::CODE_RANGE.1
            ),
            LinkError::BadPlaceholder { line, text } => {
                write!(f, "Line {}: invalid relocation placeholder '{{{}}}'", line, text)
            }
            LinkError::WrongWidth { line, bits } => {
                write!(f, "Line {}: expected 64 bits, found {}", line, bits)
            }
            LinkError::BadLine { line } => write!(f, "Line {}: not a binary image line", line),
            LinkError::Memory(exception) => write!(f, "{}", exception),
        }
    }
}

impl StdError for LinkError {}

impl From<Exception> for LinkError {
    fn from(exception: Exception) -> LinkError {
        LinkError::Memory(exception)
    }
}

// Expands one `{decimal}` placeholder into the 24-bit relocated address.
fn expand_placeholder(line: &str, index: usize, base: MemAddr) -> Result<String, LinkError> {
    let open = line.find('{').unwrap();
    let close = match line.find('}') {
        Some(close) if close > open => close,
        _ => {
            return Err(LinkError::BadPlaceholder {
                line: index,
                text: line.to_string(),
            })
        }
    };
    let inner = &line[open + 1..close];
    let value: u64 = inner.parse().map_err(|_| LinkError::BadPlaceholder {
        line: index,
        text: inner.to_string(),
    })?;
    let relocated = value.saturating_add(u64::from(base));
    let bits = util::uint_to_bits(relocated, constants::ADDRESS_WIDTH).map_err(|_| {
        LinkError::BadPlaceholder {
            line: index,
            text: inner.to_string(),
        }
    })?;
    Ok(format!("{}{}{}", &line[..open], bits, &line[close + 1..]))
}

/// Relocates `image_text` to `base` and writes it into memory through the
/// bus, one word per line. Returns the number of words loaded.
pub fn link_load(machine: &mut Machine, image_text: &str, base: MemAddr) -> Result<usize, LinkError> {
    let lines: Vec<&str> = image_text.trim().lines().map(str::trim).collect();
    if lines.is_empty() || (lines.len() == 1 && lines[0].is_empty()) {
        return Err(LinkError::EmptyImage);
    }
    if base > constants::CODE_RANGE.1 {
        return Err(LinkError::BaseOutOfRange(base));
    }
    if base as usize + lines.len() - 1 > constants::CODE_RANGE.1 as usize {
        return Err(LinkError::DoesNotFit {
            base,
            len: lines.len(),
        });
    }

    for (i, &raw) in lines.iter().enumerate() {
        if raw.is_empty() {
            return Err(LinkError::BlankLine(i));
        }
        let expanded;
        let line = if raw.contains('{') {
            expanded = expand_placeholder(raw, i, base)?;
            &expanded
        } else {
            raw
        };
        if line.len() != 64 {
            return Err(LinkError::WrongWidth {
                line: i,
                bits: line.len(),
            });
        }
        let word = util::bits_to_word(line).map_err(|_| LinkError::BadLine { line: i })?;
        machine.bus_write(base + i as MemAddr, word)?;
    }

    Ok(lines.len())
}
