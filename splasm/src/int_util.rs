use num::Num;
use splvm::Word;

fn split_radix(text: &str) -> (u32, String) {
    let (negative, body) = if text.starts_with('-') {
        (true, &text[1..])
    } else {
        (false, text)
    };
    let (radix, digits) = if body.len() > 2 && (body.starts_with("0x") || body.starts_with("0X")) {
        (16, &body[2..])
    } else if body.len() > 2 && (body.starts_with("0b") || body.starts_with("0B")) {
        (2, &body[2..])
    } else {
        (10, body)
    };
    let mut normalized = String::with_capacity(digits.len() + 1);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(digits);
    (radix, normalized)
}

/// Parses a decimal, hexadecimal (`0x`) or binary (`0b`) literal, with an
/// optional leading minus sign.
pub fn parse_int<T: Num>(text: &str) -> Result<T, T::FromStrRadixErr> {
    let (radix, digits) = split_radix(text);
    T::from_str_radix(&digits, radix)
}

/// Parses a `.data` value: signed first, then the unsigned 64-bit range.
pub fn parse_data_word(text: &str) -> Option<Word> {
    if let Ok(value) = parse_int::<i64>(text) {
        return Some(value as Word);
    }
    parse_int::<Word>(text).ok()
}
