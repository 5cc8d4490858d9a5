use splvm::isa::{InstrFormat, Mnemonic};
use splvm::{decode_fields, Word};

// Assembler-compatible rendering: plain register numbers, memory operands in
// `M[...]` form, so the output feeds straight back into `assemble`.
fn render_word(word: Word) -> String {
    let decoded = match decode_fields(word) {
        Some(decoded) => decoded,
        // Words with no opcode (data) round-trip as data directives.
        None => return format!(".data {}", word),
    };
    match decoded.format {
        InstrFormat::N => decoded.mnemonic.to_string(),
        InstrFormat::RR => format!("{} R{}, R{}", decoded.mnemonic, decoded.r, decoded.rp),
        InstrFormat::R => format!("{} R{}", decoded.mnemonic, decoded.r),
        InstrFormat::RM => {
            if decoded.mnemonic == Mnemonic::GUARD && decoded.r == 0 {
                format!("GUARD M[{}]", decoded.m)
            } else {
                format!("{} R{}, M[{}]", decoded.mnemonic, decoded.r, decoded.m)
            }
        }
        InstrFormat::RI => format!("{} R{}, {}", decoded.mnemonic, decoded.r, decoded.v),
        InstrFormat::J => format!("{} {}", decoded.mnemonic, decoded.m),
    }
}

/// Renders `words` as assembly text that reassembles to the same image.
pub fn disassemble(words: &[Word]) -> String {
    let mut out = String::new();
    for &word in words {
        out.push_str(&render_word(word));
        out.push('\n');
    }
    out
}
