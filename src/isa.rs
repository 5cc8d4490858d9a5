use crate::{constants, MemAddr, Word};
use util::{EnumFromStr, ParseEnumError};
use util_derive::EnumFromStr;

// Instruction encoding: one 64-bit word, variable-length opcode prefix.
//
//          +--------------------+------+------+
//          |63                  |      |     0|
//          +--------------------+------+------+
// N-format |      opcode (64)                 |
// RR-format|      opcode (54)   |  R   |  R'  |
// R-format |      opcode (59)          |  R   |
// RM-format| opcode (35) |  R   |   M (24)    |
// RI-format| opcode (27) |  R   |   V (32)    |
// J-format |      opcode (40)   |   M (24)    |
//          +--------------------+------+------+
//
// Opcode prefixes are prefix-free across the six lengths, so decoding is a
// longest-matching-prefix lookup over the static table below.

/// Instruction mnemonics, grouped by format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum Mnemonic {
    //  Mnemonic     | Format | Effect
    //---------------+--------+--------------------------------------------------
    // Arithmetic    |        |
    SUMA,         // | RR     | R = R + R'; updates flags
    RESTA,        // | RR     | R = R - R'; updates flags
    MULT,         // | RR     | R = R * R'; updates flags
    DIVI,         // | RR     | R = R / R' (truncating); traps on R' == 0
    //---------------+--------+--------------------------------------------------
    // Data moves    |        |
    COPIA,        // | RR     | R = R'
    COMP,         // | RR     | flags from R - R'; R unchanged
    CARGAIND,     // | RR     | R = MEM[R']
    GUARDIND,     // | RR     | MEM[R'] = R
    //---------------+--------+--------------------------------------------------
    // Register ops  |        |
    LIMP,         // | R      | R = 0
    INCRE,        // | R      | R = R + 1; updates flags
    DECRE,        // | R      | R = R - 1; updates flags
    APILA,        // | R      | MEM[SP] = R; SP -= 1
    DESAPILA,     // | R      | SP += 1; R = MEM[SP]
    //---------------+--------+--------------------------------------------------
    // Memory        |        |
    CARGA,        // | RM     | R = MEM[M]
    GUARD,        // | RM     | MEM[M] = R (R field may be 0)
    SIREGCERO,    // | RM     | PC = M if R == 0
    SIREGNCERO,   // | RM     | PC = M if R != 0
    //---------------+--------+--------------------------------------------------
    // Immediates    |        |
    ICARGA,       // | RI     | R = extend(V)
    ISUMA,        // | RI     | R = R + extend(V); updates flags
    IRESTA,       // | RI     | R = R - extend(V); updates flags
    IMULT,        // | RI     | R = R * extend(V); updates flags
    IDIVI,        // | RI     | R = R / extend(V); traps on V == 0
    IAND,         // | RI     | R = R & extend(V)
    IOR,          // | RI     | R = R | extend(V)
    IXOR,         // | RI     | R = R ^ extend(V)
    ICOMP,        // | RI     | flags from R - extend(V); R unchanged
    //---------------+--------+--------------------------------------------------
    // Jumps         |        |
    SALTA,        // | J      | PC = M
    LLAMA,        // | J      | MEM[SP] = PC; SP -= 1; PC = M
    SICERO,       // | J      | PC = M if flag Z
    SINCERO,      // | J      | PC = M if not flag Z
    SIPOS,        // | J      | PC = M if flag P
    SINEG,        // | J      | PC = M if flag N
    SIMAYOR,      // | J      | PC = M if flag P
    SIMENOR,      // | J      | PC = M if flag N
    SIOVERFL,     // | J      | PC = M if flag D
    INTERRUP,     // | J      | I/O trap: flush pending terminal output
    //---------------+--------+--------------------------------------------------
    // No operands   |        |
    PARA,         // | N      | stop execution
    VUELVE,       // | N      | SP += 1; PC = MEM[SP]
    PROCRASTINA,  // | N      | reserved scheduling yield; no effect
}

/// The six instruction shapes, named by their operand layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstrFormat {
    /// No operands; 64-bit opcode.
    N,
    /// Two registers; 54-bit opcode.
    RR,
    /// One register; 59-bit opcode.
    R,
    /// Register and 24-bit memory address; 35-bit opcode.
    RM,
    /// Register and 32-bit two's-complement immediate; 27-bit opcode.
    RI,
    /// 24-bit memory address; 40-bit opcode.
    J,
}

impl InstrFormat {
    /// Number of opcode prefix bits for this shape.
    pub fn opcode_len(self) -> u32 {
        match self {
            InstrFormat::N => 64,
            InstrFormat::R => 59,
            InstrFormat::RR => 54,
            InstrFormat::J => 40,
            InstrFormat::RM => 35,
            InstrFormat::RI => 27,
        }
    }
}

macro_rules! impl_enum_display {
    ($e:ty) => {
        impl std::fmt::Display for $e {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

impl_enum_display!(Mnemonic);
impl_enum_display!(InstrFormat);

use self::Mnemonic::*;

pub const MNEMONICS_N: &[Mnemonic] = &[PARA, VUELVE, PROCRASTINA];
pub const MNEMONICS_R: &[Mnemonic] = &[LIMP, INCRE, DECRE, APILA, DESAPILA];
pub const MNEMONICS_RR: &[Mnemonic] = &[SUMA, RESTA, MULT, DIVI, COPIA, COMP, CARGAIND, GUARDIND];
pub const MNEMONICS_J: &[Mnemonic] = &[
    SALTA, LLAMA, SICERO, SINCERO, SIPOS, SINEG, SIMAYOR, SIMENOR, SIOVERFL, INTERRUP,
];
pub const MNEMONICS_RM: &[Mnemonic] = &[CARGA, GUARD, SIREGCERO, SIREGNCERO];
pub const MNEMONICS_RI: &[Mnemonic] = &[
    ICARGA, ISUMA, IRESTA, IMULT, IDIVI, IAND, IOR, IXOR, ICOMP,
];

/// Opcode table buckets, ordered by descending prefix length so that a scan
/// finds the longest matching prefix first.
pub const OPCODE_TABLE: &[(InstrFormat, &[Mnemonic])] = &[
    (InstrFormat::N, MNEMONICS_N),
    (InstrFormat::R, MNEMONICS_R),
    (InstrFormat::RR, MNEMONICS_RR),
    (InstrFormat::J, MNEMONICS_J),
    (InstrFormat::RM, MNEMONICS_RM),
    (InstrFormat::RI, MNEMONICS_RI),
];

// Top three bits of every opcode prefix identify its bucket, which keeps the
// prefixes of different lengths from shadowing each other.
fn bucket_tag(format: InstrFormat) -> u64 {
    match format {
        InstrFormat::RI => 0b000,
        InstrFormat::RM => 0b001,
        InstrFormat::J => 0b010,
        InstrFormat::RR => 0b011,
        InstrFormat::R => 0b100,
        InstrFormat::N => 0b101,
    }
}

/// Returns the instruction shape of `mnemonic`.
pub fn format_of(mnemonic: Mnemonic) -> InstrFormat {
    for (format, bucket) in OPCODE_TABLE {
        if bucket.contains(&mnemonic) {
            return *format;
        }
    }
    unreachable!()
}

/// Opcode prefix of `mnemonic` as (bit length, prefix value).
pub fn opcode_bits(mnemonic: Mnemonic) -> (u32, u64) {
    for (format, bucket) in OPCODE_TABLE {
        if let Some(index) = bucket.iter().position(|m| *m == mnemonic) {
            let len = format.opcode_len();
            return (len, bucket_tag(*format) << (len - 3) | index as u64);
        }
    }
    unreachable!()
}

/// The opcode prefix of `mnemonic` shifted into place in an otherwise empty
/// instruction word.
pub fn opcode_word(mnemonic: Mnemonic) -> Word {
    let (len, bits) = opcode_bits(mnemonic);
    if len == 64 {
        bits
    } else {
        bits << (64 - len)
    }
}

/// Longest-matching-prefix lookup of `word` against the opcode table.
pub fn decode_opcode(word: Word) -> Option<(Mnemonic, InstrFormat)> {
    for (format, bucket) in OPCODE_TABLE {
        let len = format.opcode_len();
        let prefix = if len == 64 { word } else { word >> (64 - len) };
        for (index, &mnemonic) in bucket.iter().enumerate() {
            if prefix == bucket_tag(*format) << (len - 3) | index as u64 {
                return Some((mnemonic, *format));
            }
        }
    }
    None
}

/// Parses a mnemonic case-insensitively.
pub fn parse_mnemonic(name: &str) -> Result<Mnemonic, ParseEnumError> {
    EnumFromStr::from_str(&name.to_uppercase())
}

/// Returns whether `name` is a reserved ISA mnemonic.
pub fn is_mnemonic(name: &str) -> bool {
    parse_mnemonic(name).is_ok()
}

const REG_MASK: Word = (1 << constants::REG_ID_WIDTH) - 1;
const MEM_MASK: Word = (1 << constants::ADDRESS_WIDTH) - 1;

/// Constructs an N-format instruction word.
#[inline]
pub fn make_n_instruction(mnemonic: Mnemonic) -> Word {
    opcode_word(mnemonic)
}

/// Constructs an RR-format instruction word.
#[inline]
pub fn make_rr_instruction(mnemonic: Mnemonic, r: u32, rp: u32) -> Word {
    opcode_word(mnemonic) | (Word::from(r) & REG_MASK) << 5 | (Word::from(rp) & REG_MASK)
}

/// Constructs an R-format instruction word.
#[inline]
pub fn make_r_instruction(mnemonic: Mnemonic, r: u32) -> Word {
    opcode_word(mnemonic) | (Word::from(r) & REG_MASK)
}

/// Constructs an RM-format instruction word.
#[inline]
pub fn make_rm_instruction(mnemonic: Mnemonic, r: u32, m: MemAddr) -> Word {
    opcode_word(mnemonic) | (Word::from(r) & REG_MASK) << 24 | (Word::from(m) & MEM_MASK)
}

/// Constructs an RI-format instruction word.
#[inline]
pub fn make_ri_instruction(mnemonic: Mnemonic, r: u32, v: i32) -> Word {
    opcode_word(mnemonic) | (Word::from(r) & REG_MASK) << 32 | Word::from(v as u32)
}

/// Constructs a J-format instruction word.
#[inline]
pub fn make_j_instruction(mnemonic: Mnemonic, m: MemAddr) -> Word {
    opcode_word(mnemonic) | (Word::from(m) & MEM_MASK)
}

/// Constructs an N-format instruction word.
#[macro_export]
macro_rules! instr_n {
    ($mnemonic:ident) => {
        make_n_instruction(Mnemonic::$mnemonic)
    };
}

/// Constructs an RR-format instruction word.
#[macro_export]
macro_rules! instr_rr {
    ($mnemonic:ident, $r:expr, $rp:expr) => {
        make_rr_instruction(Mnemonic::$mnemonic, $r, $rp)
    };
}

/// Constructs an R-format instruction word.
#[macro_export]
macro_rules! instr_r {
    ($mnemonic:ident, $r:expr) => {
        make_r_instruction(Mnemonic::$mnemonic, $r)
    };
}

/// Constructs an RM-format instruction word.
#[macro_export]
macro_rules! instr_rm {
    ($mnemonic:ident, $r:expr, $m:expr) => {
        make_rm_instruction(Mnemonic::$mnemonic, $r, $m)
    };
}

/// Constructs an RI-format instruction word.
#[macro_export]
macro_rules! instr_ri {
    ($mnemonic:ident, $r:expr, $v:expr) => {
        make_ri_instruction(Mnemonic::$mnemonic, $r, $v)
    };
}

/// Constructs a J-format instruction word.
#[macro_export]
macro_rules! instr_j {
    ($mnemonic:ident, $m:expr) => {
        make_j_instruction(Mnemonic::$mnemonic, $m)
    };
}
