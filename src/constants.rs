use crate::Word;
use std::mem;

pub const WORD_BYTES: u32 = mem::size_of::<Word>() as u32;
pub const WORD_WIDTH: u32 = WORD_BYTES * 8;

pub const ADDRESS_WIDTH: u32 = 24;
pub const REG_ID_WIDTH: u32 = 5;
pub const IMMEDIATE_WIDTH: u32 = 32;

pub const REGISTER_COUNT: usize = 32;

/// Total memory size in words; addresses are `ADDRESS_WIDTH` bits wide.
pub const MEMORY_SIZE: u32 = 1 << ADDRESS_WIDTH;

// Memory map: four contiguous, disjoint ranges (inclusive bounds).
pub const CODE_RANGE: (u32, u32) = (0, 65_535);
pub const IO_RANGE: (u32, u32) = (65_536, 131_071);
pub const DATA_RANGE: (u32, u32) = (131_072, 8_388_607);
pub const STACK_RANGE: (u32, u32) = (8_388_608, MEMORY_SIZE - 1);

// Special registers. R4..R31 are general purpose.
pub const REG_PC: usize = 0;
pub const REG_SP: usize = 1;
pub const REG_IR: usize = 2;
pub const REG_STATE: usize = 3;
pub const REG_GP_START: usize = 4;

// Flag bits inside the STATE register.
pub const FLAG_ZERO: Word = 1 << 0;
pub const FLAG_POSITIVE: Word = 1 << 1;
pub const FLAG_NEGATIVE: Word = 1 << 2;
pub const FLAG_OVERFLOW: Word = 1 << 3;

/// Word written to the I/O range to flag the next value as numeric output.
/// Little-endian bytes `FF 4E 00 00 00 00 00 02`.
pub const IO_NUMERIC_MARKER: Word = 0x0200_0000_0000_4EFF;

/// Word rendered by the terminal as a line break.
/// Little-endian bytes `0A 00 00 00 00 00 00 01`.
pub const IO_NEWLINE_MARKER: Word = 0x0100_0000_0000_000A;

/// Milliseconds the terminal may hold output to coalesce adjacent writes.
pub const IO_FLUSH_DELAY_MS: u64 = 50;
