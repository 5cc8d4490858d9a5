//! Educational 64-bit virtual machine: memory, bus, register file, ALU,
//! CPU executor, loader and execution driver.
//!
//! The crate models the machine as explicit values. A [`Machine`] owns the
//! register file, the word-addressed [`Memory`], the [`Bus`] wires and the
//! [`Terminal`] I/O bridge; a [`Driver`] wraps a machine and mediates the
//! host-facing operations (load, run, step, stop, state queries).
//!
//! Programs are fixed-width 64-bit words. The instruction encoding uses a
//! variable-length opcode prefix (see [`isa`]) followed by register, memory
//! and immediate fields; decoding is a longest-matching-prefix lookup over
//! the static opcode table.

pub mod constants;
pub mod isa;

mod alu;
mod bus;
mod driver;
mod error;
mod exec;
mod io;
mod linker;
mod machine;
mod memory;
mod register;

pub use crate::bus::{Bus, Control};
pub use crate::driver::{Driver, DriverError, RunOutcome, StepEvent, StepReport, ValueFormat};
pub use crate::error::Exception;
pub use crate::exec::{decode_fields, Decoded};
pub use crate::io::{encode_input, pack_text, Terminal};
pub use crate::isa::*;
pub use crate::linker::{link_load, LinkError};
pub use crate::machine::{Machine, StepOutcome};
pub use crate::memory::{Memory, Segment};
pub use crate::register::Register;

/// Machine word: the unit of memory cells, registers and instructions.
pub type Word = u64;
/// Two's-complement view of a [`Word`].
pub type SWord = i64;
/// Memory address; only the low [`constants::ADDRESS_WIDTH`] bits are used.
pub type MemAddr = u32;
