use crate::Word;
use std::error::Error as StdError;
use std::fmt;

/// Runtime conditions raised by the executor and the memory system.
///
/// Every variant except [`Exception::InputNeeded`] is a fatal trap: the
/// driver clears the running flag and surfaces it to the host.
/// `InputNeeded` is the cooperative suspension signal produced by a read
/// from the I/O range with an empty input queue; it never escapes
/// [`Machine::execute`](crate::Machine::execute), which converts it into a
/// [`StepOutcome::NeedsInput`](crate::StepOutcome::NeedsInput).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Exception {
    OutOfRange(Word),
    DivisionByZero,
    InvalidOpcode(Word),
    ReservedRegister(u32),
    InputNeeded(u32),
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Exception::OutOfRange(address) => {
                write!(f, "Memory address {} is out of range", address)
            }
            Exception::DivisionByZero => f.write_str("Division by zero"),
            Exception::InvalidOpcode(word) => {
                write!(f, "No opcode matches instruction word {:#018x}", word)
            }
            Exception::ReservedRegister(r) => {
                write!(f, "Instruction writes reserved register R{}", r)
            }
            Exception::InputNeeded(address) => {
                write!(f, "Read from input address {} requires input", address)
            }
        }
    }
}

impl StdError for Exception {}
