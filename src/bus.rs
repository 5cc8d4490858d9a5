use crate::io::Terminal;
use crate::memory::Memory;
use crate::{constants, Exception, MemAddr, Word};
use num::traits::{FromPrimitive, ToPrimitive};
use num_derive::{FromPrimitive, ToPrimitive};

/// Commands carried on the control wire.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Control {
    Idle,
    ReadMemory,
    WriteMemory,
}

/// The three internal wires connecting the CPU, the loader and memory.
///
/// Transactions are explicit: a client latches the address, data and control
/// wires, then pulses [`action`] to execute the command against memory. The
/// wires keep their last values so the host can observe them.
///
/// [`action`]: #method.action
pub struct Bus {
    data: Word,
    address: Word,
    control: Word,
}

impl Default for Bus {
    fn default() -> Bus {
        Bus::new()
    }
}

impl Bus {
    pub fn new() -> Bus {
        Bus {
            data: 0,
            address: 0,
            control: 0,
        }
    }

    pub fn write_data(&mut self, value: Word) {
        self.data = value;
    }

    pub fn write_address(&mut self, address: MemAddr) {
        self.address = Word::from(address) & (Word::from(constants::MEMORY_SIZE) - 1);
    }

    pub fn write_control(&mut self, command: Control) {
        self.control = command.to_u64().unwrap_or(0);
    }

    pub fn data(&self) -> Word {
        self.data
    }

    pub fn address(&self) -> Word {
        self.address
    }

    pub fn control(&self) -> Word {
        self.control
    }

    /// Executes the latched command. A read latches the result back onto the
    /// data wire; an unknown control word leaves the wires untouched.
    pub fn action(
        &mut self,
        memory: &mut Memory,
        terminal: &mut Terminal,
    ) -> Result<(), Exception> {
        match Control::from_u64(self.control) {
            Some(Control::ReadMemory) => {
                self.data = memory.read(self.address as MemAddr, terminal)?;
            }
            Some(Control::WriteMemory) => {
                memory.write(self.address as MemAddr, self.data, terminal)?;
            }
            Some(Control::Idle) | None => {}
        }
        Ok(())
    }
}
