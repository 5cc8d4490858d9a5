use crate::alu::{self, Registers};
use crate::bus::{Bus, Control};
use crate::exec::{self, Decoded};
use crate::io::Terminal;
use crate::isa::Mnemonic;
use crate::memory::Memory;
use crate::register::Register;
use crate::{constants, Exception, MemAddr, Word};

/// Result of executing one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction completed; PC points at the next one.
    Done,
    /// The instruction was `PARA`; the halted flag is set.
    Halted,
    /// A read from the I/O range found the input queue empty. No state was
    /// modified; re-invoking [`Machine::execute`] retries the same
    /// instruction from the latched IR.
    NeedsInput(MemAddr),
}

/// The complete machine: register file, memory, bus wires and terminal.
///
/// CPU state persists across runs until [`reset`] is called. The
/// fetch/decode/execute split is exposed so the driver can render the
/// current instruction between `decode` and `execute` and can re-enter
/// `execute` after an input suspension.
///
/// [`reset`]: #method.reset
pub struct Machine {
    registers: Registers,
    memory: Memory,
    bus: Bus,
    terminal: Terminal,
    decoded: Option<Decoded>,
    running: bool,
    halted: bool,
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new()
    }
}

impl Machine {
    pub fn new() -> Machine {
        let mut machine = Machine {
            registers: [Register::default(); constants::REGISTER_COUNT],
            memory: Memory::new(),
            bus: Bus::new(),
            terminal: Terminal::new(),
            decoded: None,
            running: false,
            halted: false,
        };
        machine.reset();
        machine
    }

    /// Resets the observable CPU state: registers zeroed, SP back at the top
    /// of the stack segment, run flags cleared. Memory is left alone.
    pub fn reset(&mut self) {
        for register in self.registers.iter_mut() {
            register.set_u(0);
        }
        self.registers[constants::REG_SP].set_u(Word::from(constants::STACK_RANGE.1));
        self.decoded = None;
        self.running = false;
        self.halted = false;
    }

    /// Clears the run/halt flags without touching registers or memory.
    pub fn clear_run_flags(&mut self) {
        self.running = false;
        self.halted = false;
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn register(&self, index: usize) -> Register {
        self.registers[index]
    }

    /// Host-side register write; the executor never goes through here.
    pub fn set_register(&mut self, index: usize, value: Word) {
        self.registers[index].set_u(value);
    }

    pub fn flag(&self, bit: Word) -> bool {
        self.registers[constants::REG_STATE].u() & bit != 0
    }

    pub fn pc(&self) -> Word {
        self.registers[constants::REG_PC].u()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    /// Fields of the instruction currently latched for execution.
    pub fn decoded(&self) -> Option<&Decoded> {
        self.decoded.as_ref()
    }

    /// Loads PC with `address`.
    pub fn prepare(&mut self, address: MemAddr) {
        self.registers[constants::REG_PC].set_u(Word::from(address));
    }

    pub(crate) fn bus_read(&mut self, address: MemAddr) -> Result<Word, Exception> {
        self.bus.write_address(address);
        self.bus.write_control(Control::ReadMemory);
        self.bus.action(&mut self.memory, &mut self.terminal)?;
        Ok(self.bus.data())
    }

    pub(crate) fn bus_write(&mut self, address: MemAddr, value: Word) -> Result<(), Exception> {
        self.bus.write_address(address);
        self.bus.write_data(value);
        self.bus.write_control(Control::WriteMemory);
        self.bus.action(&mut self.memory, &mut self.terminal)
    }

    /// Writes `words` into memory starting at `base`, through the bus.
    pub fn load_words(&mut self, base: MemAddr, words: &[Word]) -> Result<(), Exception> {
        for (i, &word) in words.iter().enumerate() {
            self.bus_write(base + i as MemAddr, word)?;
        }
        Ok(())
    }

    fn word_to_addr(word: Word) -> Result<MemAddr, Exception> {
        if word < Word::from(constants::MEMORY_SIZE) {
            Ok(word as MemAddr)
        } else {
            Err(Exception::OutOfRange(word))
        }
    }

    /// Reads memory at PC into IR and advances PC by one.
    pub fn fetch(&mut self) -> Result<(), Exception> {
        let pc = Self::word_to_addr(self.registers[constants::REG_PC].u())?;
        let word = self.bus_read(pc)?;
        self.registers[constants::REG_IR].set_u(word);
        self.registers[constants::REG_PC].set_u(Word::from(pc) + 1);
        Ok(())
    }

    /// Decodes IR and latches the result for [`execute`].
    ///
    /// [`execute`]: #method.execute
    pub fn decode(&mut self) -> Result<(), Exception> {
        let decoded = exec::decode(self.registers[constants::REG_IR].u())?;
        self.decoded = Some(decoded);
        Ok(())
    }

    fn set_pc(&mut self, address: MemAddr) {
        self.registers[constants::REG_PC].set_u(Word::from(address));
    }

    fn push(&mut self, value: Word) -> Result<(), Exception> {
        let sp = self.registers[constants::REG_SP].u();
        let address = Self::word_to_addr(sp)?;
        self.bus_write(address, value)?;
        self.registers[constants::REG_SP].set_u(sp.wrapping_sub(1));
        Ok(())
    }

    fn pop(&mut self) -> Result<Word, Exception> {
        let sp = self.registers[constants::REG_SP].u().wrapping_add(1);
        let address = Self::word_to_addr(sp)?;
        let value = self.bus_read(address)?;
        self.registers[constants::REG_SP].set_u(sp);
        Ok(value)
    }

    /// Executes the latched instruction.
    ///
    /// Returns [`StepOutcome::NeedsInput`] instead of an error when the
    /// instruction blocked on the input queue; any real exception halts the
    /// machine.
    pub fn execute(&mut self) -> Result<StepOutcome, Exception> {
        let decoded = self
            .decoded
            .expect("execute called without a decoded instruction");
        match self.dispatch(&decoded) {
            Ok(outcome) => Ok(outcome),
            Err(Exception::InputNeeded(address)) => Ok(StepOutcome::NeedsInput(address)),
            Err(exception) => {
                self.running = false;
                Err(exception)
            }
        }
    }

    fn dispatch(&mut self, d: &Decoded) -> Result<StepOutcome, Exception> {
        use Mnemonic::*;

        let rd = d.r as usize;
        let rp = d.rp as usize;

        match d.mnemonic {
            SUMA => {
                let (a, b) = (self.registers[rd].i(), self.registers[rp].i());
                alu::add(&mut self.registers, rd, a, b);
            }
            RESTA => {
                let (a, b) = (self.registers[rd].i(), self.registers[rp].i());
                alu::sub(&mut self.registers, rd, a, b);
            }
            MULT => {
                let (a, b) = (self.registers[rd].i(), self.registers[rp].i());
                alu::mul(&mut self.registers, rd, a, b);
            }
            DIVI => {
                let (a, b) = (self.registers[rd].i(), self.registers[rp].i());
                alu::div(&mut self.registers, rd, a, b)?;
            }
            COPIA => {
                let value = self.registers[rp].u();
                self.registers[rd].set_u(value);
            }
            COMP => {
                let (a, b) = (self.registers[rd].i(), self.registers[rp].i());
                alu::compare(&mut self.registers, a, b);
            }
            CARGAIND => {
                let address = Self::word_to_addr(self.registers[rp].u())?;
                let value = self.bus_read(address)?;
                self.registers[rd].set_u(value);
            }
            GUARDIND => {
                let address = Self::word_to_addr(self.registers[rp].u())?;
                let value = self.registers[rd].u();
                self.bus_write(address, value)?;
            }

            LIMP => self.registers[rd].set_u(0),
            INCRE => {
                let a = self.registers[rd].i();
                alu::add(&mut self.registers, rd, a, 1);
            }
            DECRE => {
                let a = self.registers[rd].i();
                alu::sub(&mut self.registers, rd, a, 1);
            }
            APILA => {
                let value = self.registers[rd].u();
                self.push(value)?;
            }
            DESAPILA => {
                let value = self.pop()?;
                self.registers[rd].set_u(value);
            }

            CARGA => {
                let value = self.bus_read(d.m)?;
                self.registers[rd].set_u(value);
            }
            GUARD => {
                let value = self.registers[rd].u();
                self.bus_write(d.m, value)?;
            }
            SIREGCERO => {
                if self.registers[rd].u() == 0 {
                    self.set_pc(d.m);
                }
            }
            SIREGNCERO => {
                if self.registers[rd].u() != 0 {
                    self.set_pc(d.m);
                }
            }

            ICARGA => self.registers[rd].set_i(d.v),
            ISUMA => {
                let a = self.registers[rd].i();
                alu::add(&mut self.registers, rd, a, d.v);
            }
            IRESTA => {
                let a = self.registers[rd].i();
                alu::sub(&mut self.registers, rd, a, d.v);
            }
            IMULT => {
                let a = self.registers[rd].i();
                alu::mul(&mut self.registers, rd, a, d.v);
            }
            IDIVI => {
                let a = self.registers[rd].i();
                alu::div(&mut self.registers, rd, a, d.v)?;
            }
            IAND => {
                let result = self.registers[rd].i() & d.v;
                self.registers[rd].set_i(result);
            }
            IOR => {
                let result = self.registers[rd].i() | d.v;
                self.registers[rd].set_i(result);
            }
            IXOR => {
                let result = self.registers[rd].i() ^ d.v;
                self.registers[rd].set_i(result);
            }
            ICOMP => {
                let a = self.registers[rd].i();
                alu::compare(&mut self.registers, a, d.v);
            }

            SALTA => self.set_pc(d.m),
            LLAMA => {
                let pc = self.registers[constants::REG_PC].u();
                self.push(pc)?;
                self.set_pc(d.m);
            }
            SICERO => {
                if self.flag(constants::FLAG_ZERO) {
                    self.set_pc(d.m);
                }
            }
            SINCERO => {
                if !self.flag(constants::FLAG_ZERO) {
                    self.set_pc(d.m);
                }
            }
            SIPOS | SIMAYOR => {
                if self.flag(constants::FLAG_POSITIVE) {
                    self.set_pc(d.m);
                }
            }
            SINEG | SIMENOR => {
                if self.flag(constants::FLAG_NEGATIVE) {
                    self.set_pc(d.m);
                }
            }
            SIOVERFL => {
                if self.flag(constants::FLAG_OVERFLOW) {
                    self.set_pc(d.m);
                }
            }
            INTERRUP => self.terminal.flush_all(),

            PARA => {
                self.halted = true;
                return Ok(StepOutcome::Halted);
            }
            VUELVE => {
                let address = Self::word_to_addr(self.pop()?)?;
                self.set_pc(address);
            }
            PROCRASTINA => {}
        }

        Ok(StepOutcome::Done)
    }
}
