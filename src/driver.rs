use crate::exec::Decoded;
use crate::isa::{InstrFormat, Mnemonic};
use crate::linker::{self, LinkError};
use crate::machine::{Machine, StepOutcome};
use crate::{constants, Exception, MemAddr, SWord, Word};
use std::error::Error as StdError;
use std::fmt;

/// Render formats for registers, memory words and bus wires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueFormat {
    /// 64-character binary string.
    Bin,
    /// `0x`-prefixed hexadecimal.
    Hex,
    /// Unsigned decimal.
    Dec,
    /// Signed two's-complement decimal.
    DecC2,
}

/// Formats one word in the requested rendering.
pub fn format_word(value: Word, format: ValueFormat) -> String {
    match format {
        ValueFormat::Bin => util::word_to_bits(value),
        ValueFormat::Hex => format!("{:#x}", value),
        ValueFormat::Dec => value.to_string(),
        ValueFormat::DecC2 => (value as SWord).to_string(),
    }
}

/// Result of a `run`/`resume` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    /// Execution suspended on an input read; push input and call
    /// [`Driver::resume`].
    NeedsInput(MemAddr),
}

/// One executed instruction in stepping mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Human-readable rendering of the executed instruction.
    pub text: String,
    /// Whether the instruction was the stop instruction.
    pub halted: bool,
}

/// Result of a single `step` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepEvent {
    Executed(StepReport),
    NeedsInput(MemAddr),
}

#[derive(Debug)]
pub enum DriverError {
    /// `step` was called without `start_stepping`.
    NotStepping,
    /// A register or memory query used an invalid range.
    BadRange,
    Link(LinkError),
    Exec(Exception),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DriverError::NotStepping => {
                f.write_str("Stepping not started; call start_stepping first")
            }
            DriverError::BadRange => f.write_str("Invalid register or memory range"),
            DriverError::Link(err) => write!(f, "{}", err),
            DriverError::Exec(err) => write!(f, "{}", err),
        }
    }
}

impl StdError for DriverError {}

impl From<LinkError> for DriverError {
    fn from(err: LinkError) -> DriverError {
        DriverError::Link(err)
    }
}

impl From<Exception> for DriverError {
    fn from(err: Exception) -> DriverError {
        DriverError::Exec(err)
    }
}

/// Host-facing orchestrator: owns the [`Machine`] and mediates loading,
/// running, stepping and state queries.
pub struct Driver {
    machine: Machine,
    stepping: bool,
    suspended: bool,
}

impl Default for Driver {
    fn default() -> Driver {
        Driver::new()
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            machine: Machine::new(),
            stepping: false,
            suspended: false,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// Links `image_text` and loads it into memory at `base`.
    pub fn load(&mut self, image_text: &str, base: MemAddr) -> Result<usize, DriverError> {
        Ok(linker::link_load(&mut self.machine, image_text, base)?)
    }

    /// Queues one line of input and clears nothing else; call
    /// [`resume`](#method.resume) (or `step` again) afterwards.
    pub fn push_input(&mut self, text: &str) {
        self.machine.terminal_mut().push_input(text);
    }

    /// Registers the callback receiving coalesced terminal output.
    pub fn set_write_callback<F>(&mut self, callback: F)
    where
        F: FnMut(MemAddr, &str) + 'static,
    {
        self.machine.terminal_mut().set_write_callback(callback);
    }

    /// Runs from `address` until the program halts or blocks on input.
    pub fn run(&mut self, address: MemAddr) -> Result<RunOutcome, DriverError> {
        self.machine.clear_run_flags();
        self.machine.prepare(address);
        self.machine.set_running(true);
        self.suspended = false;
        self.run_loop()
    }

    /// Continues after an input suspension by re-executing the latched
    /// instruction, then resuming the run loop.
    pub fn resume(&mut self) -> Result<RunOutcome, DriverError> {
        match self.exec_current()? {
            StepOutcome::Halted => return Ok(self.finish_halt()),
            StepOutcome::NeedsInput(address) => return Ok(self.finish_suspend(address)),
            StepOutcome::Done => {}
        }
        self.run_loop()
    }

    fn run_loop(&mut self) -> Result<RunOutcome, DriverError> {
        loop {
            if !self.machine.running() {
                return Ok(RunOutcome::Halted);
            }
            self.fetch_decode()?;
            match self.exec_current()? {
                StepOutcome::Halted => return Ok(self.finish_halt()),
                StepOutcome::NeedsInput(address) => return Ok(self.finish_suspend(address)),
                StepOutcome::Done => self.machine.terminal_mut().flush_due(),
            }
        }
    }

    // A blocking read parks the run; pending output (a prompt, usually) must
    // reach the host before it is asked to provide input.
    fn finish_suspend(&mut self, address: MemAddr) -> RunOutcome {
        self.machine.terminal_mut().flush_all();
        self.suspended = true;
        RunOutcome::NeedsInput(address)
    }

    fn fetch_decode(&mut self) -> Result<(), DriverError> {
        if let Err(err) = self.machine.fetch().and_then(|_| self.machine.decode()) {
            self.machine.set_running(false);
            return Err(err.into());
        }
        Ok(())
    }

    fn exec_current(&mut self) -> Result<StepOutcome, DriverError> {
        self.suspended = false;
        Ok(self.machine.execute()?)
    }

    fn finish_halt(&mut self) -> RunOutcome {
        self.machine.terminal_mut().flush_all();
        self.machine.set_running(false);
        RunOutcome::Halted
    }

    /// Prepares step-by-step execution from `address`.
    pub fn start_stepping(&mut self, address: MemAddr) {
        self.stepping = true;
        self.suspended = false;
        self.machine.clear_run_flags();
        self.machine.prepare(address);
        self.machine.set_running(true);
    }

    pub fn is_stepping(&self) -> bool {
        self.stepping
    }

    /// Executes exactly one instruction and renders it.
    ///
    /// After a [`StepEvent::NeedsInput`], push input and call `step` again:
    /// the suspended instruction is retried without a new fetch.
    pub fn step(&mut self) -> Result<StepEvent, DriverError> {
        if !self.stepping {
            return Err(DriverError::NotStepping);
        }
        if !self.suspended {
            self.fetch_decode()?;
        }
        let text = self
            .machine
            .decoded()
            .map(render_instruction)
            .unwrap_or_default();
        match self.exec_current()? {
            StepOutcome::Halted => {
                self.stepping = false;
                self.finish_halt();
                self.machine.clear_run_flags();
                Ok(StepEvent::Executed(StepReport { text, halted: true }))
            }
            StepOutcome::NeedsInput(address) => {
                self.finish_suspend(address);
                Ok(StepEvent::NeedsInput(address))
            }
            StepOutcome::Done => {
                self.machine.terminal_mut().flush_due();
                Ok(StepEvent::Executed(StepReport {
                    text,
                    halted: false,
                }))
            }
        }
    }

    /// Leaves stepping mode and clears the run flags.
    pub fn stop_stepping(&mut self) {
        self.stepping = false;
        self.suspended = false;
        self.machine.clear_run_flags();
    }

    /// Stops the emulation: flushes pending output and clears the run flags
    /// without touching registers or memory.
    pub fn stop(&mut self) {
        self.machine.terminal_mut().flush_all();
        self.machine.clear_run_flags();
        self.stepping = false;
        self.suspended = false;
    }

    // ----- state queries -----

    pub fn register_content(&self, index: usize, format: ValueFormat) -> Result<String, DriverError> {
        if index >= constants::REGISTER_COUNT {
            return Err(DriverError::BadRange);
        }
        Ok(format_word(self.machine.register(index).u(), format))
    }

    pub fn registers_range_content(
        &self,
        start: usize,
        end: usize,
        format: ValueFormat,
    ) -> Result<Vec<String>, DriverError> {
        if start > end || end >= constants::REGISTER_COUNT {
            return Err(DriverError::BadRange);
        }
        Ok((start..=end)
            .map(|i| format_word(self.machine.register(i).u(), format))
            .collect())
    }

    pub fn memory_content(&self, address: MemAddr, format: ValueFormat) -> Result<String, DriverError> {
        if !self.machine.memory().check_address(address) {
            return Err(DriverError::BadRange);
        }
        Ok(format_word(self.machine.memory().peek(address), format))
    }

    pub fn memory_range_content(
        &self,
        start: MemAddr,
        end: MemAddr,
        format: ValueFormat,
    ) -> Result<Vec<String>, DriverError> {
        if start > end || !self.machine.memory().check_address(end) {
            return Err(DriverError::BadRange);
        }
        Ok((start..=end)
            .map(|address| format_word(self.machine.memory().peek(address), format))
            .collect())
    }

    /// Contents of one whole memory segment.
    pub fn segment_content(
        &self,
        segment: crate::memory::Segment,
        format: ValueFormat,
    ) -> Vec<String> {
        let (start, end) = segment.range();
        (start..=end)
            .map(|address| format_word(self.machine.memory().peek(address), format))
            .collect()
    }

    /// Addresses written since the machine was constructed.
    pub fn modified_addresses(&self) -> Vec<MemAddr> {
        self.machine.memory().modified_addresses().collect()
    }

    pub fn databus_content(&self, format: ValueFormat) -> String {
        format_word(self.machine.bus().data(), format)
    }

    pub fn addressbus_content(&self, format: ValueFormat) -> String {
        format_word(self.machine.bus().address(), format)
    }

    pub fn controlbus_content(&self, format: ValueFormat) -> String {
        format_word(self.machine.bus().control(), format)
    }
}

/// Display name of register `index`: the special registers by role, the
/// general-purpose ones as `Rk`.
pub fn register_name(index: u32) -> String {
    match index as usize {
        constants::REG_PC => "PC".to_string(),
        constants::REG_SP => "SP".to_string(),
        constants::REG_IR => "IR".to_string(),
        constants::REG_STATE => "STATE".to_string(),
        _ => format!("R{}", index),
    }
}

/// Renders a decoded instruction for observers: mnemonic plus decoded
/// operand names. A `GUARD` with R = 0 prints as a pure memory store.
pub fn render_instruction(decoded: &Decoded) -> String {
    match decoded.format {
        InstrFormat::N => decoded.mnemonic.to_string(),
        InstrFormat::RR => format!(
            "{} {}, {}",
            decoded.mnemonic,
            register_name(decoded.r),
            register_name(decoded.rp)
        ),
        InstrFormat::R => format!("{} {}", decoded.mnemonic, register_name(decoded.r)),
        InstrFormat::RM => {
            if decoded.mnemonic == Mnemonic::GUARD && decoded.r == 0 {
                format!("GUARD M[{}]", decoded.m)
            } else {
                format!(
                    "{} {}, {}",
                    decoded.mnemonic,
                    register_name(decoded.r),
                    decoded.m
                )
            }
        }
        InstrFormat::RI => format!(
            "{} {}, {}",
            decoded.mnemonic,
            register_name(decoded.r),
            decoded.v
        ),
        InstrFormat::J => format!("{} {}", decoded.mnemonic, decoded.m),
    }
}
