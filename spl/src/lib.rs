//! End-to-end pipeline: SPL (or assembly) source → preprocessor → compiler
//! → assembler → loader → execution on a [`Driver`].

use splimg::Image;
use splvm::{Driver, DriverError, LinkError, MemAddr, RunOutcome};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;


#[derive(Debug)]
pub enum Error {
    Compile(splc::CompileError),
    Assemble(Box<splasm::Error>),
    Link(LinkError),
    Exec(DriverError),
    /// Execution blocked on input but the host had none to give.
    OutOfInput(MemAddr),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Compile(err) => write!(f, "{}", err),
            Error::Assemble(err) => write!(f, "{}", err),
            Error::Link(err) => write!(f, "{}", err),
            Error::Exec(err) => write!(f, "{}", err),
            Error::OutOfInput(address) => {
                write!(f, "Program waits for input at address {}", address)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<splc::CompileError> for Error {
    fn from(err: splc::CompileError) -> Error {
        Error::Compile(err)
    }
}

impl From<splasm::Error> for Error {
    fn from(err: splasm::Error) -> Error {
        Error::Assemble(Box::new(err))
    }
}

impl From<DriverError> for Error {
    fn from(err: DriverError) -> Error {
        Error::Exec(err)
    }
}

/// Artifacts of one pipeline invocation, kept around so hosts can inspect
/// the machine afterwards.
pub struct Session {
    pub driver: Driver,
    pub image: Image,
    pub symbols: splimg::SymbolTable,
    pub preprocessed: String,
    pub assembly: String,
    pub output: String,
}

impl Session {
    /// Address of a label in loaded memory, if it was declared.
    pub fn symbol_addr(&self, name: &str, base: MemAddr) -> Option<MemAddr> {
        self.symbols
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, index)| base + index)
    }
}

/// Compiles, assembles, links at `base` and runs `source` to completion.
///
/// `input` is polled whenever the program blocks on the I/O input address;
/// returning `None` aborts the run with [`Error::OutOfInput`].
pub fn run_source<F>(source: &str, base: MemAddr, input: F) -> Result<Session, Error>
where
    F: FnMut() -> Option<String>,
{
    let preprocessed =
        splc::preprocess(source, None).map_err(splc::CompileError::Preprocessor)?;
    let assembly = splc::compile(&preprocessed)?;
    let (image, symbols) = splasm::assemble(&assembly)?;
    run_image(image, symbols, preprocessed, assembly, base, input)
}

/// Preprocesses (resolving includes relative to `path`), then compiles and
/// runs a source file.
pub fn run_file<F>(path: &Path, base: MemAddr, input: F) -> Result<Session, Error>
where
    F: FnMut() -> Option<String>,
{
    let preprocessed = splc::preprocess_file(path).map_err(splc::CompileError::Preprocessor)?;
    let assembly = splc::compile(&preprocessed)?;
    let (image, symbols) = splasm::assemble(&assembly)?;
    run_image(image, symbols, preprocessed, assembly, base, input)
}

fn run_image<F>(
    image: Image,
    symbols: splimg::SymbolTable,
    preprocessed: String,
    assembly: String,
    base: MemAddr,
    mut input: F,
) -> Result<Session, Error>
where
    F: FnMut() -> Option<String>,
{
    let mut driver = Driver::new();

    let collected = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&collected);
    driver.set_write_callback(move |_, text| {
        sink.borrow_mut().push_str(text);
    });

    driver.load(&image.to_text(), base).map_err(|err| match err {
        DriverError::Link(link) => Error::Link(link),
        other => Error::Exec(other),
    })?;

    let entry = base + image.entry_index().unwrap_or(0);
    let mut outcome = driver.run(entry)?;
    loop {
        match outcome {
            RunOutcome::Halted => break,
            RunOutcome::NeedsInput(address) => match input() {
                Some(text) => {
                    driver.push_input(&text);
                    outcome = driver.resume()?;
                }
                None => return Err(Error::OutOfInput(address)),
            },
        }
    }

    let output = collected.borrow().clone();
    Ok(Session {
        driver,
        image,
        symbols,
        preprocessed,
        assembly,
        output,
    })
}

/// Convenience for hosts with a fixed list of input lines.
pub fn scripted_input(lines: &[&str]) -> impl FnMut() -> Option<String> {
    let mut queue: Vec<String> = lines.iter().rev().map(|s| s.to_string()).collect();
    move || queue.pop()
}
