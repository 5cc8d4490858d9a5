//! SPL compiler front end.
//!
//! The pipeline is preprocess → lex → parse/emit: [`preprocess`] expands
//! `#define`/`#include`, [`compile`] turns the expanded SPL source into
//! assembly text for the assembler. Input that already starts with an ISA
//! mnemonic is taken to be hand-written assembly and passed through
//! unchanged.
//!
//! Indentation delimits blocks. Before lexing, [`compile`] makes the block
//! structure explicit by inserting synthetic `BEGIN`/`END` lines wherever
//! the indentation width changes; literal `begin`/`end` keywords in the
//! source bypass the synthesis, so fully bracketed programs also work.

pub mod ast;
pub mod lexer;

mod emit;
mod error;
mod parser;
mod preprocessor;

pub use crate::emit::CompilationUnit;
pub use crate::error::{CompileError, LexError, PreprocessorError, SyntaxError};
pub use crate::preprocessor::{preprocess, preprocess_file, preprocess_with_lib};

use splvm::isa;

/// Compiles SPL source into assembly text. Hand-written assembly (detected
/// by its first word being a mnemonic) is returned unchanged.
pub fn compile(source: &str) -> Result<String, CompileError> {
    if is_assembly(source) {
        return Ok(source.to_string());
    }

    let prepared = explicit_blocks(source);
    let tokens = lexer::tokenize(&prepared)?;
    let mut cu = CompilationUnit::new();
    let mut lines = parser::parse_program(&tokens, &mut cu)?;

    // The program must stop before the data words that follow it.
    let ends_in_para = lines
        .iter()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.trim().eq_ignore_ascii_case("PARA"))
        .unwrap_or(false);
    if !ends_in_para {
        lines.push("PARA".to_string());
    }
    lines.append(&mut cu.data_section);

    Ok(lines.join("\n") + "\n")
}

// The first word of the first non-empty line decides: known mnemonic means
// the input is already assembly.
fn is_assembly(source: &str) -> bool {
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let word: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        return !word.is_empty() && isa::is_mnemonic(&word);
    }
    false
}

// Inserts synthetic BEGIN/END lines wherever the indentation width changes,
// tracking the widths on a stack. Literal `begin`/`end` lines suppress the
// synthesis so explicitly bracketed sources survive unchanged.
fn explicit_blocks(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut indent_stack: Vec<usize> = vec![0];
    let mut prev_stripped = String::new();

    for raw in text.lines() {
        if raw.trim().is_empty() {
            out.push(raw.to_string());
            continue;
        }
        let leading = raw.len() - raw.trim_start_matches(' ').len();
        let next_stripped = raw.trim_start().to_lowercase();

        if leading > *indent_stack.last().unwrap() {
            indent_stack.push(leading);
            if !prev_stripped.starts_with("begin") {
                out.push("BEGIN".to_string());
            }
        }
        let mut skip_one_end = next_stripped.starts_with("end");
        while leading < *indent_stack.last().unwrap() {
            indent_stack.pop();
            if skip_one_end {
                skip_one_end = false;
                continue;
            }
            out.push("END".to_string());
        }
        out.push(raw.trim_start().to_string());
        prev_stripped = next_stripped;
    }
    while indent_stack.len() > 1 {
        indent_stack.pop();
        out.push("END".to_string());
    }
    out.join("\n")
}
