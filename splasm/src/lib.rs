//! Two-pass assembler for the [splvm](../splvm/index.html) instruction set.
//!
//! [`assemble`] accepts assembly text and produces an [`Image`] together
//! with the symbol table. Parsing is implemented with [pest]; the main
//! [`Error`](type.Error.html) type is an alias of `pest::error::Error`, so
//! every error carries the offending line and span and pretty-prints the
//! way pest errors do.
//!
//! # Assembly language
//!
//! A program is a sequence of lines, each one of:
//!
//! - a label declaration `name:`, which binds `name` to the current
//!   instruction index (a label may also prefix a statement on the same
//!   line);
//! - a data directive `.data v1 v2 …`, emitting one 64-bit word per value
//!   (decimal, hexadecimal `0x` or binary `0b`, negative values in two's
//!   complement);
//! - an instruction `MNEMONIC op1, op2`.
//!
//! Operands are registers `Rn`, memory references `M[1024]` / `M[label]` /
//! `M[label±k]`, integer literals, or bare labels (which resolve to the
//! label's instruction index). Comments run from `//`, `;` or `#` to the end
//! of the line, and `/*…*/` blocks are skipped. Mnemonics and register
//! names are case-insensitive.
//!
//! After the last line the assembler guarantees a terminating `PARA` word,
//! and collects two pieces of metadata: `entry_index` (the `main` label if
//! declared, otherwise the first non-zero word) and `result_addr` (the
//! target of the first `GUARD` into the data range).
//!
//! [pest]: https://docs.rs/pest/

mod disasm;
mod encode;
mod int_util;
mod parser;


use parser::{AsmParser, Rule};
use pest::iterators::Pair;
use pest::{Parser, Span};
use splimg::{Image, SymbolTable};
use splvm::isa::{self, Mnemonic};
use splvm::{constants, MemAddr, Word};
use std::collections::HashMap;

pub use disasm::disassemble;

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

pub type LabelMap<'i> = HashMap<&'i str, u32>;

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(AsmParser::parse(Rule::program, input)?.next().unwrap())
}

/// Assembles `input` into an image and its symbol table.
pub fn assemble(input: &str) -> Result<(Image, SymbolTable)> {
    let program = parse(input)?;

    let mut labels: LabelMap = HashMap::new();
    let mut symbols: SymbolTable = Vec::new();

    // Pass 1: bind every label to its instruction index.
    let mut counter: u32 = 0;
    for line in program.clone().into_inner() {
        if line.as_rule() != Rule::line {
            continue;
        }
        let inner = line.into_inner().next().unwrap();
        match inner.as_rule() {
            Rule::label => bind_label(inner, counter, &mut labels, &mut symbols)?,
            Rule::labeled_statement => {
                let mut pairs = inner.into_inner();
                bind_label(pairs.next().unwrap(), counter, &mut labels, &mut symbols)?;
                counter += statement_size(pairs.next().unwrap());
            }
            Rule::statement => counter += statement_size(inner),
            _ => unreachable!(),
        }
    }

    // Pass 2: encode instructions and data with all labels known.
    let mut words: Vec<Word> = Vec::new();
    let mut result_addr: Option<MemAddr> = None;
    for line in program.into_inner() {
        if line.as_rule() != Rule::line {
            continue;
        }
        let inner = line.into_inner().next().unwrap();
        let statement = match inner.as_rule() {
            Rule::label => continue,
            Rule::labeled_statement => inner.into_inner().nth(1).unwrap(),
            Rule::statement => inner,
            _ => unreachable!(),
        };
        let statement = statement.into_inner().next().unwrap();
        match statement.as_rule() {
            Rule::data_directive => {
                for value in statement.into_inner() {
                    let word = int_util::parse_data_word(value.as_str()).ok_or_else(|| {
                        new_parser_error(
                            value.as_span(),
                            "Data value does not fit in 64 bits".to_owned(),
                        )
                    })?;
                    words.push(word);
                }
            }
            Rule::instruction => {
                let (word, guard_target) = encode::encode_instruction(statement, &labels)?;
                if result_addr.is_none() {
                    if let Some(target) = guard_target {
                        if target >= constants::DATA_RANGE.0 && target <= constants::DATA_RANGE.1 {
                            result_addr = Some(target);
                        }
                    }
                }
                words.push(word);
            }
            _ => unreachable!(),
        }
    }

    // The image always ends in an explicit stop word.
    let para = isa::opcode_word(Mnemonic::PARA);
    if words.last() != Some(&para) {
        words.push(para);
    }

    let entry_index = match labels.get("main") {
        Some(&index) => Some(index),
        None => words
            .iter()
            .position(|&word| word != 0)
            .map(|index| index as u32),
    };

    Ok((Image::from(words, entry_index, result_addr), symbols))
}

fn bind_label<'i>(
    pair: Pair<'i, Rule>,
    counter: u32,
    labels: &mut LabelMap<'i>,
    symbols: &mut SymbolTable,
) -> Result<()> {
    let name = pair.into_inner().next().unwrap();
    let text = name.as_span().as_str();
    if labels.insert(text, counter).is_some() {
        return Err(new_parser_error(
            name.as_span(),
            format!("Duplicate label: {}", text),
        ));
    }
    symbols.push((text.to_string(), counter));
    Ok(())
}

// Words occupied by one statement: `.data` advances by its value count,
// everything else by one.
fn statement_size(statement: Pair<Rule>) -> u32 {
    let inner = statement.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::data_directive => inner.into_inner().count() as u32,
        Rule::instruction => 1,
        _ => unreachable!(),
    }
}
