use crate::int_util::parse_int;
use crate::{new_parser_error, LabelMap, Result, Rule};
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;
use splvm::isa::{self, InstrFormat, Mnemonic};
use splvm::{constants, MemAddr, SWord, Word};

// A resolved operand. Labels are already replaced by their instruction
// index, both as bare operands and inside `M[label±k]`.
enum Operand<'i> {
    Register(u32, Span<'i>),
    Mem(SWord, Span<'i>),
    Imm(SWord, Span<'i>),
}

impl<'i> Operand<'i> {
    fn span(&self) -> Span<'i> {
        match self {
            Operand::Register(_, span) | Operand::Mem(_, span) | Operand::Imm(_, span) => {
                span.clone()
            }
        }
    }
}

fn resolve_int<'i>(pair: &Pair<'i, Rule>) -> Result<SWord> {
    parse_int::<i64>(pair.as_str())
        .map_err(|err| new_parser_error(pair.as_span(), format!("Invalid integer: {}", err)))
}

fn resolve_label<'i>(pair: &Pair<'i, Rule>, labels: &LabelMap<'i>) -> Result<SWord> {
    labels
        .get(pair.as_str())
        .map(|&index| SWord::from(index))
        .ok_or_else(|| new_parser_error(pair.as_span(), "Unresolved label".to_owned()))
}

fn resolve_memref_inner<'i>(pair: Pair<'i, Rule>, labels: &LabelMap<'i>) -> Result<SWord> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::int => resolve_int(&inner),
        Rule::label_ref => {
            let mut pairs = inner.into_inner();
            let name = pairs.next().unwrap();
            let base = resolve_label(&name, labels)?;
            match pairs.next() {
                Some(offset) => {
                    let mut parts = offset.into_inner();
                    let sign = parts.next().unwrap();
                    let magnitude_pair = parts.next().unwrap();
                    let magnitude: SWord = resolve_int(&magnitude_pair)?;
                    Ok(if sign.as_str() == "-" {
                        base.wrapping_sub(magnitude)
                    } else {
                        base.wrapping_add(magnitude)
                    })
                }
                None => Ok(base),
            }
        }
        _ => unreachable!(),
    }
}

fn resolve_operand<'i>(pair: Pair<'i, Rule>, labels: &LabelMap<'i>) -> Result<Operand<'i>> {
    debug_assert_matches!(pair.as_rule(), Rule::operand);
    let span = pair.as_span();
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::register => {
            let index: u32 = inner.as_str()[1..].parse().map_err(|_| {
                new_parser_error(inner.as_span(), "Invalid register number".to_owned())
            })?;
            if index as usize >= constants::REGISTER_COUNT {
                return Err(new_parser_error(
                    inner.as_span(),
                    format!("Register R{} does not exist", index),
                ));
            }
            Ok(Operand::Register(index, span))
        }
        Rule::memref => Ok(Operand::Mem(
            resolve_memref_inner(inner.into_inner().next().unwrap(), labels)?,
            span,
        )),
        Rule::int => Ok(Operand::Imm(resolve_int(&inner)?, span)),
        Rule::identifier => Ok(Operand::Imm(resolve_label(&inner, labels)?, span)),
        _ => unreachable!(),
    }
}

fn register_field(operand: &Operand) -> Result<u32> {
    match operand {
        Operand::Register(index, _) => Ok(*index),
        other => Err(new_parser_error(
            other.span(),
            "Expected a register operand".to_owned(),
        )),
    }
}

fn memory_field(operand: &Operand) -> Result<MemAddr> {
    let value = match operand {
        Operand::Mem(value, _) | Operand::Imm(value, _) => *value,
        other => {
            return Err(new_parser_error(
                other.span(),
                "Expected a memory operand".to_owned(),
            ))
        }
    };
    if value < 0 || !util::fits_unsigned(value as u64, constants::ADDRESS_WIDTH) {
        return Err(new_parser_error(
            operand.span(),
            format!("Address {} does not fit in 24 bits", value),
        ));
    }
    Ok(value as MemAddr)
}

fn immediate_field(operand: &Operand) -> Result<i32> {
    let value = match operand {
        Operand::Imm(value, _) | Operand::Mem(value, _) => *value,
        other => {
            return Err(new_parser_error(
                other.span(),
                "Expected an immediate operand".to_owned(),
            ))
        }
    };
    if util::encode_field(value, constants::IMMEDIATE_WIDTH).is_err() {
        return Err(new_parser_error(
            operand.span(),
            format!("Immediate {} does not fit in 32 bits", value),
        ));
    }
    Ok(value as u32 as i32)
}

fn expect_operands<'i>(
    span: &Span<'i>,
    operands: &[Operand<'i>],
    count: usize,
    what: &str,
) -> Result<()> {
    if operands.len() != count {
        Err(new_parser_error(
            span.clone(),
            format!("Instruction expects {}", what),
        ))
    } else {
        Ok(())
    }
}

/// Encodes one instruction line into a 64-bit word. The second value is the
/// resolved memory target of a `GUARD`, used for result-address metadata.
pub fn encode_instruction<'i>(
    pair: Pair<'i, Rule>,
    labels: &LabelMap<'i>,
) -> Result<(Word, Option<MemAddr>)> {
    debug_assert_matches!(pair.as_rule(), Rule::instruction);
    let span = pair.as_span();
    let mut pairs = pair.into_inner();
    let mnemonic_pair = pairs.next().unwrap();
    let mnemonic = isa::parse_mnemonic(mnemonic_pair.as_str())
        .map_err(|err| new_parser_error(mnemonic_pair.as_span(), format!("{}", err)))?;

    let mut operands = Vec::new();
    for operand in pairs {
        operands.push(resolve_operand(operand, labels)?);
    }

    let word = match isa::format_of(mnemonic) {
        InstrFormat::N => {
            expect_operands(&span, &operands, 0, "no operands")?;
            isa::make_n_instruction(mnemonic)
        }
        InstrFormat::RR => {
            expect_operands(&span, &operands, 2, "two register operands")?;
            isa::make_rr_instruction(
                mnemonic,
                register_field(&operands[0])?,
                register_field(&operands[1])?,
            )
        }
        InstrFormat::R => {
            expect_operands(&span, &operands, 1, "one register operand")?;
            isa::make_r_instruction(mnemonic, register_field(&operands[0])?)
        }
        InstrFormat::RM => {
            // GUARD with a single memory operand encodes R = 0.
            if mnemonic == Mnemonic::GUARD && operands.len() == 1 {
                let m = memory_field(&operands[0])?;
                return Ok((isa::make_rm_instruction(mnemonic, 0, m), Some(m)));
            }
            expect_operands(&span, &operands, 2, "a register and a memory operand")?;
            let r = register_field(&operands[0])?;
            let m = memory_field(&operands[1])?;
            let guard = if mnemonic == Mnemonic::GUARD {
                Some(m)
            } else {
                None
            };
            return Ok((isa::make_rm_instruction(mnemonic, r, m), guard));
        }
        InstrFormat::RI => {
            expect_operands(&span, &operands, 2, "a register and an immediate")?;
            isa::make_ri_instruction(
                mnemonic,
                register_field(&operands[0])?,
                immediate_field(&operands[1])?,
            )
        }
        InstrFormat::J => {
            expect_operands(&span, &operands, 1, "a memory operand")?;
            isa::make_j_instruction(mnemonic, memory_field(&operands[0])?)
        }
    };

    Ok((word, None))
}
