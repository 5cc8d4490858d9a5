use crate::isa::{decode_opcode, InstrFormat, Mnemonic};
use crate::{Exception, MemAddr, SWord, Word};

/// Fields of the instruction currently latched in IR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub mnemonic: Mnemonic,
    pub format: InstrFormat,
    /// First register field (0 when the format has none).
    pub r: u32,
    /// Second register field of RR instructions.
    pub rp: u32,
    /// 24-bit memory operand of RM and J instructions.
    pub m: MemAddr,
    /// Sign-extended 32-bit immediate of RI instructions.
    pub v: SWord,
}

/// Slices the operand fields out of `word` according to its opcode prefix.
/// Performs no validity checks beyond the opcode lookup; used by the
/// executor and by disassemblers.
pub fn decode_fields(word: Word) -> Option<Decoded> {
    let (mnemonic, format) = decode_opcode(word)?;
    let mut decoded = Decoded {
        mnemonic,
        format,
        r: 0,
        rp: 0,
        m: 0,
        v: 0,
    };
    match format {
        InstrFormat::N => {}
        InstrFormat::RR => {
            decoded.r = ((word >> 5) & 0x1F) as u32;
            decoded.rp = (word & 0x1F) as u32;
        }
        InstrFormat::R => {
            decoded.r = (word & 0x1F) as u32;
        }
        InstrFormat::RM => {
            decoded.r = ((word >> 24) & 0x1F) as u32;
            decoded.m = (word & 0xFF_FFFF) as MemAddr;
        }
        InstrFormat::RI => {
            decoded.r = ((word >> 32) & 0x1F) as u32;
            decoded.v = SWord::from(word as u32 as i32);
        }
        InstrFormat::J => {
            decoded.m = (word & 0xFF_FFFF) as MemAddr;
        }
    }
    Some(decoded)
}

/// Decodes `word` for execution.
///
/// Beyond the field slicing of [`decode_fields`] this refuses instructions
/// that would write one of the reserved registers (PC, SP, IR, STATE): those
/// are written by the executor and the ALU only.
pub fn decode(word: Word) -> Result<Decoded, Exception> {
    let decoded = decode_fields(word).ok_or(Exception::InvalidOpcode(word))?;
    if writes_register(decoded.mnemonic) && decoded.r < 4 {
        return Err(Exception::ReservedRegister(decoded.r));
    }
    Ok(decoded)
}

fn writes_register(mnemonic: Mnemonic) -> bool {
    use Mnemonic::*;
    match mnemonic {
        SUMA | RESTA | MULT | DIVI | COPIA | CARGAIND | CARGA | ICARGA | ISUMA | IRESTA
        | IMULT | IDIVI | IAND | IOR | IXOR | LIMP | INCRE | DECRE | DESAPILA => true,
        GUARD | GUARDIND | COMP | ICOMP | SIREGCERO | SIREGNCERO | APILA | SALTA | LLAMA
        | SICERO | SINCERO | SIPOS | SINEG | SIMAYOR | SIMENOR | SIOVERFL | INTERRUP | PARA
        | VUELVE | PROCRASTINA => false,
    }
}
