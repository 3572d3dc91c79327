//! Instruction encoding, decoding, and disassembly.
//!
//! Instructions are a flat byte sequence: one opcode byte followed by its
//! operands, each packed big-endian at the width declared by the opcode's
//! [`Definition`](super::op::Definition).

use std::fmt;

use super::op::{Definition, Opcode};

/// An encoded instruction stream.
///
/// `Display` renders the disassembly, one instruction per line:
/// `NNNN Mnemonic operand` with a zero-padded four-digit byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instructions(Vec<u8>);

impl Instructions {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends an encoded instruction, returning its starting offset.
    pub fn push(&mut self, instruction: &[u8]) -> usize {
        let position = self.0.len();
        self.0.extend_from_slice(instruction);
        position
    }

    /// Truncates the stream to `len` bytes (used to drop a trailing `Pop`).
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Overwrites bytes at `position` with a re-encoded instruction
    /// (jump backpatching).
    pub fn replace(&mut self, position: usize, instruction: &[u8]) {
        self.0[position..position + instruction.len()].copy_from_slice(instruction);
    }
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes();
        let mut i = 0;
        while i < bytes.len() {
            let Some(op) = Opcode::from_repr(bytes[i]) else {
                writeln!(f, "{i:04} ERROR: unknown opcode {}", bytes[i])?;
                i += 1;
                continue;
            };
            let definition = op.definition();
            let (operands, read) = read_operands(&definition, &bytes[i + 1..]);
            write!(f, "{i:04} {}", definition.name)?;
            for operand in operands {
                write!(f, " {operand}")?;
            }
            writeln!(f)?;
            i += 1 + read;
        }
        Ok(())
    }
}

/// Encodes an instruction: opcode byte plus operands at declared widths.
#[must_use]
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let definition = op.definition();
    let mut instruction = Vec::with_capacity(1 + definition.operand_widths.len() * 2);
    instruction.push(op as u8);
    for (operand, width) in operands.iter().zip(definition.operand_widths) {
        match width {
            2 => {
                let operand = u16::try_from(*operand).expect("operand fits in u16");
                instruction.extend_from_slice(&operand.to_be_bytes());
            }
            _ => unreachable!("unhandled operand width {width}"),
        }
    }
    instruction
}

/// Decodes the operands for `definition` from the bytes following an opcode.
/// Returns the operands and the number of bytes consumed.
#[must_use]
pub fn read_operands(definition: &Definition, bytes: &[u8]) -> (Vec<usize>, usize) {
    let mut operands = Vec::with_capacity(definition.operand_widths.len());
    let mut offset = 0;
    for width in definition.operand_widths {
        match width {
            2 => operands.push(usize::from(read_u16(&bytes[offset..]))),
            _ => unreachable!("unhandled operand width {width}"),
        }
        offset += width;
    }
    (operands, offset)
}

/// Reads a big-endian u16 from the start of `bytes`.
#[must_use]
pub fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}
