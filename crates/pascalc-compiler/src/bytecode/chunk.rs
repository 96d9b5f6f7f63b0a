//! Bytecode chunk for compiled methods.
//!
//! A `BytecodeChunk` contains the compiled bytecode for a single method,
//! along with line number information for debugging.

use std::fmt::Write as _;

use super::OpCode;

/// A chunk of compiled bytecode for a single method.
///
/// Constants are stored at unit level in a `ConstantPool`, not per-method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeChunk {
    /// The bytecode instructions.
    code: Vec<u8>,
    /// Line numbers for debugging (parallel to code).
    lines: Vec<u32>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap decoded code. Line information is not stored in artifacts, so
    /// every byte maps to line 0.
    pub fn from_code(code: Vec<u8>) -> Self {
        let lines = vec![0; code.len()];
        Self { code, lines }
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.code.push(op as u8);
        self.lines.push(line);
    }

    /// Write a byte operand.
    pub fn write_byte(&mut self, byte: u8, line: u32) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Write a 16-bit operand (big-endian).
    pub fn write_u16(&mut self, value: u16, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Write a 32-bit operand (big-endian).
    pub fn write_u32(&mut self, value: u32, line: u32) {
        for byte in value.to_be_bytes() {
            self.write_byte(byte, line);
        }
    }

    /// Overwrite a previously written 32-bit operand.
    ///
    /// Returns `false` if the operand does not lie within the chunk.
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> bool {
        match self.code.get_mut(offset..offset + 4) {
            Some(slot) => {
                slot.copy_from_slice(&value.to_be_bytes());
                true
            }
            None => false,
        }
    }

    /// Drop everything written at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.code.truncate(len);
        self.lines.truncate(len);
    }

    /// Get current code offset.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// Get the length of the bytecode.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Read a byte at the given offset.
    pub fn read_byte(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    /// Read a u16 at the given offset (big-endian).
    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a u32 at the given offset (big-endian).
    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        let bytes = self.code.get(offset..offset + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an opcode at the given offset.
    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    /// Extract all opcodes from the chunk, skipping operands.
    ///
    /// This is useful for testing bytecode sequences without worrying about
    /// specific operand values or instruction offsets.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset < self.code.len() {
            if let Some(op) = self.read_op(offset) {
                ops.push(op);
                offset += 1 + op.operand_size();
            } else {
                offset += 1;
            }
        }

        ops
    }

    /// Render a human-readable listing, one instruction per line.
    pub fn disassemble(&self, name: &str) -> String {
        let mut out = format!("== {name} ==\n");
        let mut offset = 0;

        while offset < self.code.len() {
            let Some(op) = self.read_op(offset) else {
                let _ = writeln!(out, "{offset:04} <invalid {:#04x}>", self.code[offset]);
                offset += 1;
                continue;
            };
            let _ = write!(out, "{offset:04} {:<14}", op.name());
            match op.operand_size() {
                1 => {
                    let _ = write!(out, " {}", self.read_byte(offset + 1).unwrap_or(0));
                }
                2 => {
                    let _ = write!(out, " {}", self.read_u16(offset + 1).unwrap_or(0));
                }
                3 => {
                    let _ = write!(
                        out,
                        " {} {}",
                        self.read_u16(offset + 1).unwrap_or(0),
                        self.read_byte(offset + 3).unwrap_or(0) as i8
                    );
                }
                4 => {
                    let _ = write!(out, " -> {:04}", self.read_u32(offset + 1).unwrap_or(0));
                }
                _ => {}
            }
            out.push('\n');
            offset += 1 + op.operand_size();
        }

        out
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// This ignores operand values, only checking the opcodes themselves.
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes (in order, but not necessarily contiguous).
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_empty() {
        let chunk = BytecodeChunk::new();
        assert!(chunk.is_empty());
        assert_eq!(chunk.len(), 0);
    }

    #[test]
    fn write_op() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(42, 1);

        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.read_op(0), Some(OpCode::Constant));
        assert_eq!(chunk.read_byte(1), Some(42));
        assert_eq!(chunk.line_at(1), Some(1));
    }

    #[test]
    fn write_wide_operands() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_u16(0x1234, 5);
        chunk.write_u32(0xDEAD_BEEF, 6);

        assert_eq!(chunk.read_u16(0), Some(0x1234));
        assert_eq!(chunk.read_u32(2), Some(0xDEAD_BEEF));
        assert_eq!(chunk.line_at(5), Some(6));
        assert_eq!(chunk.read_u32(3), None);
    }

    #[test]
    fn patch_and_truncate() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Jump, 1);
        chunk.write_u32(0, 1);
        assert!(chunk.patch_u32(1, 77));
        assert!(!chunk.patch_u32(3, 1));
        assert_eq!(chunk.read_u32(1), Some(77));

        chunk.write_op(OpCode::Pop, 2);
        chunk.truncate(5);
        assert_eq!(chunk.len(), 5);
        assert_eq!(chunk.lines().len(), 5);
    }

    #[test]
    fn opcodes_with_wide_operands() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Call, 1);
        chunk.write_u16(3, 1);
        chunk.write_byte(2, 1);
        chunk.write_op(OpCode::JumpIfLt, 1);
        chunk.write_u32(0, 1);
        chunk.write_op(OpCode::Return, 1);

        assert_eq!(
            chunk.opcodes(),
            vec![OpCode::Call, OpCode::JumpIfLt, OpCode::Return]
        );
    }

    #[test]
    fn disassemble_listing() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::GetLocal, 1);
        chunk.write_byte(2, 1);
        chunk.write_op(OpCode::Jump, 1);
        chunk.write_u32(0, 1);

        let text = chunk.disassemble("f");
        assert!(text.starts_with("== f ==\n"));
        assert!(text.contains("0000 GET_LOCAL"));
        assert!(text.contains("-> 0000"));
    }

    #[test]
    fn assert_opcodes_success() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(0, 1);
        chunk.write_op(OpCode::SetLocal, 1);
        chunk.write_byte(0, 1);

        chunk.assert_opcodes(&[OpCode::Constant, OpCode::SetLocal]);
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(0, 1);

        chunk.assert_opcodes(&[OpCode::GetLocal]);
    }

    #[test]
    #[should_panic(expected = "Missing opcodes")]
    fn assert_contains_opcodes_failure() {
        let mut chunk = BytecodeChunk::new();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(0, 1);

        chunk.assert_contains_opcodes(&[OpCode::Constant, OpCode::Sub]);
    }
}
