//! Bytecode emitter.
//!
//! The [`BytecodeEmitter`] provides a high-level API for generating the
//! bytecode of one method body, handling constants, slot widths and
//! forward-referenced jump labels.
//!
//! # Example
//!
//! ```
//! use pascalc_compiler::bytecode::{ConstantPool, OpCode};
//! use pascalc_compiler::emit::BytecodeEmitter;
//!
//! let mut constants = ConstantPool::new();
//! let mut emitter = BytecodeEmitter::new(&mut constants);
//!
//! let done = emitter.new_label();
//! emitter.emit_int(1).unwrap();
//! emitter.emit_jump(OpCode::JumpIfZero, done);
//! emitter.emit_int(42).unwrap();
//! emitter.emit(OpCode::Print);
//! emitter.bind_label(done).unwrap();
//! emitter.emit(OpCode::ReturnVoid);
//!
//! let chunk = emitter.finish().unwrap();
//! assert_eq!(chunk.read_u32(2), Some(9));
//! ```

mod labels;

use thiserror::Error;

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};
use labels::LabelTable;

pub use labels::Label;

/// Failures while assembling a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A jump references a label that was never bound.
    #[error("label {0} referenced but never bound")]
    UnboundLabel(u32),
    /// A label was bound twice.
    #[error("label {0} bound twice")]
    LabelRebound(u32),
    /// A label from another method body was used.
    #[error("label {0} does not belong to this method")]
    UnknownLabel(u32),
    /// The method body outgrew 32-bit jump targets.
    #[error("method body exceeds the maximum code size")]
    CodeTooLarge,
    /// The unit's constant pool has no free 16-bit index left.
    #[error("too many constants: the unit constant pool holds at most 65536 entries")]
    TooManyConstants,
    /// A string constant does not fit its 16-bit length.
    #[error("string constant of {0} bytes exceeds the maximum of 65535")]
    ConstantTooLong(usize),
}

/// A saved emitter position, see [`BytecodeEmitter::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    code_len: usize,
    fixups: usize,
}

/// Emits bytecode instructions.
///
/// Uses a shared unit-level constant pool for deduplication across methods.
/// Each `BytecodeEmitter` produces bytecode for a single method, and its
/// labels are meaningless outside of it.
pub struct BytecodeEmitter<'pool> {
    /// The bytecode chunk being built (per-method)
    chunk: BytecodeChunk,

    /// Shared unit-level constant pool (deduplicated)
    constants: &'pool mut ConstantPool,

    /// Jump labels of this method
    labels: LabelTable,

    /// Current source line for debug info
    current_line: u32,
}

impl<'pool> BytecodeEmitter<'pool> {
    /// Create a new bytecode emitter.
    pub fn new(constants: &'pool mut ConstantPool) -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            constants,
            labels: LabelTable::default(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.current_line);
    }

    /// Emit opcode with 8-bit operand.
    pub fn emit_byte(&mut self, op: OpCode, byte: u8) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_byte(byte, self.current_line);
    }

    /// Emit opcode with 16-bit operand.
    pub fn emit_u16(&mut self, op: OpCode, value: u16) {
        self.chunk.write_op(op, self.current_line);
        self.chunk.write_u16(value, self.current_line);
    }

    /// Emit a constant load instruction.
    ///
    /// Uses narrow (8-bit) or wide (16-bit) index based on pool size.
    pub fn emit_constant(&mut self, constant: Constant) -> Result<(), EmitError> {
        let index = self.constants.add(constant)?;
        match u8::try_from(index) {
            Ok(narrow) => self.emit_byte(OpCode::Constant, narrow),
            Err(_) => self.emit_u16(OpCode::ConstantWide, index),
        }
        Ok(())
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit an integer constant.
    ///
    /// 0 uses `PushZero`, 1 uses `PushOne`.
    pub fn emit_int(&mut self, value: i32) -> Result<(), EmitError> {
        match value {
            0 => self.emit(OpCode::PushZero),
            1 => self.emit(OpCode::PushOne),
            _ => return self.emit_constant(Constant::Int(value)),
        }
        Ok(())
    }

    /// Emit a boolean as 0 or 1.
    pub fn emit_bool(&mut self, value: bool) {
        self.emit(if value {
            OpCode::PushOne
        } else {
            OpCode::PushZero
        });
    }

    /// Emit a null array reference.
    pub fn emit_null(&mut self) {
        self.emit(OpCode::PushNull);
    }

    /// Emit a bounds fault carrying `message`.
    pub fn emit_fault(&mut self, message: &str) -> Result<(), EmitError> {
        let index = self.constants.add_string(message)?;
        self.emit_u16(OpCode::Fault, index);
        Ok(())
    }

    // ==========================================================================
    // Variables
    // ==========================================================================

    /// Emit get local variable.
    pub fn emit_get_local(&mut self, slot: u16) {
        if slot < 256 {
            self.emit_byte(OpCode::GetLocal, slot as u8);
        } else {
            self.emit_u16(OpCode::GetLocalWide, slot);
        }
    }

    /// Emit set local variable.
    pub fn emit_set_local(&mut self, slot: u16) {
        if slot < 256 {
            self.emit_byte(OpCode::SetLocal, slot as u8);
        } else {
            self.emit_u16(OpCode::SetLocalWide, slot);
        }
    }

    /// Emit an in-place increment of an integer local.
    pub fn emit_inc_local(&mut self, slot: u16, delta: i8) {
        self.emit_u16(OpCode::IncLocal, slot);
        self.chunk.write_byte(delta as u8, self.current_line);
    }

    /// Emit get unit field.
    pub fn emit_get_global(&mut self, field: u16) {
        self.emit_u16(OpCode::GetGlobal, field);
    }

    /// Emit set unit field.
    pub fn emit_set_global(&mut self, field: u16) {
        self.emit_u16(OpCode::SetGlobal, field);
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Emit a call of method `method` with `arg_count` arguments on the stack.
    pub fn emit_call(&mut self, method: u16, arg_count: u8) {
        self.emit_u16(OpCode::Call, method);
        self.chunk.write_byte(arg_count, self.current_line);
    }

    /// Emit return with value.
    pub fn emit_return(&mut self) {
        self.emit(OpCode::Return);
    }

    /// Emit return without a value.
    pub fn emit_return_void(&mut self) {
        self.emit(OpCode::ReturnVoid);
    }

    // ==========================================================================
    // Labels and Jumps
    // ==========================================================================

    /// Allocate a label whose position is bound later.
    pub fn new_label(&mut self) -> Label {
        self.labels.new_label()
    }

    /// Bind `label` to the current position.
    pub fn bind_label(&mut self, label: Label) -> Result<(), EmitError> {
        let position = self.position()?;
        tracing::trace!(label = label.index(), position, "bind label");
        self.labels.bind(label, position)
    }

    /// Emit a jump instruction targeting `label`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `op` is not a jump opcode.
    pub fn emit_jump(&mut self, op: OpCode, label: Label) {
        debug_assert!(op.is_jump(), "{} is not a jump", op.name());
        self.emit(op);
        let operand = self.chunk.current_offset();
        let target = self.labels.position(label).unwrap_or(u32::MAX);
        self.chunk.write_u32(target, self.current_line);
        self.labels.add_fixup(operand, label);
    }

    /// Get current bytecode offset.
    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    fn position(&self) -> Result<u32, EmitError> {
        u32::try_from(self.chunk.current_offset()).map_err(|_| EmitError::CodeTooLarge)
    }

    // ==========================================================================
    // Checkpoints
    // ==========================================================================

    /// Save the current position so a failed construct can be undone.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            code_len: self.chunk.len(),
            fixups: self.labels.fixup_count(),
        }
    }

    /// Discard every instruction and jump emitted since `checkpoint`.
    ///
    /// Constants added in the meantime stay in the shared pool.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.chunk.truncate(checkpoint.code_len);
        self.labels.rewind(checkpoint.fixups, checkpoint.code_len);
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Resolve every jump and return the bytecode chunk.
    pub fn finish(mut self) -> Result<BytecodeChunk, EmitError> {
        for (operand, target) in self.labels.resolve()? {
            if !self.chunk.patch_u32(operand, target) {
                return Err(EmitError::CodeTooLarge);
            }
        }
        Ok(self.chunk)
    }

    /// Get current chunk size.
    pub fn code_size(&self) -> usize {
        self.chunk.len()
    }
}

impl std::fmt::Debug for BytecodeEmitter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BytecodeEmitter")
            .field("code_size", &self.chunk.len())
            .field("current_line", &self.current_line)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_constant() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(42).unwrap();
        let chunk = emitter.finish().unwrap();

        assert_eq!(chunk.read_op(0), Some(OpCode::Constant));
        assert_eq!(chunk.read_byte(1), Some(0));
        assert_eq!(constants.get(0), Some(&Constant::Int(42)));
    }

    #[test]
    fn emit_special_ints() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(0).unwrap();
        emitter.emit_int(1).unwrap();
        emitter.emit_bool(true);
        let chunk = emitter.finish().unwrap();

        chunk.assert_opcodes(&[OpCode::PushZero, OpCode::PushOne, OpCode::PushOne]);
        assert!(constants.is_empty());
    }

    #[test]
    fn fault_message_deduplicated() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_fault("Index out of bound in access a").unwrap();
        emitter.emit_fault("Index out of bound in access a").unwrap();
        drop(emitter);

        assert_eq!(constants.len(), 1);
    }

    #[test]
    fn forward_jump_is_patched() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        let end = emitter.new_label();
        emitter.emit_jump(OpCode::Jump, end);
        emitter.emit(OpCode::Pop);
        emitter.bind_label(end).unwrap();
        emitter.emit(OpCode::ReturnVoid);

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_u32(1), Some(6));
        assert_eq!(chunk.read_op(6), Some(OpCode::ReturnVoid));
    }

    #[test]
    fn backward_jump_uses_bound_position() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.emit(OpCode::PushOne);
        let top = emitter.new_label();
        emitter.bind_label(top).unwrap();
        emitter.emit(OpCode::Pop);
        emitter.emit_jump(OpCode::Jump, top);

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.read_u32(3), Some(1));
    }

    #[test]
    fn unbound_label_fails_finish() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        let nowhere = emitter.new_label();
        emitter.emit_jump(OpCode::JumpIfZero, nowhere);

        assert_eq!(emitter.finish(), Err(EmitError::UnboundLabel(0)));
    }

    #[test]
    fn rebinding_fails() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        let label = emitter.new_label();
        emitter.bind_label(label).unwrap();
        assert_eq!(emitter.bind_label(label), Err(EmitError::LabelRebound(0)));
    }

    #[test]
    fn rewind_discards_code_and_jumps() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.emit(OpCode::PushOne);
        let mark = emitter.checkpoint();
        let dangling = emitter.new_label();
        emitter.emit_jump(OpCode::Jump, dangling);
        emitter.emit(OpCode::Print);
        emitter.rewind(mark);
        emitter.emit(OpCode::Pop);

        let chunk = emitter.finish().unwrap();
        chunk.assert_opcodes(&[OpCode::PushOne, OpCode::Pop]);
    }

    #[test]
    fn emit_locals() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.emit_get_local(0);
        emitter.emit_set_local(255);
        emitter.emit_get_local(256);
        emitter.emit_set_local(1000);
        emitter.emit_inc_local(3, -1);

        let chunk = emitter.finish().unwrap();
        chunk.assert_opcodes(&[
            OpCode::GetLocal,
            OpCode::SetLocal,
            OpCode::GetLocalWide,
            OpCode::SetLocalWide,
            OpCode::IncLocal,
        ]);
        assert_eq!(chunk.read_u16(5), Some(256));
        assert_eq!(chunk.read_byte(chunk.len() - 1), Some(0xFF));
    }

    #[test]
    fn emit_call_operands() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.emit_call(4, 2);
        let chunk = emitter.finish().unwrap();

        assert_eq!(chunk.read_op(0), Some(OpCode::Call));
        assert_eq!(chunk.read_u16(1), Some(4));
        assert_eq!(chunk.read_byte(3), Some(2));
    }

    #[test]
    fn wide_constant_index() {
        let mut constants = ConstantPool::new();
        for i in 0..256 {
            constants.add_int(1000 + i).unwrap();
        }
        let mut emitter = BytecodeEmitter::new(&mut constants);
        emitter.emit_int(5000).unwrap();
        let chunk = emitter.finish().unwrap();

        assert_eq!(chunk.read_op(0), Some(OpCode::ConstantWide));
        assert_eq!(chunk.read_u16(1), Some(256));
    }

    #[test]
    fn full_pool_fails_instead_of_wrapping() {
        let mut constants = ConstantPool::new();
        for i in 0..=u16::MAX as i32 {
            constants.add_int(100_000 + i).unwrap();
        }
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.emit_int(100_000 + 65_535).unwrap();
        assert_eq!(emitter.emit_int(100_000 + 65_536), Err(EmitError::TooManyConstants));
        assert_eq!(
            emitter.emit_fault("Index out of bound in access of 'a'"),
            Err(EmitError::TooManyConstants)
        );
        emitter.emit_int(1).unwrap();

        let chunk = emitter.finish().unwrap();
        chunk.assert_opcodes(&[OpCode::ConstantWide, OpCode::PushOne]);
        assert_eq!(chunk.read_u16(1), Some(65_535));
    }

    #[test]
    fn line_tracking() {
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);

        emitter.set_line(7);
        emitter.emit(OpCode::PushOne);
        emitter.set_line(9);
        emitter.emit(OpCode::Print);

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.line_at(0), Some(7));
        assert_eq!(chunk.line_at(1), Some(9));
    }
}
