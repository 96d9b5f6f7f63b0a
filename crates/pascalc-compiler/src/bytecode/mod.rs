//! Bytecode types for compiled units.
//!
//! - [`OpCode`] - The instruction set of the stack machine
//! - [`BytecodeChunk`] - Compiled bytecode for one method
//! - [`Constant`] and [`ConstantPool`] - Unit-level constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
