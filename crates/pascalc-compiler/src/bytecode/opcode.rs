//! Bytecode operation codes.
//!
//! Each opcode is a single byte, with operands following inline in
//! big-endian order. Booleans are the integers 0 and 1; every arithmetic
//! and comparison instruction works on 32-bit signed integers.

/// Bytecode operation codes.
///
/// The machine is stack-based. Most operations pop operands from the stack
/// and push results back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push constant from pool (8-bit index).
    /// Operand: u8 constant index
    Constant = 0,
    /// Push constant from pool (16-bit index).
    /// Operand: u16 constant index
    ConstantWide,
    /// Push a null array reference.
    PushNull,
    /// Push integer 0.
    PushZero,
    /// Push integer 1.
    PushOne,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Pop top of stack.
    Pop,
    /// Duplicate top of stack.
    Dup,
    /// Duplicate the top two values: `a b -> a b a b`.
    Dup2,

    // =========================================================================
    // Local Variables
    // =========================================================================
    /// Load local variable (8-bit slot).
    /// Operand: u8 slot index
    GetLocal,
    /// Store to local variable (8-bit slot).
    /// Operand: u8 slot index
    SetLocal,
    /// Load local variable (16-bit slot).
    /// Operand: u16 slot index
    GetLocalWide,
    /// Store to local variable (16-bit slot).
    /// Operand: u16 slot index
    SetLocalWide,
    /// Add a signed delta to an integer local in place.
    /// Operand: u16 slot index + i8 delta
    IncLocal,

    // =========================================================================
    // Global Variables
    // =========================================================================
    /// Load unit field.
    /// Operand: u16 field index
    GetGlobal,
    /// Store to unit field.
    /// Operand: u16 field index
    SetGlobal,

    // =========================================================================
    // Arithmetic (i32, wrapping)
    // =========================================================================
    /// Add two values.
    Add,
    /// Subtract two values.
    Sub,
    /// Multiply two values.
    Mul,
    /// Divide two values, truncating toward zero.
    Div,
    /// Remainder with the sign of the dividend.
    Mod,
    /// Negate a value.
    Neg,

    // =========================================================================
    // Bitwise
    // =========================================================================
    /// Bitwise AND.
    BitAnd,
    /// Bitwise OR.
    BitOr,
    /// Bitwise XOR.
    BitXor,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional jump.
    /// Operand: u32 absolute target offset
    Jump,
    /// Pop a value and jump if it is zero.
    /// Operand: u32 absolute target offset
    JumpIfZero,
    /// Pop `b`, pop `a`, jump if `a == b`.
    /// Operand: u32 absolute target offset
    JumpIfEq,
    /// Pop `b`, pop `a`, jump if `a != b`.
    /// Operand: u32 absolute target offset
    JumpIfNe,
    /// Pop `b`, pop `a`, jump if `a < b`.
    /// Operand: u32 absolute target offset
    JumpIfLt,
    /// Pop `b`, pop `a`, jump if `a <= b`.
    /// Operand: u32 absolute target offset
    JumpIfLe,
    /// Pop `b`, pop `a`, jump if `a > b`.
    /// Operand: u32 absolute target offset
    JumpIfGt,
    /// Pop `b`, pop `a`, jump if `a >= b`.
    /// Operand: u32 absolute target offset
    JumpIfGe,

    // =========================================================================
    // Arrays
    // =========================================================================
    /// Pop a length and push a new zero-filled array.
    NewArray,
    /// Pop index, pop array, push the cell.
    ArrayLoad,
    /// Pop value, pop index, pop array, store the cell.
    ArrayStore,
    /// Raise a bounds fault with a message from the pool.
    /// Operand: u16 constant index (string data)
    Fault,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Call a method of the unit.
    /// Operand: u16 method index + u8 arg count
    Call,
    /// Return the top of stack.
    Return,
    /// Return without a value.
    ReturnVoid,

    // =========================================================================
    // I/O
    // =========================================================================
    /// Pop an integer and print it on its own line.
    Print,
    /// Read one line and push it parsed as an integer.
    ReadInt,
    /// Read one line and push 1 if it is `true` (any case), else 0.
    ReadBool,
}

impl OpCode {
    /// The highest opcode value.
    const LAST: OpCode = OpCode::ReadBool;

    /// Convert a byte to an opcode.
    pub fn from_u8(value: u8) -> Option<Self> {
        if value <= Self::LAST as u8 {
            // SAFETY: OpCode is repr(u8) with contiguous discriminants from 0
            // and the value has been checked against the last one.
            Some(unsafe { std::mem::transmute::<u8, OpCode>(value) })
        } else {
            None
        }
    }

    /// Get the size of operands for this opcode in bytes.
    ///
    /// This does NOT include the opcode byte itself.
    pub fn operand_size(&self) -> usize {
        match self {
            OpCode::PushNull
            | OpCode::PushZero
            | OpCode::PushOne
            | OpCode::Pop
            | OpCode::Dup
            | OpCode::Dup2
            | OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::Mod
            | OpCode::Neg
            | OpCode::BitAnd
            | OpCode::BitOr
            | OpCode::BitXor
            | OpCode::NewArray
            | OpCode::ArrayLoad
            | OpCode::ArrayStore
            | OpCode::Return
            | OpCode::ReturnVoid
            | OpCode::Print
            | OpCode::ReadInt
            | OpCode::ReadBool => 0,

            OpCode::Constant | OpCode::GetLocal | OpCode::SetLocal => 1,

            OpCode::ConstantWide
            | OpCode::GetLocalWide
            | OpCode::SetLocalWide
            | OpCode::GetGlobal
            | OpCode::SetGlobal
            | OpCode::Fault => 2,

            OpCode::IncLocal // u16 slot + i8 delta
            | OpCode::Call => 3, // u16 method index + u8 arg count

            OpCode::Jump
            | OpCode::JumpIfZero
            | OpCode::JumpIfEq
            | OpCode::JumpIfNe
            | OpCode::JumpIfLt
            | OpCode::JumpIfLe
            | OpCode::JumpIfGt
            | OpCode::JumpIfGe => 4,
        }
    }

    /// Whether this opcode carries a jump target operand.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            OpCode::Jump
                | OpCode::JumpIfZero
                | OpCode::JumpIfEq
                | OpCode::JumpIfNe
                | OpCode::JumpIfLt
                | OpCode::JumpIfLe
                | OpCode::JumpIfGt
                | OpCode::JumpIfGe
        )
    }

    /// Get the name of this opcode for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::ConstantWide => "CONSTANT_WIDE",
            OpCode::PushNull => "PUSH_NULL",
            OpCode::PushZero => "PUSH_ZERO",
            OpCode::PushOne => "PUSH_ONE",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::Dup2 => "DUP2",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::SetLocal => "SET_LOCAL",
            OpCode::GetLocalWide => "GET_LOCAL_WIDE",
            OpCode::SetLocalWide => "SET_LOCAL_WIDE",
            OpCode::IncLocal => "INC_LOCAL",
            OpCode::GetGlobal => "GET_GLOBAL",
            OpCode::SetGlobal => "SET_GLOBAL",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Neg => "NEG",
            OpCode::BitAnd => "BIT_AND",
            OpCode::BitOr => "BIT_OR",
            OpCode::BitXor => "BIT_XOR",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfZero => "JUMP_IF_ZERO",
            OpCode::JumpIfEq => "JUMP_IF_EQ",
            OpCode::JumpIfNe => "JUMP_IF_NE",
            OpCode::JumpIfLt => "JUMP_IF_LT",
            OpCode::JumpIfLe => "JUMP_IF_LE",
            OpCode::JumpIfGt => "JUMP_IF_GT",
            OpCode::JumpIfGe => "JUMP_IF_GE",
            OpCode::NewArray => "NEW_ARRAY",
            OpCode::ArrayLoad => "ARRAY_LOAD",
            OpCode::ArrayStore => "ARRAY_STORE",
            OpCode::Fault => "FAULT",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::ReturnVoid => "RETURN_VOID",
            OpCode::Print => "PRINT",
            OpCode::ReadInt => "READ_INT",
            OpCode::ReadBool => "READ_BOOL",
        }
    }
}
