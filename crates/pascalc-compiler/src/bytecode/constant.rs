//! Constant pool for compiled units.
//!
//! The constant pool stores values that are referenced by bytecode
//! instructions: integer literals that do not fit a dedicated opcode and the
//! messages raised by array bounds checks.

use rustc_hash::FxHashMap;

use crate::emit::EmitError;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// 32-bit signed integer.
    Int(i32),
    /// Raw UTF-8 string bytes.
    StringData(Vec<u8>),
}

impl Constant {
    /// Tag byte used by the artifact format.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Constant::Int(_) => 0,
            Constant::StringData(_) => 1,
        }
    }
}

/// Unit-level constant pool with deduplication.
///
/// Shared across all methods of a unit. Instructions address constants with
/// a 16-bit index, so the pool holds at most 65,536 entries, and string data
/// carries a 16-bit length in the artifact.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    /// The actual constants.
    constants: Vec<Constant>,
    /// Deduplication index: maps constant to its index.
    index: FxHashMap<Constant, u16>,
}

impl ConstantPool {
    /// Create a new empty constant pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get existing constant, returns index.
    ///
    /// Deduplicates identical constants.
    pub fn add(&mut self, constant: Constant) -> Result<u16, EmitError> {
        if let Some(&idx) = self.index.get(&constant) {
            return Ok(idx);
        }
        match &constant {
            Constant::StringData(data) if data.len() > u16::MAX as usize => {
                return Err(EmitError::ConstantTooLong(data.len()));
            }
            _ => {}
        }

        let idx = u16::try_from(self.constants.len()).map_err(|_| EmitError::TooManyConstants)?;
        self.constants.push(constant.clone());
        self.index.insert(constant, idx);
        Ok(idx)
    }

    /// Add an integer constant.
    pub fn add_int(&mut self, value: i32) -> Result<u16, EmitError> {
        self.add(Constant::Int(value))
    }

    /// Add string data.
    pub fn add_string(&mut self, data: &str) -> Result<u16, EmitError> {
        self.add(Constant::StringData(data.as_bytes().to_vec()))
    }

    /// Get constant by index.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Get all constants (for serialization).
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}
