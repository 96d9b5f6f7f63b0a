//! Compiled units: fields, methods and the shared constant pool.
//!
//! A [`UnitBuilder`] collects the pieces while translation runs. Method
//! slots are reserved when a signature is declared and filled when its body
//! has been emitted, so calls can name a method before its code exists.

use std::fmt;

use pascalc_core::{CompilationError, DataType, Span};

use crate::bytecode::{BytecodeChunk, ConstantPool};

/// Name of the trivial instance initializer.
pub const INIT: &str = "<init>";
/// Name of the static initializer that allocates array fields.
pub const CLINIT: &str = "<clinit>";
/// Name of the no-argument entry routine.
pub const MAIN: &str = "main";

/// Most fields a unit can declare.
pub const MAX_FIELDS: usize = u16::MAX as usize;
/// Most methods a unit can declare.
pub const MAX_METHODS: usize = u16::MAX as usize;
/// Most parameters a method can take.
pub const MAX_PARAMS: usize = u8::MAX as usize;

/// Index of a field in its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u16);

/// Index of a method in its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u16);

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit-level (static) variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: DataType,
}

impl FieldDef {
    /// Whether the field starts as a null reference rather than zero.
    pub fn defaults_to_null(&self) -> bool {
        !self.ty.is_primitive()
    }
}

/// A method signature and its compiled body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<DataType>,
    /// `None` for the initializers and the entry routine.
    pub return_type: Option<DataType>,
    /// Slots needed by parameters and locals.
    pub local_count: u16,
    pub chunk: BytecodeChunk,
}

/// A complete compiled unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub constants: Vec<crate::bytecode::Constant>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl Unit {
    /// Find a method by name, returning the first match.
    pub fn method_id(&self, name: &str) -> Option<MethodId> {
        self.methods
            .iter()
            .position(|m| m.name == name)
            .map(|i| MethodId(i as u16))
    }

    /// Get a method by id.
    pub fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.methods.get(id.0 as usize)
    }

    /// Find a method by name.
    pub fn method_named(&self, name: &str) -> Option<&MethodDef> {
        self.method_id(name).and_then(|id| self.method(id))
    }

    /// The entry routine: `main` taking no arguments and returning nothing.
    ///
    /// A user function may also be called `main`; it always has a return
    /// type and so is never picked.
    pub fn entry(&self) -> Option<MethodId> {
        self.methods
            .iter()
            .position(|m| m.name == MAIN && m.params.is_empty() && m.return_type.is_none())
            .map(|i| MethodId(i as u16))
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Disassemble every method.
    pub fn disassemble(&self) -> String {
        self.methods
            .iter()
            .map(|m| m.chunk.disassemble(&m.name))
            .collect()
    }
}

/// A reserved method slot.
#[derive(Debug)]
struct MethodSlot {
    name: String,
    params: Vec<DataType>,
    return_type: Option<DataType>,
    body: Option<(u16, BytecodeChunk)>,
}

/// Accumulates the fields and methods of one unit.
#[derive(Debug)]
pub struct UnitBuilder {
    name: String,
    constants: ConstantPool,
    fields: Vec<FieldDef>,
    methods: Vec<MethodSlot>,
}

impl UnitBuilder {
    /// Open a unit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constants: ConstantPool::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared constant pool, for method emitters.
    pub fn constants_mut(&mut self) -> &mut ConstantPool {
        &mut self.constants
    }

    /// Declare a static field.
    pub fn add_field(
        &mut self,
        name: &str,
        ty: DataType,
        span: Span,
    ) -> Result<FieldId, CompilationError> {
        if self.fields.len() >= MAX_FIELDS {
            return Err(CompilationError::Emit {
                message: format!("too many fields declaring '{name}': a unit holds at most {MAX_FIELDS}"),
                span,
            });
        }
        let id = FieldId(self.fields.len() as u16);
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
        });
        Ok(id)
    }

    /// Reserve a method slot for a signature.
    pub fn declare_method(
        &mut self,
        name: &str,
        params: Vec<DataType>,
        return_type: Option<DataType>,
        span: Span,
    ) -> Result<MethodId, CompilationError> {
        if params.len() > MAX_PARAMS {
            return Err(CompilationError::ArityMismatch {
                message: format!("too many parameters for '{name}'"),
                expected: MAX_PARAMS,
                got: params.len(),
                span,
            });
        }
        if self.methods.len() >= MAX_METHODS {
            return Err(CompilationError::Emit {
                message: format!("too many methods declaring '{name}': a unit holds at most {MAX_METHODS}"),
                span,
            });
        }
        let id = MethodId(self.methods.len() as u16);
        self.methods.push(MethodSlot {
            name: name.to_string(),
            params,
            return_type,
            body: None,
        });
        Ok(id)
    }

    /// Attach the compiled body of a declared method.
    pub fn define_method(
        &mut self,
        id: MethodId,
        local_count: u16,
        chunk: BytecodeChunk,
        span: Span,
    ) -> Result<(), CompilationError> {
        let slot = self
            .methods
            .get_mut(id.0 as usize)
            .ok_or_else(|| CompilationError::Emit {
                message: format!("method {id} was never declared"),
                span,
            })?;
        if slot.body.is_some() {
            return Err(CompilationError::Emit {
                message: format!("method '{}' defined twice", slot.name),
                span,
            });
        }
        tracing::trace!(method = %slot.name, code_size = chunk.len(), "define method");
        slot.body = Some((local_count, chunk));
        Ok(())
    }

    /// Finish the unit. Every declared method must have a body.
    pub fn finish(self, span: Span) -> Result<Unit, CompilationError> {
        let methods = self
            .methods
            .into_iter()
            .map(|slot| match slot.body {
                Some((local_count, chunk)) => Ok(MethodDef {
                    name: slot.name,
                    params: slot.params,
                    return_type: slot.return_type,
                    local_count,
                    chunk,
                }),
                None => Err(CompilationError::Emit {
                    message: format!("method '{}' has no body", slot.name),
                    span,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Unit {
            name: self.name,
            constants: self.constants.constants().to_vec(),
            fields: self.fields,
            methods,
        })
    }
}
