//! Symbol table for one translation.
//!
//! Tracks global variables, function signatures for overload resolution,
//! the locals of the function being compiled, the current-function context
//! and the stack of enclosing loops. A fresh table is built for every
//! translation; nothing here is shared between calls.

use pascalc_core::{CompilationError, DataType, Span};
use rustc_hash::FxHashMap;

use crate::emit::Label;
use crate::unit::{FieldId, MethodId};

/// Where a variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// A unit field.
    Global(FieldId),
    /// A slot of the current method frame.
    Local(u16),
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: DataType,
    pub storage: Storage,
}

/// A declared function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<DataType>,
    pub return_type: DataType,
    pub method: MethodId,
}

/// The function whose body is being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionContext {
    pub name: String,
    pub return_type: DataType,
}

/// Jump targets of one enclosing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopContext {
    pub continue_label: Label,
    pub break_label: Label,
}

/// What a name used as an assignment target refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The enclosing function's own name: a return-value write.
    FunctionResult(&'a DataType),
    /// A local or global variable.
    Variable(&'a Variable),
}

/// Module-wide and per-function symbols.
#[derive(Debug, Default)]
pub struct SymbolTable {
    globals: Vec<Variable>,
    global_index: FxHashMap<String, usize>,
    functions: FxHashMap<String, Vec<FunctionSignature>>,
    locals: Vec<Variable>,
    local_index: FxHashMap<String, usize>,
    current: Option<FunctionContext>,
    loops: Vec<LoopContext>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Globals
    // ==========================================================================

    /// Register a module-level variable stored in `field`.
    pub fn declare_global(
        &mut self,
        name: &str,
        ty: DataType,
        field: FieldId,
        span: Span,
    ) -> Result<(), CompilationError> {
        if self.global_index.contains_key(name) {
            return Err(CompilationError::DuplicateDeclaration {
                name: name.to_string(),
                message: "a global variable with this name already exists".to_string(),
                span,
            });
        }
        self.global_index.insert(name.to_string(), self.globals.len());
        self.globals.push(Variable {
            name: name.to_string(),
            ty,
            storage: Storage::Global(field),
        });
        Ok(())
    }

    /// Look up a global variable.
    pub fn global(&self, name: &str) -> Option<&Variable> {
        self.global_index.get(name).map(|&i| &self.globals[i])
    }

    /// All globals in declaration order.
    pub fn globals(&self) -> &[Variable] {
        &self.globals
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Register a function signature.
    ///
    /// Fails if a function with the same name and parameter types exists.
    pub fn declare_function(
        &mut self,
        name: &str,
        params: Vec<DataType>,
        return_type: DataType,
        method: MethodId,
        span: Span,
    ) -> Result<(), CompilationError> {
        let overloads = self.functions.entry(name.to_string()).or_default();
        if overloads.iter().any(|sig| sig.params == params) {
            return Err(CompilationError::DuplicateDeclaration {
                name: name.to_string(),
                message: format!(
                    "a function with parameters ({}) already exists",
                    type_list(&params)
                ),
                span,
            });
        }
        overloads.push(FunctionSignature {
            name: name.to_string(),
            params,
            return_type,
            method,
        });
        Ok(())
    }

    /// Find the overload whose parameter types equal `args` exactly.
    pub fn resolve_function(&self, name: &str, args: &[DataType]) -> Option<&FunctionSignature> {
        self.functions
            .get(name)?
            .iter()
            .find(|sig| sig.params == args)
    }

    /// Whether any function has this name.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of declared signatures.
    pub fn function_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    // ==========================================================================
    // Current function and locals
    // ==========================================================================

    /// Start a new function body. Clears the locals of the previous one.
    pub fn begin_function(&mut self, name: &str, return_type: DataType) {
        self.clear_locals();
        self.current = Some(FunctionContext {
            name: name.to_string(),
            return_type,
        });
    }

    /// Start the entry body, which has no function context.
    pub fn begin_entry(&mut self) {
        self.clear_locals();
        self.current = None;
    }

    /// Leave the current body.
    pub fn end_function(&mut self) {
        self.clear_locals();
        self.current = None;
    }

    /// The function being compiled, if any.
    pub fn current_function(&self) -> Option<&FunctionContext> {
        self.current.as_ref()
    }

    fn clear_locals(&mut self) {
        self.locals.clear();
        self.local_index.clear();
        self.loops.clear();
    }

    /// Append a local; its slot is the number of locals declared before it.
    pub fn add_local(
        &mut self,
        name: &str,
        ty: DataType,
        span: Span,
    ) -> Result<u16, CompilationError> {
        if self.local_index.contains_key(name) {
            return Err(CompilationError::DuplicateDeclaration {
                name: name.to_string(),
                message: "a parameter or local with this name already exists".to_string(),
                span,
            });
        }
        let slot = u16::try_from(self.locals.len())
            .ok()
            .filter(|&slot| slot < u16::MAX)
            .ok_or_else(|| CompilationError::Emit {
                message: format!("too many locals declaring '{name}'"),
                span,
            })?;
        self.local_index.insert(name.to_string(), self.locals.len());
        self.locals.push(Variable {
            name: name.to_string(),
            ty,
            storage: Storage::Local(slot),
        });
        Ok(slot)
    }

    /// Look up a local variable.
    pub fn local(&self, name: &str) -> Option<&Variable> {
        self.local_index.get(name).map(|&i| &self.locals[i])
    }

    /// Number of locals in the current body.
    ///
    /// [`add_local`](Self::add_local) keeps the count below `u16::MAX`.
    pub fn local_count(&self) -> u16 {
        self.locals.len() as u16
    }

    /// Resolve a variable: locals shadow globals.
    pub fn resolve_variable(&self, name: &str) -> Option<&Variable> {
        self.local(name).or_else(|| self.global(name))
    }

    /// Resolve an assignment target: the enclosing function's own name
    /// first, then locals, then globals.
    pub fn resolve_target(&self, name: &str) -> Option<Target<'_>> {
        if let Some(current) = &self.current
            && current.name == name
        {
            return Some(Target::FunctionResult(&current.return_type));
        }
        self.resolve_variable(name).map(Target::Variable)
    }

    // ==========================================================================
    // Loops
    // ==========================================================================

    /// Push the targets of a loop being entered.
    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.loops.push(LoopContext {
            continue_label,
            break_label,
        });
    }

    /// Pop the innermost loop.
    pub fn exit_loop(&mut self) -> Option<LoopContext> {
        self.loops.pop()
    }

    /// The innermost loop, if any.
    pub fn innermost_loop(&self) -> Option<LoopContext> {
        self.loops.last().copied()
    }

    /// Current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }
}

/// Render a parameter list like `integer, boolean`.
pub(crate) fn type_list(types: &[DataType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
