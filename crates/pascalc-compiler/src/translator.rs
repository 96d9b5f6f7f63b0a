//! Program translation.
//!
//! [`Translator::translate`] walks a [`Program`] once and produces a
//! [`CompiledUnit`]. Methods are laid out in a fixed order:
//!
//! ```text
//! #0 <init>      trivial instance initializer
//! #1 <clinit>    allocates array globals, in declaration order
//! #2..           user functions, in declaration order
//! #last main     the program body
//! ```
//!
//! A function's signature is registered before its body is compiled, so it
//! may call itself and any function declared before it.

use pascalc_ast::{Block, FunctionDecl, Program, VarDecl};
use pascalc_core::{CompilationError, DataType, Span};
use tracing::debug;

use crate::artifact;
use crate::emit::BytecodeEmitter;
use crate::expr::emit_error;
use crate::function_compiler::{FunctionCompiler, emit_allocation};
use crate::symbols::{Storage, SymbolTable};
use crate::type_resolver::resolve_type;
use crate::unit::{CLINIT, INIT, MAIN, Unit, UnitBuilder};

type Result<T> = std::result::Result<T, CompilationError>;

/// The result of translating one program.
#[derive(Debug)]
pub struct CompiledUnit {
    name: String,
    binary: Vec<u8>,
    unit: Unit,
    symbols: SymbolTable,
}

impl CompiledUnit {
    /// The unit name derived from the program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The encoded artifact.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// The decoded form of [`binary`](Self::binary).
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Globals and function signatures declared by the program.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Take the encoded artifact.
    pub fn into_binary(self) -> Vec<u8> {
        self.binary
    }
}

/// Translates programs into compiled units.
///
/// Every call to [`translate`](Self::translate) starts from an empty symbol
/// table; nothing declared by one program is visible to the next.
#[derive(Debug, Default)]
pub struct Translator {
    symbols: SymbolTable,
}

impl Translator {
    /// Create a translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a program. Fails on the first error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    #[tracing::instrument(level = "debug", skip_all, fields(program = %program.name))]
    pub fn translate(&mut self, program: &Program<'_>) -> Result<CompiledUnit> {
        self.symbols = SymbolTable::new();

        let name = unit_name(program.name.name);
        let mut builder = UnitBuilder::new(name.clone());

        self.declare_globals(&mut builder, program.globals)?;
        self.emit_initializers(&mut builder, program.span)?;
        for function in program.functions {
            self.compile_function(&mut builder, function)?;
        }
        self.compile_entry(&mut builder, &program.body, program.span)?;

        let unit = builder.finish(program.span)?;
        let binary = artifact::encode(&unit).map_err(|e| CompilationError::Emit {
            message: e.to_string(),
            span: program.span,
        })?;
        debug!(
            unit = %unit.name,
            fields = unit.fields.len(),
            methods = unit.methods.len(),
            bytes = binary.len(),
            "unit finished"
        );

        Ok(CompiledUnit {
            name,
            binary,
            unit,
            symbols: std::mem::take(&mut self.symbols),
        })
    }

    fn declare_globals(&mut self, builder: &mut UnitBuilder, globals: &[VarDecl<'_>]) -> Result<()> {
        for decl in globals {
            let ty = resolve_type(&decl.ty)?;
            for ident in decl.names {
                if self.symbols.global(ident.name).is_some() {
                    return Err(CompilationError::DuplicateDeclaration {
                        name: ident.name.to_string(),
                        message: "a global variable with this name already exists".to_string(),
                        span: ident.span,
                    });
                }
                let field = builder.add_field(ident.name, ty.clone(), ident.span)?;
                self.symbols.declare_global(ident.name, ty.clone(), field, ident.span)?;
            }
        }
        Ok(())
    }

    /// Emit `<init>` and `<clinit>`.
    fn emit_initializers(&mut self, builder: &mut UnitBuilder, span: Span) -> Result<()> {
        let init = builder.declare_method(INIT, Vec::new(), None, span)?;
        let clinit = builder.declare_method(CLINIT, Vec::new(), None, span)?;

        let mut emitter = BytecodeEmitter::new(builder.constants_mut());
        emitter.emit_return_void();
        let chunk = emitter.finish().map_err(|e| emit_error(e, span))?;
        builder.define_method(init, 0, chunk, span)?;

        let mut emitter = BytecodeEmitter::new(builder.constants_mut());
        for global in self.symbols.globals() {
            if let (Some(array), Storage::Global(field)) = (global.ty.as_array(), global.storage) {
                emit_allocation(&mut emitter, array).map_err(|e| emit_error(e, span))?;
                emitter.emit_set_global(field.0);
            }
        }
        emitter.emit_return_void();
        let chunk = emitter.finish().map_err(|e| emit_error(e, span))?;
        builder.define_method(clinit, 0, chunk, span)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %decl.name))]
    fn compile_function(&mut self, builder: &mut UnitBuilder, decl: &FunctionDecl<'_>) -> Result<()> {
        let name = decl.name.name;
        let span = decl.span;

        let return_type = resolve_type(&decl.return_type)?;
        let params = decl
            .param_list()
            .map(|(ident, ty)| resolve_type(&ty).map(|ty| (ident, ty)))
            .collect::<Result<Vec<_>>>()?;
        let param_types: Vec<DataType> = params.iter().map(|(_, ty)| ty.clone()).collect();

        if self.symbols.resolve_function(name, &param_types).is_some() {
            return Err(CompilationError::DuplicateDeclaration {
                name: name.to_string(),
                message: format!(
                    "a function with parameters ({}) already exists",
                    crate::symbols::type_list(&param_types)
                ),
                span: decl.name.span,
            });
        }

        let method = builder.declare_method(name, param_types.clone(), Some(return_type.clone()), span)?;
        self.symbols
            .declare_function(name, param_types, return_type.clone(), method, decl.name.span)?;

        let mut compiler =
            FunctionCompiler::new(&mut self.symbols, builder.constants_mut(), name, return_type, span);
        compiler.setup_parameters(&params)?;
        compiler.declare_locals(decl.locals)?;
        compiler.compile_body(&decl.body)?;
        let (local_count, chunk) = compiler.finish()?;

        builder.define_method(method, local_count, chunk, span)
    }

    fn compile_entry(&mut self, builder: &mut UnitBuilder, body: &Block<'_>, span: Span) -> Result<()> {
        let method = builder.declare_method(MAIN, Vec::new(), None, span)?;

        let mut compiler = FunctionCompiler::entry(&mut self.symbols, builder.constants_mut(), span);
        compiler.compile_body(body)?;
        let (local_count, chunk) = compiler.finish()?;

        builder.define_method(method, local_count, chunk, span)
    }
}

/// Translate a program with a fresh [`Translator`].
pub fn translate(program: &Program<'_>) -> Result<CompiledUnit> {
    Translator::new().translate(program)
}

/// The program name with its first letter upper-cased.
fn unit_name(program: &str) -> String {
    let mut chars = program.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
