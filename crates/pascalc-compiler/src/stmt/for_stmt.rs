//! Counting for loop compilation.

use pascalc_ast::{Expr, ForDirection, ForStmt, QualifiedName};
use pascalc_core::{CompilationError, DataType, Span};

use crate::bytecode::OpCode;
use crate::expr::{compile_element_address, emit_load, emit_store, require_array};
use crate::symbols::{Storage, Variable};

use super::{Result, StmtCompiler};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Compile `for counter := start (to|downto) bound do body`.
    ///
    /// The bound is evaluated again before every iteration and the loop
    /// runs while the counter has not passed it. `continue` resumes at the
    /// counter update.
    ///
    /// Bytecode layout (`to`; `downto` uses `JumpIfGt` and subtracts):
    /// ```text
    /// [counter := start]
    /// test:
    /// [bound] [counter]
    /// JumpIfLt -> break     (bound < counter)
    /// [body]
    /// continue:
    /// [counter := counter + 1]
    /// Jump -> test
    /// break:
    /// ```
    pub fn compile_for(&mut self, for_stmt: &ForStmt<'_>) -> Result<()> {
        let target = &for_stmt.init.target;
        let counter = self.resolve_variable_target(target, "a loop counter")?;

        let counter_type = Self::target_type(&counter, target)?;
        if counter_type != DataType::INTEGER {
            return Err(CompilationError::type_mismatch(
                format_args!("loop counter '{}'", target.name()),
                DataType::INTEGER,
                counter_type,
                target.span,
            ));
        }

        self.compile_store(&counter, target, |exprs, ty| {
            exprs.check(for_stmt.init.value, ty, "loop start value")
        })?;

        let test = self.emitter.new_label();
        let continue_label = self.emitter.new_label();
        let break_label = self.emitter.new_label();

        self.bind(test, for_stmt.span)?;
        {
            let mut exprs = self.expr_compiler();
            exprs.check(for_stmt.bound, &DataType::INTEGER, "loop bound")?;
            exprs.infer(&Expr::Name(*target))?;
        }
        let exit = match for_stmt.direction {
            ForDirection::To => OpCode::JumpIfLt,
            ForDirection::Downto => OpCode::JumpIfGt,
        };
        self.emitter.emit_jump(exit, break_label);

        self.compile_loop_body(for_stmt.body, continue_label, break_label)?;

        self.bind(continue_label, for_stmt.span)?;
        self.emit_counter_step(&counter, target, for_stmt.direction)?;
        self.emitter.emit_jump(OpCode::Jump, test);
        self.bind(break_label, for_stmt.span)
    }

    fn emit_counter_step(
        &mut self,
        counter: &Variable,
        target: &QualifiedName<'_>,
        direction: ForDirection,
    ) -> Result<()> {
        let step = match direction {
            ForDirection::To => OpCode::Add,
            ForDirection::Downto => OpCode::Sub,
        };

        if target.is_indexed() {
            let array = require_array(counter, target.span)?;
            let mut exprs = self.expr_compiler();
            compile_element_address(&mut exprs, counter, array, target.indices, target.span)?;
            let emitter = exprs.emitter();
            emitter.emit(OpCode::Dup2);
            emitter.emit(OpCode::ArrayLoad);
            emitter.emit(OpCode::PushOne);
            emitter.emit(step);
            emitter.emit(OpCode::ArrayStore);
            return Ok(());
        }

        match counter.storage {
            Storage::Local(slot) => {
                let delta = i8::try_from(direction.step()).map_err(|_| step_error(target.span))?;
                self.emitter.emit_inc_local(slot, delta);
            }
            Storage::Global(_) => {
                emit_load(self.emitter, counter);
                self.emitter.emit(OpCode::PushOne);
                self.emitter.emit(step);
                emit_store(self.emitter, counter);
            }
        }
        Ok(())
    }
}

fn step_error(span: Span) -> CompilationError {
    CompilationError::Emit {
        message: "loop step does not fit an in-place increment".to_string(),
        span,
    }
}
