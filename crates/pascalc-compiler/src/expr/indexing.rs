//! Bounds-checked, row-major array element addressing.
//!
//! For `a[i1, ..., ik]` the array reference is pushed, then each index is
//! evaluated left to right, checked against its range, normalized to a
//! zero-based offset and folded into a flat offset:
//!
//! ```text
//! offset = ((off_0 * len_1) + off_1) * len_2 + off_2 ...
//! ```
//!
//! Per dimension the emitted check is:
//!
//! ```text
//! [index]
//! Dup; push from; JumpIfLt -> bad
//! Dup; push to;   JumpIfLe -> ok
//! bad: Fault "Index out of bound in access ..."
//! ok:  push from; Sub            (omitted when from = 0)
//! ```
//!
//! A violation is a runtime fault: whether an index is in range depends on
//! data, so the translator only emits the guard.

use pascalc_ast::Expr;
use pascalc_core::{ArrayType, CompilationError, DataType, Span};

use super::{ExprCompiler, Result, emit_error, emit_load};
use crate::bytecode::OpCode;
use crate::symbols::Variable;

/// Push the array reference of `var` and the flat offset of `indices`.
///
/// Leaves `array, offset` on the stack, ready for `ArrayLoad` or for a
/// value followed by `ArrayStore`.
pub(crate) fn compile_element_address(
    compiler: &mut ExprCompiler<'_, '_>,
    var: &Variable,
    array: &ArrayType,
    indices: &[Expr<'_>],
    span: Span,
) -> Result<()> {
    if indices.len() != array.rank() {
        return Err(CompilationError::ArityMismatch {
            message: format!("wrong number of indices for array '{}'", var.name),
            expected: array.rank(),
            got: indices.len(),
            span,
        });
    }

    emit_load(compiler.emitter(), var);

    for (dim, (range, index)) in array.dimensions().iter().zip(indices).enumerate() {
        if dim > 0 {
            compiler.emit_int(range.length() as i32, span)?;
            compiler.emitter().emit(OpCode::Mul);
        }

        compiler.check(
            index,
            &DataType::INTEGER,
            format_args!("index {} of '{}'", dim + 1, var.name),
        )?;
        emit_bounds_check(compiler, &var.name, range.from(), range.to(), index.span())?;

        if range.from() != 0 {
            compiler.emit_int(range.from(), span)?;
            compiler.emitter().emit(OpCode::Sub);
        }
        if dim > 0 {
            compiler.emitter().emit(OpCode::Add);
        }
    }

    Ok(())
}

fn emit_bounds_check(
    compiler: &mut ExprCompiler<'_, '_>,
    name: &str,
    from: i32,
    to: i32,
    span: Span,
) -> Result<()> {
    let bad = compiler.emitter().new_label();
    let ok = compiler.emitter().new_label();

    compiler.emitter().emit(OpCode::Dup);
    compiler.emit_int(from, span)?;
    compiler.emitter().emit_jump(OpCode::JumpIfLt, bad);
    compiler.emitter().emit(OpCode::Dup);
    compiler.emit_int(to, span)?;
    compiler.emitter().emit_jump(OpCode::JumpIfLe, ok);

    compiler.bind(bad, span)?;
    compiler
        .emitter()
        .emit_fault(&format!(
            "Index out of bound in access of '{name}' at {span} (range {from}..{to})"
        ))
        .map_err(|e| emit_error(e, span))?;
    compiler.bind(ok, span)
}
