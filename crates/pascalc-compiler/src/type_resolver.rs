//! Resolution of declared type expressions into [`DataType`]s.
//!
//! Arrays are checked here: every range must have `from <= to`, and the
//! total cell count must fit a 32-bit length since it is pushed as an
//! integer when the backing store is allocated.

use pascalc_ast::TypeExpr;
use pascalc_core::{ArrayType, CompilationError, DataType, Range};

type Result<T> = std::result::Result<T, CompilationError>;

/// Resolve a declared type.
pub fn resolve_type(ty: &TypeExpr<'_>) -> Result<DataType> {
    if !ty.is_array() {
        return Ok(DataType::Primitive(ty.primitive));
    }

    let dimensions = ty
        .ranges
        .iter()
        .map(|r| {
            Range::new(r.from, r.to).ok_or_else(|| CompilationError::InvalidRange {
                message: format!("lower bound {} exceeds upper bound {}", r.from, r.to),
                span: r.span,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let array = ArrayType::new(ty.primitive, dimensions).ok_or_else(|| {
        CompilationError::InvalidRange {
            message: "an array needs at least one dimension".to_string(),
            span: ty.span,
        }
    })?;

    if array.size() > i32::MAX as u64 {
        return Err(CompilationError::InvalidRange {
            message: format!("{array} has more than {} cells", i32::MAX),
            span: ty.span,
        });
    }

    Ok(DataType::Array(array))
}

/// Cell count of an array type as the integer pushed before `NewArray`.
pub(crate) fn cell_count(array: &ArrayType) -> i32 {
    i32::try_from(array.size()).unwrap_or(i32::MAX)
}
