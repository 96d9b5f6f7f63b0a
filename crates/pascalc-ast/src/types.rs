//! Type expressions as written in declarations.
//!
//! A [`TypeExpr`] is the syntactic form (`integer`, `array[1..10] of boolean`);
//! the translator resolves it into a [`pascalc_core::DataType`] and reports
//! inverted bounds against the range's span.

use pascalc_core::{PrimitiveKind, Span};

/// A declared type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    /// Element kind for arrays, or the kind itself for scalars
    pub primitive: PrimitiveKind,
    /// Array dimensions, empty for a scalar
    pub ranges: &'ast [RangeExpr],
    /// Source location
    pub span: Span,
}

impl TypeExpr<'_> {
    /// Whether this is an array type.
    #[inline]
    pub fn is_array(&self) -> bool {
        !self.ranges.is_empty()
    }
}

/// One `from..to` array bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeExpr {
    /// Lower bound
    pub from: i32,
    /// Upper bound
    pub to: i32,
    /// Source location
    pub span: Span,
}
