//! Expression AST nodes.
//!
//! # Expression Precedence
//!
//! The parser builds the tree with the following levels (low to high):
//! 1. Logical and relational (`or`, `and`, `=`, `<>`, `<`, `<=`, `>`, `>=`)
//! 2. Additive (`+`, `-`, including a leading unary sign)
//! 3. Multiplicative (`*`, `/`, `mod`)
//! 4. Unary `not`
//! 5. Atoms (literal, variable or array element, call, parenthesized expression)

use crate::node::Ident;
use crate::ops::{BinaryOp, UnaryOp};
use pascalc_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer or boolean literal
    Literal(LiteralExpr),
    /// Variable or array element
    Name(QualifiedName<'ast>),
    /// Function call
    Call(&'ast CallExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Name(e) => e.span,
            Self::Call(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr {
    /// The literal kind
    pub kind: LiteralKind,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Integer literal
    Int(i32),
    /// `true` / `false`
    Bool(bool),
}

/// A variable reference, optionally indexed: `x` or `a[i, j]`.
///
/// Used both as an expression and as the target of assignments, `for`
/// counters and `read` statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualifiedName<'ast> {
    /// The variable name
    pub ident: Ident<'ast>,
    /// Index expressions, empty for a plain variable
    pub indices: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> QualifiedName<'ast> {
    /// The variable name.
    #[inline]
    pub fn name(&self) -> &'ast str {
        self.ident.name
    }

    /// Whether this names an array element rather than a whole variable.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }
}

/// A function call `f(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// Function name
    pub callee: Ident<'ast>,
    /// Arguments in order
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    /// The inner expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}
