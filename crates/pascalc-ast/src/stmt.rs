//! Statement AST nodes.
//!
//! - Assignment (`target := expr`)
//! - Control flow (`if`, `while`, `for`)
//! - Jump statements (`break`, `continue`)
//! - Blocks and call statements
//! - I/O (`read`, `write`)

use crate::expr::{CallExpr, Expr, QualifiedName};
use crate::ops::ForDirection;
use pascalc_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Assignment
    Assign(&'ast AssignStmt<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// Counting for loop
    For(&'ast ForStmt<'ast>),
    /// `begin ... end`
    Block(Block<'ast>),
    /// Function called for its side effects
    Call(&'ast CallExpr<'ast>),
    /// `read(v1, ..., vn)`
    Read(ReadStmt<'ast>),
    /// `write(e1, ..., en)`
    Write(WriteStmt<'ast>),
    /// Break statement
    Break(BreakStmt),
    /// Continue statement
    Continue(ContinueStmt),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Assign(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::For(s) => s.span,
            Self::Block(s) => s.span,
            Self::Call(s) => s.span,
            Self::Read(s) => s.span,
            Self::Write(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
        }
    }
}

/// An assignment `target := value`.
///
/// When `target` names the enclosing function, the assignment sets the
/// function result and returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    /// Variable, array element or enclosing function name
    pub target: QualifiedName<'ast>,
    /// Assigned value
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An if statement with optional else branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Statement run when the condition holds
    pub then_branch: &'ast Stmt<'ast>,
    /// Statement run otherwise
    pub else_branch: Option<&'ast Stmt<'ast>>,
    /// Source location
    pub span: Span,
}

/// A while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    /// Condition tested before each iteration
    pub condition: &'ast Expr<'ast>,
    /// Loop body
    pub body: &'ast Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// `for counter := start (to|downto) bound do body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Initial assignment of the counter
    pub init: AssignStmt<'ast>,
    /// Counting direction
    pub direction: ForDirection,
    /// End bound, inclusive
    pub bound: &'ast Expr<'ast>,
    /// Loop body
    pub body: &'ast Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

/// `read(v1, ..., vn)`: one input line per target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadStmt<'ast> {
    /// Variables or array elements to fill
    pub targets: &'ast [QualifiedName<'ast>],
    /// Source location
    pub span: Span,
}

/// `write(e1, ..., en)`: one output line per value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteStmt<'ast> {
    /// Values to print
    pub values: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A break statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    /// Source location
    pub span: Span,
}

/// A continue statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt {
    /// Source location
    pub span: Span,
}
