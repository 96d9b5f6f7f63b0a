//! Declaration AST nodes: the program, its variables and its functions.

use crate::node::Ident;
use crate::stmt::Block;
use crate::types::TypeExpr;
use pascalc_core::Span;

/// A complete program unit.
///
/// ```text
/// program Name;
/// var ...;
/// function ...;
/// begin ... end.
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// Program name
    pub name: Ident<'ast>,
    /// Global variable declarations, in order
    pub globals: &'ast [VarDecl<'ast>],
    /// Function declarations, in order
    pub functions: &'ast [FunctionDecl<'ast>],
    /// Entry body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

/// A variable declaration sharing one type: `a, b: integer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    /// Declared names, in order
    pub names: &'ast [Ident<'ast>],
    /// Declared type
    pub ty: TypeExpr<'ast>,
    /// Source location
    pub span: Span,
}

/// A function declaration.
///
/// Parameters are passed by value and occupy the first local slots, in
/// order; `locals` follow them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name
    pub name: Ident<'ast>,
    /// Parameter groups
    pub params: &'ast [VarDecl<'ast>],
    /// Return type
    pub return_type: TypeExpr<'ast>,
    /// Local variable declarations
    pub locals: &'ast [VarDecl<'ast>],
    /// Function body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

impl<'ast> FunctionDecl<'ast> {
    /// Parameter names and their types, flattened in declaration order.
    pub fn param_list(&self) -> impl Iterator<Item = (Ident<'ast>, TypeExpr<'ast>)> + '_ {
        self.params
            .iter()
            .flat_map(|decl| decl.names.iter().map(move |name| (*name, decl.ty)))
    }
}
