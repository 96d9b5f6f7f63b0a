//! Arena-backed construction of AST nodes.
//!
//! Parsers and tests build trees through [`AstBuilder`] instead of
//! assembling the node structs by hand. Every node gets the builder's
//! current position, set with [`AstBuilder::at`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use pascalc_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! let body = [b.at(2, 3).write(&[b.binary(b.int(1), BinaryOp::Add, b.int(2))])];
//! let program = b.program("demo", &[], &[], &body);
//! assert_eq!(program.name.name, "demo");
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use pascalc_core::{PrimitiveKind, Span};

use crate::decl::{FunctionDecl, Program, VarDecl};
use crate::expr::{
    BinaryExpr, CallExpr, Expr, LiteralExpr, LiteralKind, ParenExpr, QualifiedName, UnaryExpr,
};
use crate::node::Ident;
use crate::ops::{BinaryOp, ForDirection, UnaryOp};
use crate::stmt::{
    AssignStmt, Block, BreakStmt, ContinueStmt, ForStmt, IfStmt, ReadStmt, Stmt, WhileStmt,
    WriteStmt,
};
use crate::types::{RangeExpr, TypeExpr};

/// Allocates AST nodes in a [`Bump`] arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder positioned at `1:1`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Cell::new(Span::point(1, 1)),
        }
    }

    /// Set the position given to every node built afterwards.
    pub fn at(&self, line: u32, col: u32) -> &Self {
        self.span.set(Span::point(line, col));
        self
    }

    /// The current position.
    #[inline]
    pub fn span(&self) -> Span {
        self.span.get()
    }

    /// The backing arena.
    #[inline]
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// An identifier copied into the arena.
    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// `integer`
    pub fn integer(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveKind::Integer)
    }

    /// `boolean`
    pub fn boolean(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveKind::Boolean)
    }

    fn primitive(&self, primitive: PrimitiveKind) -> TypeExpr<'ast> {
        TypeExpr {
            primitive,
            ranges: &[],
            span: self.span(),
        }
    }

    /// `array[from..to, ...] of element`
    pub fn array(&self, element: PrimitiveKind, bounds: &[(i32, i32)]) -> TypeExpr<'ast> {
        let span = self.span();
        let ranges = self
            .arena
            .alloc_slice_fill_iter(bounds.iter().map(|&(from, to)| RangeExpr { from, to, span }));
        TypeExpr {
            primitive: element,
            ranges,
            span,
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Integer literal.
    pub fn int(&self, value: i32) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind: LiteralKind::Int(value),
            span: self.span(),
        })
    }

    /// `true` / `false`.
    pub fn bool(&self, value: bool) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind: LiteralKind::Bool(value),
            span: self.span(),
        })
    }

    /// A plain variable reference.
    pub fn var(&self, name: &str) -> Expr<'ast> {
        Expr::Name(self.name(name))
    }

    /// An array element reference `name[indices]`.
    pub fn index(&self, name: &str, indices: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Name(self.element(name, indices))
    }

    /// A function call expression.
    pub fn call(&self, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Call(self.call_expr(name, args))
    }

    fn call_expr(&self, name: &str, args: &[Expr<'ast>]) -> &'ast CallExpr<'ast> {
        self.arena.alloc(CallExpr {
            callee: self.ident(name),
            args: self.arena.alloc_slice_copy(args),
            span: self.span(),
        })
    }

    /// A binary operation.
    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left: self.arena.alloc(left),
            op,
            right: self.arena.alloc(right),
            span: self.span(),
        }))
    }

    /// A unary operation.
    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand: self.arena.alloc(operand),
            span: self.span(),
        }))
    }

    /// `not operand`
    pub fn not(&self, operand: Expr<'ast>) -> Expr<'ast> {
        self.unary(UnaryOp::Not, operand)
    }

    /// `-operand`
    pub fn neg(&self, operand: Expr<'ast>) -> Expr<'ast> {
        self.unary(UnaryOp::Neg, operand)
    }

    /// `(expr)`
    pub fn paren(&self, expr: Expr<'ast>) -> Expr<'ast> {
        Expr::Paren(self.arena.alloc(ParenExpr {
            expr: self.arena.alloc(expr),
            span: self.span(),
        }))
    }

    // ------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------

    /// A plain variable used as a target.
    pub fn name(&self, name: &str) -> QualifiedName<'ast> {
        self.element(name, &[])
    }

    /// An array element used as a target.
    pub fn element(&self, name: &str, indices: &[Expr<'ast>]) -> QualifiedName<'ast> {
        QualifiedName {
            ident: self.ident(name),
            indices: self.arena.alloc_slice_copy(indices),
            span: self.span(),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// `target := value`
    pub fn assign(&self, target: QualifiedName<'ast>, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Assign(self.arena.alloc(self.assign_stmt(target, value)))
    }

    fn assign_stmt(&self, target: QualifiedName<'ast>, value: Expr<'ast>) -> AssignStmt<'ast> {
        AssignStmt {
            target,
            value: self.arena.alloc(value),
            span: self.span(),
        }
    }

    /// `if condition then ... [else ...]`
    pub fn if_(
        &self,
        condition: Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            condition: self.arena.alloc(condition),
            then_branch: self.arena.alloc(then_branch),
            else_branch: else_branch.map(|s| self.stmt(s)),
            span: self.span(),
        }))
    }

    fn stmt(&self, stmt: Stmt<'ast>) -> &'ast Stmt<'ast> {
        self.arena.alloc(stmt)
    }

    /// `while condition do body`
    pub fn while_(&self, condition: Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            condition: self.arena.alloc(condition),
            body: self.arena.alloc(body),
            span: self.span(),
        }))
    }

    /// `for counter := start to bound do body`
    pub fn for_to(
        &self,
        counter: QualifiedName<'ast>,
        start: Expr<'ast>,
        bound: Expr<'ast>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        self.for_(counter, start, ForDirection::To, bound, body)
    }

    /// `for counter := start downto bound do body`
    pub fn for_downto(
        &self,
        counter: QualifiedName<'ast>,
        start: Expr<'ast>,
        bound: Expr<'ast>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        self.for_(counter, start, ForDirection::Downto, bound, body)
    }

    fn for_(
        &self,
        counter: QualifiedName<'ast>,
        start: Expr<'ast>,
        direction: ForDirection,
        bound: Expr<'ast>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::For(self.arena.alloc(ForStmt {
            init: self.assign_stmt(counter, start),
            direction,
            bound: self.arena.alloc(bound),
            body: self.arena.alloc(body),
            span: self.span(),
        }))
    }

    /// `begin stmts end`
    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.block_of(stmts))
    }

    /// A [`Block`] node, as used for function and program bodies.
    pub fn block_of(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    /// A call used as a statement.
    pub fn call_stmt(&self, name: &str, args: &[Expr<'ast>]) -> Stmt<'ast> {
        Stmt::Call(self.call_expr(name, args))
    }

    /// `read(targets)`
    pub fn read(&self, targets: &[QualifiedName<'ast>]) -> Stmt<'ast> {
        Stmt::Read(ReadStmt {
            targets: self.arena.alloc_slice_copy(targets),
            span: self.span(),
        })
    }

    /// `write(values)`
    pub fn write(&self, values: &[Expr<'ast>]) -> Stmt<'ast> {
        Stmt::Write(WriteStmt {
            values: self.arena.alloc_slice_copy(values),
            span: self.span(),
        })
    }

    /// `break`
    pub fn break_(&self) -> Stmt<'ast> {
        Stmt::Break(BreakStmt { span: self.span() })
    }

    /// `continue`
    pub fn continue_(&self) -> Stmt<'ast> {
        Stmt::Continue(ContinueStmt { span: self.span() })
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `names: ty`
    pub fn var_decl(&self, names: &[&str], ty: TypeExpr<'ast>) -> VarDecl<'ast> {
        VarDecl {
            names: self
                .arena
                .alloc_slice_fill_iter(names.iter().map(|name| self.ident(name))),
            ty,
            span: self.span(),
        }
    }

    /// A function declaration.
    pub fn function(
        &self,
        name: &str,
        params: &[VarDecl<'ast>],
        return_type: TypeExpr<'ast>,
        locals: &[VarDecl<'ast>],
        body: &[Stmt<'ast>],
    ) -> FunctionDecl<'ast> {
        FunctionDecl {
            name: self.ident(name),
            params: self.arena.alloc_slice_copy(params),
            return_type,
            locals: self.arena.alloc_slice_copy(locals),
            body: self.block_of(body),
            span: self.span(),
        }
    }

    /// A program unit.
    pub fn program(
        &self,
        name: &str,
        globals: &[VarDecl<'ast>],
        functions: &[FunctionDecl<'ast>],
        body: &[Stmt<'ast>],
    ) -> Program<'ast> {
        Program {
            name: self.ident(name),
            globals: self.arena.alloc_slice_copy(globals),
            functions: self.arena.alloc_slice_copy(functions),
            body: self.block_of(body),
            span: self.span(),
        }
    }
}
