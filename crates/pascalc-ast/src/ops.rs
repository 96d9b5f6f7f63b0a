//! Operator definitions for expressions and `for` loops.

use std::fmt;

/// Binary operators, organized by precedence from lowest to highest.
///
/// The upstream parser has already applied precedence when building the
/// tree; [`BinaryOp::precedence`] is kept for printers and parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical and relational (precedence 1)
    /// `or`
    Or,
    /// `and`
    And,
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Additive (precedence 2)
    /// `+`
    Add,
    /// `-`
    Sub,

    // Multiplicative (precedence 3)
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `mod`
    Mod,
}

impl BinaryOp {
    /// Precedence level; higher binds more tightly.
    pub fn precedence(&self) -> u8 {
        use BinaryOp::*;
        match self {
            Or | And | Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => 1,
            Add | Sub => 2,
            Mul | Div | Mod => 3,
        }
    }

    /// `or` / `and`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    /// `=`, `<>`, `<`, `<=`, `>`, `>=`.
    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    /// `=` / `<>`.
    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Or => "or",
            And => "and",
            Equal => "=",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "mod",
        };
        f.write_str(s)
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        })
    }
}

/// Counting direction of a `for` loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForDirection {
    /// `to`: counts up by one.
    To,
    /// `downto`: counts down by one.
    Downto,
}

impl ForDirection {
    /// The per-iteration counter change.
    pub fn step(&self) -> i32 {
        match self {
            ForDirection::To => 1,
            ForDirection::Downto => -1,
        }
    }
}

impl fmt::Display for ForDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ForDirection::To => "to",
            ForDirection::Downto => "downto",
        })
    }
}
