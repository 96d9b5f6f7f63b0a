//! Error types for every phase.
//!
//! ## Error Hierarchy
//!
//! ```text
//! PascalError (top-level wrapper)
//! ├── CompilationError - scope/type resolution and emission failures
//! ├── ArtifactError    - malformed or corrupted compiled units
//! └── RuntimeError     - faults raised while executing a unit
//! ```
//!
//! Translation aborts at the first [`CompilationError`]; there is no
//! multi-error batching. Array bounds violations depend on data and are the
//! only fault deferred to execution ([`RuntimeError::BoundsFault`]).

use thiserror::Error;

use crate::{PrimitiveKind, Span};

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that abort translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// An expression or assignment is incompatible with the expected type.
    #[error("at {span}: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Where the mismatch occurred.
        span: Span,
    },

    /// An identifier or call has no matching declaration.
    #[error("at {span}: {message}")]
    UnresolvedSymbol {
        /// The name that could not be resolved.
        name: String,
        /// Description of what was looked up.
        message: String,
        /// Where the name was used.
        span: Span,
    },

    /// A function signature, parameter, local or global collides with an
    /// existing declaration.
    #[error("at {span}: duplicate declaration of '{name}': {message}")]
    DuplicateDeclaration {
        /// The colliding name.
        name: String,
        /// What it collided with.
        message: String,
        /// Where the second declaration appears.
        span: Span,
    },

    /// A name is not allowed in this position, such as a parameter named
    /// after its own function.
    #[error("at {span}: illegal name '{name}': {message}")]
    IllegalName {
        /// The offending name.
        name: String,
        /// Why it is not allowed.
        message: String,
        /// Where the name appears.
        span: Span,
    },

    /// `break` or `continue` outside any loop.
    #[error("at {span}: '{keyword}' is not inside a loop")]
    IllegalControlFlow {
        /// `break` or `continue`.
        keyword: &'static str,
        /// Where the statement appears.
        span: Span,
    },

    /// Wrong number of array indices or call arguments.
    #[error("at {span}: {message}: expected {expected}, got {got}")]
    ArityMismatch {
        /// What was being counted.
        message: String,
        /// Declared count.
        expected: usize,
        /// Supplied count.
        got: usize,
        /// Where the access or call appears.
        span: Span,
    },

    /// An array bound is inverted or the array is too large to allocate.
    #[error("at {span}: invalid array bounds: {message}")]
    InvalidRange {
        /// Description of the problem.
        message: String,
        /// Where the type appears.
        span: Span,
    },

    /// The emitter could not finalize a method body.
    #[error("at {span}: {message}")]
    Emit {
        /// Description of the failure.
        message: String,
        /// The method whose body failed.
        span: Span,
    },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::UnresolvedSymbol { span, .. } => *span,
            CompilationError::DuplicateDeclaration { span, .. } => *span,
            CompilationError::IllegalName { span, .. } => *span,
            CompilationError::IllegalControlFlow { span, .. } => *span,
            CompilationError::ArityMismatch { span, .. } => *span,
            CompilationError::InvalidRange { span, .. } => *span,
            CompilationError::Emit { span, .. } => *span,
        }
    }

    /// Shorthand for a [`CompilationError::TypeMismatch`] between two types.
    pub fn type_mismatch(
        context: impl std::fmt::Display,
        expected: impl std::fmt::Display,
        got: impl std::fmt::Display,
        span: Span,
    ) -> Self {
        CompilationError::TypeMismatch {
            message: format!("type mismatch in {context}: expected {expected}, got {got}"),
            span,
        }
    }
}

// ============================================================================
// Artifact Errors
// ============================================================================

/// Errors raised while encoding or decoding a compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// The buffer does not start with the unit magic.
    #[error("not a compiled unit (bad magic)")]
    BadMagic,

    /// The format version is not understood.
    #[error("unsupported unit format version {0}")]
    UnsupportedVersion(u16),

    /// The buffer ended in the middle of a record.
    #[error("compiled unit is truncated at byte {offset}")]
    Truncated {
        /// Offset at which more bytes were expected.
        offset: usize,
    },

    /// The trailing checksum does not match the contents.
    #[error("checksum mismatch: stored {stored:#018x}, computed {computed:#018x}")]
    ChecksumMismatch {
        /// Checksum found in the buffer.
        stored: u64,
        /// Checksum of the contents.
        computed: u64,
    },

    /// An unknown tag byte was found.
    #[error("invalid {what} tag {tag} at byte {offset}")]
    InvalidTag {
        /// Which record kind was being decoded.
        what: &'static str,
        /// The tag value.
        tag: u8,
        /// Offset of the tag.
        offset: usize,
    },

    /// A name is not valid UTF-8.
    #[error("invalid UTF-8 in name at byte {offset}")]
    InvalidUtf8 {
        /// Offset of the name.
        offset: usize,
    },

    /// A length or count does not fit its field in the format.
    #[error("{what} of {len} exceeds the format limit of {max}")]
    LimitExceeded {
        /// What was being written.
        what: &'static str,
        /// The actual length or count.
        len: usize,
        /// The largest value the field can hold.
        max: usize,
    },
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors that occur while executing a compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An array index fell outside its declared range.
    #[error("index out of bounds: {message}")]
    BoundsFault {
        /// The message emitted with the guarding check.
        message: String,
    },

    /// Integer division or `mod` by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An array reference was used before it was allocated.
    #[error("null array reference")]
    NullReference,

    /// An input line could not be parsed as the target type.
    #[error("cannot read '{input}' as {expected}")]
    InvalidInput {
        /// The offending line.
        input: String,
        /// The declared type of the target.
        expected: PrimitiveKind,
    },

    /// `read` found no more input lines.
    #[error("unexpected end of input")]
    EndOfInput,

    /// The call depth limit was exceeded.
    #[error("stack overflow at call depth {depth}")]
    StackOverflow {
        /// Depth at which the limit was hit.
        depth: usize,
    },

    /// An instruction needed more operands than the stack held.
    #[error("operand stack underflow in '{method}'")]
    StackUnderflow {
        /// Method being executed.
        method: String,
    },

    /// An operand had the wrong shape (integer where an array was expected,
    /// or the reverse).
    #[error("operand type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the instruction required.
        expected: &'static str,
        /// What it found.
        actual: &'static str,
    },

    /// The code stream is malformed.
    #[error("invalid bytecode in '{method}' at offset {offset}: {message}")]
    InvalidBytecode {
        /// Method being executed.
        method: String,
        /// Offset of the instruction.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// The unit has no method with the requested name.
    #[error("unit has no method '{name}'")]
    MissingEntry {
        /// The method that was requested.
        name: String,
    },

    /// More than one overload accepts the arguments of an invocation.
    #[error("call to '{name}' is ambiguous between {candidates} overloads")]
    AmbiguousCall {
        /// The requested function.
        name: String,
        /// How many overloads matched.
        candidates: usize,
    },

    /// Reading input or writing output failed.
    #[error("i/o error: {message}")]
    Io {
        /// The underlying error message.
        message: String,
    },
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for translation, loading and execution.
///
/// Each variant uses `#[from]` so the `?` operator converts phase errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PascalError {
    /// A translation error.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// A malformed compiled unit.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// An execution fault.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl PascalError {
    /// Check if this is a compilation error.
    pub fn is_compilation(&self) -> bool {
        matches!(self, PascalError::Compilation(_))
    }

    /// Check if this is a runtime error.
    pub fn is_runtime(&self) -> bool {
        matches!(self, PascalError::Runtime(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_display() {
        let err = CompilationError::UnresolvedSymbol {
            name: "x".to_string(),
            message: "variable 'x' not found".to_string(),
            span: Span::new(10, 5, 1),
        };
        assert_eq!(format!("{err}"), "at 10:5: variable 'x' not found");
    }

    #[test]
    fn type_mismatch_message() {
        let err = CompilationError::type_mismatch(
            "assignment to 'x'",
            "integer",
            "boolean",
            Span::new(2, 3, 6),
        );
        assert_eq!(
            err.to_string(),
            "at 2:3: type mismatch in assignment to 'x': expected integer, got boolean"
        );
        assert_eq!(err.span(), Span::new(2, 3, 6));
    }

    #[test]
    fn illegal_control_flow_display() {
        let err = CompilationError::IllegalControlFlow {
            keyword: "break",
            span: Span::new(4, 1, 5),
        };
        assert_eq!(err.to_string(), "at 4:1: 'break' is not inside a loop");
    }

    #[test]
    fn runtime_error_display() {
        let err = RuntimeError::InvalidInput {
            input: "abc".to_string(),
            expected: PrimitiveKind::Integer,
        };
        assert_eq!(err.to_string(), "cannot read 'abc' as integer");
    }

    #[test]
    fn unified_error_from_phases() {
        let err: PascalError = RuntimeError::DivisionByZero.into();
        assert!(err.is_runtime());
        assert!(!err.is_compilation());

        let err: PascalError = CompilationError::IllegalControlFlow {
            keyword: "continue",
            span: Span::default(),
        }
        .into();
        assert!(err.is_compilation());
    }

    #[test]
    fn transparent_display() {
        let err: PascalError = ArtifactError::BadMagic.into();
        assert_eq!(err.to_string(), "not a compiled unit (bad magic)");
    }
}
