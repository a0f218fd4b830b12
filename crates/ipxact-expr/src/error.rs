//! Error types for expression evaluation.

/// Errors that can occur while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The expression contains no tokens.
    #[error("empty expression")]
    Empty,

    /// The expression text is not well formed.
    #[error("syntax error at offset {position}: {detail}")]
    Syntax {
        /// Byte offset of the offending token.
        position: usize,
        /// Description of the problem.
        detail: String,
    },

    /// A symbol is not known to the parameter finder.
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    /// A symbol refers back to itself through its own value.
    #[error("cyclic reference through '{0}'")]
    CyclicReference(String),

    /// A sized literal holds a value that does not fit its declared width.
    #[error("literal '{literal}' does not fit in {width} bits")]
    WidthOverflow {
        /// The literal as written.
        literal: String,
        /// The declared bit width.
        width: u32,
    },

    /// A literal has digits that are not valid for its base.
    #[error("invalid literal '{0}'")]
    InvalidLiteral(String),

    /// An operator was applied to operands it does not accept.
    #[error("type mismatch: {detail}")]
    TypeMismatch {
        /// Description of the mismatch.
        detail: String,
    },

    /// Division or modulo by zero under the strict policy.
    #[error("division by zero")]
    DivisionByZero,

    /// An integer result is outside the representable range.
    #[error("integer overflow")]
    Overflow,
}

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, EvalError>;
