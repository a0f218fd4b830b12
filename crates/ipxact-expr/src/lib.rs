//! Parameter expression evaluation for IP-XACT models.
//!
//! Every parameterizable value in a model (bit widths, offsets, reset values,
//! parameter values) is stored as a SystemVerilog-style expression string.
//! This crate parses and evaluates those strings:
//!
//! - **Literals:** decimal, sized/unsized based (`8'hFF`, `'b101`), reals,
//!   strings, `true`/`false`
//! - **Operators:** arithmetic, shifts, comparisons, bitwise and logical
//!   operators, `?:`, and `$clog2`/`$pow`/`$sqrt`/`$exp`
//! - **Arrays:** `{a,b}` and `'{a,b}`, nestable
//! - **Symbols:** valueIds resolved through a [`ParameterFinder`], with
//!   cycle detection

pub mod error;
pub mod eval;
pub mod finder;
pub mod lexer;
pub mod parser;
pub mod value;

pub use error::{EvalError, Result};
pub use eval::{DivisionByZero, EvaluatorConfig, ExpressionEvaluator, UNRESOLVED};
pub use finder::{NullFinder, ParameterFinder};
pub use lexer::{count_references, referenced_ids};
pub use value::Value;

/// Whether an expression is a plain value that references no symbols.
pub fn is_plain_value(expression: &str) -> bool {
    parser::parse(expression).is_ok_and(|expr| !expr.has_symbols())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_have_no_symbols() {
        assert!(is_plain_value("8'hFF + 1"));
        assert!(!is_plain_value("uuid_1 + 1"));
        assert!(!is_plain_value("1 +"));
    }
}
