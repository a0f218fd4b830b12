//! Expression evaluation against a parameter finder.
//!
//! The evaluator keeps no state between calls. Symbol resolution tracks the
//! chain of symbols being expanded on the call stack, so a symbol that
//! reaches itself through its own value is reported as a cyclic reference.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{EvalError, Result};
use crate::finder::ParameterFinder;
use crate::parser::{parse, BinaryOp, Expr, Function, UnaryOp};
use crate::value::Value;

/// Text shown for an expression that cannot be evaluated.
pub const UNRESOLVED: &str = "x";

/// What a division or modulo by zero evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DivisionByZero {
    /// Yield `0` and log a warning. Keeps saved expressions evaluating as before.
    #[default]
    Zero,
    /// Fail with [`EvalError::DivisionByZero`].
    Error,
}

/// Evaluator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EvaluatorConfig {
    /// Division-by-zero policy.
    #[serde(default)]
    pub division_by_zero: DivisionByZero,
}

/// Evaluates expressions, resolving symbols through a [`ParameterFinder`].
#[derive(Clone, Copy)]
pub struct ExpressionEvaluator<'f> {
    finder: &'f dyn ParameterFinder,
    config: EvaluatorConfig,
}

impl std::fmt::Debug for ExpressionEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'f> ExpressionEvaluator<'f> {
    /// Create an evaluator with the default configuration.
    pub fn new(finder: &'f dyn ParameterFinder) -> Self {
        Self::with_config(finder, EvaluatorConfig::default())
    }

    /// Create an evaluator with an explicit configuration.
    pub fn with_config(finder: &'f dyn ParameterFinder, config: EvaluatorConfig) -> Self {
        ExpressionEvaluator { finder, config }
    }

    /// The finder used for symbol resolution.
    pub fn finder(&self) -> &'f dyn ParameterFinder {
        self.finder
    }

    /// The active configuration.
    pub fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Evaluate an expression.
    pub fn evaluate(&self, expression: &str) -> Result<Value> {
        let mut stack = Vec::new();
        self.evaluate_text(expression, &mut stack)
    }

    /// Whether an expression evaluates without error.
    ///
    /// An empty expression is valid: it stands for an unset optional value.
    pub fn is_valid_expression(&self, expression: &str) -> bool {
        expression.trim().is_empty() || self.evaluate(expression).is_ok()
    }

    /// Evaluate an expression that must produce an integer.
    pub fn evaluate_int(&self, expression: &str) -> Result<i128> {
        let value = self.evaluate(expression)?;
        value.as_int().ok_or_else(|| EvalError::TypeMismatch {
            detail: format!("expected an integer, found {}", value.kind_name()),
        })
    }

    /// Whether an expression evaluates to a brace array.
    pub fn is_array_expression(&self, expression: &str) -> bool {
        self.evaluate(expression).is_ok_and(|v| v.is_array())
    }

    /// Evaluated value as display text: empty for an empty expression,
    /// [`UNRESOLVED`] when evaluation fails.
    pub fn format_value(&self, expression: &str) -> String {
        if expression.trim().is_empty() {
            return String::new();
        }
        match self.evaluate(expression) {
            Ok(value) => value.to_string(),
            Err(_) => UNRESOLVED.to_string(),
        }
    }

    fn evaluate_text(&self, text: &str, stack: &mut Vec<String>) -> Result<Value> {
        let expr = parse(text)?;
        self.eval(&expr, stack)
    }

    fn eval(&self, expr: &Expr, stack: &mut Vec<String>) -> Result<Value> {
        match expr {
            Expr::Int(v) => Ok(Value::Int(*v)),
            Expr::Real(v) => Ok(Value::Real(*v)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Symbol(name) => self.resolve(name, stack),
            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item, stack))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, stack)?;
                unary(*op, value)
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !truthy(&self.eval(lhs, stack)?)? {
                    return Ok(Value::Int(0));
                }
                Ok(bool_value(truthy(&self.eval(rhs, stack)?)?))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if truthy(&self.eval(lhs, stack)?)? {
                    return Ok(Value::Int(1));
                }
                Ok(bool_value(truthy(&self.eval(rhs, stack)?)?))
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs, stack)?;
                let rhs = self.eval(rhs, stack)?;
                self.binary(*op, &lhs, &rhs)
            }
            Expr::Conditional(condition, then_branch, else_branch) => {
                if truthy(&self.eval(condition, stack)?)? {
                    self.eval(then_branch, stack)
                } else {
                    self.eval(else_branch, stack)
                }
            }
            Expr::Call(function, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, stack))
                    .collect::<Result<Vec<_>>>()?;
                self.call(*function, &args)
            }
        }
    }

    fn resolve(&self, name: &str, stack: &mut Vec<String>) -> Result<Value> {
        if stack.iter().any(|s| s == name) {
            return Err(EvalError::CyclicReference(name.to_string()));
        }
        let text = self
            .finder
            .value_for_id(name)
            .ok_or_else(|| EvalError::UnknownSymbol(name.to_string()))?;
        trace!(symbol = name, expression = %text, "resolving symbol");

        stack.push(name.to_string());
        let result = self.evaluate_text(&text, stack);
        stack.pop();
        result
    }

    fn binary(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
        match op {
            BinaryOp::Eq => return values_equal(op, lhs, rhs).map(bool_value),
            BinaryOp::Ne => return values_equal(op, lhs, rhs).map(|eq| bool_value(!eq)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                return compare(op, lhs, rhs)
            }
            _ => {}
        }

        match operands(op, lhs, rhs)? {
            Operands::Int(a, b) => self.integer_op(op, a, b),
            Operands::Real(a, b) => self.real_op(op, a, b),
        }
    }

    fn integer_op(&self, op: BinaryOp, a: i128, b: i128) -> Result<Value> {
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div | BinaryOp::Mod if b == 0 => return self.division_by_zero(),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Mod => a.checked_rem(b),
            BinaryOp::Pow => return self.integer_pow(a, b),
            BinaryOp::Shl | BinaryOp::Shr => return shift(op, a, b),
            BinaryOp::BitAnd => Some(a & b),
            BinaryOp::BitOr => Some(a | b),
            BinaryOp::BitXor => Some(a ^ b),
            _ => return Err(operator_mismatch(op, "integer")),
        };
        result.map(Value::Int).ok_or(EvalError::Overflow)
    }

    fn real_op(&self, op: BinaryOp, a: f64, b: f64) -> Result<Value> {
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return self.division_by_zero(),
            BinaryOp::Div => a / b,
            BinaryOp::Mod => a % b,
            BinaryOp::Pow => a.powf(b),
            _ => return Err(operator_mismatch(op, "real")),
        };
        finite(result)
    }

    fn integer_pow(&self, base: i128, exponent: i128) -> Result<Value> {
        if exponent >= 0 {
            return u32::try_from(exponent)
                .ok()
                .and_then(|e| base.checked_pow(e))
                .map(Value::Int)
                .ok_or(EvalError::Overflow);
        }
        // Negative exponents truncate toward zero like integer division.
        match base {
            0 => self.division_by_zero(),
            1 => Ok(Value::Int(1)),
            -1 => Ok(Value::Int(if exponent % 2 == 0 { 1 } else { -1 })),
            _ => Ok(Value::Int(0)),
        }
    }

    fn division_by_zero(&self) -> Result<Value> {
        match self.config.division_by_zero {
            DivisionByZero::Zero => {
                warn!("division by zero in expression evaluated as 0");
                Ok(Value::Int(0))
            }
            DivisionByZero::Error => Err(EvalError::DivisionByZero),
        }
    }

    fn call(&self, function: Function, args: &[Value]) -> Result<Value> {
        match (function, args) {
            (Function::Clog2, [x]) => {
                let x = x.as_int().ok_or_else(|| argument_mismatch("$clog2", x))?;
                if x < 0 {
                    return Err(EvalError::TypeMismatch {
                        detail: "$clog2 of a negative value".into(),
                    });
                }
                Ok(Value::Int(clog2(x)))
            }
            (Function::Pow, [base, exponent]) => self.binary(BinaryOp::Pow, base, exponent),
            (Function::Sqrt, [x]) => {
                let x = x.as_f64().ok_or_else(|| argument_mismatch("$sqrt", x))?;
                if x < 0.0 {
                    return Err(EvalError::TypeMismatch {
                        detail: "$sqrt of a negative value".into(),
                    });
                }
                finite(x.sqrt())
            }
            (Function::Exp, [x]) => {
                let x = x.as_f64().ok_or_else(|| argument_mismatch("$exp", x))?;
                finite(x.exp())
            }
            _ => Err(EvalError::TypeMismatch {
                detail: "wrong number of function arguments".into(),
            }),
        }
    }
}

enum Operands {
    Int(i128, i128),
    Real(f64, f64),
}

fn operands(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Operands> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Operands::Int(*a, *b)),
        (Value::Int(_) | Value::Real(_), Value::Int(_) | Value::Real(_)) => {
            match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Ok(Operands::Real(a, b)),
                _ => Err(operand_mismatch(op, lhs, rhs)),
            }
        }
        _ => Err(operand_mismatch(op, lhs, rhs)),
    }
}

fn values_equal(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<bool> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            for (x, y) in a.iter().zip(b) {
                if !values_equal(op, x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => match operands(op, lhs, rhs)? {
            Operands::Int(a, b) => Ok(a == b),
            Operands::Real(a, b) => Ok(a == b),
        },
    }
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    let ordering = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => match operands(op, lhs, rhs)? {
            Operands::Int(a, b) => a.partial_cmp(&b),
            Operands::Real(a, b) => a.partial_cmp(&b),
        },
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Int(0));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(bool_value(result))
}

fn shift(op: BinaryOp, value: i128, amount: i128) -> Result<Value> {
    let amount = u32::try_from(amount).map_err(|_| EvalError::TypeMismatch {
        detail: "negative shift amount".into(),
    })?;
    if op == BinaryOp::Shr {
        let shifted = value.checked_shr(amount).unwrap_or(if value < 0 { -1 } else { 0 });
        return Ok(Value::Int(shifted));
    }
    match value.checked_shl(amount) {
        Some(shifted) if shifted >> amount == value => Ok(Value::Int(shifted)),
        _ => Err(EvalError::Overflow),
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(v)) => v.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
        (UnaryOp::Neg, Value::Real(v)) => Ok(Value::Real(-v)),
        (UnaryOp::Plus, Value::Int(v)) => Ok(Value::Int(v)),
        (UnaryOp::Plus, Value::Real(v)) => Ok(Value::Real(v)),
        (UnaryOp::BitNot, Value::Int(v)) => Ok(Value::Int(!v)),
        (UnaryOp::LogicalNot, other) => Ok(bool_value(!truthy(&other)?)),
        (_, other) => Err(EvalError::TypeMismatch {
            detail: format!("unary operator not applicable to {}", other.kind_name()),
        }),
    }
}

fn truthy(value: &Value) -> Result<bool> {
    match value {
        Value::Int(v) => Ok(*v != 0),
        Value::Real(v) => Ok(*v != 0.0),
        other => Err(EvalError::TypeMismatch {
            detail: format!("{} used as a condition", other.kind_name()),
        }),
    }
}

fn bool_value(b: bool) -> Value {
    Value::Int(i128::from(b))
}

fn finite(v: f64) -> Result<Value> {
    if v.is_finite() {
        Ok(Value::Real(v))
    } else {
        Err(EvalError::Overflow)
    }
}

/// Ceiling of log2, with `$clog2(0) == $clog2(1) == 0`.
fn clog2(x: i128) -> i128 {
    if x <= 1 {
        0
    } else {
        i128::from(128 - (x - 1).leading_zeros())
    }
}

fn operand_mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch {
        detail: format!(
            "operator '{}' not applicable to {} and {}",
            op.symbol(),
            lhs.kind_name(),
            rhs.kind_name()
        ),
    }
}

fn operator_mismatch(op: BinaryOp, kind: &str) -> EvalError {
    EvalError::TypeMismatch {
        detail: format!("operator '{}' not applicable to {kind} operands", op.symbol()),
    }
}

fn argument_mismatch(function: &str, value: &Value) -> EvalError {
    EvalError::TypeMismatch {
        detail: format!("{function} does not accept a {} argument", value.kind_name()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;
    use crate::finder::NullFinder;

    fn finder(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("2**4", "16")]
    #[case("8'hFF", "255")]
    #[case("'h1F + 1", "32")]
    #[case("4'b1010", "10")]
    #[case("'o17", "15")]
    #[case("1_000", "1000")]
    #[case("-3 + 5", "2")]
    #[case("-2**2", "4")]
    #[case("10 / 3", "3")]
    #[case("10 % 3", "1")]
    #[case("1.5 * 2", "3")]
    #[case("7 / 2.0", "3.5")]
    #[case("(2 + 3) * 4", "20")]
    #[case("1 << 4", "16")]
    #[case("256 >> 4", "16")]
    #[case("$clog2(8)", "3")]
    #[case("$clog2(9)", "4")]
    #[case("$pow(2, 10)", "1024")]
    #[case("$sqrt(16)", "4")]
    #[case("3 > 2 ? 7 : 9", "7")]
    #[case("1 == 2 || 2 >= 2", "1")]
    #[case("5 & 3 | 8 ^ 1", "9")]
    #[case("~0", "-1")]
    #[case("!0", "1")]
    #[case("TRUE", "1")]
    #[case("false", "0")]
    #[case("{1, 2, 3}", "{1,2,3}")]
    #[case("'{1, {2, 3}}", "{1,{2,3}}")]
    #[case("\"abc\"", "\"abc\"")]
    #[case("\"a\" == \"a\"", "1")]
    #[case("2 ** -1", "0")]
    fn evaluate_literals_and_operators(#[case] expression: &str, #[case] expected: &str) {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert_eq!(evaluator.evaluate(expression).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("ff")]
    #[case("1 +")]
    #[case("(1")]
    #[case("{1, 2} + 1")]
    #[case("8'b102")]
    #[case("\"abc\" * 2")]
    #[case("0'h1")]
    #[case("9'hFFF")]
    #[case("$clog2(-1)")]
    fn invalid_expressions_are_rejected(#[case] expression: &str) {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert!(!evaluator.is_valid_expression(expression));
    }

    #[test]
    fn sized_literal_exceeding_width_reports_width() {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        let err = evaluator.evaluate("9'hFFF").unwrap_err();
        assert!(matches!(err, EvalError::WidthOverflow { width: 9, .. }));
    }

    #[test]
    fn empty_expression_is_valid_but_has_no_value() {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert!(evaluator.is_valid_expression(""));
        assert_eq!(evaluator.evaluate("").unwrap_err(), EvalError::Empty);
        assert_eq!(evaluator.format_value(" "), "");
    }

    #[test]
    fn division_by_zero_follows_policy() {
        let lenient = ExpressionEvaluator::new(&NullFinder);
        assert_eq!(lenient.evaluate("1/0").unwrap(), Value::Int(0));
        assert_eq!(lenient.evaluate("5 % 0").unwrap(), Value::Int(0));

        let strict = ExpressionEvaluator::with_config(
            &NullFinder,
            EvaluatorConfig {
                division_by_zero: DivisionByZero::Error,
            },
        );
        assert_eq!(strict.evaluate("1/0").unwrap_err(), EvalError::DivisionByZero);
        assert_eq!(strict.evaluate("1.0/0").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn symbols_resolve_recursively() {
        let symbols = finder(&[("uuid_a", "uuid_b + 1"), ("uuid_b", "2")]);
        let evaluator = ExpressionEvaluator::new(&symbols);
        assert_eq!(evaluator.evaluate_int("uuid_a * 2").unwrap(), 6);
    }

    #[test]
    fn cyclic_reference_is_detected() {
        let symbols = finder(&[("a", "b + 1"), ("b", "a")]);
        let evaluator = ExpressionEvaluator::new(&symbols);
        assert!(matches!(
            evaluator.evaluate("a").unwrap_err(),
            EvalError::CyclicReference(_)
        ));

        let self_ref = finder(&[("a", "a")]);
        let evaluator = ExpressionEvaluator::new(&self_ref);
        assert_eq!(
            evaluator.evaluate("a").unwrap_err(),
            EvalError::CyclicReference("a".into())
        );
    }

    #[test]
    fn same_symbol_twice_is_not_a_cycle() {
        let symbols = finder(&[("w", "8")]);
        let evaluator = ExpressionEvaluator::new(&symbols);
        assert_eq!(evaluator.evaluate_int("w + w").unwrap(), 16);
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert_eq!(
            evaluator.evaluate("missing").unwrap_err(),
            EvalError::UnknownSymbol("missing".into())
        );
        assert_eq!(evaluator.format_value("missing"), UNRESOLVED);
    }

    #[test]
    fn conditional_only_evaluates_taken_branch() {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert_eq!(evaluator.evaluate_int("1 ? 4 : missing").unwrap(), 4);
        assert_eq!(evaluator.evaluate_int("0 && missing").unwrap(), 0);
    }

    #[test]
    fn array_detection() {
        let evaluator = ExpressionEvaluator::new(&NullFinder);
        assert!(evaluator.is_array_expression("'{1, 2}"));
        assert!(!evaluator.is_array_expression("12"));
    }

    #[test]
    fn evaluation_is_deterministic_across_threads() {
        let symbols = finder(&[("width", "32"), ("depth", "width / 4")]);
        let evaluator = ExpressionEvaluator::new(&symbols);
        let first = evaluator.evaluate("depth * 2").unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| evaluator.evaluate("depth * 2").unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), first);
            }
        });
    }
}
