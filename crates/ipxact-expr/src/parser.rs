//! Recursive-descent parser producing an expression tree.

use crate::error::{EvalError, Result};
use crate::lexer::{tokenize, Token, TokenKind};

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i128),
    Real(f64),
    Str(String),
    /// Reference to a valueId or macro name.
    Symbol(String),
    /// Brace array, `{a,b}` or `'{a,b}`.
    Array(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : else`
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

impl Expr {
    /// Whether the expression refers to any symbol.
    pub fn has_symbols(&self) -> bool {
        match self {
            Expr::Int(_) | Expr::Real(_) | Expr::Str(_) => false,
            Expr::Symbol(_) => true,
            Expr::Array(items) | Expr::Call(_, items) => items.iter().any(Expr::has_symbols),
            Expr::Unary(_, operand) => operand.has_symbols(),
            Expr::Binary(_, lhs, rhs) => lhs.has_symbols() || rhs.has_symbols(),
            Expr::Conditional(c, t, e) => c.has_symbols() || t.has_symbols() || e.has_symbols(),
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    BitNot,
    LogicalNot,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "**" => BinaryOp::Pow,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&" => BinaryOp::BitAnd,
            "^" => BinaryOp::BitXor,
            "|" => BinaryOp::BitOr,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    /// Operator text as written in expressions.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Pow => "**",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::Ne => 6,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 10,
            BinaryOp::Pow => 11,
        }
    }
}

/// Supported system functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Clog2,
    Pow,
    Sqrt,
    Exp,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "$clog2" => Some(Function::Clog2),
            "$pow" => Some(Function::Pow),
            "$sqrt" => Some(Function::Sqrt),
            "$exp" => Some(Function::Exp),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Function::Pow => 2,
            Function::Clog2 | Function::Sqrt | Function::Exp => 1,
        }
    }
}

/// Parse an expression string into a tree.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.conditional()?;
    if let Some(token) = parser.peek() {
        return Err(syntax(token.position, "unexpected trailing token"));
    }
    Ok(expr)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    end: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(syntax(self.position(), &format!("expected {what}")))
        }
    }

    fn conditional(&mut self) -> Result<Expr> {
        let condition = self.binary(1)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then_branch = self.conditional()?;
        self.expect(&TokenKind::Colon, "':' in conditional expression")?;
        let else_branch = self.conditional()?;
        Ok(Expr::Conditional(
            Box::new(condition),
            Box::new(then_branch),
            Box::new(else_branch),
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token {
                    kind: TokenKind::Op(symbol),
                    ..
                }) => BinaryOp::from_symbol(symbol),
                _ => None,
            };
            let Some(op) = op else { break };
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(op.precedence() + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Op("-")) => Some(UnaryOp::Neg),
            Some(TokenKind::Op("+")) => Some(UnaryOp::Plus),
            Some(TokenKind::Op("~")) => Some(UnaryOp::BitNot),
            Some(TokenKind::Op("!")) => Some(UnaryOp::LogicalNot),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                Ok(Expr::Unary(op, Box::new(self.unary()?)))
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let position = self.position();
        let Some(token) = self.next() else {
            return Err(syntax(position, "unexpected end of expression"));
        };
        match &token.kind {
            TokenKind::Int(v) => Ok(Expr::Int(*v)),
            TokenKind::Real(v) => Ok(Expr::Real(*v)),
            TokenKind::Str(s) => Ok(Expr::Str(s.clone())),
            TokenKind::Ident(name) => Ok(Expr::Symbol(name.clone())),
            TokenKind::LParen => {
                let inner = self.conditional()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBrace | TokenKind::TickBrace => {
                let items = self.list(&TokenKind::RBrace, "'}'")?;
                if items.is_empty() {
                    return Err(syntax(position, "empty array"));
                }
                Ok(Expr::Array(items))
            }
            TokenKind::Function(name) => {
                let function = Function::from_name(name)
                    .ok_or_else(|| syntax(position, &format!("unknown function '{name}'")))?;
                self.expect(&TokenKind::LParen, "'(' after function name")?;
                let args = self.list(&TokenKind::RParen, "')'")?;
                if args.len() != function.arity() {
                    return Err(syntax(
                        position,
                        &format!("{name} expects {} argument(s)", function.arity()),
                    ));
                }
                Ok(Expr::Call(function, args))
            }
            _ => Err(syntax(position, "unexpected token")),
        }
    }

    /// Comma-separated expressions up to and including `close`.
    fn list(&mut self, close: &TokenKind, what: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.conditional()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(&TokenKind::Comma, &format!("',' or {what}"))?;
        }
    }
}

fn syntax(position: usize, detail: &str) -> EvalError {
    EvalError::Syntax {
        position,
        detail: detail.to_string(),
    }
}
