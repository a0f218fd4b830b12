//! Tokenizer for parameter expressions.
//!
//! Handles SystemVerilog number literals (sized, unsized, signed, based),
//! real literals, string literals, identifiers, system functions, and the
//! operator set used by IP-XACT parameter expressions.

use crate::error::{EvalError, Result};

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal, already width-checked.
    Int(i128),
    /// Real literal.
    Real(f64),
    /// String literal without its quotes.
    Str(String),
    /// Symbol reference (valueId or macro name).
    Ident(String),
    /// System function name including the leading `$`.
    Function(String),
    /// Operator text.
    Op(&'static str),
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// The `'{` array opener.
    TickBrace,
    Comma,
    Question,
    Colon,
}

/// A token with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind and payload.
    pub kind: TokenKind,
    /// Byte offset where the token starts.
    pub position: usize,
}

// Longest operators first so that `**` wins over `*`.
const OPERATORS: &[&str] = &[
    "**", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*", "/", "%", "+", "-", "<", ">", "!",
    "~", "&", "|", "^",
];

/// Split an expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match c {
            b'0'..=b'9' => {
                let (kind, end) = lex_number(input, pos)?;
                pos = end;
                kind
            }
            b'\'' => {
                let (kind, end) = lex_tick(input, pos)?;
                pos = end;
                kind
            }
            b'"' => {
                let (text, end) = lex_string(input, pos)?;
                pos = end;
                TokenKind::Str(text)
            }
            b'$' => {
                let end = scan_while(bytes, pos + 1, is_ident_char);
                if end == pos + 1 {
                    return Err(syntax(pos, "expected function name after '$'"));
                }
                pos = end;
                TokenKind::Function(input[start..end].to_string())
            }
            b'`' | b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let name_start = if c == b'`' { pos + 1 } else { pos };
                let end = scan_while(bytes, name_start, is_ident_char);
                if end == name_start {
                    return Err(syntax(pos, "expected macro name after '`'"));
                }
                pos = end;
                identifier(&input[name_start..end])
            }
            b'(' => single(&mut pos, TokenKind::LParen),
            b')' => single(&mut pos, TokenKind::RParen),
            b'{' => single(&mut pos, TokenKind::LBrace),
            b'}' => single(&mut pos, TokenKind::RBrace),
            b',' => single(&mut pos, TokenKind::Comma),
            b'?' => single(&mut pos, TokenKind::Question),
            b':' => single(&mut pos, TokenKind::Colon),
            _ => {
                let rest = &bytes[pos..];
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(op.as_bytes()))
                    .ok_or_else(|| syntax(pos, "unexpected character"))?;
                pos += op.len();
                TokenKind::Op(op)
            }
        };
        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

/// List the distinct symbols an expression refers to, in order of first use.
///
/// Returns an empty list when the expression cannot be tokenized.
pub fn referenced_ids(expression: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    if let Ok(tokens) = tokenize(expression) {
        for token in tokens {
            if let TokenKind::Ident(name) = token.kind {
                if !ids.contains(&name) {
                    ids.push(name);
                }
            }
        }
    }
    ids
}

/// Count the references to `id` in an expression.
///
/// Counts identifier tokens. Expressions that cannot be tokenized fall back
/// to whole-word matches on the raw text, so references inside them are
/// still counted.
pub fn count_references(expression: &str, id: &str) -> usize {
    if id.is_empty() {
        return 0;
    }
    match tokenize(expression) {
        Ok(tokens) => tokens
            .iter()
            .filter(|token| matches!(&token.kind, TokenKind::Ident(name) if name == id))
            .count(),
        Err(_) => expression
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .filter(|word| *word == id)
            .count(),
    }
}

fn single(pos: &mut usize, kind: TokenKind) -> TokenKind {
    *pos += 1;
    kind
}

fn identifier(name: &str) -> TokenKind {
    if name.eq_ignore_ascii_case("true") {
        TokenKind::Int(1)
    } else if name.eq_ignore_ascii_case("false") {
        TokenKind::Int(0)
    } else {
        TokenKind::Ident(name.to_string())
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn syntax(position: usize, detail: &str) -> EvalError {
    EvalError::Syntax {
        position,
        detail: detail.to_string(),
    }
}

fn strip_underscores(text: &str) -> String {
    text.chars().filter(|c| *c != '_').collect()
}

fn is_base_letter(b: u8) -> bool {
    matches!(b.to_ascii_lowercase(), b'd' | b'b' | b'o' | b'h')
}

/// Whether a base specifier (`h`, `sh`, ...) starts at `pos`.
fn has_base_prefix(bytes: &[u8], pos: usize) -> bool {
    match bytes.get(pos) {
        Some(b's' | b'S') => bytes.get(pos + 1).is_some_and(|b| is_base_letter(*b)),
        Some(b) => is_base_letter(*b),
        None => false,
    }
}

fn has_exponent(bytes: &[u8], pos: usize) -> bool {
    match (bytes.get(pos), bytes.get(pos + 1), bytes.get(pos + 2)) {
        (Some(b'e' | b'E'), Some(d), _) if d.is_ascii_digit() => true,
        (Some(b'e' | b'E'), Some(b'+' | b'-'), Some(d)) if d.is_ascii_digit() => true,
        _ => false,
    }
}

fn lex_number(input: &str, start: usize) -> Result<(TokenKind, usize)> {
    let bytes = input.as_bytes();
    let mut pos = scan_while(bytes, start, |b| b.is_ascii_digit() || b == b'_');
    let integral = &input[start..pos];

    let has_fraction = bytes.get(pos) == Some(&b'.')
        && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit());
    if has_fraction || has_exponent(bytes, pos) {
        if has_fraction {
            pos = scan_while(bytes, pos + 1, |b| b.is_ascii_digit() || b == b'_');
        }
        if has_exponent(bytes, pos) {
            pos = scan_while(bytes, pos + 2, |b| b.is_ascii_digit());
        }
        let literal = &input[start..pos];
        let value = strip_underscores(literal)
            .parse::<f64>()
            .map_err(|_| EvalError::InvalidLiteral(literal.to_string()))?;
        return Ok((TokenKind::Real(value), pos));
    }

    if bytes.get(pos) == Some(&b'\'') && has_base_prefix(bytes, pos + 1) {
        let width = strip_underscores(integral)
            .parse::<u32>()
            .map_err(|_| EvalError::InvalidLiteral(integral.to_string()))?;
        let (magnitude, signed, end) = lex_based(input, pos + 1, start)?;
        let literal = &input[start..end];
        if width == 0 {
            return Err(EvalError::InvalidLiteral(literal.to_string()));
        }
        if width < 128 && magnitude >> width != 0 {
            return Err(EvalError::WidthOverflow {
                literal: literal.to_string(),
                width,
            });
        }
        let value = if signed && width < 128 && magnitude >> (width - 1) == 1 {
            let half = 1i128 << (width - 1);
            to_i128(magnitude)? - half - half
        } else {
            to_i128(magnitude)?
        };
        return Ok((TokenKind::Int(value), end));
    }

    if bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
        return Err(syntax(pos, "unexpected character in number"));
    }

    let value = strip_underscores(integral)
        .parse::<i128>()
        .map_err(|_| EvalError::Overflow)?;
    Ok((TokenKind::Int(value), pos))
}

fn lex_tick(input: &str, start: usize) -> Result<(TokenKind, usize)> {
    let bytes = input.as_bytes();
    match bytes.get(start + 1) {
        Some(b'{') => Ok((TokenKind::TickBrace, start + 2)),
        Some(_) if has_base_prefix(bytes, start + 1) => {
            let (magnitude, _, end) = lex_based(input, start + 1, start)?;
            Ok((TokenKind::Int(to_i128(magnitude)?), end))
        }
        Some(b) if b.is_ascii_digit() => {
            let end = scan_while(bytes, start + 1, |b| b.is_ascii_digit() || b == b'_');
            let value = strip_underscores(&input[start + 1..end])
                .parse::<i128>()
                .map_err(|_| EvalError::Overflow)?;
            Ok((TokenKind::Int(value), end))
        }
        _ => Err(syntax(start, "expected base or '{' after apostrophe")),
    }
}

/// Lex the base specifier and digits of a based literal.
///
/// `pos` points just past the apostrophe. Returns the magnitude, the signed
/// flag, and the end offset.
fn lex_based(input: &str, mut pos: usize, literal_start: usize) -> Result<(u128, bool, usize)> {
    let bytes = input.as_bytes();
    let mut signed = false;
    if matches!(bytes.get(pos), Some(b's' | b'S')) {
        signed = true;
        pos += 1;
    }
    let radix = match bytes.get(pos).map(|b| b.to_ascii_lowercase()) {
        Some(b'd') => 10,
        Some(b'b') => 2,
        Some(b'o') => 8,
        Some(b'h') => 16,
        _ => return Err(syntax(pos, "expected base specifier")),
    };
    let digits_start = pos + 1;
    let end = scan_while(bytes, digits_start, |b| b.is_ascii_alphanumeric() || b == b'_');
    let literal = &input[literal_start..end];
    let digits = strip_underscores(&input[digits_start..end]);
    if digits.is_empty() {
        return Err(EvalError::InvalidLiteral(literal.to_string()));
    }
    let magnitude = u128::from_str_radix(&digits, radix)
        .map_err(|_| EvalError::InvalidLiteral(literal.to_string()))?;
    Ok((magnitude, signed, end))
}

fn lex_string(input: &str, start: usize) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut chars = input[start + 1..].char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((text, start + 1 + offset + 1)),
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    text.push(escaped);
                }
            }
            other => text.push(other),
        }
    }
    Err(syntax(start, "unterminated string literal"))
}

fn to_i128(magnitude: u128) -> Result<i128> {
    i128::try_from(magnitude).map_err(|_| EvalError::Overflow)
}
