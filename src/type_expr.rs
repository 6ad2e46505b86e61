//! Textual type expressions: `List(number)`, `Map(Optional(string))`, `Rec`.
//!
//! Grammar:
//!
//! ```text
//! expr := IDENT [ "(" [ expr ("," expr)* ] ")" ]
//! ```
//!
//! Identifiers resolve to a primitive, a builtin generic, or a factory from the
//! given [`Registry`]. Only references are textual; definitions stay in code.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::DefinitionError;
use crate::prelude::Registry;
use crate::ty::{Builtin, Primitive, Type};

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?:(?P<ident>[A-Za-z_][A-Za-z0-9_]*)|(?P<punct>[(),])|(?P<bad>\S))")
        .expect("token regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

pub fn parse(src: &str, registry: &Registry) -> Result<Type, TypeExprError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0, end: src.len() };
    let node = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(syntax(token.offset, format!("unexpected {}", token.tok)));
    }
    Ok(node.resolve(registry)?)
}

// ————————————————————————————————————————————————————————————————————————————
// LEXER
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok<'a> {
    Ident(&'a str),
    Open,
    Close,
    Comma,
}

impl std::fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(name) => write!(f, "'{name}'"),
            Tok::Open => f.write_str("'('"),
            Tok::Close => f.write_str("')'"),
            Tok::Comma => f.write_str("','"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    tok: Tok<'a>,
    offset: usize,
}

fn tokenize(src: &str) -> Result<Vec<Token<'_>>, TypeExprError> {
    let mut out = Vec::new();
    for caps in TOKEN.captures_iter(src) {
        if let Some(m) = caps.name("ident") {
            out.push(Token { tok: Tok::Ident(m.as_str()), offset: m.start() });
        } else if let Some(m) = caps.name("punct") {
            let tok = match m.as_str() {
                "(" => Tok::Open,
                ")" => Tok::Close,
                _ => Tok::Comma,
            };
            out.push(Token { tok, offset: m.start() });
        } else if let Some(m) = caps.name("bad") {
            return Err(syntax(m.start(), format!("unexpected character '{}'", m.as_str())));
        }
    }
    Ok(out)
}

fn syntax(offset: usize, message: impl Into<String>) -> TypeExprError {
    TypeExprError::Syntax { offset, message: message.into() }
}

// ————————————————————————————————————————————————————————————————————————————
// PARSER
// ————————————————————————————————————————————————————————————————————————————

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: usize,
}

/// `name(args..)` before names are looked up.
struct Node<'a> {
    name: &'a str,
    args: Vec<Node<'a>>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        self.pos += usize::from(token.is_some());
        token
    }

    fn expr(&mut self) -> Result<Node<'a>, TypeExprError> {
        let name = match self.bump() {
            Some(Token { tok: Tok::Ident(name), .. }) => name,
            Some(token) => {
                return Err(syntax(token.offset, format!("expected a type name, found {}", token.tok)));
            }
            None => return Err(syntax(self.end, "expected a type name, found end of input")),
        };
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token { tok: Tok::Open, .. })) {
            self.bump();
            if matches!(self.peek(), Some(Token { tok: Tok::Close, .. })) {
                self.bump();
            } else {
                loop {
                    args.push(self.expr()?);
                    match self.bump() {
                        Some(Token { tok: Tok::Comma, .. }) => continue,
                        Some(Token { tok: Tok::Close, .. }) => break,
                        Some(token) => {
                            return Err(syntax(token.offset, format!("expected ',' or ')', found {}", token.tok)));
                        }
                        None => return Err(syntax(self.end, "unclosed '('")),
                    }
                }
            }
        }
        Ok(Node { name, args })
    }
}

impl Node<'_> {
    fn resolve(&self, registry: &Registry) -> Result<Type, DefinitionError> {
        let args = self
            .args
            .iter()
            .map(|arg| arg.resolve(registry))
            .collect::<Result<Vec<_>, _>>()?;
        let name = self.name;
        if let Ok(p) = name.parse::<Primitive>() {
            if !args.is_empty() {
                return Err(DefinitionError::arity(name, 0, args.len()));
            }
            return Ok(Type::Primitive(p));
        }
        if let Some(kind) = Builtin::from_name(name) {
            return Type::generic(kind, args);
        }
        match registry.get(name) {
            Some(factory) => factory.apply(args),
            None => Err(DefinitionError::invalid_type(name, "unknown type name")),
        }
    }
}
