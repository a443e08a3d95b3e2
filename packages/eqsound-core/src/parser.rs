//! # Parser Module
//!
//! This module turns expression text into a [`Program`].
//!
//! ## Statement Splitting
//! The text is split on `;`. Each piece is trimmed and empty pieces are dropped. Every
//! statement except the last must be an assignment `name = expr`; the last one is the
//! result expression and is mandatory.
//!
//! ## Expression Grammar
//! ```text
//! expr           := additive
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary          := ("+" | "-") unary | power
//! power          := primary (("^" | "**") unary)?
//! primary        := NUMBER | IDENT | IDENT "(" expr ")" | "(" expr ")"
//! ```
//! Power binds tighter than unary minus and is right-associative, so `-t^2` is `-(t^2)`
//! and `2^3^2` is `2^9`.
//!
//! Neither the syntax tree nor the parser's own recursion may go deeper than
//! [`MAX_DEPTH`]; longer chains, sign runs and parenthesis nests are a `SyntaxError`.
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<Program, SignalError>`
//!
//! ## Example
//! ```rust
//! use eqsound::parse;
//!
//! let program = parse("A = 0.5; f = 440; A*sin(2*pi*f*t)").unwrap();
//! assert_eq!(program.assignments.len(), 2);
//! assert_eq!(program.assignments[1].name, "f");
//! ```

use crate::ast::*;
use crate::error::SignalError;
use crate::lexer::{Lexer, LocatedToken, Token};

/// One `;`-separated piece of the source, trimmed, with its character offset
struct Statement<'a> {
    text: &'a str,
    offset: usize,
}

/// Split on `;`, trim each piece and drop the empty ones, keeping character offsets
fn split_statements(source: &str) -> Vec<Statement<'_>> {
    let mut statements = Vec::new();
    let mut char_offset = 0;

    for piece in source.split(';') {
        let leading = piece.len() - piece.trim_start().len();
        let text = piece.trim();
        if !text.is_empty() {
            statements.push(Statement {
                text,
                offset: char_offset + piece[..leading].chars().count(),
            });
        }
        // +1 for the ';' consumed by split
        char_offset += piece.chars().count() + 1;
    }

    statements
}

/// Nesting limit for parentheses, calls, signs and operator chains
pub const MAX_DEPTH: usize = 256;

/// Recursive-descent parser over the tokens of a single statement
pub struct Parser {
    tokens: Vec<LocatedToken>,
    position: usize,
    end_column: usize,
    nesting: usize,
}

impl Parser {
    pub fn new(tokens: Vec<LocatedToken>, end_column: usize) -> Self {
        Self {
            tokens,
            position: 0,
            end_column,
            nesting: 0,
        }
    }

    fn current(&self) -> Option<&LocatedToken> {
        self.tokens.get(self.position)
    }

    fn peek_token(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.position + ahead).map(|t| &t.token)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn column(&self) -> usize {
        self.current().map(|t| t.column).unwrap_or(self.end_column)
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, SignalError> {
        Err(SignalError::SyntaxError {
            column: self.column(),
            message: message.into(),
        })
    }

    fn too_deep<T>(&self) -> Result<T, SignalError> {
        self.error(format!("Expression nests deeper than {} levels", MAX_DEPTH))
    }

    fn descend(&mut self) -> Result<(), SignalError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return self.too_deep();
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.nesting -= 1;
    }

    /// Accept a freshly built node unless it makes the tree too deep
    fn node(&self, expr: Expr) -> Result<Expr, SignalError> {
        if expr.depth() > MAX_DEPTH {
            return self.too_deep();
        }
        Ok(expr)
    }

    fn expect(&mut self, expected: Token) -> Result<(), SignalError> {
        match self.current() {
            Some(t) if t.token == expected => {
                self.advance();
                Ok(())
            }
            Some(t) => {
                let found = t.token.describe();
                self.error(format!("Expected {}, found {}", expected.describe(), found))
            }
            None => self.error(format!("Expected {}, found end of statement", expected.describe())),
        }
    }

    fn expect_end(&self) -> Result<(), SignalError> {
        match self.current() {
            None => Ok(()),
            Some(t) => self.error(format!("Unexpected {}", t.token.describe())),
        }
    }

    /// `IDENT "=" expr`, the only form allowed before the final statement
    pub fn parse_assignment(&mut self) -> Result<Assignment, SignalError> {
        match (self.peek_token(0), self.peek_token(1)) {
            (Some(Token::Ident(name)), Some(Token::Equals)) => {
                let name = name.clone();
                let column = self.column();
                self.advance();
                self.advance();
                let value = self.parse_expr()?;
                self.expect_end()?;
                Ok(Assignment {
                    name,
                    column,
                    value,
                })
            }
            _ => self.error("Only the last statement may be a bare expression; expected 'name = ...'"),
        }
    }

    /// Bare expression filling the whole statement
    pub fn parse_result(&mut self) -> Result<Expr, SignalError> {
        if let (Some(Token::Ident(_)), Some(Token::Equals)) = (self.peek_token(0), self.peek_token(1)) {
            return self.error("The last statement must be an expression, not an assignment");
        }
        let expr = self.parse_expr()?;
        self.expect_end()?;
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, SignalError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Expr, SignalError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_token(0) {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.node(Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })?;
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SignalError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_token(0) {
                Some(Token::Star) => BinaryOp::Multiply,
                Some(Token::Slash) => BinaryOp::Divide,
                Some(Token::Percent) => BinaryOp::Remainder,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.node(Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SignalError> {
        let op = match self.peek_token(0) {
            Some(Token::Minus) => UnaryOp::Negate,
            Some(Token::Plus) => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        self.advance();
        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();
        self.node(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> Result<Expr, SignalError> {
        let base = self.parse_primary()?;
        if matches!(self.peek_token(0), Some(Token::Caret) | Some(Token::DoubleStar)) {
            self.advance();
            // Exponent may itself carry a sign: 2^-1
            self.descend()?;
            let exponent = self.parse_unary()?;
            self.ascend();
            return self.node(Expr::Binary {
                op: BinaryOp::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, SignalError> {
        let current = match self.current() {
            Some(t) => t.clone(),
            None => return self.error("Unexpected end of statement"),
        };

        match current.token {
            Token::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Token::Ident(name) => {
                self.advance();
                if let Some(Token::LeftParen) = self.peek_token(0) {
                    self.advance();
                    self.descend()?;
                    let argument = self.parse_expr()?;
                    self.ascend();
                    if let Some(Token::Comma) = self.peek_token(0) {
                        return self.error(format!("'{}' takes exactly one argument", name));
                    }
                    self.expect(Token::RightParen)?;
                    return self.node(Expr::Call {
                        function: name,
                        argument: Box::new(argument),
                        column: current.column,
                    });
                }
                Ok(Expr::Ident {
                    name,
                    column: current.column,
                })
            }
            Token::LeftParen => {
                self.advance();
                self.descend()?;
                let inner = self.parse_expr()?;
                self.ascend();
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            other => self.error(format!("Unexpected {}", other.describe())),
        }
    }
}

/// Main parsing function
pub fn parse(source: &str) -> Result<Program, SignalError> {
    let statements = split_statements(source);

    let Some((last, leading)) = statements.split_last() else {
        return Err(SignalError::SyntaxError {
            column: 1,
            message: "Expression is empty".to_string(),
        });
    };

    let mut assignments = Vec::with_capacity(leading.len());
    for statement in leading {
        let mut parser = statement_parser(statement)?;
        assignments.push(parser.parse_assignment()?);
    }

    let result = statement_parser(last)?.parse_result()?;

    Ok(Program {
        assignments,
        result,
    })
}

fn statement_parser(statement: &Statement<'_>) -> Result<Parser, SignalError> {
    let tokens = Lexer::with_offset(statement.text, statement.offset).tokenize()?;
    let end_column = statement.offset + statement.text.chars().count() + 1;
    Ok(Parser::new(tokens, end_column))
}
