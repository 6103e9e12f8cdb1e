//! Parser for the Kata language
//!
//! A recursive descent parser that transforms the lexer's token stream into
//! an abstract syntax tree. Parse errors are accumulated rather than
//! short-circuiting: a header error skips to the next `function` keyword, a
//! statement error skips to the next statement boundary, so a single compile
//! reports as many distinct problems as possible.

pub mod error;
mod expr;
mod recovery;
mod stmt;

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Maximum parameters per function
pub const MAX_PARAMS: usize = 255;

/// Maximum expression nesting depth
///
/// Submissions are untrusted; without a bound, a pathological expression
/// could exhaust the host stack during parsing.
pub(crate) const MAX_EXPR_DEPTH: u32 = 200;

/// Parser state for the Kata language.
pub struct Parser {
    /// Pre-tokenized input, always terminated by `Token::Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in the token stream
    pos: usize,

    /// Accumulated parse errors (parsing continues after errors)
    errors: Vec<ParseError>,

    /// Current expression nesting depth
    expr_depth: u32,
}

impl Parser {
    /// Create a new parser from source code.
    ///
    /// # Errors
    ///
    /// Returns every lexical error if tokenization fails.
    pub fn new(source: &str) -> Result<Self, Vec<crate::lexer::LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            expr_depth: 0,
        })
    }

    /// Parse the entire source into a [`Program`].
    ///
    /// Returns the program on success, or all accumulated errors.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut functions = Vec::new();

        while !self.at_eof() {
            match self.parse_function() {
                Ok(func) => functions.push(func),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_function_boundary();
                }
            }
        }

        let span = functions
            .last()
            .map(|f: &FunctionDecl| start_span.to(f.span))
            .unwrap_or(start_span);

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Program { functions, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Peek at the next token.
    #[inline]
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(tok, _)| tok)
    }

    /// Advance to the next token, returning the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token matches, without consuming.
    #[inline]
    pub(crate) fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    /// Consume the current token if it matches.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Whether the parser has reached end of input.
    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the expected token or produce an error.
    pub(crate) fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                &expected.describe(),
                self.current(),
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier or produce an error.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        let span = self.current_span();
        match self.current() {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, span))
            }
            found => Err(ParseError::unexpected(what, found, span)),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Parse a top-level `function name(params) { ... }` declaration.
    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::Function)?;
        let (name, name_span) = self.expect_identifier("function name")?;

        self.expect(&Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(&Token::RParen)?;

        let body = self.parse_block()?;
        let span = start_span.to(body.span);

        Ok(FunctionDecl {
            name,
            name_span,
            params,
            body,
            span,
        })
    }

    /// Parse a comma-separated parameter list (without the parentheses).
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params: Vec<Param> = Vec::new();

        if self.check(&Token::RParen) {
            return Ok(params);
        }

        loop {
            let (name, span) = self.expect_identifier("parameter name")?;
            if params.iter().any(|p| p.name == name) {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateParameter { name: name.clone() },
                    span,
                    format!("duplicate parameter '{name}'"),
                ));
            }
            if params.len() >= MAX_PARAMS {
                return Err(ParseError::new(
                    ParseErrorKind::TooManyParameters,
                    span,
                    format!("functions may declare at most {MAX_PARAMS} parameters"),
                ));
            }
            params.push(Param { name, span });

            if !self.eat(&Token::Comma) {
                break;
            }
        }

        Ok(params)
    }
}
