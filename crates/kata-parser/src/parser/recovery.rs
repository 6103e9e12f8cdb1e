//! Panic-mode error recovery
//!
//! After a parse error the parser skips tokens until a point where parsing
//! can plausibly resume, so one submission surfaces several diagnostics.

use super::Parser;
use crate::token::Token;

impl Parser {
    /// Skip to the next statement boundary inside a block.
    ///
    /// Stops after a `;`, or before a `}` / statement-start keyword / end of
    /// input. Always consumes at least one token unless already at a stop
    /// point, so the enclosing loop makes progress.
    pub(crate) fn sync_to_statement_boundary(&mut self) {
        if !self.at_eof() && !self.check(&Token::RBrace) {
            if self.advance() == Token::Semicolon {
                return;
            }
        }

        while !self.at_eof() {
            if self.check(&Token::RBrace) || starts_statement(self.current()) {
                return;
            }
            if self.advance() == Token::Semicolon {
                return;
            }
        }
    }

    /// Skip to the next top-level `function` keyword (or end of input).
    pub(crate) fn sync_to_function_boundary(&mut self) {
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() && !self.check(&Token::Function) {
            self.advance();
        }
    }
}

/// Tokens that begin a statement and are safe resume points
fn starts_statement(token: &Token) -> bool {
    matches!(
        token,
        Token::Let
            | Token::If
            | Token::While
            | Token::Return
            | Token::Break
            | Token::Continue
            | Token::LBrace
    )
}
