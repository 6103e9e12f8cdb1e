//! Expression parsing
//!
//! Classic precedence layering, loosest first:
//! `||` < `&&` < `== !=` < `< <= > >=` < `+ -` < `* / %` < unary < call/primary.

use super::{ParseError, ParseErrorKind, Parser, MAX_EXPR_DEPTH};
use crate::ast::*;
use crate::token::Token;

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.expr_depth += 1;
        let result = if self.expr_depth > MAX_EXPR_DEPTH {
            Err(ParseError::new(
                ParseErrorKind::NestingTooDeep,
                self.current_span(),
                "expression nesting is too deep".to_string(),
            ))
        } else {
            self.parse_or()
        };
        self.expr_depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(&Token::PipePipe) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(&Token::AmpAmp) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current() {
                Token::EqualEqual => BinaryOp::Eq,
                Token::BangEqual => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current() {
                Token::Less => BinaryOp::Lt,
                Token::LessEqual => BinaryOp::Le,
                Token::Greater => BinaryOp::Gt,
                Token::GreaterEqual => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Bang => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            let start_span = self.current_span();
            self.advance();
            // Recurse through parse_expr so the depth guard applies to
            // pathological unary chains as well.
            self.expr_depth += 1;
            let result = if self.expr_depth > MAX_EXPR_DEPTH {
                Err(ParseError::new(
                    ParseErrorKind::NestingTooDeep,
                    self.current_span(),
                    "expression nesting is too deep".to_string(),
                ))
            } else {
                self.parse_unary()
            };
            self.expr_depth -= 1;
            let operand = result?;
            let span = start_span.to(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_call_or_primary()
    }

    fn parse_call_or_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        match self.current().clone() {
            Token::Null => {
                self.advance();
                Ok(Expr::Null(span))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Bool(true, span))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Bool(false, span))
            }
            Token::IntLiteral(v) => {
                self.advance();
                Ok(Expr::Int(v, span))
            }
            Token::FloatLiteral(v) => {
                self.advance();
                Ok(Expr::Float(v, span))
            }
            Token::StringLiteral(s) => {
                self.advance();
                Ok(Expr::Str(s, span))
            }
            Token::Identifier(name) => {
                self.advance();
                if self.check(&Token::LParen) {
                    self.parse_call(name, span)
                } else {
                    Ok(Expr::Ident(name, span))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            found => Err(ParseError::unexpected("an expression", &found, span)),
        }
    }

    fn parse_call(
        &mut self,
        callee: String,
        callee_span: crate::token::Span,
    ) -> Result<Expr, ParseError> {
        self.expect(&Token::LParen)?;

        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        let end_span = self.current_span();
        self.expect(&Token::RParen)?;

        Ok(Expr::Call {
            callee,
            callee_span,
            args,
            span: callee_span.to(end_span),
        })
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}
