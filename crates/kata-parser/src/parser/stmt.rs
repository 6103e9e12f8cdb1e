//! Statement parsing

use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

impl Parser {
    /// Parse a `{ ... }` block, recovering at statement boundaries.
    ///
    /// Errors inside the block are accumulated so later statements still
    /// get parsed; the block itself only fails if its braces are malformed.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::LBrace)?;

        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && !self.at_eof() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_statement_boundary();
                }
            }
        }

        let end_span = self.current_span();
        self.expect(&Token::RBrace)?;

        Ok(Block {
            statements,
            span: start_span.to(end_span),
        })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current() {
            Token::Let => self.parse_let(),
            Token::If => Ok(Stmt::If(self.parse_if()?)),
            Token::While => self.parse_while(),
            Token::Return => self.parse_return(),
            Token::Break => {
                let span = self.current_span();
                self.advance();
                self.expect(&Token::Semicolon)?;
                Ok(Stmt::Break(span))
            }
            Token::Continue => {
                let span = self.current_span();
                self.advance();
                self.expect(&Token::Semicolon)?;
                Ok(Stmt::Continue(span))
            }
            Token::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            // `name = expr;` is an assignment; anything else starting with an
            // identifier is an expression statement (e.g. a call).
            Token::Identifier(_) if matches!(self.peek(), Some(Token::Equal)) => {
                self.parse_assignment()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::Let)?;
        let (name, _) = self.expect_identifier("variable name")?;
        self.expect(&Token::Equal)?;
        let value = self.parse_expr()?;
        let end_span = self.current_span();
        self.expect(&Token::Semicolon)?;

        Ok(Stmt::Let(LetStmt {
            name,
            value,
            span: start_span.to(end_span),
        }))
    }

    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let (name, name_span) = self.expect_identifier("variable name")?;
        self.expect(&Token::Equal)?;
        let value = self.parse_expr()?;
        let end_span = self.current_span();
        self.expect(&Token::Semicolon)?;

        Ok(Stmt::Assign(AssignStmt {
            name,
            name_span,
            value,
            span: name_span.to(end_span),
        }))
    }

    fn parse_if(&mut self) -> Result<IfStmt, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let then_branch = self.parse_block()?;

        let mut span = start_span.to(then_branch.span);
        let else_branch = if self.eat(&Token::Else) {
            if self.check(&Token::If) {
                let nested = self.parse_if()?;
                span = span.to(nested.span);
                Some(ElseBranch::If(Box::new(nested)))
            } else {
                let block = self.parse_block()?;
                span = span.to(block.span);
                Some(ElseBranch::Block(block))
            }
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let condition = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        let body = self.parse_block()?;
        let span = start_span.to(body.span);

        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current_span();
        self.expect(&Token::Return)?;

        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end_span = self.current_span();
        self.expect(&Token::Semicolon)?;

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start_span.to(end_span),
        }))
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;
        let end_span = self.current_span();
        self.expect(&Token::Semicolon)?;
        let span = expr.span().to(end_span);

        Ok(Stmt::Expression(ExprStmt { expr, span }))
    }
}
