// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Statement and block parsing.
//!
//! Blocks separate executed statements from an optional trailing result
//! expression: an expression directly before `}` with no `;` is the block's
//! value. Expressions with natural `}` boundaries (`if`, `match`, blocks)
//! may stand as statements without a semicolon.
//!
//! Statement-level error recovery happens here: the block loop catches the
//! [`ParseError`] sentinel, synchronises, and continues with the next
//! statement, so one bad statement costs one diagnostic and nothing else.

use ecow::eco_format;

use crate::ast::{Block, ForLoop, Statement, StatementKind};
use crate::context::ErrorTag;
use crate::source_analysis::TokenKind;

use super::{ParseError, ParseResult, Parser};

impl Parser<'_, '_> {
    /// Parses a `{ … }` block with statement-level recovery.
    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect(TokenKind::LBrace)?.span();

        let mut statements = Vec::new();
        let mut result = None;

        // A block is a fresh statement context: the struct-init restriction
        // from a surrounding `if`/`match`/`for` header ends at its `{`.
        self.with_struct_init(true, |parser| {
            while !parser.check(TokenKind::RBrace) && !parser.at_end() {
                let before = parser.consumed;
                match parser.parse_block_entry(&mut statements, &mut result) {
                    Ok(()) => {}
                    Err(ParseError) => {
                        parser.synchronize();
                        if parser.consumed == before
                            && !parser.at_end()
                            && !parser.check(TokenKind::RBrace)
                        {
                            parser.advance();
                        }
                    }
                }
            }
        });

        let end = self.expect(TokenKind::RBrace)?.span();
        Ok(Block {
            statements,
            result,
            span: start.merge(end),
        })
    }

    /// Parses one block entry: a statement, or an expression that is either
    /// a statement (with `;` or a natural block boundary) or the block's
    /// trailing result.
    fn parse_block_entry(
        &mut self,
        statements: &mut Vec<Statement>,
        result: &mut Option<Box<crate::ast::Expression>>,
    ) -> ParseResult<()> {
        let kind = self.peek_kind();
        if matches!(
            kind,
            TokenKind::Let
                | TokenKind::For
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::Defer
        ) || kind.starts_declaration()
        {
            statements.push(self.parse_statement()?);
            return Ok(());
        }

        let expression = self.parse_expression()?;

        if self.eat(TokenKind::Semicolon) {
            let span = expression.span.merge(self.previous_span());
            statements.push(self.make_stmt(span, StatementKind::Expression(expression)));
        } else if self.check(TokenKind::RBrace) {
            *result = Some(Box::new(expression));
        } else if expression.kind.has_block_form() {
            let span = expression.span;
            statements.push(self.make_stmt(span, StatementKind::Expression(expression)));
        } else {
            let found = self.peek_kind();
            return Err(self.error_here(
                ErrorTag::ExpectedSemicolon,
                eco_format!("expected ';' after expression, found '{found}'"),
            ));
        }
        Ok(())
    }

    /// Parses a statement. Expressions in statement position are handled by
    /// the block loop, not here.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let kind = self.peek_kind();
        match kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::For => self.parse_for_statement(),

            TokenKind::Break => {
                let start = self.advance().span();
                let end = self.expect(TokenKind::Semicolon)?.span();
                Ok(self.make_stmt(start.merge(end), StatementKind::Break))
            }
            TokenKind::Continue => {
                let start = self.advance().span();
                let end = self.expect(TokenKind::Semicolon)?.span();
                Ok(self.make_stmt(start.merge(end), StatementKind::Continue))
            }

            TokenKind::Return => {
                let start = self.advance().span();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let end = self.expect(TokenKind::Semicolon)?.span();
                Ok(self.make_stmt(start.merge(end), StatementKind::Return { value }))
            }

            TokenKind::Defer => {
                let start = self.advance().span();
                let expression = self.parse_expression()?;
                let end = self.expect(TokenKind::Semicolon)?.span();
                Ok(self.make_stmt(start.merge(end), StatementKind::Defer { expression }))
            }

            kind if kind.starts_declaration() => {
                let declaration = self.parse_declaration()?;
                let span = declaration.span;
                Ok(self.make_stmt(span, StatementKind::Declaration(Box::new(declaration))))
            }

            kind => Err(self.error_here(
                ErrorTag::ExpectedStatement,
                eco_format!("expected statement, found '{kind}'"),
            )),
        }
    }

    /// Parses `let pattern [: type] = value;`.
    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().span(); // let
        let pattern = self.parse_pattern()?;

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        let end = self.expect(TokenKind::Semicolon)?.span();

        Ok(self.make_stmt(
            start.merge(end),
            StatementKind::Let { pattern, ty, value },
        ))
    }

    /// Parses a `for` statement in any of its forms:
    ///
    /// - `for { body }` - infinite
    /// - `for cond { body }` - condition-only
    /// - `for init; cond; post { body }` - three-part, each part optional
    /// - `for [mut] x in iterable { body }` - iterator
    ///
    /// Header expressions are parsed with struct-init disallowed so the
    /// body's `{` is never mistaken for an initialiser.
    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let start = self.advance().span(); // for

        if self.check(TokenKind::LBrace) {
            let body = self.parse_block()?;
            let span = start.merge(body.span);
            return Ok(self.make_stmt(span, StatementKind::For(ForLoop::Infinite { body })));
        }

        // Iterator form: `ident in` or `mut ident in` (within lookahead 4).
        let is_iterator = (self.check(TokenKind::Identifier)
            && self.check_nth(1, TokenKind::In))
            || (self.check(TokenKind::Mut)
                && self.check_nth(1, TokenKind::Identifier)
                && self.check_nth(2, TokenKind::In));
        if is_iterator {
            let mutable = self.eat(TokenKind::Mut);
            let name_token = self.expect(TokenKind::Identifier)?;
            let binding = self.intern_token(name_token);
            self.expect(TokenKind::In)?;
            let iterable = self.with_struct_init(false, |parser| parser.parse_expression())?;
            let body = self.parse_block()?;
            let span = start.merge(body.span);
            return Ok(self.make_stmt(
                span,
                StatementKind::For(ForLoop::Iterator {
                    mutable,
                    binding,
                    iterable,
                    body,
                }),
            ));
        }

        let loop_form = self.with_struct_init(false, |parser| parser.parse_for_header())?;
        let span = start.merge(self.previous_span());
        Ok(self.make_stmt(span, StatementKind::For(loop_form)))
    }

    /// Parses the three-part (or condition-only) `for` header and body.
    fn parse_for_header(&mut self) -> ParseResult<ForLoop> {
        // Init part
        let init = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::Let) {
            Some(Box::new(self.parse_let_statement()?))
        } else {
            let expression = self.parse_expression()?;
            if self.check(TokenKind::LBrace) {
                // Condition-only sugar: `for cond { body }`
                let body = self.parse_block()?;
                return Ok(ForLoop::Condition {
                    condition: expression,
                    body,
                });
            }
            let end = self.expect(TokenKind::Semicolon)?.span();
            let span = expression.span.merge(end);
            let statement = self.make_stmt(span, StatementKind::Expression(expression));
            Some(Box::new(statement))
        };

        // Condition part
        let condition = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            Some(condition)
        };

        // Post part
        let post = if self.check(TokenKind::LBrace) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let body = self.parse_block()?;
        Ok(ForLoop::Classic {
            init,
            condition,
            post,
            body,
        })
    }
}
