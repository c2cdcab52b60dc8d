// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Pattern parsing (`let` bindings and `match` arms).
//!
//! Patterns reuse expression nodes for their literal and type-context
//! parts, so `Option.<i32>.Some(x)` carries an ordinary generic
//! instantiation in its context slot. Struct destructuring is never
//! ambiguous with blocks - a `{` after a pattern path always opens a field
//! list - so no mode flag is involved here.

use ecow::eco_format;

use crate::ast::{Expression, ExpressionKind, FieldPattern, Pattern, PatternKind};
use crate::context::ErrorTag;
use crate::source_analysis::TokenKind;

use super::{ParseResult, Parser, Precedence};

impl Parser<'_, '_> {
    /// Parses a pattern.
    pub(super) fn parse_pattern(&mut self) -> ParseResult<Pattern> {
        let token = self.peek(0);
        match token.kind() {
            TokenKind::Underscore => {
                let span = self.advance().span();
                Ok(self.make_pattern(span, PatternKind::Wildcard))
            }

            TokenKind::Mut => {
                let start = self.advance().span();
                let name_token = self.expect(TokenKind::Identifier)?;
                let name = self.intern_token(name_token);
                let span = start.merge(name_token.span());
                Ok(self.make_pattern(span, PatternKind::Binding {
                    mutable: true,
                    name,
                }))
            }

            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::Char
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Minus => self.parse_literal_pattern(),

            TokenKind::Dot => self.parse_short_enum_pattern(),

            TokenKind::LParen => self.parse_tuple_pattern(),

            TokenKind::Identifier | TokenKind::SelfType => self.parse_path_pattern(),

            TokenKind::Illegal => Err(self.report_illegal(token)),

            kind => Err(self.error_here(
                ErrorTag::ExpectedPattern,
                eco_format!("expected pattern, found '{kind}'"),
            )),
        }
    }

    /// Parses a literal pattern, possibly extended into a literal range
    /// (`1..9`, `'a'..='z'`).
    fn parse_literal_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.parse_expression_prec(Precedence::Prefix)?;

        let kind = self.peek_kind();
        if matches!(kind, TokenKind::DotDot | TokenKind::DotDotEq) {
            self.advance();
            let inclusive = kind == TokenKind::DotDotEq;
            let end = self.parse_expression_prec(Precedence::Prefix)?;
            let span = start.span.merge(end.span);
            return Ok(self.make_pattern(
                span,
                PatternKind::Range {
                    start: Box::new(start),
                    end: Box::new(end),
                    inclusive,
                },
            ));
        }

        let span = start.span;
        Ok(self.make_pattern(span, PatternKind::Literal(Box::new(start))))
    }

    /// Parses the short enum form `.Name` / `.Name(p, …)`.
    fn parse_short_enum_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.advance().span(); // .
        let name_token = self.expect(TokenKind::Identifier)?;
        let variant = self.intern_token(name_token);

        let payload = if self.check(TokenKind::LParen) {
            Some(self.parse_pattern_list()?)
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Ok(self.make_pattern(
            span,
            PatternKind::EnumVariant {
                context: None,
                variant,
                payload,
            },
        ))
    }

    /// Parses a tuple pattern `(a, _, mut b)`.
    fn parse_tuple_pattern(&mut self) -> ParseResult<Pattern> {
        let start = self.current_span();
        let elements = self.parse_pattern_list()?;
        let span = start.merge(self.previous_span());
        Ok(self.make_pattern(span, PatternKind::Tuple { elements }))
    }

    /// Parses a parenthesised, comma-separated pattern list. Trailing commas
    /// are accepted.
    fn parse_pattern_list(&mut self) -> ParseResult<Vec<Pattern>> {
        self.expect(TokenKind::LParen)?;
        let mut patterns = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_end() {
            patterns.push(self.parse_pattern()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(patterns)
    }

    /// Parses a pattern that starts with an identifier: a plain binding, a
    /// qualified enum match `Type.Name(…)`, or a struct destructuring
    /// `Type { … }` (where `Type` may be generic or a dotted path).
    fn parse_path_pattern(&mut self) -> ParseResult<Pattern> {
        let path = self.parse_pattern_path()?;

        if self.check(TokenKind::LBrace) {
            return self.parse_struct_pattern(path);
        }

        if self.check(TokenKind::LParen) {
            let (context, variant) = match path.kind {
                ExpressionKind::MemberAccess { target, member } => (Some(target), member),
                ExpressionKind::Identifier(name) => (None, name),
                _ => {
                    return Err(self.error_at(
                        path.span,
                        ErrorTag::ExpectedPattern,
                        "expected a variant name before '('",
                    ));
                }
            };
            let payload = Some(self.parse_pattern_list()?);
            let span = path.span.merge(self.previous_span());
            return Ok(self.make_pattern(
                span,
                PatternKind::EnumVariant {
                    context,
                    variant,
                    payload,
                },
            ));
        }

        match path.kind {
            ExpressionKind::Identifier(name) => {
                let span = path.span;
                Ok(self.make_pattern(span, PatternKind::Binding {
                    mutable: false,
                    name,
                }))
            }
            ExpressionKind::MemberAccess { target, member } => {
                let span = path.span;
                Ok(self.make_pattern(
                    span,
                    PatternKind::EnumVariant {
                        context: Some(target),
                        variant: member,
                        payload: None,
                    },
                ))
            }
            _ => Err(self.error_at(
                path.span,
                ErrorTag::ExpectedPattern,
                "a generic type pattern must destructure fields or a variant",
            )),
        }
    }

    /// Parses the dotted/generic path prefix of a pattern:
    /// `Type`, `mod.Type`, `Type.<G>`, `Type.Variant`.
    fn parse_pattern_path(&mut self) -> ParseResult<Expression> {
        let first = self.advance();
        let symbol = self.intern_token(first);
        let mut path = self.make_expr(first.span(), ExpressionKind::Identifier(symbol));

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier)?;
                    let member = self.intern_token(name);
                    let span = path.span.merge(name.span());
                    path = self.make_expr(
                        span,
                        ExpressionKind::MemberAccess {
                            target: Box::new(path),
                            member,
                        },
                    );
                }
                TokenKind::DotLess => {
                    self.advance();
                    let arguments = self.parse_generic_args()?;
                    let span = path.span.merge(self.previous_span());
                    path = self.make_expr(
                        span,
                        ExpressionKind::GenericInstantiation {
                            base: Box::new(path),
                            arguments,
                        },
                    );
                }
                _ => break,
            }
        }

        Ok(path)
    }

    /// Parses struct destructuring fields: `{ x: p, mut y, z, .. }`.
    fn parse_struct_pattern(&mut self, target: Expression) -> ParseResult<Pattern> {
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        let mut has_rest = false;
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            if self.eat(TokenKind::DotDot) {
                has_rest = true;
                // The rest marker must come last.
                self.eat(TokenKind::Comma);
                break;
            }

            let mutable = self.eat(TokenKind::Mut);
            let name_token = self.expect(TokenKind::Identifier)?;
            let name = self.intern_token(name_token);

            let pattern = if self.eat(TokenKind::Colon) {
                if mutable {
                    return Err(self.error_here(
                        ErrorTag::ExpectedPattern,
                        "'mut' applies only to shorthand field bindings",
                    ));
                }
                Some(self.parse_pattern()?)
            } else {
                None
            };

            let span = pattern
                .as_ref()
                .map_or(name_token.span(), |p| name_token.span().merge(p.span));
            fields.push(FieldPattern {
                name,
                pattern,
                mutable,
                span,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span();

        let span = target.span.merge(end);
        Ok(self.make_pattern(
            span,
            PatternKind::Struct {
                target: Box::new(target),
                fields,
                has_rest,
            },
        ))
    }
}
