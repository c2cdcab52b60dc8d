// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! A single Pratt loop ([`Parser::parse_expression_prec`]) drives all
//! expression parsing. Prefix forms dispatch on the current token; infix and
//! postfix forms dispatch on the operator token whenever its precedence
//! exceeds the caller's minimum. All binary operators are left-associative
//! except assignment, which recurses at one level lower to bind rightwards.
//!
//! Struct initialisation (`Ident { … }`) is ambiguous with control-flow
//! blocks; a mode flag plus a two-token shape heuristic resolves it (see
//! [`Parser::looks_like_struct_init`]).

use ecow::eco_format;

use crate::ast::{
    AssignOp, BinaryOp, ExpressionKind, Expression, MatchArm, StructInitField, UnaryOp,
};
use crate::context::ErrorTag;
use crate::source_analysis::TokenKind;

use super::{ParseResult, Parser, Precedence, infix_precedence};

impl Parser<'_, '_> {
    /// Parses any expression.
    ///
    /// Entry point for expression parsing; handles all precedence levels.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_expression_prec(Precedence::Lowest)
    }

    /// Pratt parsing core: parses an expression whose operators all bind
    /// tighter than `min`.
    ///
    /// Uses `stacker::maybe_grow` to extend the stack on the heap when the
    /// red zone falls below 32 KiB; the nesting-depth ceiling keeps the
    /// number of segments small.
    pub(super) fn parse_expression_prec(&mut self, min: Precedence) -> ParseResult<Expression> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            self.enter_nesting()?;
            let result = self.parse_expression_inner(min);
            self.leave_nesting();
            result
        })
    }

    fn parse_expression_inner(&mut self, min: Precedence) -> ParseResult<Expression> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let token = self.peek(0);
            let Some(precedence) = infix_precedence(token.kind()) else {
                break;
            };
            if precedence <= min {
                break;
            }

            match token.kind() {
                // Struct initialisation is gated by mode and shape; when the
                // `{` is a block (or struct-init is disallowed), it simply
                // ends the expression.
                TokenKind::LBrace => {
                    if self.struct_init_allowed()
                        && struct_init_target(&lhs)
                        && self.looks_like_struct_init()
                    {
                        lhs = self.parse_struct_init(lhs)?;
                    } else {
                        break;
                    }
                }

                // A macro call needs `!` directly followed by an open
                // delimiter; a stray `!` ends the expression instead.
                TokenKind::Bang => {
                    if matches!(
                        self.peek(1).kind(),
                        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
                    ) {
                        lhs = self.parse_macro_call(lhs)?;
                    } else {
                        break;
                    }
                }

                kind if kind.is_assignment() => {
                    self.advance();
                    let op = assign_op(kind);
                    // Right-associative: recurse below Assignment level.
                    let value = self.parse_expression_prec(Precedence::Lowest)?;
                    let span = lhs.span.merge(value.span);
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Assign {
                            op,
                            target: Box::new(lhs),
                            value: Box::new(value),
                        },
                    );
                }

                TokenKind::DotDot | TokenKind::DotDotEq => {
                    lhs = self.parse_range_rest(lhs, token.kind())?;
                }

                TokenKind::As => {
                    self.advance();
                    let ty = self.parse_type()?;
                    let span = lhs.span.merge(ty.span);
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Cast {
                            operand: Box::new(lhs),
                            ty: Box::new(ty),
                        },
                    );
                }

                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier)?;
                    let member = self.intern_token(name);
                    let span = lhs.span.merge(name.span());
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::MemberAccess {
                            target: Box::new(lhs),
                            member,
                        },
                    );
                }

                TokenKind::DotLess => {
                    self.advance();
                    let arguments = self.parse_generic_args()?;
                    let span = lhs.span.merge(self.previous_span());
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::GenericInstantiation {
                            base: Box::new(lhs),
                            arguments,
                        },
                    );
                }

                TokenKind::LParen => {
                    self.advance();
                    let arguments = self.parse_call_arguments()?;
                    let span = lhs.span.merge(self.previous_span());
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Call {
                            callee: Box::new(lhs),
                            arguments,
                        },
                    );
                }

                TokenKind::LBracket => {
                    self.advance();
                    let index =
                        self.with_struct_init(true, |parser| parser.parse_expression())?;
                    self.expect(TokenKind::RBracket)?;
                    let span = lhs.span.merge(self.previous_span());
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Index {
                            target: Box::new(lhs),
                            index: Box::new(index),
                        },
                    );
                }

                TokenKind::DotQuestion => {
                    let end = self.advance().span();
                    let span = lhs.span.merge(end);
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Propagate {
                            operand: Box::new(lhs),
                        },
                    );
                }

                TokenKind::DotStar => {
                    let end = self.advance().span();
                    let span = lhs.span.merge(end);
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Deref {
                            operand: Box::new(lhs),
                        },
                    );
                }

                kind => {
                    self.advance();
                    let op = binary_op(kind);
                    // Left-associative: same level stops further merges.
                    let right = self.parse_expression_prec(precedence)?;
                    let span = lhs.span.merge(right.span);
                    lhs = self.make_expr(
                        span,
                        ExpressionKind::Binary {
                            op,
                            left: Box::new(lhs),
                            right: Box::new(right),
                        },
                    );
                }
            }
        }

        Ok(lhs)
    }

    /// Parses the tail of a range whose lower bound is `start`.
    ///
    /// The upper bound is optional for `..` (open-ended range); `..=`
    /// requires one.
    fn parse_range_rest(
        &mut self,
        start: Expression,
        kind: TokenKind,
    ) -> ParseResult<Expression> {
        let op_span = self.advance().span();
        let inclusive = kind == TokenKind::DotDotEq;

        let end = if Self::token_begins_expression(self.peek_kind()) {
            Some(Box::new(self.parse_expression_prec(Precedence::Range)?))
        } else if inclusive {
            return Err(self.error_here(
                ErrorTag::ExpectedExpression,
                "inclusive range requires an upper bound",
            ));
        } else {
            None
        };

        let end_span = end.as_deref().map_or(op_span, |e| e.span);
        let span = start.span.merge(end_span);
        Ok(self.make_expr(
            span,
            ExpressionKind::Range {
                start: Some(Box::new(start)),
                end,
                inclusive,
            },
        ))
    }

    // ========================================================================
    // Prefix Forms
    // ========================================================================

    /// Parses a prefix expression (literal, name, grouping, prefix operator,
    /// aggregate literal, control flow, or type prefix).
    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let token = self.peek(0);
        match token.kind() {
            TokenKind::Int => self.parse_int_literal(),
            TokenKind::Float => self.parse_float_literal(),
            TokenKind::Str => self.parse_string_literal(),
            TokenKind::Char => self.parse_char_literal(),
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                let value = token.kind() == TokenKind::True;
                Ok(self.make_expr(token.span(), ExpressionKind::Bool(value)))
            }
            TokenKind::Undef => {
                let token = self.advance();
                Ok(self.make_expr(token.span(), ExpressionKind::Undef))
            }
            TokenKind::Null => {
                let token = self.advance();
                Ok(self.make_expr(token.span(), ExpressionKind::Null))
            }
            TokenKind::Unreachable => {
                let token = self.advance();
                Ok(self.make_expr(token.span(), ExpressionKind::Unreachable))
            }

            TokenKind::Identifier | TokenKind::SelfValue | TokenKind::SelfType => {
                let token = self.advance();
                let symbol = self.intern_token(token);
                Ok(self.make_expr(token.span(), ExpressionKind::Identifier(symbol)))
            }

            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => self.parse_bracket_prefix(),

            TokenKind::Minus => self.parse_unary(UnaryOp::Neg),
            TokenKind::Bang => self.parse_unary(UnaryOp::Not),
            TokenKind::Tilde => self.parse_unary(UnaryOp::BitNot),
            TokenKind::Hash => self.parse_unary(UnaryOp::Len),

            TokenKind::Question => {
                let start = self.advance().span();
                let operand = self.parse_expression_prec(Precedence::Prefix)?;
                let span = start.merge(operand.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::OptionalType {
                        operand: Box::new(operand),
                    },
                ))
            }

            TokenKind::Amp => {
                let start = self.advance().span();
                let mutable = self.eat(TokenKind::Mut);
                let operand = self.parse_expression_prec(Precedence::Prefix)?;
                let span = start.merge(operand.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::Reference {
                        mutable,
                        operand: Box::new(operand),
                    },
                ))
            }

            TokenKind::Star => {
                let start = self.advance().span();
                let mutable = self.eat(TokenKind::Mut);
                let operand = self.parse_expression_prec(Precedence::Prefix)?;
                let span = start.merge(operand.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::Pointer {
                        mutable,
                        operand: Box::new(operand),
                    },
                ))
            }

            TokenKind::If => self.parse_if_expression(),
            TokenKind::Match => self.parse_match_expression(),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(self.make_expr(span, ExpressionKind::Block(block)))
            }
            TokenKind::Fn => self.parse_function_type(),

            TokenKind::DotDot | TokenKind::DotDotEq => self.parse_prefix_range(token.kind()),

            TokenKind::Illegal => Err(self.report_illegal(token)),

            kind => Err(self.error_here(
                ErrorTag::ExpectedExpression,
                eco_format!("expected expression, found '{kind}'"),
            )),
        }
    }

    fn parse_unary(&mut self, op: UnaryOp) -> ParseResult<Expression> {
        let start = self.advance().span();
        let operand = self.parse_expression_prec(Precedence::Prefix)?;
        let span = start.merge(operand.span);
        Ok(self.make_expr(
            span,
            ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
        ))
    }

    /// Parses `..e` / `..=e` with an absent lower bound (and bare `..`).
    fn parse_prefix_range(&mut self, kind: TokenKind) -> ParseResult<Expression> {
        let op_span = self.advance().span();
        let inclusive = kind == TokenKind::DotDotEq;

        let end = if Self::token_begins_expression(self.peek_kind()) {
            Some(Box::new(self.parse_expression_prec(Precedence::Range)?))
        } else if inclusive {
            return Err(self.error_here(
                ErrorTag::ExpectedExpression,
                "inclusive range requires an upper bound",
            ));
        } else {
            None
        };

        let span = end.as_deref().map_or(op_span, |e| op_span.merge(e.span));
        Ok(self.make_expr(
            span,
            ExpressionKind::Range {
                start: None,
                end,
                inclusive,
            },
        ))
    }

    /// Parses `()` (unit), `(e)` (grouping), or `(a, b)` (tuple literal).
    fn parse_paren_or_tuple(&mut self) -> ParseResult<Expression> {
        let start = self.advance().span();

        if self.check(TokenKind::RParen) {
            let end = self.advance().span();
            return Ok(self.make_expr(
                start.merge(end),
                ExpressionKind::Tuple {
                    elements: Vec::new(),
                },
            ));
        }

        let first = self.with_struct_init(true, |parser| parser.parse_expression())?;

        if self.check(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::RParen) {
                    break;
                }
                let element =
                    self.with_struct_init(true, |parser| parser.parse_expression())?;
                elements.push(element);
            }
            let end = self.expect(TokenKind::RParen)?.span();
            return Ok(self.make_expr(start.merge(end), ExpressionKind::Tuple { elements }));
        }

        self.expect(TokenKind::RParen)?;
        // Grouping contributes no node of its own.
        Ok(first)
    }

    /// Parses the `[` prefix family: array literal `[a, b]`, repeated array
    /// `[v; n]`, slice type `[]T`, or array type `[N]T`.
    ///
    /// `[]` immediately followed by anything is a slice type. Otherwise one
    /// expression is parsed; `;` selects the repeat form, `,` the literal
    /// form, and after a lone `[e]` the next token decides: if it looks like
    /// a type, the bracket was an array-type length prefix.
    fn parse_bracket_prefix(&mut self) -> ParseResult<Expression> {
        let start = self.advance().span();

        if self.eat(TokenKind::RBracket) {
            let element = self.parse_type()?;
            let span = start.merge(element.span);
            return Ok(self.make_expr(
                span,
                ExpressionKind::SliceType {
                    element: Box::new(element),
                },
            ));
        }

        let first = self.with_struct_init(true, |parser| parser.parse_expression())?;

        if self.eat(TokenKind::Semicolon) {
            let length = self.with_struct_init(true, |parser| parser.parse_expression())?;
            let end = self.expect(TokenKind::RBracket)?.span();
            return Ok(self.make_expr(
                start.merge(end),
                ExpressionKind::ArrayRepeat {
                    value: Box::new(first),
                    length: Box::new(length),
                },
            ));
        }

        if self.check(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::RBracket) {
                    break;
                }
                let element =
                    self.with_struct_init(true, |parser| parser.parse_expression())?;
                elements.push(element);
            }
            let end = self.expect(TokenKind::RBracket)?.span();
            return Ok(self.make_expr(
                start.merge(end),
                ExpressionKind::ArrayLiteral { elements },
            ));
        }

        let close = self.expect(TokenKind::RBracket)?.span();

        if Self::token_begins_type(self.peek_kind()) {
            let element = self.parse_type()?;
            let span = start.merge(element.span);
            return Ok(self.make_expr(
                span,
                ExpressionKind::ArrayType {
                    length: Box::new(first),
                    element: Box::new(element),
                },
            ));
        }

        Ok(self.make_expr(
            start.merge(close),
            ExpressionKind::ArrayLiteral {
                elements: vec![first],
            },
        ))
    }

    /// Parses an `if` expression. The condition is parsed with struct-init
    /// disallowed so `if cond { … }` takes the `{` as the then-block.
    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        let start = self.advance().span();
        let condition = self.with_struct_init(false, |parser| parser.parse_expression())?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if_expression()?))
            } else {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Box::new(self.make_expr(span, ExpressionKind::Block(block))))
            }
        } else {
            None
        };

        let end = else_branch
            .as_deref()
            .map_or(then_block.span, |e| e.span);
        let span = start.merge(end);
        Ok(self.make_expr(
            span,
            ExpressionKind::If {
                condition: Box::new(condition),
                then_block,
                else_branch,
            },
        ))
    }

    /// Parses a `match` expression. The scrutinee is parsed with struct-init
    /// disallowed.
    fn parse_match_expression(&mut self) -> ParseResult<Expression> {
        let start = self.advance().span();
        let scrutinee = self.with_struct_init(false, |parser| parser.parse_expression())?;
        self.expect(TokenKind::LBrace)?;

        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::FatArrow)?;
            let body = self.parse_expression()?;
            let span = pattern.span.merge(body.span);
            arms.push(MatchArm {
                pattern,
                body,
                span,
            });
            // Commas separate arms; the trailing one is optional, and arms
            // ending in `}` may omit it.
            self.eat(TokenKind::Comma);
        }
        let end = self.expect(TokenKind::RBrace)?.span();

        let span = start.merge(end);
        Ok(self.make_expr(
            span,
            ExpressionKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
        ))
    }

    /// Parses a function type: `fn(A, B) R?`.
    pub(super) fn parse_function_type(&mut self) -> ParseResult<Expression> {
        let start = self.advance().span();
        self.expect(TokenKind::LParen)?;

        let mut parameters = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_end() {
            parameters.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(TokenKind::RParen)?.span();

        let return_type = if Self::token_begins_type(self.peek_kind()) {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let end = return_type.as_deref().map_or(close, |r| r.span);
        let span = start.merge(end);
        Ok(self.make_expr(
            span,
            ExpressionKind::FunctionType {
                parameters,
                return_type,
            },
        ))
    }

    // ========================================================================
    // Struct Initialisation
    // ========================================================================

    /// Shape heuristic for `Ident {`: the token after `{` must be `}`
    /// (empty init) or an identifier followed by `:`, `,`, or `}` (named or
    /// shorthand field). Anything else means the `{` opens a block.
    pub(super) fn looks_like_struct_init(&mut self) -> bool {
        match self.peek(1).kind() {
            TokenKind::RBrace => true,
            TokenKind::Identifier => matches!(
                self.peek(2).kind(),
                TokenKind::Colon | TokenKind::Comma | TokenKind::RBrace
            ),
            _ => false,
        }
    }

    /// Parses `target { field: value, shorthand, … }`. The `{` has been
    /// checked but not consumed.
    fn parse_struct_init(&mut self, target: Expression) -> ParseResult<Expression> {
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let name_token = self.expect(TokenKind::Identifier)?;
            let name = self.intern_token(name_token);

            let value = if self.eat(TokenKind::Colon) {
                Some(self.with_struct_init(true, |parser| parser.parse_expression())?)
            } else {
                None
            };

            let span = value
                .as_ref()
                .map_or(name_token.span(), |v| name_token.span().merge(v.span));
            fields.push(StructInitField { name, value, span });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span();

        let span = target.span.merge(end);
        Ok(self.make_expr(
            span,
            ExpressionKind::StructInit {
                target: Box::new(target),
                fields,
            },
        ))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Parses call arguments after a consumed `(`. Trailing commas are
    /// accepted.
    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_end() {
            let argument = self.with_struct_init(true, |parser| parser.parse_expression())?;
            arguments.push(argument);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(arguments)
    }

    // ========================================================================
    // Literal Decoding
    // ========================================================================

    fn parse_int_literal(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let text = self.text(token);
        let digits: String = text.chars().filter(|&c| c != '_').collect();

        let parsed = match digits.as_bytes() {
            [b'0', b'x' | b'X', rest @ ..] => parse_radix(rest, 16),
            [b'0', b'b' | b'B', rest @ ..] => parse_radix(rest, 2),
            [b'0', b'o' | b'O', rest @ ..] => parse_radix(rest, 8),
            _ => digits.parse::<u64>().ok(),
        };

        let value = match parsed {
            Some(value) => value,
            None => {
                self.report_and_continue(
                    token.span(),
                    ErrorTag::IntegerOverflow,
                    eco_format!("integer literal `{text}` is too large"),
                );
                0
            }
        };
        Ok(self.make_expr(token.span(), ExpressionKind::Int(value)))
    }

    fn parse_float_literal(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let digits: String = self.text(token).chars().filter(|&c| c != '_').collect();
        let value = digits.parse::<f64>().unwrap_or_default();
        Ok(self.make_expr(token.span(), ExpressionKind::Float(value)))
    }

    fn parse_string_literal(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let decoded = self.unescape_string(token);
        let symbol = self.ctx.interner.intern(&decoded);
        Ok(self.make_expr(token.span(), ExpressionKind::Str(symbol)))
    }

    fn parse_char_literal(&mut self) -> ParseResult<Expression> {
        let token = self.advance();
        let value = self.decode_char(token);
        Ok(self.make_expr(token.span(), ExpressionKind::Char(value)))
    }

    /// Decodes the escapes in a lexed string literal (quotes included in the
    /// token text). The lexer only validated `\"` and `\\`; everything else
    /// is checked here, reporting [`ErrorTag::InvalidEscape`] without
    /// aborting the literal.
    fn unescape_string(&mut self, token: crate::source_analysis::Token) -> String {
        let text = self.text(token);
        let inner = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        let span = token.span();

        let mut result = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some('x') => {
                    let hi = chars.next();
                    let lo = chars.next();
                    match (
                        hi.and_then(|c| c.to_digit(16)),
                        lo.and_then(|c| c.to_digit(16)),
                    ) {
                        (Some(hi), Some(lo)) => {
                            let code = hi * 16 + lo;
                            match char::from_u32(code) {
                                Some(decoded) => result.push(decoded),
                                None => result.push(char::REPLACEMENT_CHARACTER),
                            }
                        }
                        _ => self.report_and_continue(
                            span,
                            ErrorTag::InvalidEscape,
                            "\\x escape requires exactly two hex digits",
                        ),
                    }
                }
                Some('u') => {
                    if chars.next() != Some('{') {
                        self.report_and_continue(
                            span,
                            ErrorTag::InvalidEscape,
                            "\\u escape requires braces: \\u{…}",
                        );
                        continue;
                    }
                    let mut hex = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                    }
                    if hex.is_empty() || hex.len() > 6 {
                        self.report_and_continue(
                            span,
                            ErrorTag::InvalidEscape,
                            "\\u escape requires one to six hex digits",
                        );
                        continue;
                    }
                    let decoded = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32);
                    match decoded {
                        Some(decoded) => result.push(decoded),
                        None => self.report_and_continue(
                            span,
                            ErrorTag::InvalidEscape,
                            eco_format!("\\u{{{hex}}} is not a Unicode scalar value"),
                        ),
                    }
                }
                Some(other) => {
                    self.report_and_continue(
                        span,
                        ErrorTag::InvalidEscape,
                        eco_format!("unknown escape sequence `\\{other}`"),
                    );
                    result.push(other);
                }
                None => break,
            }
        }
        result
    }

    /// Decodes a lexed character literal. The lexer has already validated
    /// the shape, so only scalar-value range errors can surface here.
    fn decode_char(&mut self, token: crate::source_analysis::Token) -> char {
        let text = self.text(token);
        let inner = &text[1..text.len() - 1];

        let mut chars = inner.chars();
        let first = chars.next().unwrap_or(char::REPLACEMENT_CHARACTER);
        if first != '\\' {
            return first;
        }

        match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('0') => '\0',
            Some('x') => {
                let code = u32::from_str_radix(chars.as_str(), 16).unwrap_or(0);
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            Some('u') => {
                let hex: String = chars
                    .as_str()
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .to_owned();
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                match decoded {
                    Some(decoded) => decoded,
                    None => {
                        self.report_and_continue(
                            token.span(),
                            ErrorTag::InvalidEscape,
                            eco_format!("\\u{{{hex}}} is not a Unicode scalar value"),
                        );
                        char::REPLACEMENT_CHARACTER
                    }
                }
            }
            _ => char::REPLACEMENT_CHARACTER,
        }
    }
}

/// Parses a digit run in the given radix (prefix and underscores already
/// stripped). `None` for empty digits or overflow.
fn parse_radix(digits: &[u8], radix: u32) -> Option<u64> {
    let digits = std::str::from_utf8(digits).ok()?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// Returns whether an expression may be the target of struct initialisation
/// (`Point { … }`, `geo.Point { … }`, `List.<i32> { … }`).
fn struct_init_target(expression: &Expression) -> bool {
    matches!(
        expression.kind,
        ExpressionKind::Identifier(_)
            | ExpressionKind::MemberAccess { .. }
            | ExpressionKind::GenericInstantiation { .. }
    )
}

const fn assign_op(kind: TokenKind) -> AssignOp {
    match kind {
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::BitAnd,
        TokenKind::PipeAssign => AssignOp::BitOr,
        TokenKind::CaretAssign => AssignOp::BitXor,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        _ => AssignOp::Assign,
    }
}

const fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Equal => BinaryOp::Eq,
        TokenKind::NotEqual => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEqual => BinaryOp::Le,
        TokenKind::GreaterEqual => BinaryOp::Ge,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        // Greater is the only remaining comparison the table dispatches here.
        _ => BinaryOp::Gt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::source_analysis::parse;

    /// Parses `source` as the initialiser of a single `let` and returns the
    /// expression.
    fn parse_expr(source: &str) -> (Expression, Context) {
        let mut ctx = Context::new();
        let wrapped = format!("fn t() {{ let _ = {source}; }}");
        let module = parse(&wrapped, &mut ctx);
        assert!(
            ctx.diagnostics().is_empty(),
            "unexpected errors for {source:?}: {:?}",
            ctx.diagnostics()
        );
        let crate::ast::DeclarationKind::Function(function) = &module.declarations[0].kind else {
            panic!("expected function wrapper");
        };
        let body = function.body.as_ref().unwrap();
        let crate::ast::StatementKind::Let { value, .. } = &body.statements[0].kind else {
            panic!("expected let statement");
        };
        (value.clone(), ctx)
    }

    fn expr_kind(source: &str) -> ExpressionKind {
        parse_expr(source).0.kind
    }

    #[test]
    fn precedence_factor_over_term() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        let ExpressionKind::Binary { op, right, .. } = expr_kind("2 + 3 * 4") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            right.kind,
            ExpressionKind::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn left_associativity() {
        // 10 - 4 - 3 parses as (10 - 4) - 3
        let ExpressionKind::Binary { op, left, right } = expr_kind("10 - 4 - 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Sub);
        assert!(matches!(left.kind, ExpressionKind::Binary { .. }));
        assert!(matches!(right.kind, ExpressionKind::Int(3)));
    }

    #[test]
    fn assignment_is_right_associative() {
        // a = b = c parses as a = (b = c)
        let ExpressionKind::Assign { op, value, .. } = expr_kind("a = b = c") else {
            panic!("expected assignment");
        };
        assert_eq!(op, AssignOp::Assign);
        assert!(matches!(value.kind, ExpressionKind::Assign { .. }));
    }

    #[test]
    fn word_operators_bind_looser_than_comparison() {
        // a < 3 and b > 4 parses as (a < 3) and (b > 4)
        let ExpressionKind::Binary { op, left, right } = expr_kind("a < 3 and b > 4") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::And);
        assert!(matches!(left.kind, ExpressionKind::Binary { op: BinaryOp::Lt, .. }));
        assert!(matches!(right.kind, ExpressionKind::Binary { op: BinaryOp::Gt, .. }));
    }

    #[test]
    fn generic_instantiation_then_call() {
        // Scenario: List.<i32>.new() is Call(MemberAccess(GenericInst(List, [i32]), new), [])
        let ExpressionKind::Call { callee, arguments } = expr_kind("List.<i32>.new()") else {
            panic!("expected call");
        };
        assert!(arguments.is_empty());
        let ExpressionKind::MemberAccess { target, .. } = &callee.kind else {
            panic!("expected member access");
        };
        assert!(matches!(
            target.kind,
            ExpressionKind::GenericInstantiation { .. }
        ));
    }

    #[test]
    fn less_than_stays_a_comparison() {
        let ExpressionKind::Binary { op, .. } = expr_kind("a < 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Lt);
    }

    #[test]
    fn nested_generic_arguments_split_shr() {
        let ExpressionKind::GenericInstantiation { arguments, .. } =
            expr_kind("Map.<i32, List.<i32>>")
        else {
            panic!("expected generic instantiation");
        };
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn struct_init_forms() {
        let ExpressionKind::StructInit { fields, .. } = expr_kind("Point { x: 1, y: 2 }") else {
            panic!("expected struct init");
        };
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().all(|f| f.value.is_some()));

        // Shorthand and trailing comma
        let ExpressionKind::StructInit { fields, .. } = expr_kind("Point { x, y: 2, }") else {
            panic!("expected struct init");
        };
        assert!(fields[0].value.is_none());

        // Empty
        let ExpressionKind::StructInit { fields, .. } = expr_kind("Point {}") else {
            panic!("expected struct init");
        };
        assert!(fields.is_empty());
    }

    #[test]
    fn struct_init_on_member_path() {
        let ExpressionKind::StructInit { target, .. } = expr_kind("geo.Point { x: 1 }") else {
            panic!("expected struct init");
        };
        assert!(matches!(target.kind, ExpressionKind::MemberAccess { .. }));
    }

    #[test]
    fn ranges() {
        assert!(matches!(
            expr_kind("0..5"),
            ExpressionKind::Range {
                start: Some(_),
                end: Some(_),
                inclusive: false,
            }
        ));
        assert!(matches!(
            expr_kind("0..=5"),
            ExpressionKind::Range {
                inclusive: true,
                ..
            }
        ));
        assert!(matches!(
            expr_kind("0.."),
            ExpressionKind::Range {
                start: Some(_),
                end: None,
                ..
            }
        ));
        assert!(matches!(
            expr_kind("..5"),
            ExpressionKind::Range {
                start: None,
                end: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn inclusive_range_requires_upper_bound() {
        let mut ctx = Context::new();
        parse("fn t() { let _ = 0..=; }", &mut ctx);
        assert!(ctx.has_errors());
    }

    #[test]
    fn float_versus_member_access() {
        assert!(matches!(expr_kind("1.5"), ExpressionKind::Float(_)));
        assert!(matches!(
            expr_kind("x.abs()"),
            ExpressionKind::Call { .. }
        ));
    }

    #[test]
    fn unary_operators() {
        assert!(matches!(
            expr_kind("-x"),
            ExpressionKind::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
        assert!(matches!(
            expr_kind("!ok"),
            ExpressionKind::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
        assert!(matches!(
            expr_kind("~bits"),
            ExpressionKind::Unary {
                op: UnaryOp::BitNot,
                ..
            }
        ));
        assert!(matches!(
            expr_kind("#items"),
            ExpressionKind::Unary {
                op: UnaryOp::Len,
                ..
            }
        ));

        // -x * y parses as (-x) * y
        let ExpressionKind::Binary { op, left, .. } = expr_kind("-x * y") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Mul);
        assert!(matches!(left.kind, ExpressionKind::Unary { .. }));
    }

    #[test]
    fn postfix_chains() {
        // a.b[0].?.* - member, index, propagate, deref
        let ExpressionKind::Deref { operand } = expr_kind("a.b[0].?.*") else {
            panic!("expected deref");
        };
        let ExpressionKind::Propagate { operand } = &operand.kind else {
            panic!("expected propagate");
        };
        assert!(matches!(operand.kind, ExpressionKind::Index { .. }));
    }

    #[test]
    fn cast_binds_tighter_than_arithmetic() {
        // x as f64 / 2.0 parses as (x as f64) / 2.0
        let ExpressionKind::Binary { op, left, .. } = expr_kind("x as f64 / 2.0") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Div);
        assert!(matches!(left.kind, ExpressionKind::Cast { .. }));
    }

    #[test]
    fn tuples_and_grouping() {
        assert!(matches!(
            expr_kind("()"),
            ExpressionKind::Tuple { elements } if elements.is_empty()
        ));
        assert!(matches!(
            expr_kind("(1, 2)"),
            ExpressionKind::Tuple { elements } if elements.len() == 2
        ));
        assert!(matches!(
            expr_kind("(1,)"),
            ExpressionKind::Tuple { elements } if elements.len() == 1
        ));
        // Plain grouping contributes no node
        assert!(matches!(expr_kind("(1 + 2)"), ExpressionKind::Binary { .. }));
    }

    #[test]
    fn array_forms() {
        assert!(matches!(
            expr_kind("[1, 2, 3]"),
            ExpressionKind::ArrayLiteral { elements } if elements.len() == 3
        ));
        assert!(matches!(
            expr_kind("[1, 2, 3,]"),
            ExpressionKind::ArrayLiteral { elements } if elements.len() == 3
        ));
        assert!(matches!(
            expr_kind("[0; 16]"),
            ExpressionKind::ArrayRepeat { .. }
        ));
        assert!(matches!(
            expr_kind("[]i32"),
            ExpressionKind::SliceType { .. }
        ));
        assert!(matches!(
            expr_kind("[4]i32"),
            ExpressionKind::ArrayType { .. }
        ));
        // Single-element literal when no type follows
        assert!(matches!(
            expr_kind("[x]"),
            ExpressionKind::ArrayLiteral { elements } if elements.len() == 1
        ));
    }

    #[test]
    fn type_prefixes_in_expression_position() {
        assert!(matches!(
            expr_kind("&mut buffer"),
            ExpressionKind::Reference { mutable: true, .. }
        ));
        assert!(matches!(
            expr_kind("&value"),
            ExpressionKind::Reference { mutable: false, .. }
        ));
        assert!(matches!(
            expr_kind("*mut u8"),
            ExpressionKind::Pointer { mutable: true, .. }
        ));
        assert!(matches!(
            expr_kind("?i32"),
            ExpressionKind::OptionalType { .. }
        ));
        assert!(matches!(
            expr_kind("fn(i32, i32) i32"),
            ExpressionKind::FunctionType { parameters, return_type: Some(_) }
                if parameters.len() == 2
        ));
    }

    #[test]
    fn if_else_chains() {
        let ExpressionKind::If { else_branch, .. } = expr_kind("if a { 1 } else if b { 2 } else { 3 }")
        else {
            panic!("expected if");
        };
        let else_branch = else_branch.unwrap();
        assert!(matches!(else_branch.kind, ExpressionKind::If { .. }));
    }

    #[test]
    fn match_arms_with_trailing_comma() {
        let ExpressionKind::Match { arms, .. } = expr_kind("match x { 1 => 10, _ => 0, }") else {
            panic!("expected match");
        };
        assert_eq!(arms.len(), 2);
    }

    #[test]
    fn literal_decoding() {
        assert!(matches!(expr_kind("0xFF"), ExpressionKind::Int(255)));
        assert!(matches!(expr_kind("0b1010"), ExpressionKind::Int(10)));
        assert!(matches!(expr_kind("0o777"), ExpressionKind::Int(511)));
        assert!(matches!(expr_kind("1_000_000"), ExpressionKind::Int(1_000_000)));
        assert!(matches!(expr_kind("'\\n'"), ExpressionKind::Char('\n')));
        assert!(matches!(expr_kind("'\\x41'"), ExpressionKind::Char('A')));
        assert!(matches!(expr_kind("'\\u{1F600}'"), ExpressionKind::Char('😀')));
        assert!(matches!(expr_kind("'中'"), ExpressionKind::Char('中')));
    }

    #[test]
    fn string_unescaping_is_interned() {
        let (expr, ctx) = parse_expr(r#""a\tb\u{41}""#);
        let ExpressionKind::Str(symbol) = expr.kind else {
            panic!("expected string");
        };
        assert_eq!(ctx.resolve(symbol), "a\tbA");
    }

    #[test]
    fn integer_overflow_is_reported_but_not_fatal() {
        let mut ctx = Context::new();
        let module = parse(
            "fn t() { let a = 99999999999999999999999999; let b = 2; }",
            &mut ctx,
        );
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(
            ctx.diagnostics()[0].tag,
            crate::context::ErrorTag::IntegerOverflow
        );
        // The second statement still parses
        let crate::ast::DeclarationKind::Function(function) = &module.declarations[0].kind else {
            panic!("expected function");
        };
        assert_eq!(function.body.as_ref().unwrap().statements.len(), 2);
    }

    #[test]
    fn trailing_commas_in_calls_and_generic_args() {
        let ExpressionKind::Call { arguments, .. } = expr_kind("f(1, 2,)") else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);

        let ExpressionKind::GenericInstantiation { arguments, .. } = expr_kind("List.<i32,>")
        else {
            panic!("expected generic instantiation");
        };
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn spans_cover_whole_expressions() {
        let (expr, _) = parse_expr("1 + 2 * 3");
        let source = "fn t() { let _ = 1 + 2 * 3; }";
        assert_eq!(expr.span.slice(source), "1 + 2 * 3");
    }
}
