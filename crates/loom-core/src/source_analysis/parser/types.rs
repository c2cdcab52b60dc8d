// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Type expression parsing.
//!
//! Types share the expression AST; this module is the dedicated entry used
//! wherever a type is syntactically required (parameter annotations, return
//! types, generic arguments, `type` aliases, cast targets). In type context
//! `<` introduces generic arguments directly - it cannot be a less-than
//! comparison here, so no `.<` turbofish is needed.
//!
//! Nested generic argument lists close across a single `>>` token
//! (`Map<K, List<V>>`); the closer splits the token and pushes the second
//! `>` back onto the stream.

use ecow::eco_format;

use crate::ast::{Expression, ExpressionKind, GenericParam};
use crate::context::ErrorTag;
use crate::source_analysis::{Span, Token, TokenKind};

use super::{ParseResult, Parser};

impl Parser<'_, '_> {
    /// Parses a type expression, including type-level ranges `T .. U` and
    /// `T ..= U`.
    pub(super) fn parse_type(&mut self) -> ParseResult<Expression> {
        self.enter_nesting()?;
        let result = self.parse_type_inner();
        self.leave_nesting();
        result
    }

    fn parse_type_inner(&mut self) -> ParseResult<Expression> {
        let start = self.parse_type_operand()?;

        let kind = self.peek_kind();
        if matches!(kind, TokenKind::DotDot | TokenKind::DotDotEq) {
            self.advance();
            let inclusive = kind == TokenKind::DotDotEq;
            let end = self.parse_type_operand()?;
            let span = start.span.merge(end.span);
            return Ok(self.make_expr(
                span,
                ExpressionKind::Range {
                    start: Some(Box::new(start)),
                    end: Some(Box::new(end)),
                    inclusive,
                },
            ));
        }

        Ok(start)
    }

    /// Parses a type without a range suffix: a prefix form plus `.Member`
    /// and `<…>` suffixes.
    fn parse_type_operand(&mut self) -> ParseResult<Expression> {
        let mut ty = self.parse_type_prefix()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier)?;
                    let member = self.intern_token(name);
                    let span = ty.span.merge(name.span());
                    ty = self.make_expr(
                        span,
                        ExpressionKind::MemberAccess {
                            target: Box::new(ty),
                            member,
                        },
                    );
                }
                // `<` opens generic arguments directly in type position;
                // `.<` is also accepted for symmetry with expressions.
                TokenKind::Less | TokenKind::DotLess => {
                    self.advance();
                    let arguments = self.parse_generic_args()?;
                    let span = ty.span.merge(self.previous_span());
                    ty = self.make_expr(
                        span,
                        ExpressionKind::GenericInstantiation {
                            base: Box::new(ty),
                            arguments,
                        },
                    );
                }
                _ => break,
            }
        }

        Ok(ty)
    }

    /// Parses one type prefix form.
    fn parse_type_prefix(&mut self) -> ParseResult<Expression> {
        let token = self.peek(0);
        match token.kind() {
            TokenKind::Identifier | TokenKind::SelfType => {
                let token = self.advance();
                let symbol = self.intern_token(token);
                Ok(self.make_expr(token.span(), ExpressionKind::Identifier(symbol)))
            }

            TokenKind::Amp => {
                let start = self.advance().span();
                let mutable = self.eat(TokenKind::Mut);
                let operand = self.parse_type()?;
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
                let operand = self.parse_type()?;
                let span = start.merge(operand.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::Pointer {
                        mutable,
                        operand: Box::new(operand),
                    },
                ))
            }

            TokenKind::Question => {
                let start = self.advance().span();
                let operand = self.parse_type()?;
                let span = start.merge(operand.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::OptionalType {
                        operand: Box::new(operand),
                    },
                ))
            }

            TokenKind::LBracket => {
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
                let length = self.with_struct_init(true, |parser| parser.parse_expression())?;
                self.expect(TokenKind::RBracket)?;
                let element = self.parse_type()?;
                let span = start.merge(element.span);
                Ok(self.make_expr(
                    span,
                    ExpressionKind::ArrayType {
                        length: Box::new(length),
                        element: Box::new(element),
                    },
                ))
            }

            TokenKind::Fn => self.parse_function_type(),

            TokenKind::Bang => {
                let span = self.advance().span();
                Ok(self.make_expr(span, ExpressionKind::NeverType))
            }

            TokenKind::LParen => {
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
                let first = self.parse_type()?;
                if self.check(TokenKind::Comma) {
                    let mut elements = vec![first];
                    while self.eat(TokenKind::Comma) {
                        if self.check(TokenKind::RParen) {
                            break;
                        }
                        elements.push(self.parse_type()?);
                    }
                    let end = self.expect(TokenKind::RParen)?.span();
                    return Ok(
                        self.make_expr(start.merge(end), ExpressionKind::Tuple { elements })
                    );
                }
                self.expect(TokenKind::RParen)?;
                Ok(first)
            }

            TokenKind::Illegal => Err(self.report_illegal(token)),

            kind => Err(self.error_here(
                ErrorTag::ExpectedType,
                eco_format!("expected type, found '{kind}'"),
            )),
        }
    }

    // ========================================================================
    // Generic Arguments & Parameters
    // ========================================================================

    /// Parses the arguments of a generic instantiation after the opening
    /// `<` / `.<` has been consumed. Trailing commas are accepted.
    pub(super) fn parse_generic_args(&mut self) -> ParseResult<Vec<Expression>> {
        let mut arguments = Vec::new();
        loop {
            if self.at_generic_close() {
                self.eat_generic_close()?;
                break;
            }
            arguments.push(self.parse_type()?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.eat_generic_close()?;
            break;
        }
        Ok(arguments)
    }

    /// Parses a declaration-side generic parameter list `<T, U: Bound>`,
    /// starting at the `<`.
    pub(super) fn parse_generic_params(&mut self) -> ParseResult<Vec<GenericParam>> {
        self.expect(TokenKind::Less)?;

        let mut params = Vec::new();
        loop {
            if self.at_generic_close() {
                self.eat_generic_close()?;
                break;
            }
            let name_token = self.expect(TokenKind::Identifier)?;
            let name = self.intern_token(name_token);
            let constraint = if self.eat(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let span = constraint
                .as_ref()
                .map_or(name_token.span(), |c| name_token.span().merge(c.span));
            params.push(GenericParam {
                name,
                constraint,
                span,
            });

            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.eat_generic_close()?;
            break;
        }
        Ok(params)
    }

    fn at_generic_close(&mut self) -> bool {
        matches!(self.peek_kind(), TokenKind::Greater | TokenKind::Shr)
    }

    /// Consumes one closing `>`. A `>>` token is split: its first half
    /// closes this list and a synthetic `>` covering the second half is
    /// pushed back for the enclosing list.
    fn eat_generic_close(&mut self) -> ParseResult<()> {
        let token = self.peek(0);
        match token.kind() {
            TokenKind::Greater => {
                self.advance();
                Ok(())
            }
            TokenKind::Shr => {
                self.advance();
                let span = token.span();
                let second = Token::new(
                    TokenKind::Greater,
                    Span::new(span.start() + 1, span.end()),
                );
                self.push_back_token(second);
                Ok(())
            }
            _ => {
                self.expect(TokenKind::Greater)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeclarationKind;
    use crate::context::Context;
    use crate::source_analysis::parse;

    /// Parses `source` as the right-hand side of a `type` alias.
    fn parse_ty(source: &str) -> Expression {
        let mut ctx = Context::new();
        let wrapped = format!("type T = {source};");
        let module = parse(&wrapped, &mut ctx);
        assert!(
            ctx.diagnostics().is_empty(),
            "unexpected errors for {source:?}: {:?}",
            ctx.diagnostics()
        );
        let DeclarationKind::TypeAlias(alias) = &module.declarations[0].kind else {
            panic!("expected type alias");
        };
        alias.ty.clone()
    }

    #[test]
    fn named_and_member_types() {
        assert!(matches!(parse_ty("i32").kind, ExpressionKind::Identifier(_)));
        assert!(matches!(
            parse_ty("geo.Point").kind,
            ExpressionKind::MemberAccess { .. }
        ));
        assert!(matches!(parse_ty("Self").kind, ExpressionKind::Identifier(_)));
    }

    #[test]
    fn generic_arguments_use_bare_angle_brackets() {
        let ExpressionKind::GenericInstantiation { arguments, .. } = parse_ty("List<i32>").kind
        else {
            panic!("expected generic instantiation");
        };
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn nested_generics_split_shr() {
        let ExpressionKind::GenericInstantiation { arguments, .. } =
            parse_ty("Map<str, List<i32>>").kind
        else {
            panic!("expected generic instantiation");
        };
        assert_eq!(arguments.len(), 2);
        assert!(matches!(
            arguments[1].kind,
            ExpressionKind::GenericInstantiation { .. }
        ));

        // Three levels deep: `>>>` is `>>` + `>` from the lexer.
        let ty = parse_ty("A<B<C<i32>>>");
        assert!(matches!(ty.kind, ExpressionKind::GenericInstantiation { .. }));
    }

    #[test]
    fn pointer_and_reference_types() {
        assert!(matches!(
            parse_ty("&Node").kind,
            ExpressionKind::Reference { mutable: false, .. }
        ));
        assert!(matches!(
            parse_ty("&mut Node").kind,
            ExpressionKind::Reference { mutable: true, .. }
        ));
        assert!(matches!(
            parse_ty("*u8").kind,
            ExpressionKind::Pointer { mutable: false, .. }
        ));
        assert!(matches!(
            parse_ty("*mut u8").kind,
            ExpressionKind::Pointer { mutable: true, .. }
        ));
    }

    #[test]
    fn sequence_types() {
        assert!(matches!(parse_ty("[]u8").kind, ExpressionKind::SliceType { .. }));

        let ExpressionKind::ArrayType { length, .. } = parse_ty("[16]u8").kind else {
            panic!("expected array type");
        };
        assert!(matches!(length.kind, ExpressionKind::Int(16)));

        // Nested: slice of arrays
        let ExpressionKind::SliceType { element } = parse_ty("[][4]f32").kind else {
            panic!("expected slice type");
        };
        assert!(matches!(element.kind, ExpressionKind::ArrayType { .. }));
    }

    #[test]
    fn optional_function_and_never_types() {
        assert!(matches!(
            parse_ty("?i32").kind,
            ExpressionKind::OptionalType { .. }
        ));
        assert!(matches!(parse_ty("!").kind, ExpressionKind::NeverType));

        let ExpressionKind::FunctionType {
            parameters,
            return_type,
        } = parse_ty("fn(i32, []u8) bool").kind
        else {
            panic!("expected function type");
        };
        assert_eq!(parameters.len(), 2);
        assert!(return_type.is_some());

        assert!(matches!(
            parse_ty("fn()").kind,
            ExpressionKind::FunctionType { return_type: None, .. }
        ));
    }

    #[test]
    fn tuple_types() {
        assert!(matches!(
            parse_ty("()").kind,
            ExpressionKind::Tuple { elements } if elements.is_empty()
        ));
        assert!(matches!(
            parse_ty("(i32, f64)").kind,
            ExpressionKind::Tuple { elements } if elements.len() == 2
        ));
        // Parenthesised single type is just grouping
        assert!(matches!(parse_ty("(i32)").kind, ExpressionKind::Identifier(_)));
    }

    #[test]
    fn type_level_ranges() {
        let ExpressionKind::Range { inclusive, .. } = parse_ty("u8 .. u16").kind else {
            panic!("expected range");
        };
        assert!(!inclusive);

        let ExpressionKind::Range { inclusive, .. } = parse_ty("u8 ..= u16").kind else {
            panic!("expected range");
        };
        assert!(inclusive);
    }

    #[test]
    fn complex_composite_type() {
        // ?&mut List<geo.Point>
        let ExpressionKind::OptionalType { operand } = parse_ty("?&mut List<geo.Point>").kind
        else {
            panic!("expected optional");
        };
        let ExpressionKind::Reference { mutable, operand } = &operand.kind else {
            panic!("expected reference");
        };
        assert!(mutable);
        assert!(matches!(
            operand.kind,
            ExpressionKind::GenericInstantiation { .. }
        ));
    }

    #[test]
    fn type_errors_are_reported() {
        let mut ctx = Context::new();
        parse("type T = ,;", &mut ctx);
        assert!(ctx.has_errors());
        assert!(
            ctx.diagnostics()
                .iter()
                .any(|d| d.tag == ErrorTag::ExpectedType)
        );
    }
}
