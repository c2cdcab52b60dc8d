// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Declaration parsing.
//!
//! Each declaration parser consumes an optional `pub`, the keyword, the
//! declaration-specific syntax, and leaves the cursor immediately after the
//! final `}` or `;`.
//!
//! Body loops (struct/enum/union/trait/impl/extern) recover member-by-member:
//! an unexpected token is reported once (panic-mode gated), then advanced
//! past individually, and the next successfully parsed member clears panic
//! mode. This keeps one bad member from consuming the rest of the body.

use ecow::eco_format;

use crate::ast::{
    Declaration, DeclarationKind, EnumDecl, EnumVariantDecl, ExpressionKind, ExternBlock,
    FieldDecl, FunctionDecl, GlobalDecl, GlobalKind, ImplDecl, Parameter, StructDecl,
    StructMember, TraitDecl, TypeAliasDecl, UnionDecl, UseAnchor, UseDecl, UseGroupItem,
    UseKind, VariantPayload,
};
use crate::context::ErrorTag;
use crate::source_analysis::{Span, TokenKind};

use super::{ParseError, ParseResult, Parser};

impl Parser<'_, '_> {
    /// Parses one declaration, including its optional `pub` prefix.
    pub(super) fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        let start = self.current_span();
        let is_public = self.eat(TokenKind::Pub);
        self.parse_declaration_body(is_public, start)
    }

    /// Parses a declaration whose `pub` (if any) has already been consumed.
    fn parse_declaration_body(
        &mut self,
        is_public: bool,
        start: Span,
    ) -> ParseResult<Declaration> {
        match self.peek_kind() {
            TokenKind::Fn => self.parse_function(is_public, start),
            TokenKind::Struct => self.parse_struct(is_public, start),
            TokenKind::Enum => self.parse_enum(is_public, start),
            TokenKind::Union => self.parse_union(is_public, start),
            TokenKind::Trait => self.parse_trait(is_public, start),
            TokenKind::Impl => self.parse_impl(start),
            TokenKind::Macro => self.parse_macro_declaration(is_public, start),
            TokenKind::Use => self.parse_use(is_public, start),
            TokenKind::Type => self.parse_type_alias(is_public, start),
            TokenKind::Extern => self.parse_extern(start),
            TokenKind::Const | TokenKind::Static => self.parse_global(is_public, start),
            TokenKind::Illegal => {
                let token = self.peek(0);
                Err(self.report_illegal(token))
            }
            kind => Err(self.error_here(
                ErrorTag::ExpectedDeclaration,
                eco_format!("expected declaration, found '{kind}'"),
            )),
        }
    }

    /// Runs a member-body loop with advance-one recovery. `parse_member`
    /// returns `Ok(true)` to continue, `Ok(false)` when the member was
    /// consumed but produced nothing (e.g. filtered out).
    fn parse_body_members(
        &mut self,
        mut parse_member: impl FnMut(&mut Self) -> ParseResult<()>,
    ) -> ParseResult<Span> {
        self.expect(TokenKind::LBrace)?;
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.consumed_tokens();
            match parse_member(self) {
                Ok(()) => self.exit_panic(),
                Err(ParseError) => {
                    if self.consumed_tokens() == before {
                        self.advance();
                    }
                }
            }
        }
        Ok(self.expect(TokenKind::RBrace)?.span())
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parses `fn name<G>(params) R? { body }` (or `;` for signatures).
    fn parse_function(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // fn
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let (parameters, is_variadic) = self.parse_parameter_list()?;

        let return_type = if Self::token_begins_type(self.peek_kind()) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else if self.eat(TokenKind::Semicolon) {
            None
        } else {
            let found = self.peek_kind();
            return Err(self.error_here(
                ErrorTag::ExpectedToken,
                eco_format!("expected '{{' or ';', found '{}'", found),
            ));
        };

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Function(FunctionDecl {
                is_public,
                name,
                generics,
                parameters,
                is_variadic,
                return_type,
                body,
            }),
        ))
    }

    /// Parses `(params)`, handling receiver shorthands, binding casts,
    /// defaults, and a trailing `...`.
    fn parse_parameter_list(&mut self) -> ParseResult<(Vec<Parameter>, bool)> {
        self.expect(TokenKind::LParen)?;

        let mut parameters = Vec::new();
        let mut is_variadic = false;

        if let Some(receiver) = self.parse_receiver_parameter() {
            parameters.push(receiver);
            if !self.eat(TokenKind::Comma) && !self.check(TokenKind::RParen) {
                self.expect(TokenKind::RParen)?;
            }
        }

        while !self.check(TokenKind::RParen) && !self.at_end() {
            if self.eat(TokenKind::Ellipsis) {
                // `...` must close the list (extern variadics).
                is_variadic = true;
                break;
            }

            let name_token = self.expect(TokenKind::Identifier)?;
            let param_name = self.intern_token(name_token);
            self.expect(TokenKind::Colon)?;
            let is_binding_cast = self.eat(TokenKind::As);
            let ty = self.parse_type()?;

            let default = if self.eat(TokenKind::Assign) {
                Some(self.with_struct_init(true, |parser| parser.parse_expression())?)
            } else {
                None
            };

            let end = self.previous_span();
            parameters.push(Parameter {
                name: param_name,
                ty: Some(ty),
                default,
                is_binding_cast,
                span: name_token.span().merge(end),
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok((parameters, is_variadic))
    }

    /// Recognises `self`, `&self`, and `&mut self` as the first parameter,
    /// synthesising a parameter named `self` of type `Self` / `&Self` /
    /// `&mut Self`.
    fn parse_receiver_parameter(&mut self) -> Option<Parameter> {
        let is_bare = self.check(TokenKind::SelfValue);
        let is_ref = self.check(TokenKind::Amp) && self.check_nth(1, TokenKind::SelfValue);
        let is_ref_mut = self.check(TokenKind::Amp)
            && self.check_nth(1, TokenKind::Mut)
            && self.check_nth(2, TokenKind::SelfValue);
        if !is_bare && !is_ref && !is_ref_mut {
            return None;
        }

        let start = self.current_span();
        let mutable = is_ref_mut;
        if !is_bare {
            self.advance(); // &
            if mutable {
                self.advance(); // mut
            }
        }
        let self_token = self.advance(); // self
        let span = start.merge(self_token.span());

        let name = self.ctx.interner.intern("self");
        let self_type_name = self.ctx.interner.intern("Self");
        let self_type = self.make_expr(span, ExpressionKind::Identifier(self_type_name));
        let ty = if is_bare {
            self_type
        } else {
            self.make_expr(
                span,
                ExpressionKind::Reference {
                    mutable,
                    operand: Box::new(self_type),
                },
            )
        };

        Some(Parameter {
            name,
            ty: Some(ty),
            default: None,
            is_binding_cast: false,
            span,
        })
    }

    // ========================================================================
    // Structs, Enums, Unions
    // ========================================================================

    /// Parses `struct Name<G>: Base? { fields-and-nested-declarations }`.
    fn parse_struct(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // struct
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let base = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut members = Vec::new();
        self.parse_body_members(|parser| {
            let member_start = parser.current_span();
            let member_public = parser.eat(TokenKind::Pub);

            // A member starting with an identifier is a field; a member
            // starting with a declaration keyword is a nested declaration.
            if parser.check(TokenKind::Identifier) {
                let field = parser.parse_field(member_public)?;
                members.push(StructMember::Field(field));
                return Ok(());
            }
            if parser.peek_kind().starts_declaration() {
                let declaration = parser.parse_declaration_body(member_public, member_start)?;
                members.push(StructMember::Declaration(declaration));
                return Ok(());
            }
            let found = parser.peek_kind();
            Err(parser.error_here(
                ErrorTag::UnexpectedToken,
                eco_format!("expected field or declaration, found '{found}'"),
            ))
        })?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Struct(StructDecl {
                is_public,
                name,
                generics,
                base,
                members,
            }),
        ))
    }

    /// Parses one field `name: Type [= default]` with an optional `,` or
    /// `;` separator.
    fn parse_field(&mut self, is_public: bool) -> ParseResult<FieldDecl> {
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;

        let default = if self.eat(TokenKind::Assign) {
            Some(self.with_struct_init(true, |parser| parser.parse_expression())?)
        } else {
            None
        };

        let span = name_token.span().merge(self.previous_span());
        if !self.eat(TokenKind::Comma) {
            self.eat(TokenKind::Semicolon);
        }

        Ok(FieldDecl {
            is_public,
            name,
            ty,
            default,
            span,
        })
    }

    /// Parses `enum Name<G>: Underlying? { variants }`.
    fn parse_enum(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // enum
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let underlying = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut variants = Vec::new();
        self.parse_body_members(|parser| {
            let variant = parser.parse_enum_variant()?;
            variants.push(variant);
            Ok(())
        })?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Enum(EnumDecl {
                is_public,
                name,
                generics,
                underlying,
                variants,
            }),
        ))
    }

    /// Parses one enum variant: bare, `= tag`, `(types)`, or `{ fields }`.
    fn parse_enum_variant(&mut self) -> ParseResult<EnumVariantDecl> {
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let payload = if self.eat(TokenKind::Assign) {
            let tag = self.with_struct_init(true, |parser| parser.parse_expression())?;
            VariantPayload::Tag(tag)
        } else if self.eat(TokenKind::LParen) {
            let mut types = Vec::new();
            while !self.check(TokenKind::RParen) && !self.at_end() {
                types.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            VariantPayload::Tuple(types)
        } else if self.check(TokenKind::LBrace) {
            self.advance();
            let mut fields = Vec::new();
            while !self.check(TokenKind::RBrace) && !self.at_end() {
                let field_public = self.eat(TokenKind::Pub);
                fields.push(self.parse_field(field_public)?);
            }
            self.expect(TokenKind::RBrace)?;
            VariantPayload::Struct(fields)
        } else {
            VariantPayload::Unit
        };

        let span = name_token.span().merge(self.previous_span());
        self.eat(TokenKind::Comma);
        Ok(EnumVariantDecl {
            name,
            payload,
            span,
        })
    }

    /// Parses `union Name<G> { fields }`.
    fn parse_union(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // union
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let mut fields = Vec::new();
        self.parse_body_members(|parser| {
            let field_public = parser.eat(TokenKind::Pub);
            let field = parser.parse_field(field_public)?;
            fields.push(field);
            Ok(())
        })?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Union(UnionDecl {
                is_public,
                name,
                generics,
                fields,
            }),
        ))
    }

    // ========================================================================
    // Traits & Impls
    // ========================================================================

    /// Parses `trait Name<G>: A + B + C { members }`.
    fn parse_trait(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // trait
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let mut supertraits = Vec::new();
        if self.eat(TokenKind::Colon) {
            supertraits.push(self.parse_type()?);
            while self.eat(TokenKind::Plus) {
                supertraits.push(self.parse_type()?);
            }
        }

        let mut members = Vec::new();
        self.parse_body_members(|parser| {
            let member = parser.parse_declaration()?;
            members.push(member);
            Ok(())
        })?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Trait(TraitDecl {
                is_public,
                name,
                generics,
                supertraits,
                members,
            }),
        ))
    }

    /// Parses `impl<G> Target { members }`.
    ///
    /// Nested `impl` blocks are rejected: an `impl` keyword inside another
    /// impl body reports [`ErrorTag::NestedImpl`] and aborts that member, so
    /// no `Impl` node ever appears inside another.
    fn parse_impl(&mut self, start: Span) -> ParseResult<Declaration> {
        if self.in_impl() {
            let span = self.current_span();
            return Err(self.error_at(
                span,
                ErrorTag::NestedImpl,
                "impl blocks cannot be nested inside another impl",
            ));
        }

        self.advance(); // impl

        // Generic parameters precede the target type: `impl<T> List<T>`.
        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let target = self.parse_type()?;

        let mut members = Vec::new();
        self.set_in_impl(true);
        let body = self.parse_body_members(|parser| {
            let member = parser.parse_declaration()?;
            members.push(member);
            Ok(())
        });
        self.set_in_impl(false);
        body?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Impl(ImplDecl {
                generics,
                target,
                members,
            }),
        ))
    }

    // ========================================================================
    // Use, Extern, Type Alias, Globals
    // ========================================================================

    /// Parses `use [./..]path[.{a, b} | .* | as alias];`.
    fn parse_use(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // use

        let anchor = if self.eat(TokenKind::Dot) {
            UseAnchor::Current
        } else if self.eat(TokenKind::DotDot) {
            UseAnchor::Parent
        } else {
            UseAnchor::Root
        };

        let mut path = Vec::new();
        let first = self.expect(TokenKind::Identifier)?;
        path.push(self.intern_token(first));

        let mut kind = None;
        loop {
            // `p.*` lexes as a single `.*` token (maximal munch), so the
            // glob form is checked before the plain `.` separator.
            if self.eat(TokenKind::DotStar) {
                kind = Some(UseKind::Glob);
                break;
            }
            if !self.eat(TokenKind::Dot) {
                break;
            }
            if self.check(TokenKind::Identifier) {
                let segment = self.advance();
                path.push(self.intern_token(segment));
            } else if self.check(TokenKind::LBrace) {
                kind = Some(UseKind::Group(self.parse_use_group()?));
                break;
            } else {
                let found = self.peek_kind();
                return Err(self.error_here(
                    ErrorTag::ExpectedIdentifier,
                    eco_format!("expected path segment, found '{found}'"),
                ));
            }
        }

        let kind = match kind {
            Some(kind) => kind,
            None => {
                let alias = if self.eat(TokenKind::As) {
                    let alias = self.expect(TokenKind::Identifier)?;
                    Some(self.intern_token(alias))
                } else {
                    None
                };
                UseKind::Plain { alias }
            }
        };

        self.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Use(UseDecl {
                is_public,
                anchor,
                path,
                kind,
            }),
        ))
    }

    /// Parses a use group `{a, b as c}`. The group as a whole takes no
    /// alias.
    fn parse_use_group(&mut self) -> ParseResult<Vec<UseGroupItem>> {
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let name_token = self.expect(TokenKind::Identifier)?;
            let name = self.intern_token(name_token);
            let alias = if self.eat(TokenKind::As) {
                let alias = self.expect(TokenKind::Identifier)?;
                Some(self.intern_token(alias))
            } else {
                None
            };
            let span = name_token.span().merge(self.previous_span());
            items.push(UseGroupItem { name, alias, span });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(items)
    }

    /// Parses `extern { members }`. Only function signatures and globals are
    /// admitted; anything else reports [`ErrorTag::InvalidExternMember`] and
    /// is dropped.
    fn parse_extern(&mut self, start: Span) -> ParseResult<Declaration> {
        self.advance(); // extern

        let mut members = Vec::new();
        self.parse_body_members(|parser| {
            let member = parser.parse_declaration()?;
            match member.kind {
                DeclarationKind::Function(_) | DeclarationKind::Global(_) => {
                    members.push(member);
                }
                _ => {
                    parser.report_and_continue(
                        member.span,
                        ErrorTag::InvalidExternMember,
                        "only functions and globals may appear in an extern block",
                    );
                }
            }
            Ok(())
        })?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(span, DeclarationKind::Extern(ExternBlock { members })))
    }

    /// Parses `type Name<G> = T;`.
    fn parse_type_alias(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        self.advance(); // type
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let generics = if self.check(TokenKind::Less) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Assign)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::TypeAlias(TypeAliasDecl {
                is_public,
                name,
                generics,
                ty,
            }),
        ))
    }

    /// Parses `const` / `static` / `static mut` globals.
    fn parse_global(&mut self, is_public: bool, start: Span) -> ParseResult<Declaration> {
        let mutability = if self.eat(TokenKind::Const) {
            GlobalKind::Const
        } else {
            self.advance(); // static
            if self.eat(TokenKind::Mut) {
                GlobalKind::StaticMut
            } else {
                GlobalKind::Static
            }
        };

        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let value = if self.eat(TokenKind::Assign) {
            Some(self.with_struct_init(true, |parser| parser.parse_expression())?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Global(GlobalDecl {
                is_public,
                mutability,
                name,
                ty,
                value,
            }),
        ))
    }
}
