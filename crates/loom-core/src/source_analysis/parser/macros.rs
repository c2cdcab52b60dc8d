// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Macro definition and invocation parsing.
//!
//! Macro *bodies* and macro-call *arguments* are captured as raw token
//! trees: the parser tracks balanced `{}`/`()`/`[]` nesting and records the
//! tokens verbatim, without interpreting them. Rule matchers are parsed
//! structurally (literal tokens, `$name:spec` captures, `$(…) sep? op`
//! repetitions, recursively). Expansion - matching a call against a rule
//! and substituting captures into the body - is a later pass.

use ecow::eco_format;

use crate::ast::{
    DeclarationKind, Expression, ExpressionKind, FragmentSpecifier, MacroDecl, MacroDelimiter,
    MacroMatcher, MacroRule, RepetitionOperator,
};
use crate::context::ErrorTag;
use crate::source_analysis::{Span, Token, TokenKind};

use super::{ParseResult, Parser};

/// Returns the closing delimiter for an opening one.
const fn closing_delimiter(open: TokenKind) -> TokenKind {
    match open {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBracket => TokenKind::RBracket,
        _ => TokenKind::RBrace,
    }
}

/// Returns the opening delimiter a closing token matches.
const fn opening_delimiter(close: TokenKind) -> TokenKind {
    match close {
        TokenKind::RParen => TokenKind::LParen,
        TokenKind::RBracket => TokenKind::LBracket,
        _ => TokenKind::LBrace,
    }
}

const fn is_open_delimiter(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
    )
}

const fn is_close_delimiter(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
    )
}

impl Parser<'_, '_> {
    /// Parses `macro name { rules }`.
    pub(super) fn parse_macro_declaration(
        &mut self,
        is_public: bool,
        start: Span,
    ) -> ParseResult<crate::ast::Declaration> {
        self.advance(); // macro
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_token(name_token);

        self.expect(TokenKind::LBrace)?;
        let mut rules = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.consumed_tokens();
            match self.parse_macro_rule() {
                Ok(rule) => {
                    rules.push(rule);
                    self.exit_panic();
                }
                Err(_) => {
                    if self.consumed_tokens() == before {
                        self.advance();
                    }
                }
            }
        }
        self.expect(TokenKind::RBrace)?;

        let span = start.merge(self.previous_span());
        Ok(self.make_decl(
            span,
            DeclarationKind::Macro(MacroDecl {
                is_public,
                name,
                rules,
            }),
        ))
    }

    /// Parses one rule: `(matcher-sequence) => body-token-tree ;?`.
    fn parse_macro_rule(&mut self) -> ParseResult<MacroRule> {
        let start = self.current_span();
        self.expect(TokenKind::LParen)?;
        let matchers = self.parse_matchers_until(TokenKind::RParen)?;

        self.expect(TokenKind::FatArrow)?;

        let open = self.peek(0);
        if !is_open_delimiter(open.kind()) {
            return Err(self.error_here(
                ErrorTag::ExpectedToken,
                eco_format!("expected macro body delimiter, found '{}'", open.kind()),
            ));
        }
        self.advance();
        let body = self.collect_token_tree(open.kind())?;

        // The rule separator is optional before the closing `}`.
        self.eat(TokenKind::Semicolon);

        let span = start.merge(self.previous_span());
        Ok(MacroRule {
            matchers,
            body,
            span,
        })
    }

    /// Parses matchers until `close` at nesting depth zero, consuming the
    /// closer. Recurses for repetition sub-sequences.
    fn parse_matchers_until(&mut self, close: TokenKind) -> ParseResult<Vec<MacroMatcher>> {
        let mut matchers = Vec::new();
        let mut delimiters: Vec<TokenKind> = Vec::new();

        loop {
            let token = self.peek(0);
            let kind = token.kind();

            if kind == TokenKind::Eof {
                return Err(self.error_here(
                    ErrorTag::UnexpectedToken,
                    "unexpected end of file in macro rule",
                ));
            }

            if kind == close && delimiters.is_empty() {
                self.advance();
                return Ok(matchers);
            }

            if kind == TokenKind::Dollar && self.check_nth(1, TokenKind::Identifier) {
                matchers.push(self.parse_capture_matcher()?);
                continue;
            }
            if kind == TokenKind::Dollar && self.check_nth(1, TokenKind::LParen) {
                matchers.push(self.parse_repetition_matcher()?);
                continue;
            }

            if is_open_delimiter(kind) {
                delimiters.push(kind);
            } else if is_close_delimiter(kind) {
                if delimiters.last() == Some(&opening_delimiter(kind)) {
                    delimiters.pop();
                } else {
                    return Err(self.error_here(
                        ErrorTag::MacroDelimiterImbalance,
                        eco_format!("unbalanced '{kind}' in macro matcher"),
                    ));
                }
            }

            matchers.push(MacroMatcher::Token(token));
            self.advance();
        }
    }

    /// Parses a capture `$name:spec`.
    fn parse_capture_matcher(&mut self) -> ParseResult<MacroMatcher> {
        let start = self.advance().span(); // $
        let name_token = self.advance(); // identifier (checked by caller)
        let name = self.intern_token(name_token);
        self.expect(TokenKind::Colon)?;

        // `type` is a keyword token, so the specifier is either an
        // identifier or the `type` keyword itself.
        let spec_token = self.peek(0);
        let spec_text = match spec_token.kind() {
            TokenKind::Identifier => self.text(spec_token),
            TokenKind::Type => "type",
            _ => "",
        };
        let Some(fragment) = FragmentSpecifier::from_name(spec_text) else {
            return Err(self.error_here(
                ErrorTag::UnknownFragmentSpecifier,
                eco_format!(
                    "unknown macro fragment specifier '{}'",
                    self.text(spec_token)
                ),
            ));
        };
        self.advance();

        let span = start.merge(spec_token.span());
        Ok(MacroMatcher::Capture {
            name,
            fragment,
            span,
        })
    }

    /// Parses a repetition `$(sub-matchers) sep? op` where `op` is one of
    /// `*`, `+`, `?` and `sep` is any single token appearing before `op`.
    fn parse_repetition_matcher(&mut self) -> ParseResult<MacroMatcher> {
        let start = self.advance().span(); // $
        self.advance(); // (
        let matchers = self.parse_matchers_until(TokenKind::RParen)?;

        let mut separator = None;
        let operator = match self.repetition_operator() {
            Some(op) => {
                self.advance();
                op
            }
            None => {
                let sep_token = self.peek(0);
                if sep_token.kind() == TokenKind::Eof {
                    return Err(self.error_here(
                        ErrorTag::UnexpectedToken,
                        "unexpected end of file in macro rule",
                    ));
                }
                self.advance();
                separator = Some(sep_token);
                match self.repetition_operator() {
                    Some(op) => {
                        self.advance();
                        op
                    }
                    None => {
                        return Err(self.error_here(
                            ErrorTag::UnexpectedToken,
                            "expected repetition operator '*', '+', or '?'",
                        ));
                    }
                }
            }
        };

        let span = start.merge(self.previous_span());
        Ok(MacroMatcher::Repetition {
            matchers,
            separator,
            operator,
            span,
        })
    }

    fn repetition_operator(&mut self) -> Option<RepetitionOperator> {
        match self.peek_kind() {
            TokenKind::Star => Some(RepetitionOperator::ZeroOrMore),
            TokenKind::Plus => Some(RepetitionOperator::OneOrMore),
            TokenKind::Question => Some(RepetitionOperator::ZeroOrOne),
            _ => None,
        }
    }

    /// Collects a raw token tree after its opening delimiter has been
    /// consumed. Returns the tokens between the delimiters (exclusive),
    /// verifying that `{}`/`()`/`[]` nesting stays balanced.
    pub(super) fn collect_token_tree(&mut self, open: TokenKind) -> ParseResult<Vec<Token>> {
        let mut delimiters = vec![open];
        let mut tokens = Vec::new();

        loop {
            let token = self.peek(0);
            let kind = token.kind();

            if kind == TokenKind::Eof {
                return Err(self.error_here(
                    ErrorTag::UnexpectedToken,
                    "unexpected end of file in macro token tree",
                ));
            }

            if is_open_delimiter(kind) {
                delimiters.push(kind);
            } else if is_close_delimiter(kind) {
                if delimiters.last() == Some(&opening_delimiter(kind)) {
                    delimiters.pop();
                    if delimiters.is_empty() {
                        self.advance(); // the matching closer is not recorded
                        return Ok(tokens);
                    }
                } else {
                    return Err(self.error_here(
                        ErrorTag::MacroDelimiterImbalance,
                        eco_format!("mismatched '{kind}' in macro token tree"),
                    ));
                }
            }

            tokens.push(token);
            self.advance();
        }
    }

    /// Parses a macro invocation `callee! delim … delim`. The `!` is the
    /// current token; the callee has already been parsed.
    pub(super) fn parse_macro_call(&mut self, callee: Expression) -> ParseResult<Expression> {
        if !matches!(
            callee.kind,
            ExpressionKind::Identifier(_) | ExpressionKind::MemberAccess { .. }
        ) {
            let span = callee.span;
            return Err(self.error_at(
                span,
                ErrorTag::UnexpectedToken,
                "macro name must be an identifier or dotted path",
            ));
        }

        self.advance(); // !
        let open = self.advance(); // delimiter (checked by the caller)
        let delimiter = match open.kind() {
            TokenKind::LParen => MacroDelimiter::Paren,
            TokenKind::LBracket => MacroDelimiter::Bracket,
            _ => MacroDelimiter::Brace,
        };
        let arguments = self.collect_token_tree(open.kind())?;

        let span = callee.span.merge(self.previous_span());
        Ok(self.make_expr(
            span,
            ExpressionKind::MacroCall {
                callee: Box::new(callee),
                delimiter,
                arguments,
            },
        ))
    }
}
