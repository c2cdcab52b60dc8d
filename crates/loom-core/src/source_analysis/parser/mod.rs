// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Loom source code.
//!
//! The parser turns the token stream into a typed AST. It is built for
//! error recovery: it always produces a [`Module`], reports as many
//! independent diagnostics as it can, and never panics on malformed input.
//!
//! # Design
//!
//! - **Pratt expression core** - a single `parse_expression_prec(min)` drives
//!   all expression parsing over the [`Precedence`] ladder; statements and
//!   declarations are plain recursive descent on top of it
//! - **Sentinel errors** - every failed `expect()` reports at most one
//!   diagnostic (panic-mode gated), then propagates [`ParseError`] up the
//!   call stack; the nearest recovery frame catches it, synchronises, and
//!   continues with the next unit
//! - **Bounded lookahead** - at most 4 tokens
//!   ([`MAX_LOOKAHEAD`](super::token_stream::MAX_LOOKAHEAD)), enough for
//!   `pub fn name<`, the struct-init shape heuristic, and `$name:spec`
//!
//! # Precedence Ladder
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | Assignment | `=` `+=` … | Right |
//! | Range | `..` `..=` | Left |
//! | LogicalOr | `or` | Left |
//! | LogicalAnd | `and` | Left |
//! | Equality | `==` `!=` | Left |
//! | Comparison | `<` `<=` `>` `>=` | Left |
//! | Bitwise | `&` `\|` `^` | Left |
//! | Shift | `<<` `>>` | Left |
//! | Term | `+` `-` | Left |
//! | Factor | `*` `/` `%` | Left |
//! | Cast | `as` | Left |
//! | Prefix | `-` `!` `~` `#` `?` `&` `*` | - |
//! | Call | `.` `.<` `(` `[` `.?` `.*` `!` `{` | Left |
//!
//! # Usage
//!
//! ```
//! use loom_core::context::Context;
//! use loom_core::source_analysis::parse;
//!
//! let mut ctx = Context::new();
//! let module = parse("fn main() { }", &mut ctx);
//! assert!(ctx.diagnostics().is_empty());
//! assert_eq!(module.declarations.len(), 1);
//! ```

mod declarations;
mod expressions;
mod macros;
mod patterns;
mod statements;
mod types;

#[cfg(test)]
mod property_tests;

use ecow::eco_format;

use crate::ast::{Declaration, Expression, ExpressionKind, Module, NodeId, Pattern, PatternKind,
    Statement, StatementKind};
use crate::context::{Context, ErrorTag};
use crate::intern::Symbol;
use crate::source::{FileId, SourceManager};
use crate::source_analysis::{Lexer, Span, Token, TokenKind, TokenStream};

/// The sentinel carried through the parser's call stack after a diagnostic
/// has been reported. Carries no payload; the report already lives in the
/// [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

/// Result type for all parser productions.
pub type ParseResult<T> = Result<T, ParseError>;

/// Expression nesting ceiling. Deeply nested input fails with a diagnostic
/// instead of exhausting the stack.
const MAX_NESTING_DEPTH: u32 = 128;

/// Parses a source string into a [`Module`].
///
/// Always returns a module, possibly partial; diagnostics accumulate in the
/// context. An empty module is legal.
pub fn parse(source: &str, ctx: &mut Context) -> Module {
    Parser::new(source, ctx).parse_module()
}

/// Parses a file previously loaded into the [`SourceManager`].
pub fn parse_file(manager: &SourceManager, file: FileId, ctx: &mut Context) -> Module {
    parse(manager[file].src(), ctx)
}

/// Operator precedence levels, lowest binds loosest.
///
/// Encoded as plain discriminants so the Pratt loop compares levels with
/// `>`. All binary operators are left-associative except assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    /// Entry level; binds nothing.
    Lowest,
    /// `=` and compound assignments (right-associative).
    Assignment,
    /// `..` / `..=`.
    Range,
    /// `or`.
    LogicalOr,
    /// `and`.
    LogicalAnd,
    /// `==` / `!=`.
    Equality,
    /// `<` `<=` `>` `>=`.
    Comparison,
    /// `&` `|` `^`.
    Bitwise,
    /// `<<` `>>`.
    Shift,
    /// `+` `-`.
    Term,
    /// `*` `/` `%`.
    Factor,
    /// `as`.
    Cast,
    /// Prefix operators.
    Prefix,
    /// Postfix forms: call, index, member, propagate, deref, macro, init.
    Call,
}

/// Maps an infix/postfix operator token to its precedence level.
///
/// Returns `None` for tokens that cannot continue an expression, which ends
/// the Pratt loop - useful for error recovery, since junk simply terminates
/// the current expression.
pub(super) fn infix_precedence(kind: TokenKind) -> Option<Precedence> {
    use TokenKind::*;
    let precedence = match kind {
        Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign | PercentAssign
        | AmpAssign | PipeAssign | CaretAssign | ShlAssign | ShrAssign => Precedence::Assignment,
        DotDot | DotDotEq => Precedence::Range,
        Or => Precedence::LogicalOr,
        And => Precedence::LogicalAnd,
        Equal | NotEqual => Precedence::Equality,
        Less | LessEqual | Greater | GreaterEqual => Precedence::Comparison,
        Amp | Pipe | Caret => Precedence::Bitwise,
        Shl | Shr => Precedence::Shift,
        Plus | Minus => Precedence::Term,
        Star | Slash | Percent => Precedence::Factor,
        As => Precedence::Cast,
        Dot | DotLess | DotQuestion | DotStar | LParen | LBracket | Bang | LBrace => {
            Precedence::Call
        }
        _ => return None,
    };
    Some(precedence)
}

/// The parser state.
///
/// One parser per compilation unit; the [`Context`] is shared by mutable
/// reference with everything else that reports diagnostics or interns
/// strings.
pub(super) struct Parser<'src, 'ctx> {
    /// The source text (token text is recovered from it via spans).
    source: &'src str,
    /// The buffered token stream.
    stream: TokenStream<'src>,
    /// Shared interner + diagnostics.
    ctx: &'ctx mut Context,
    /// Fresh node ids.
    node_id_counter: u32,
    /// Number of tokens consumed, used by recovery frames to guarantee
    /// progress.
    consumed: usize,
    /// Whether `Ident { … }` may be struct initialisation here. Cleared in
    /// `if` conditions, `match` scrutinees, and `for` headers.
    struct_init_allowed: bool,
    /// Whether we are inside an `impl` body (nested `impl` is rejected).
    in_impl: bool,
    /// Current expression/type nesting depth.
    nesting_depth: u32,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    /// Creates a parser over a source string.
    pub(super) fn new(source: &'src str, ctx: &'ctx mut Context) -> Self {
        Self {
            source,
            stream: TokenStream::new(Lexer::new(source)),
            ctx,
            node_id_counter: 0,
            consumed: 0,
            struct_init_allowed: true,
            in_impl: false,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the token `n` positions ahead without consuming.
    pub(super) fn peek(&mut self, n: usize) -> Token {
        self.stream.peek(n)
    }

    /// Returns the current token's kind.
    pub(super) fn peek_kind(&mut self) -> TokenKind {
        self.stream.peek(0).kind()
    }

    /// Checks the current token against a kind.
    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Checks the token `n` ahead against a kind.
    pub(super) fn check_nth(&mut self, n: usize, kind: TokenKind) -> bool {
        self.stream.peek(n).kind() == kind
    }

    /// Returns true once the stream has reached `Eof`.
    pub(super) fn at_end(&mut self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consumes and returns the current token.
    pub(super) fn advance(&mut self) -> Token {
        self.consumed += 1;
        self.stream.advance()
    }

    /// Consumes the current token if it matches.
    pub(super) fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consumes the current token if it matches, discarding it.
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        self.consume(kind).is_some()
    }

    /// Returns the span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        self.stream.last_span()
    }

    /// Returns the current token's span.
    pub(super) fn current_span(&mut self) -> Span {
        self.peek(0).span()
    }

    /// Extracts a token's text from the source.
    pub(super) fn text(&self, token: Token) -> &'src str {
        token.span().slice(self.source)
    }

    /// Interns a token's text.
    pub(super) fn intern_token(&mut self, token: Token) -> Symbol {
        let text = token.span().slice(self.source);
        self.ctx.interner.intern(text)
    }

    /// Pushes a token back onto the stream (used to split `>>`).
    pub(super) fn push_back_token(&mut self, token: Token) {
        self.stream.push_front(token);
    }

    // ========================================================================
    // Node Construction
    // ========================================================================

    /// Allocates a fresh node id.
    pub(super) fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.node_id_counter);
        self.node_id_counter += 1;
        id
    }

    /// Creates an expression node.
    pub(super) fn make_expr(&mut self, span: Span, kind: ExpressionKind) -> Expression {
        let id = self.next_id();
        Expression::new(id, span, kind)
    }

    /// Creates a pattern node.
    pub(super) fn make_pattern(&mut self, span: Span, kind: PatternKind) -> Pattern {
        let id = self.next_id();
        Pattern::new(id, span, kind)
    }

    /// Creates a statement node.
    pub(super) fn make_stmt(&mut self, span: Span, kind: StatementKind) -> Statement {
        let id = self.next_id();
        Statement::new(id, span, kind)
    }

    /// Creates a declaration node.
    pub(super) fn make_decl(
        &mut self,
        span: Span,
        kind: crate::ast::DeclarationKind,
    ) -> Declaration {
        let id = self.next_id();
        Declaration::new(id, span, kind)
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Expects a specific token kind, consuming it.
    ///
    /// On mismatch, reports one diagnostic (panic-mode gated) and returns
    /// the sentinel.
    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if let Some(token) = self.consume(kind) {
            return Ok(token);
        }
        let found = self.peek(0);
        let tag = match kind {
            TokenKind::Semicolon => ErrorTag::ExpectedSemicolon,
            TokenKind::Identifier => ErrorTag::ExpectedIdentifier,
            _ => ErrorTag::ExpectedToken,
        };
        self.ctx.error(
            found.span(),
            tag,
            eco_format!("expected '{}', found '{}'", kind, found.kind()),
        );
        Err(ParseError)
    }

    /// Reports an error at the given span and returns the sentinel.
    pub(super) fn error_at(
        &mut self,
        span: Span,
        tag: ErrorTag,
        message: impl Into<ecow::EcoString>,
    ) -> ParseError {
        self.ctx.error(span, tag, message);
        ParseError
    }

    /// Reports an error at the current token and returns the sentinel.
    pub(super) fn error_here(
        &mut self,
        tag: ErrorTag,
        message: impl Into<ecow::EcoString>,
    ) -> ParseError {
        let span = self.current_span();
        self.error_at(span, tag, message)
    }

    /// Reports a non-fatal error without entering a recovery path.
    ///
    /// Used for terminal per-literal problems (overflow, bad escape) where
    /// parsing continues normally; panic mode is cleared immediately so the
    /// report cannot suppress a later, unrelated error.
    pub(super) fn report_and_continue(
        &mut self,
        span: Span,
        tag: ErrorTag,
        message: impl Into<ecow::EcoString>,
    ) {
        self.ctx.error(span, tag, message);
        self.ctx.exit_panic_mode();
    }

    /// Reports an `Illegal` token with a tag derived from its shape, then
    /// consumes it.
    pub(super) fn report_illegal(&mut self, token: Token) -> ParseError {
        let text = self.text(token);
        let tag = match text.as_bytes().first() {
            Some(b'"') => ErrorTag::UnterminatedString,
            Some(b'\'') => ErrorTag::MalformedChar,
            Some(b'0') => ErrorTag::UnrecognizedToken, // bare base prefix like `0x`
            _ => ErrorTag::UnrecognizedToken,
        };
        let message = match tag {
            ErrorTag::UnterminatedString => eco_format!("unterminated string literal"),
            ErrorTag::MalformedChar => eco_format!("malformed character literal"),
            _ => eco_format!("unrecognized token `{text}`"),
        };
        self.advance();
        self.error_at(token.span(), tag, message)
    }

    /// Discards tokens until a plausible statement boundary, then leaves
    /// panic mode.
    ///
    /// Boundaries: a `;` just consumed, or the next token opens a statement
    /// or declaration, or a `}` / `Eof` that the enclosing frame must see.
    pub(super) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.check(TokenKind::Semicolon) {
                self.advance();
                break;
            }
            let kind = self.peek_kind();
            if kind.starts_statement()
                || kind.starts_declaration()
                || kind == TokenKind::RBrace
            {
                break;
            }
            self.advance();
        }
        self.ctx.exit_panic_mode();
    }

    /// Runs `f` with the struct-init mode flag set to `allowed`, restoring
    /// the previous mode afterwards.
    pub(super) fn with_struct_init<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = std::mem::replace(&mut self.struct_init_allowed, allowed);
        let result = f(self);
        self.struct_init_allowed = previous;
        result
    }

    /// Returns whether struct initialisation is currently permitted.
    pub(super) fn struct_init_allowed(&self) -> bool {
        self.struct_init_allowed
    }

    /// Returns the number of tokens consumed so far (recovery progress
    /// tracking).
    pub(super) fn consumed_tokens(&self) -> usize {
        self.consumed
    }

    /// Clears panic mode (a recovery frame finished its unit).
    pub(super) fn exit_panic(&mut self) {
        self.ctx.exit_panic_mode();
    }

    /// Returns whether parsing is inside an `impl` body.
    pub(super) fn in_impl(&self) -> bool {
        self.in_impl
    }

    /// Marks entry to / exit from an `impl` body.
    pub(super) fn set_in_impl(&mut self, in_impl: bool) {
        self.in_impl = in_impl;
    }

    /// Guards one level of expression/type recursion.
    pub(super) fn enter_nesting(&mut self) -> ParseResult<()> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            self.nesting_depth -= 1;
            let span = self.current_span();
            return Err(self.error_at(
                span,
                ErrorTag::NestingTooDeep,
                "expression nesting is too deep",
            ));
        }
        Ok(())
    }

    /// Leaves one nesting level.
    pub(super) fn leave_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    // ========================================================================
    // Module Parsing
    // ========================================================================

    /// Parses a complete module: top-level declarations until `Eof`.
    pub(super) fn parse_module(&mut self) -> Module {
        let start = self.current_span();
        let mut declarations = Vec::new();

        while !self.at_end() {
            let before = self.consumed;
            match self.parse_declaration() {
                Ok(declaration) => declarations.push(declaration),
                Err(ParseError) => {
                    self.synchronize();
                    // Guarantee progress when the offending token is itself
                    // a statement opener the synchronizer stops at.
                    if self.consumed == before && !self.at_end() {
                        self.advance();
                    }
                }
            }
        }

        // A comment that never closed is only detectable once the lexer has
        // reached the end of input.
        if let Some(span) = self.stream.unterminated_comment() {
            self.ctx.exit_panic_mode();
            self.ctx.error(
                span,
                ErrorTag::UnterminatedComment,
                "unterminated block comment",
            );
        }

        let span = if declarations.is_empty() {
            Span::empty(start.start())
        } else {
            start.merge(self.previous_span())
        };
        Module { declarations, span }
    }

    // ========================================================================
    // Shared Lookahead Helpers
    // ========================================================================

    /// Returns whether a token can begin an expression (prefix position).
    pub(super) fn token_begins_expression(kind: TokenKind) -> bool {
        use TokenKind::*;
        kind.is_literal()
            || matches!(
                kind,
                Identifier
                    | SelfValue
                    | SelfType
                    | LParen
                    | LBracket
                    | LBrace
                    | Minus
                    | Bang
                    | Tilde
                    | Hash
                    | Question
                    | Amp
                    | Star
                    | If
                    | Match
                    | Fn
                    | DotDot
                    | DotDotEq
            )
    }

    /// Returns whether a token can begin a type expression.
    pub(super) fn token_begins_type(kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            Identifier | SelfType | Amp | Star | LBracket | Question | Fn | Bang | LParen
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeclarationKind;
    use crate::context::Severity;

    /// Parses source expecting no diagnostics.
    fn parse_ok(source: &str) -> Module {
        let mut ctx = Context::new();
        let module = parse(source, &mut ctx);
        assert!(
            ctx.diagnostics().is_empty(),
            "expected no errors, got: {:?}",
            ctx.diagnostics()
        );
        module
    }

    /// Parses source expecting at least one error.
    fn parse_err(source: &str) -> (Module, Context) {
        let mut ctx = Context::new();
        let module = parse(source, &mut ctx);
        assert!(ctx.has_errors(), "expected errors for {source:?}");
        (module, ctx)
    }

    #[test]
    fn empty_module_is_legal() {
        let module = parse_ok("");
        assert!(module.declarations.is_empty());
        assert!(module.span.is_empty());

        let module = parse_ok("  // just a comment\n/* and another */ ");
        assert!(module.declarations.is_empty());
    }

    #[test]
    fn module_collects_declarations_in_order() {
        let module = parse_ok("fn a() {}\nstruct B {}\nconst C: i32 = 1;");
        assert_eq!(module.declarations.len(), 3);
        assert!(matches!(module.declarations[0].kind, DeclarationKind::Function(_)));
        assert!(matches!(module.declarations[1].kind, DeclarationKind::Struct(_)));
        assert!(matches!(module.declarations[2].kind, DeclarationKind::Global(_)));
    }

    #[test]
    fn module_span_covers_all_declarations() {
        let src = "fn a() {}  fn b() {}";
        let module = parse_ok(src);
        assert_eq!(module.span.start(), 0);
        assert_eq!(module.span.end() as usize, src.len());
    }

    #[test]
    fn stray_token_produces_one_error_then_recovers() {
        let (module, ctx) = parse_err("@ fn ok() {}");
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(module.declarations.len(), 1);
    }

    #[test]
    fn error_recovery_yields_multiple_independent_diagnostics() {
        // Scenario F shape at top level: two bad declarations, one good one.
        let (module, ctx) = parse_err("struct { } \n fn ok() {} \n enum { }");
        assert!(ctx.error_count() >= 2, "got {:?}", ctx.diagnostics());
        assert!(
            module
                .declarations
                .iter()
                .any(|d| matches!(d.kind, DeclarationKind::Function(_)))
        );
    }

    #[test]
    fn unterminated_comment_is_reported_at_eof() {
        let (_, ctx) = parse_err("fn a() {} /* open");
        let diag = ctx
            .diagnostics()
            .iter()
            .find(|d| d.tag == ErrorTag::UnterminatedComment)
            .expect("unterminated comment diagnostic");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.span.start(), 10);
    }

    #[test]
    fn node_ids_are_unique_and_dense() {
        let mut ctx = Context::new();
        let module = parse("fn f(a: i32) i32 { a + 1 }", &mut ctx);

        let mut ids = Vec::new();
        // Walk just the top declaration's expression bodies via Debug - the
        // structural walk lives in semantic analysis; here it is enough to
        // check the root ids are distinct.
        for declaration in &module.declarations {
            ids.push(declaration.id.index());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), module.declarations.len());
    }

    #[test]
    fn deep_nesting_fails_gracefully() {
        let mut source = String::from("const X: i32 = ");
        source.push_str(&"(".repeat(400));
        source.push('1');
        source.push_str(&")".repeat(400));
        source.push(';');

        let mut ctx = Context::new();
        let _ = parse(&source, &mut ctx);
        assert!(ctx.has_errors());
        assert!(
            ctx.diagnostics()
                .iter()
                .any(|d| d.tag == ErrorTag::NestingTooDeep)
        );
    }
}
