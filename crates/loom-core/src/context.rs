// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic accumulation and the shared compilation context.
//!
//! Every component that produces user-visible diagnostics writes into the
//! [`Context`]; every component that mentions identifier text routes through
//! its shared [`Interner`]. The context is passed by mutable reference - a
//! single owner per compilation, no cross-thread sharing.
//!
//! # Panic Mode
//!
//! After an error is reported the context enters *panic mode*: further error
//! emissions are suppressed until the parser synchronises at a statement
//! boundary and calls [`Context::exit_panic_mode`]. This produces at most
//! one reported error per synchronisation boundary and keeps cascades out of
//! the diagnostic list. Warnings and notes are never suppressed.

use ecow::EcoString;

use crate::intern::{Interner, Symbol};
use crate::source::SourceFile;
use crate::source_analysis::Span;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An error that prevents later compilation stages from running.
    Error,
    /// A warning that should be addressed.
    Warning,
    /// Additional context attached to a preceding diagnostic.
    Note,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
            Self::Note => f.write_str("note"),
        }
    }
}

/// The finite set of diagnostic categories the front end can produce.
///
/// Messages are fixed phrases derived from these tags (plus token details);
/// the exact wording is stable within a version but not contractual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    /// A token that cannot appear in the current position.
    UnexpectedToken,
    /// `expect()` failed for a specific token kind.
    ExpectedToken,
    /// An identifier was required.
    ExpectedIdentifier,
    /// An expression was required.
    ExpectedExpression,
    /// A type expression was required.
    ExpectedType,
    /// A pattern was required.
    ExpectedPattern,
    /// A statement was required.
    ExpectedStatement,
    /// A declaration was required.
    ExpectedDeclaration,
    /// A `;` terminator was required.
    ExpectedSemicolon,
    /// A string literal ran to end of input.
    UnterminatedString,
    /// A character literal is malformed or unclosed.
    MalformedChar,
    /// A block comment ran to end of input with unbalanced nesting.
    UnterminatedComment,
    /// An escape sequence is not recognised or out of range.
    InvalidEscape,
    /// A byte sequence no token rule matches.
    UnrecognizedToken,
    /// An `impl` block nested inside another `impl`.
    NestedImpl,
    /// A declaration kind that `extern` blocks do not admit.
    InvalidExternMember,
    /// A `$name:spec` capture with an unknown fragment specifier.
    UnknownFragmentSpecifier,
    /// Macro arguments whose bracket nesting never closes.
    MacroDelimiterImbalance,
    /// An integer literal that does not fit the literal domain.
    IntegerOverflow,
    /// Expression or type nesting beyond the parser's depth ceiling.
    NestingTooDeep,
}

impl ErrorTag {
    /// Returns the fixed phrase this tag's messages are built from.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::UnexpectedToken => "unexpected token",
            Self::ExpectedToken => "expected token",
            Self::ExpectedIdentifier => "expected identifier",
            Self::ExpectedExpression => "expected expression",
            Self::ExpectedType => "expected type",
            Self::ExpectedPattern => "expected pattern",
            Self::ExpectedStatement => "expected statement",
            Self::ExpectedDeclaration => "expected declaration",
            Self::ExpectedSemicolon => "expected ';'",
            Self::UnterminatedString => "unterminated string literal",
            Self::MalformedChar => "malformed character literal",
            Self::UnterminatedComment => "unterminated block comment",
            Self::InvalidEscape => "invalid escape sequence",
            Self::UnrecognizedToken => "unrecognized token",
            Self::NestedImpl => "impl blocks cannot be nested",
            Self::InvalidExternMember => "declaration not allowed in extern block",
            Self::UnknownFragmentSpecifier => "unknown macro fragment specifier",
            Self::MacroDelimiterImbalance => "unbalanced macro delimiter",
            Self::IntegerOverflow => "integer literal is too large",
            Self::NestingTooDeep => "expression nesting is too deep",
        }
    }
}

/// A diagnostic record: severity, source location, category, and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The source location the diagnostic points at.
    pub span: Span,
    /// The category the message was derived from.
    pub tag: ErrorTag,
    /// The rendered message.
    pub message: EcoString,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    #[must_use]
    pub fn error(span: Span, tag: ErrorTag, message: impl Into<EcoString>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            tag,
            message: message.into(),
        }
    }

    /// Creates a new warning diagnostic.
    #[must_use]
    pub fn warning(span: Span, tag: ErrorTag, message: impl Into<EcoString>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            tag,
            message: message.into(),
        }
    }

    /// Renders this diagnostic in the driver format
    /// `<path>:<line>:<column>: <severity>: <message>`.
    ///
    /// Line and column are 1-based. Snippets and colour are driver concerns.
    #[must_use]
    pub fn render(&self, file: &SourceFile) -> String {
        let (line, column) = file.line_col(self.span.start());
        format!(
            "{}:{line}:{column}: {}: {}",
            file.path(),
            self.severity,
            self.message
        )
    }
}

/// Shared state for one compilation: the interner plus accumulated
/// diagnostics with panic-mode gating.
#[derive(Debug, Default)]
pub struct Context {
    /// The shared string interner. Interned strings outlive the AST.
    pub interner: Interner,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    panic_mode: bool,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string through the shared interner.
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.interner.intern(text)
    }

    /// Resolves a symbol through the shared interner.
    #[must_use]
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol)
    }

    /// Reports an error and enters panic mode.
    ///
    /// While panic mode is active the report is suppressed; the parser
    /// clears the mode after it has synchronised to a statement boundary.
    pub fn error(&mut self, span: Span, tag: ErrorTag, message: impl Into<EcoString>) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.error_count += 1;
        self.diagnostics.push(Diagnostic::error(span, tag, message));
    }

    /// Reports a warning. Never suppressed.
    pub fn warning(&mut self, span: Span, tag: ErrorTag, message: impl Into<EcoString>) {
        self.diagnostics
            .push(Diagnostic::warning(span, tag, message));
    }

    /// Attaches a note to the diagnostic list. Never suppressed.
    pub fn note(&mut self, span: Span, tag: ErrorTag, message: impl Into<EcoString>) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Note,
            span,
            tag,
            message: message.into(),
        });
    }

    /// Returns whether panic mode is active.
    #[must_use]
    pub fn in_panic_mode(&self) -> bool {
        self.panic_mode
    }

    /// Leaves panic mode, re-enabling error reports.
    pub fn exit_panic_mode(&mut self) {
        self.panic_mode = false;
    }

    /// Returns the diagnostics accumulated so far, in discovery order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the context's diagnostic list.
    #[must_use]
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Returns the number of reported (non-suppressed) errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Returns true if at least one error has been reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}
