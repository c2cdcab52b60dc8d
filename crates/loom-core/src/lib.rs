// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Loom compiler front end.
//!
//! This crate turns UTF-8 source text into a fully-typed, well-structured
//! abstract syntax tree plus a diagnostic list, ready for a semantic
//! analysis and code generation back end:
//!
//! - [`source`] - file identity, line tables, the 1 GiB-capped
//!   [`SourceManager`](source::SourceManager)
//! - [`source_analysis`] - spans, the hand-written lexer, buffered
//!   lookahead, and the Pratt/recursive-descent parser
//! - [`intern`] - the shared string interner
//! - [`context`] - diagnostic accumulation with panic-mode deduplication
//! - [`ast`] - the expression / pattern / statement / declaration node
//!   families
//!
//! Name resolution, type checking, macro expansion, and code generation are
//! out of scope here; macro definitions and call sites are parsed, their
//! expansion is deferred.
//!
//! # Example
//!
//! ```
//! use loom_core::context::Context;
//! use loom_core::source_analysis::parse;
//!
//! let mut ctx = Context::new();
//! let module = parse("fn main() { let answer = 6 * 7; }", &mut ctx);
//!
//! assert!(ctx.diagnostics().is_empty());
//! assert_eq!(module.declarations.len(), 1);
//! ```
//!
//! On malformed input the parser still returns a (partial) module and the
//! context holds ordered diagnostics; drivers decide whether to continue
//! based on [`Context::has_errors`](context::Context::has_errors).

pub mod ast;
pub mod context;
pub mod intern;
pub mod source;
pub mod source_analysis;

/// Re-exports of the types most drivers need.
pub mod prelude {
    pub use crate::ast::{Declaration, DeclarationKind, Expression, ExpressionKind, Module,
        NodeId, Pattern, PatternKind, Statement, StatementKind};
    pub use crate::context::{Context, Diagnostic, ErrorTag, Severity};
    pub use crate::intern::{Interner, Symbol};
    pub use crate::source::{FileId, SourceFile, SourceManager};
    pub use crate::source_analysis::{Span, parse, parse_file};
}
