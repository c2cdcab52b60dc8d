// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Loom source code.
//!
//! This module contains the lexer, token stream, and parser.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s. Each
//! token carries its exact source location via [`Span`]; token text is
//! recovered by slicing the source with that span. Whitespace and comments
//! (including arbitrarily nested `/* … */`) are skipped between tokens and
//! produce no tokens.
//!
//! ```
//! use loom_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("x + 1").collect();
//! assert_eq!(tokens.len(), 3); // x, +, 1
//! ```
//!
//! # Parsing
//!
//! The [`parse`] function converts source text into a
//! [`Module`](crate::ast::Module) AST, reporting diagnostics into the shared
//! [`Context`](crate::context::Context). Expression precedence uses Pratt
//! parsing; statements and declarations are recursive descent. The parser
//! buffers at most [`MAX_LOOKAHEAD`] tokens through [`TokenStream`].
//!
//! # Error Handling
//!
//! The lexer never fails: unscannable input becomes [`TokenKind::Illegal`]
//! and scanning resumes at the next byte. The parser reports panic-mode
//! gated diagnostics and recovers at statement and declaration boundaries,
//! so one malformed construct costs one diagnostic and the rest of the file
//! still parses.

mod lexer;
mod parser;
mod span;
mod token;
mod token_stream;


pub use lexer::{Lexer, lex, lex_with_eof};
pub use parser::{ParseError, ParseResult, parse, parse_file};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use token_stream::{MAX_LOOKAHEAD, TokenStream};
