// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the parser.
//!
//! These tests use `proptest` to verify parser invariants over generated
//! inputs:
//!
//! 1. **Parser never panics** — arbitrary string input always returns a
//!    module
//! 2. **Diagnostic spans within input** — every diagnostic has
//!    `end <= input.len()`
//! 3. **Valid corpus is clean** — well-formed fragments parse without
//!    diagnostics
//! 4. **Error messages are user-facing** — no internal type names leak into
//!    diagnostics
//! 5. **`impl` exclusion** — no `Impl` node ever appears inside another
//!    `Impl` node, however mangled the input

use proptest::prelude::*;

use crate::ast::{
    Block, Declaration, DeclarationKind, Expression, ExpressionKind, ForLoop, Module, Statement,
    StatementKind, StructMember,
};
use crate::context::Context;
use crate::source_analysis::parse;

// ============================================================================
// Near-valid Loom generators
// ============================================================================

/// Valid Loom declarations for composing near-valid inputs.
const FRAGMENTS: &[&str] = &[
    "fn main() { }",
    "fn add(a: i32, b: i32) i32 { a + b }",
    "pub fn get<T>(items: []T, index: i32) ?T { items[index] }",
    "struct Point { x: f32, y: f32 }",
    "struct Counter { value: i32 = 0, fn bump(&mut self) { self.value += 1; } }",
    "enum Color: u8 { Red, Green = 2, Custom(u8, u8, u8) }",
    "union Bits { word: u32, bytes: [4]u8 }",
    "trait Drawable: Sized { fn draw(&self); }",
    "impl<T> List<T> { fn len(&self) i32 { self.count } }",
    "use std.io.{reader, writer as w};",
    "type Callback = fn(i32) bool;",
    "const LIMIT: i32 = 256;",
    "static mut TICKS: i64 = 0;",
    "extern { fn write(fd: i32, buf: *u8, len: i64) i64; }",
    "macro twice { ($e:expr) => { $e + $e } }",
    "fn control() { for i in 0..10 { if i > 5 { break; } } }",
    "fn looped() { for let i = 0; i < 8; i += 1 { tick(i); } }",
    "fn matcher(v: ?i32) i32 { match v { .Some(x) => x, .None => 0 } }",
    "fn literals() { let s = \"text\"; let c = '\\n'; let h = 0xFF; }",
    "fn build() { let p = Point { x: 1.0, y: 2.0 }; }",
];

fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(FRAGMENTS).prop_map(str::to_string)
}

/// Generates a truncated fragment (cut at a random char boundary).
fn truncated_fragment() -> impl Strategy<Value = String> {
    valid_fragment().prop_flat_map(|s| {
        let len = s.len();
        (1..len.max(2)).prop_map(move |cut| {
            let mut cut = cut.min(len);
            while cut > 0 && !s.is_char_boundary(cut) {
                cut -= 1;
            }
            s[..cut].to_string()
        })
    })
}

/// Generates input with swapped bracket kinds.
fn mismatched_brackets() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| {
        s.chars()
            .map(|c| match c {
                '{' => '(',
                '}' => ']',
                '(' => '[',
                _ => c,
            })
            .collect()
    })
}

/// Generates input with semicolons removed.
fn missing_semicolons() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| s.replace(';', " "))
}

/// Generates input with duplicated operators.
fn duplicated_operators() -> impl Strategy<Value = String> {
    valid_fragment().prop_map(|s| s.replace('+', "+ +").replace('=', "= ="))
}

/// Generates nested-impl inputs to attack the impl-exclusion invariant.
fn nested_impl_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(&["impl A {", "impl B {", "fn f() {}", "}", "const N: i32 = 1;"][..]),
        1..10,
    )
    .prop_map(|parts| parts.join(" "))
}

fn near_valid_loom() -> impl Strategy<Value = String> {
    prop_oneof![
        valid_fragment(),
        truncated_fragment(),
        mismatched_brackets(),
        missing_semicolons(),
        duplicated_operators(),
        nested_impl_soup(),
    ]
}

// ============================================================================
// AST walkers
// ============================================================================

/// Recursively collects whether any `Impl` appears inside another `Impl`.
fn impl_nested_in_impl(module: &Module) -> bool {
    fn in_declaration(declaration: &Declaration, inside_impl: bool) -> bool {
        match &declaration.kind {
            DeclarationKind::Impl(decl) => {
                inside_impl || decl.members.iter().any(|m| in_declaration(m, true))
            }
            DeclarationKind::Function(decl) => decl
                .body
                .as_ref()
                .is_some_and(|b| in_block(b, inside_impl)),
            DeclarationKind::Struct(decl) => decl.members.iter().any(|m| match m {
                StructMember::Declaration(d) => in_declaration(d, inside_impl),
                StructMember::Field(_) => false,
            }),
            DeclarationKind::Trait(decl) => {
                decl.members.iter().any(|m| in_declaration(m, inside_impl))
            }
            DeclarationKind::Extern(block) => {
                block.members.iter().any(|m| in_declaration(m, inside_impl))
            }
            _ => false,
        }
    }

    fn in_block(block: &Block, inside_impl: bool) -> bool {
        block.statements.iter().any(|s| in_statement(s, inside_impl))
            || block
                .result
                .as_deref()
                .is_some_and(|e| in_expression(e, inside_impl))
    }

    fn in_statement(statement: &Statement, inside_impl: bool) -> bool {
        match &statement.kind {
            StatementKind::Declaration(declaration) => in_declaration(declaration, inside_impl),
            StatementKind::Expression(expression) => in_expression(expression, inside_impl),
            StatementKind::Let { value, .. } => in_expression(value, inside_impl),
            StatementKind::Return { value } => {
                value.as_ref().is_some_and(|e| in_expression(e, inside_impl))
            }
            StatementKind::Defer { expression } => in_expression(expression, inside_impl),
            StatementKind::For(loop_form) => match loop_form {
                ForLoop::Infinite { body } => in_block(body, inside_impl),
                ForLoop::Condition { condition, body } => {
                    in_expression(condition, inside_impl) || in_block(body, inside_impl)
                }
                ForLoop::Classic {
                    init,
                    condition,
                    post,
                    body,
                } => {
                    init.as_deref().is_some_and(|s| in_statement(s, inside_impl))
                        || condition
                            .as_ref()
                            .is_some_and(|e| in_expression(e, inside_impl))
                        || post.as_ref().is_some_and(|e| in_expression(e, inside_impl))
                        || in_block(body, inside_impl)
                }
                ForLoop::Iterator { iterable, body, .. } => {
                    in_expression(iterable, inside_impl) || in_block(body, inside_impl)
                }
            },
            StatementKind::Break | StatementKind::Continue => false,
        }
    }

    fn in_expression(expression: &Expression, inside_impl: bool) -> bool {
        match &expression.kind {
            ExpressionKind::Block(block) => in_block(block, inside_impl),
            ExpressionKind::If {
                condition,
                then_block,
                else_branch,
            } => {
                in_expression(condition, inside_impl)
                    || in_block(then_block, inside_impl)
                    || else_branch
                        .as_deref()
                        .is_some_and(|e| in_expression(e, inside_impl))
            }
            ExpressionKind::Match { scrutinee, arms } => {
                in_expression(scrutinee, inside_impl)
                    || arms.iter().any(|arm| in_expression(&arm.body, inside_impl))
            }
            _ => false,
        }
    }

    module.declarations.iter().any(|d| in_declaration(d, false))
}

/// Internal names that should never appear in user-facing diagnostics.
const INTERNAL_NAMES: &[&str] = &[
    "TokenKind",
    "ExpressionKind",
    "unwrap()",
    "panic!",
    "unreachable!",
    "ParseError",
    "internal error",
];

fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the parser never panics on arbitrary string input.
    #[test]
    fn parser_never_panics(input in "\\PC{0,500}") {
        let mut ctx = Context::new();
        let _module = parse(&input, &mut ctx);
    }

    /// Property 1b: the parser never panics on near-valid structured input,
    /// which exercises recovery paths far more deeply.
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_loom()) {
        let mut ctx = Context::new();
        let _module = parse(&input, &mut ctx);
    }

    /// Property 2: all diagnostic spans stay within the input.
    #[test]
    fn diagnostic_spans_within_input(input in near_valid_loom()) {
        let mut ctx = Context::new();
        let _module = parse(&input, &mut ctx);
        let len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for diagnostic in ctx.diagnostics() {
            prop_assert!(
                diagnostic.span.end() <= len,
                "span {:?} exceeds input length {} (input {:?}: {})",
                diagnostic.span,
                len,
                input,
                diagnostic.message,
            );
        }
    }

    /// Property 3: the valid corpus parses without diagnostics.
    #[test]
    fn valid_corpus_is_clean(input in valid_fragment()) {
        let mut ctx = Context::new();
        let _module = parse(&input, &mut ctx);
        prop_assert!(
            ctx.diagnostics().is_empty(),
            "unexpected diagnostics for {:?}: {:?}",
            input,
            ctx.diagnostics(),
        );
    }

    /// Property 4: error messages are user-facing.
    #[test]
    fn error_messages_are_user_facing(input in near_valid_loom()) {
        let mut ctx = Context::new();
        let _module = parse(&input, &mut ctx);
        for diagnostic in ctx.diagnostics() {
            for internal in INTERNAL_NAMES {
                prop_assert!(
                    !diagnostic.message.contains(internal),
                    "diagnostic leaks {:?}: {:?} (input {:?})",
                    internal,
                    diagnostic.message,
                    input,
                );
            }
        }
    }

    /// Property 5: no `Impl` node inside another `Impl` node, even under
    /// hostile nesting.
    #[test]
    fn impl_exclusion_holds(input in near_valid_loom()) {
        let mut ctx = Context::new();
        let module = parse(&input, &mut ctx);
        prop_assert!(
            !impl_nested_in_impl(&module),
            "nested impl constructed for input {:?}",
            input,
        );
    }
}
