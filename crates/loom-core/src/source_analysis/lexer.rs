// Copyright 2026 The Loom Authors
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Loom source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for maximum control over error recovery and span
//! precision.
//!
//! # Design Principles
//!
//! - **Error recovery**: never fail outright on malformed input; emit
//!   [`TokenKind::Illegal`] and resume at the next byte
//! - **Precise spans**: every token's span covers exactly the bytes it
//!   consumed; whitespace and comments carry no token
//! - **Stateless scanning**: the only state carried between tokens is the
//!   cursor, so scanning is a single O(n) pass
//!
//! Keyword recognition happens *after* the full identifier is scanned, so
//! `functional` never matches `fn`. The decimal point is deliberately
//! under-tokenised: `1.5` is one float, but `1..10` is `Int DotDot Int` and
//! `1.method` is `Int Dot Identifier` - the `.` must see a digit to start a
//! fractional part.
//!
//! # Example
//!
//! ```
//! use loom_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("x + 1").collect();
//! assert_eq!(tokens.len(), 3); // x, +, 1 (Eof excluded from iterator)
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use super::{Span, Token, TokenKind};

/// A lexer that tokenizes Loom source code.
///
/// Implements [`Iterator`] for easy consumption; iteration stops at end of
/// input. Calling [`next_token`](Lexer::next_token) directly never stops:
/// past the end it keeps returning [`TokenKind::Eof`] with a zero-length
/// span at the end offset.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// Span of a block comment left unclosed at end of input, if any.
    unterminated_comment: Option<Span>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            unterminated_comment: None,
        }
    }

    /// Returns the span of an unclosed `/* …` comment, if scanning ran off
    /// the end of input inside one.
    ///
    /// Comments never produce tokens, so this is the only way the condition
    /// surfaces; the parser reports it once the stream reaches `Eof`.
    #[must_use]
    pub fn unterminated_comment(&self) -> Option<Span> {
        self.unterminated_comment
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`, n=1 returns the second character, etc.).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 1 GiB are rejected by the source manager"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        span.slice(self.source)
    }

    /// Lexes the next token, skipping any leading whitespace and comments.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.current_position();
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c, start),
        };

        Token::new(kind, self.span_from(start))
    }

    /// Skips whitespace and comments. Neither produces a token.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                }
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    self.advance_while(|c| c != '\n');
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    /// Skips a block comment, honouring arbitrary-depth nesting.
    ///
    /// `/* outer /* inner */ still outer */` is one comment: the depth
    /// counter must return to zero before scanning resumes.
    fn skip_block_comment(&mut self) {
        let start = self.current_position();
        self.advance(); // /
        self.advance(); // *
        let mut depth: u32 = 1;

        while depth > 0 {
            match self.peek_char() {
                None => {
                    self.unterminated_comment = Some(self.span_from(start));
                    return;
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Lexes a token kind based on the first character.
    fn lex_token_kind(&mut self, c: char, start: u32) -> TokenKind {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier_or_keyword(start),
            '0'..='9' => self.lex_number(),
            '"' => self.lex_string(),
            '\'' => self.lex_character(),

            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '?' => self.single(TokenKind::Question),
            '@' => self.single(TokenKind::At),
            '$' => self.single(TokenKind::Dollar),
            '#' => self.single(TokenKind::Hash),
            '~' => self.single(TokenKind::Tilde),

            '+' => self.with_assign(TokenKind::Plus, TokenKind::PlusAssign),
            '-' => self.with_assign(TokenKind::Minus, TokenKind::MinusAssign),
            '*' => self.with_assign(TokenKind::Star, TokenKind::StarAssign),
            '/' => self.with_assign(TokenKind::Slash, TokenKind::SlashAssign),
            '%' => self.with_assign(TokenKind::Percent, TokenKind::PercentAssign),
            '&' => self.with_assign(TokenKind::Amp, TokenKind::AmpAssign),
            '|' => self.with_assign(TokenKind::Pipe, TokenKind::PipeAssign),
            '^' => self.with_assign(TokenKind::Caret, TokenKind::CaretAssign),

            '=' => {
                self.advance();
                match self.peek_char() {
                    Some('=') => self.single(TokenKind::Equal),
                    Some('>') => self.single(TokenKind::FatArrow),
                    _ => TokenKind::Assign,
                }
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.single(TokenKind::NotEqual)
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                self.advance();
                match self.peek_char() {
                    Some('<') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::ShlAssign)
                        } else {
                            TokenKind::Shl
                        }
                    }
                    Some('=') => self.single(TokenKind::LessEqual),
                    _ => TokenKind::Less,
                }
            }
            '>' => {
                self.advance();
                match self.peek_char() {
                    Some('>') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::ShrAssign)
                        } else {
                            TokenKind::Shr
                        }
                    }
                    Some('=') => self.single(TokenKind::GreaterEqual),
                    _ => TokenKind::Greater,
                }
            }
            '.' => self.lex_dot(),

            // Unknown character - error recovery resumes at the next byte.
            _ => self.single(TokenKind::Illegal),
        }
    }

    /// Consumes one character and returns `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes one character; if `=` follows, consumes it too and returns
    /// the compound-assignment kind.
    fn with_assign(&mut self, plain: TokenKind, compound: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some('=') {
            self.advance();
            compound
        } else {
            plain
        }
    }

    /// Lexes the `.`-family punctuators with maximal munch:
    /// `..=` `...` `..` `.?` `.*` `.<` `.`
    fn lex_dot(&mut self) -> TokenKind {
        self.advance(); // .
        match self.peek_char() {
            Some('.') => {
                self.advance();
                match self.peek_char() {
                    Some('=') => self.single(TokenKind::DotDotEq),
                    Some('.') => self.single(TokenKind::Ellipsis),
                    _ => TokenKind::DotDot,
                }
            }
            Some('?') => self.single(TokenKind::DotQuestion),
            Some('*') => self.single(TokenKind::DotStar),
            Some('<') => self.single(TokenKind::DotLess),
            _ => TokenKind::Dot,
        }
    }

    /// Lexes an identifier or keyword.
    ///
    /// The full `[A-Za-z_][A-Za-z0-9_]*` match is scanned first and only
    /// then looked up in the keyword table. A lone `_` is its own kind.
    fn lex_identifier_or_keyword(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.text_for(self.span_from(start));

        if text == "_" {
            return TokenKind::Underscore;
        }
        TokenKind::lookup_keyword(text).unwrap_or(TokenKind::Identifier)
    }

    /// Lexes an integer or float literal.
    ///
    /// Base prefixes `0x` / `0b` / `0o` select the digit alphabet;
    /// underscores between digits are accepted everywhere. A decimal point
    /// only begins a fractional part when a digit follows it, so `1..10`
    /// and `1.method` stay three tokens.
    fn lex_number(&mut self) -> TokenKind {
        // Base-prefixed integer
        if self.peek_char() == Some('0') {
            let digits_consumed = match self.peek_char_n(1) {
                Some('x' | 'X') => Some(self.lex_prefixed_digits(|c| c.is_ascii_hexdigit())),
                Some('b' | 'B') => Some(self.lex_prefixed_digits(|c| matches!(c, '0' | '1'))),
                Some('o' | 'O') => Some(self.lex_prefixed_digits(|c| matches!(c, '0'..='7'))),
                _ => None,
            };
            if let Some(consumed) = digits_consumed {
                // A bare prefix like `0x` with no digits is unscannable.
                return if consumed { TokenKind::Int } else { TokenKind::Illegal };
            }
        }

        // Decimal integer part
        self.advance_while(|c| c.is_ascii_digit() || c == '_');

        // Fractional part: only if `.` is followed by a digit
        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit() || c == '_');
            is_float = true;
        }

        // Exponent: only if `e` is followed by digits (optionally signed),
        // so `1e` stays `Int Identifier`.
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let exponent_ok = match self.peek_char_n(1) {
                Some('+' | '-') => self.peek_char_n(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_ok {
                self.advance(); // e
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit() || c == '_');
                is_float = true;
            }
        }

        if is_float { TokenKind::Float } else { TokenKind::Int }
    }

    /// Consumes a base prefix (`0x` etc.) and its digit run. Returns whether
    /// at least one digit was consumed.
    fn lex_prefixed_digits(&mut self, is_digit: impl Fn(char) -> bool) -> bool {
        self.advance(); // 0
        self.advance(); // x / b / o
        let mut any = false;
        while self.peek_char().is_some_and(|c| is_digit(c) || c == '_') {
            if self.peek_char() != Some('_') {
                any = true;
            }
            self.advance();
        }
        any
    }

    /// Lexes a string literal.
    ///
    /// Only `\"` and `\\` matter to the scanner; full unescaping is the
    /// parser's job. An unterminated string is `Illegal` with a span
    /// covering everything consumed.
    fn lex_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                None => return TokenKind::Illegal,
                Some('"') => {
                    self.advance();
                    return TokenKind::Str;
                }
                Some('\\') => {
                    self.advance();
                    if self.advance().is_none() {
                        return TokenKind::Illegal;
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Lexes a character literal: one UTF-8 scalar or one escape between
    /// single quotes.
    ///
    /// Accepted escapes: `\n \r \t \\ \' \" \0`, `\xHH` (exactly two hex
    /// digits), `\u{H..H}` (one to six hex digits). Anything else —
    /// including an empty `''` or a missing closing quote - is `Illegal`.
    fn lex_character(&mut self) -> TokenKind {
        self.advance(); // opening quote

        let content_ok = match self.peek_char() {
            None | Some('\'' | '\n') => false,
            Some('\\') => {
                self.advance();
                self.lex_char_escape()
            }
            Some(_) => {
                self.advance();
                true
            }
        };

        if content_ok && self.peek_char() == Some('\'') {
            self.advance();
            return TokenKind::Char;
        }

        // Recovery: consume up to the closing quote on this line so the
        // Illegal span covers the whole malformed literal.
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
            if c == '\'' {
                break;
            }
        }
        TokenKind::Illegal
    }

    /// Lexes the body of a character escape (the `\` is already consumed).
    /// Returns whether the escape is well-formed.
    fn lex_char_escape(&mut self) -> bool {
        match self.peek_char() {
            Some('n' | 'r' | 't' | '\\' | '\'' | '"' | '0') => {
                self.advance();
                true
            }
            Some('x') => {
                self.advance();
                for _ in 0..2 {
                    if !self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                        return false;
                    }
                    self.advance();
                }
                true
            }
            Some('u') => {
                self.advance();
                if self.peek_char() != Some('{') {
                    return false;
                }
                self.advance();
                let mut digits = 0;
                while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                    digits += 1;
                }
                if digits == 0 || digits > 6 || self.peek_char() != Some('}') {
                    return false;
                }
                self.advance();
                true
            }
            _ => false,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

/// Lexes source into a token vector, excluding the trailing `Eof`.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lexes source into a token vector, including the trailing `Eof` token.
#[must_use]
pub fn lex_with_eof(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind().is_eof();
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(Token::kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        lex(source)
            .into_iter()
            .map(|t| t.text(source).to_string())
            .collect()
    }

    #[test]
    fn empty_input_yields_eof_forever() {
        let mut lexer = Lexer::new("");
        for _ in 0..3 {
            let token = lexer.next_token();
            assert_eq!(token.kind(), Eof);
            assert_eq!(token.span(), Span::empty(0));
        }
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(kinds("fn let functional lets"), vec![Fn, Let, Identifier, Identifier]);
        assert_eq!(kinds("_ _x x_"), vec![Underscore, Identifier, Identifier]);
        assert_eq!(kinds("self Self"), vec![SelfValue, SelfType]);
        assert_eq!(kinds("and or in as"), vec![And, Or, In, As]);
    }

    #[test]
    fn integer_bases_and_underscores() {
        assert_eq!(kinds("42 0xFF 0b1010 0o777 1_000_000"), vec![Int; 5]);
        assert_eq!(kinds("0xdead_beef"), vec![Int]);
        assert_eq!(texts("0xFF"), vec!["0xFF"]);

        // A bare base prefix has no digits to scan
        assert_eq!(kinds("0x"), vec![Illegal]);
        assert_eq!(kinds("0b_"), vec![Illegal]);
    }

    #[test]
    fn float_discrimination() {
        assert_eq!(kinds("1.5"), vec![Float]);
        assert_eq!(kinds("1e9 2.5e-3 1E+2"), vec![Float, Float, Float]);

        // `.` must see a digit to start a fractional part
        assert_eq!(kinds("1..10"), vec![Int, DotDot, Int]);
        assert_eq!(kinds("1.method"), vec![Int, Dot, Identifier]);
        assert_eq!(kinds("1."), vec![Int, Dot]);

        // `e` must see digits to start an exponent
        assert_eq!(kinds("1e"), vec![Int, Identifier]);
        assert_eq!(kinds("1e+"), vec![Int, Identifier, Plus]);
    }

    #[test]
    fn maximal_munch_punctuators() {
        assert_eq!(kinds("<<= << <= <"), vec![ShlAssign, Shl, LessEqual, Less]);
        assert_eq!(kinds(">>= >> >= >"), vec![ShrAssign, Shr, GreaterEqual, Greater]);
        assert_eq!(kinds("..= ... .. .? .* .< ."), vec![
            DotDotEq, Ellipsis, DotDot, DotQuestion, DotStar, DotLess, Dot
        ]);
        assert_eq!(kinds("== => ="), vec![Equal, FatArrow, Assign]);
        assert_eq!(kinds("!= !"), vec![NotEqual, Bang]);
        assert_eq!(kinds("+= -= *= /= %= &= |= ^="), vec![
            PlusAssign, MinusAssign, StarAssign, SlashAssign, PercentAssign, AmpAssign,
            PipeAssign, CaretAssign
        ]);
    }

    #[test]
    fn adjacent_punctuators_without_spaces() {
        // `a<=b` must not lex `<` then `=`
        assert_eq!(kinds("a<=b"), vec![Identifier, LessEqual, Identifier]);
        // `x..=y` is one inclusive-range token
        assert_eq!(kinds("x..=y"), vec![Identifier, DotDotEq, Identifier]);
        // propagate-then-member chains
        assert_eq!(kinds("a.?.b"), vec![Identifier, DotQuestion, Dot, Identifier]);
    }

    #[test]
    fn string_literals() {
        assert_eq!(kinds(r#""hello""#), vec![Str]);
        assert_eq!(kinds(r#""a \" b""#), vec![Str]);
        assert_eq!(kinds(r#""a \\""#), vec![Str]);
        assert_eq!(kinds(r#""unterminated"#), vec![Illegal]);
        assert_eq!(kinds("\"trailing backslash\\"), vec![Illegal]);
    }

    #[test]
    fn character_literals() {
        assert_eq!(kinds("'a'"), vec![Char]);
        assert_eq!(kinds(r#"'\n' '\r' '\t' '\\' '\'' '\"' '\0'"#), vec![Char; 7]);
        assert_eq!(kinds(r"'\x41'"), vec![Char]);
        assert_eq!(kinds(r"'\u{1F600}'"), vec![Char]);
        assert_eq!(kinds(r"'\u{41}'"), vec![Char]);

        // Multi-byte scalars are accepted
        assert_eq!(kinds("'中'"), vec![Char]);
    }

    #[test]
    fn malformed_character_literals() {
        assert_eq!(kinds(r"'\x4'"), vec![Illegal]);
        assert_eq!(kinds(r"'\u{}'"), vec![Illegal]);
        assert_eq!(kinds(r"'\u{1234567}'"), vec![Illegal]);
        assert_eq!(kinds(r"'\q'"), vec![Illegal]);
        assert_eq!(kinds("''"), vec![Illegal]);
        assert_eq!(kinds("'a"), vec![Illegal]);
        assert_eq!(kinds("'ab'"), vec![Illegal]);
    }

    #[test]
    fn illegal_spans_cover_offending_bytes() {
        let src = r"let c = '\q'; x";
        let tokens = lex(src);
        let illegal = tokens.iter().find(|t| t.kind() == Illegal).unwrap();
        assert_eq!(illegal.text(src), r"'\q'");
        // Scanning resumes after the bad literal
        assert_eq!(tokens.last().unwrap().kind(), Identifier);
    }

    #[test]
    fn line_comments_are_transparent() {
        assert_eq!(kinds("x // comment\ny"), vec![Identifier, Identifier]);
        assert_eq!(kinds("// only a comment"), vec![]);
    }

    #[test]
    fn nested_block_comments() {
        let src = "let x = /* outer /* inner */ still outer */ 42;";
        assert_eq!(kinds(src), vec![Let, Identifier, Assign, Int, Semicolon]);

        // Three levels deep
        assert_eq!(kinds("a /* 1 /* 2 /* 3 */ 2 */ 1 */ b"), vec![Identifier, Identifier]);
    }

    #[test]
    fn unterminated_block_comment_is_tracked() {
        let mut lexer = Lexer::new("x /* never closed");
        assert_eq!(lexer.next_token().kind(), Identifier);
        assert_eq!(lexer.next_token().kind(), Eof);
        let span = lexer.unterminated_comment().unwrap();
        assert_eq!(span.start(), 2);

        // Closing only the inner comment is not enough
        let mut lexer = Lexer::new("/* outer /* inner */");
        assert_eq!(lexer.next_token().kind(), Eof);
        assert!(lexer.unterminated_comment().is_some());
    }

    #[test]
    fn range_in_for_loop() {
        let src = "for i in 0..5 { print(i); }";
        assert_eq!(kinds(src), vec![
            For, Identifier, In, Int, DotDot, Int, LBrace, Identifier, LParen, Identifier,
            RParen, Semicolon, RBrace
        ]);
    }

    #[test]
    fn token_spans_are_exact_and_monotonic() {
        let src = "fn add(a: i32) i32 { a + 1 }";
        let tokens = lex(src);
        let mut prev_end = 0;
        for token in &tokens {
            assert!(token.span().start() >= prev_end, "tokens must not overlap");
            // The gap between tokens is whitespace only
            let gap = &src[prev_end as usize..token.span().start() as usize];
            assert!(gap.chars().all(char::is_whitespace));
            prev_end = token.span().end();
        }
        assert_eq!(prev_end as usize, src.len());
    }

    #[test]
    fn unknown_bytes_become_illegal() {
        assert_eq!(kinds("a ` b"), vec![Identifier, Illegal, Identifier]);
        assert_eq!(kinds("€"), vec![Illegal]);
    }

    #[test]
    fn lex_with_eof_appends_terminator() {
        let tokens = lex_with_eof("x");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind(), Eof);
        assert_eq!(tokens[1].span(), Span::empty(1));
    }
}
