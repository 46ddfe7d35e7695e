//! The IndentScript scanner.
//!
//! Converts source characters into a token stream whose structure reflects
//! indentation as explicit block delimiters: INDENT and DEDENT tokens are
//! synthesized from leading-whitespace width, and logical line ends become
//! NEWLINE tokens (collapsed, never adjacent).
//!
//! The scanner never fails. Malformed input degrades to best-effort tokens:
//! unclosed strings consume to end of input, unknown characters are skipped.

use crate::char_codes::*;
use iscript_ast::token::{is_reserved_word, Token, TokenKind};

/// Three-character operators.
const OPERATORS_3: [&str; 7] = ["===", "!==", "**=", "//=", ">>>", "<<=", ">>="];

/// Two-character operators.
const OPERATORS_2: [&str; 23] = [
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "**", "//",
    "<<", ">>", "&=", "|=", "^=", "=>", "..", "?.",
];

/// Indent width contributed by a tab character.
const TAB_WIDTH: usize = 4;

/// The scanner converts IndentScript source text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Current position in the text.
    pos: usize,
    /// 1-based line of the current position.
    line: u32,
    /// 1-based column of the current position.
    col: u32,
    /// Tokens emitted so far.
    tokens: Vec<Token>,
    /// Stack of open indentation widths. Never empty; the base entry is 0.
    indent_stack: Vec<usize>,
    /// Whether the scanner is at the start of a line, before any token on it.
    at_line_start: bool,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
            indent_stack: vec![0],
            at_line_start: true,
        }
    }

    /// Scan the entire source and return the token stream.
    ///
    /// The stream always ends with EOF, preceded by one DEDENT per still-open
    /// indentation level.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while let Some(ch) = self.current_char() {
            if self.at_line_start && ch != '\n' && ch != '#' {
                self.scan_indentation();
                continue;
            }
            match ch {
                ' ' | '\t' | '\r' => self.advance(),
                '\n' => self.scan_newline(),
                '#' => self.skip_comment(),
                '\'' | '"' => {
                    let (line, col) = (self.line, self.col);
                    self.scan_string(ch, TokenKind::Str, line, col);
                }
                'f' | 'F' if self.char_at(1).is_some_and(is_quote) => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    let quote = self.current_char().unwrap_or('"');
                    self.scan_string(quote, TokenKind::FString, line, col);
                }
                '`' => {
                    let (line, col) = (self.line, self.col);
                    let value = self.scan_quoted('`');
                    self.tokens
                        .push(Token::new(TokenKind::Template, value, line, col));
                }
                '0'..='9' => self.scan_number(),
                _ if is_identifier_start(ch) => self.scan_identifier(),
                _ if is_bracket(ch) => {
                    let (line, col) = (self.line, self.col);
                    self.advance();
                    self.tokens
                        .push(Token::new(TokenKind::Bracket, ch, line, col));
                }
                _ => {
                    if !self.scan_operator() {
                        if is_punctuation(ch) {
                            let (line, col) = (self.line, self.col);
                            self.advance();
                            self.tokens
                                .push(Token::new(TokenKind::Punctuation, ch, line, col));
                        } else {
                            // Unknown characters are silently skipped.
                            self.advance();
                        }
                    }
                }
            }
        }
        self.flush_dedents();
        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.col));
        self.tokens
    }

    // ========================================================================
    // Position helpers
    // ========================================================================

    /// Look at the character at the current position without advancing.
    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    /// Look at the character at position pos + offset.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    /// Advance past the current character, keeping line/column current.
    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    /// Collect the next `n` characters as a string, if that many remain.
    fn peek_run(&self, n: usize) -> Option<String> {
        if self.pos + n <= self.text.len() {
            Some(self.text[self.pos..self.pos + n].iter().collect())
        } else {
            None
        }
    }

    #[inline]
    fn indent_top(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    // ========================================================================
    // Line structure
    // ========================================================================

    /// Measure the leading whitespace of the current line and emit the
    /// INDENT/DEDENT tokens its width implies. Blank and comment-only lines
    /// emit nothing and leave the scanner in line-start mode.
    fn scan_indentation(&mut self) {
        let mut width = 0;
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' => width += 1,
                '\t' => width += TAB_WIDTH,
                _ => break,
            }
            self.advance();
        }
        match self.current_char() {
            None | Some('\n') | Some('#') => return,
            _ => {}
        }
        self.at_line_start = false;
        if width > self.indent_top() {
            self.indent_stack.push(width);
            self.tokens
                .push(Token::new(TokenKind::Indent, "", self.line, self.col));
        } else {
            while width < self.indent_top() {
                self.indent_stack.pop();
                self.tokens
                    .push(Token::new(TokenKind::Dedent, "", self.line, self.col));
            }
        }
    }

    /// Consume a line break, emitting NEWLINE unless the previous token is
    /// already one (runs collapse) or no token has been emitted yet.
    fn scan_newline(&mut self) {
        let emit = self
            .tokens
            .last()
            .is_some_and(|t| t.kind != TokenKind::Newline);
        if emit {
            self.tokens
                .push(Token::new(TokenKind::Newline, "\n", self.line, self.col));
        }
        self.advance();
        self.at_line_start = true;
    }

    /// Discard a `#` comment up to (not including) the line break.
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Close any indentation levels still open at end of input.
    fn flush_dedents(&mut self) {
        while self.indent_top() > 0 {
            self.indent_stack.pop();
            self.tokens
                .push(Token::new(TokenKind::Dedent, "", self.line, self.col));
        }
    }

    // ========================================================================
    // Token scanning
    // ========================================================================

    /// Scan a string literal opened by `quote`. Three consecutive quote
    /// characters open a triple-quoted form that is consumed literally, with
    /// no escape processing, until a matching triple.
    fn scan_string(&mut self, quote: char, kind: TokenKind, line: u32, col: u32) {
        if self.char_at(1) == Some(quote) && self.char_at(2) == Some(quote) {
            self.advance();
            self.advance();
            self.advance();
            let mut value = String::new();
            while let Some(ch) = self.current_char() {
                if ch == quote && self.char_at(1) == Some(quote) && self.char_at(2) == Some(quote) {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
                value.push(ch);
                self.advance();
            }
            self.tokens.push(Token::new(kind, value, line, col));
            return;
        }
        let value = self.scan_quoted(quote);
        self.tokens.push(Token::new(kind, value, line, col));
    }

    /// Consume a single-quoted-style run up to the matching unescaped
    /// `quote`, decoding escape sequences. Unclosed runs consume to end of
    /// input.
    fn scan_quoted(&mut self, quote: char) -> String {
        self.advance();
        let mut value = String::new();
        while let Some(ch) = self.current_char() {
            if ch == quote {
                self.advance();
                break;
            }
            if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    self.advance();
                }
                continue;
            }
            value.push(ch);
            self.advance();
        }
        value
    }

    /// Scan a numeric literal: digits, an optional single decimal point when
    /// followed by a digit, and an optional exponent when its digit run is
    /// present. Underscore separators are elided from the stored value.
    fn scan_number(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut value = String::new();
        self.read_digits(&mut value);
        if self.current_char() == Some('.') && self.char_at(1).is_some_and(is_digit) {
            value.push('.');
            self.advance();
            self.read_digits(&mut value);
        }
        if let Some(e) = self.current_char() {
            if e == 'e' || e == 'E' {
                let sign = matches!(self.char_at(1), Some('+') | Some('-'));
                let digit_offset = if sign { 2 } else { 1 };
                if self.char_at(digit_offset).is_some_and(is_digit) {
                    value.push(e);
                    self.advance();
                    if sign {
                        if let Some(s) = self.current_char() {
                            value.push(s);
                        }
                        self.advance();
                    }
                    self.read_digits(&mut value);
                }
            }
        }
        self.tokens.push(Token::new(TokenKind::Number, value, line, col));
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.current_char() {
            if is_digit(ch) {
                value.push(ch);
                self.advance();
            } else if ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut value = String::new();
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            value.push(ch);
            self.advance();
        }
        let kind = if is_reserved_word(&value) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.tokens.push(Token::new(kind, value, line, col));
    }

    /// Try to scan an operator by longest match. Returns false when the
    /// current character starts no operator.
    fn scan_operator(&mut self) -> bool {
        let (line, col) = (self.line, self.col);
        if let Some(run) = self.peek_run(3) {
            if OPERATORS_3.contains(&run.as_str()) {
                self.advance();
                self.advance();
                self.advance();
                self.tokens
                    .push(Token::new(TokenKind::Operator, run, line, col));
                return true;
            }
        }
        if let Some(run) = self.peek_run(2) {
            if OPERATORS_2.contains(&run.as_str()) {
                self.advance();
                self.advance();
                self.tokens
                    .push(Token::new(TokenKind::Operator, run, line, col));
                return true;
            }
        }
        if let Some(ch) = self.current_char() {
            if is_operator_char(ch) {
                self.advance();
                self.tokens
                    .push(Token::new(TokenKind::Operator, ch, line, col));
                return true;
            }
        }
        false
    }
}
