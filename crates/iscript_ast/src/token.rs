//! Token kinds and the token record produced by the scanner.

use std::fmt;

/// The kind of a scanned token.
///
/// `Indent`, `Dedent` and `Newline` are synthetic: they are derived from
/// leading whitespace and line structure rather than from any single source
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Block-open marker: the line's indent width exceeded the enclosing one.
    Indent,
    /// Block-close marker: the line's indent width dropped below the
    /// enclosing one. Balanced one-to-one with `Indent` over a whole stream.
    Dedent,
    /// End of a logical line. Never emitted twice in a row.
    Newline,
    /// End of input. Always present and always the final token.
    Eof,
    Identifier,
    Keyword,
    Number,
    /// String literal; the value carries the decoded contents.
    Str,
    /// Formatted string literal; `{...}` placeholders are retained verbatim
    /// for the generator to rewrite.
    FString,
    /// Backtick template literal.
    Template,
    Operator,
    Bracket,
    Punctuation,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::FString => "f-string",
            TokenKind::Template => "template",
            TokenKind::Operator => "operator",
            TokenKind::Bracket => "bracket",
            TokenKind::Punctuation => "punctuation",
        };
        f.write_str(name)
    }
}

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The original lexeme. Strings carry their decoded contents, numbers
    /// their digit sequence with underscores elided, synthetic tokens the
    /// empty string.
    pub value: String,
    /// 1-based line of the token's first character.
    pub line: u32,
    /// 1-based column of the token's first character.
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    /// Whether this token has the given kind.
    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Whether this token has the given kind and lexeme.
    #[inline]
    pub fn matches(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }
}

/// Whether `text` is in the reserved-word set.
///
/// The set covers both source-language keywords and target-language reserved
/// words, so that identifiers which would collide with emitted JavaScript are
/// tokenized as keywords.
pub fn is_reserved_word(text: &str) -> bool {
    matches!(
        text,
        "def" | "class"
            | "if"
            | "else"
            | "elif"
            | "for"
            | "while"
            | "return"
            | "import"
            | "from"
            | "in"
            | "as"
            | "with"
            | "pass"
            | "break"
            | "continue"
            | "print"
            | "len"
            | "range"
            | "enumerate"
            | "lambda"
            | "async"
            | "await"
            | "try"
            | "except"
            | "finally"
            | "raise"
            | "assert"
            | "del"
            | "global"
            | "nonlocal"
            | "yield"
            | "None"
            | "True"
            | "False"
            | "and"
            | "or"
            | "not"
            | "is"
            | "function"
            | "const"
            | "let"
            | "var"
            | "this"
            | "new"
            | "typeof"
            | "instanceof"
            | "delete"
            | "void"
            | "super"
            | "static"
            | "get"
            | "set"
            | "extends"
            | "implements"
            | "interface"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "export"
            | "default"
            | "case"
            | "switch"
            | "do"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("def"));
        assert!(is_reserved_word("lambda"));
        assert!(is_reserved_word("None"));
        assert!(is_reserved_word("instanceof"));
        assert!(!is_reserved_word("foo"));
        assert!(!is_reserved_word("Def"));
        assert!(!is_reserved_word(""));
    }

    #[test]
    fn test_token_matches() {
        let token = Token::new(TokenKind::Keyword, "def", 1, 1);
        assert!(token.is(TokenKind::Keyword));
        assert!(token.matches(TokenKind::Keyword, "def"));
        assert!(!token.matches(TokenKind::Keyword, "class"));
        assert!(!token.matches(TokenKind::Identifier, "def"));
    }
}
