//! Character classification helpers used by the scanner.
//!
//! All comparisons are on individual code units with ASCII semantics.

/// Whether `ch` can start an identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Whether `ch` can continue an identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Whether `ch` can open a string literal.
#[inline]
pub fn is_quote(ch: char) -> bool {
    ch == '\'' || ch == '"'
}

/// Whether `ch` can appear as a one-character operator.
#[inline]
pub fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '~'
    )
}

#[inline]
pub fn is_bracket(ch: char) -> bool {
    matches!(ch, '(' | ')' | '{' | '}' | '[' | ']')
}

#[inline]
pub fn is_punctuation(ch: char) -> bool {
    matches!(ch, '.' | ',' | ';' | ':' | '?' | '@')
}
