//! Scanner integration tests.
//!
//! Verifies tokenization of the various IndentScript constructs, plus the
//! stream-level invariants: INDENT/DEDENT balance, NEWLINE collapse, and EOF
//! terminality.

use iscript_ast::token::{Token, TokenKind};
use iscript_scanner::tokenize;

/// Helper: scan all tokens and return (kind, value) pairs, excluding EOF.
fn scan_all(source: &str) -> Vec<(TokenKind, String)> {
    let tokens = tokenize(source);
    tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| (t.kind, t.value))
        .collect()
}

/// Helper: scan all token kinds, excluding EOF.
fn scan_kinds(source: &str) -> Vec<TokenKind> {
    scan_all(source).into_iter().map(|(k, _)| k).collect()
}

fn count_kind(tokens: &[Token], kind: TokenKind) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}

// ============================================================================
// Stream invariants
// ============================================================================

#[test]
fn test_empty_source_is_just_eof() {
    let tokens = tokenize("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn test_eof_is_final_token() {
    for source in ["", "x", "def f():\n    pass\n", "a\n\n\nb", "if x:\n  if y:\n    z"] {
        let tokens = tokenize(source);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof, "source: {:?}", source);
        assert_eq!(count_kind(&tokens, TokenKind::Eof), 1, "source: {:?}", source);
    }
}

#[test]
fn test_indent_dedent_balance() {
    let sources = [
        "if x:\n    y\n",
        "if x:\n    if y:\n        z\n",
        "def f():\n    a\n    b\nc\n",
        "if a:\n    b\nelse:\n    c",
        "if x:\n\ty",
        "class A:\n    def m(self):\n        pass",
    ];
    for source in sources {
        let tokens = tokenize(source);
        assert_eq!(
            count_kind(&tokens, TokenKind::Indent),
            count_kind(&tokens, TokenKind::Dedent),
            "source: {:?}",
            source
        );
    }
}

#[test]
fn test_no_adjacent_newlines() {
    let sources = ["a\n\n\nb", "\n\n\na", "a\n\n", "a\n# c\n\n# d\nb"];
    for source in sources {
        let tokens = tokenize(source);
        for pair in tokens.windows(2) {
            assert!(
                !(pair[0].kind == TokenKind::Newline && pair[1].kind == TokenKind::Newline),
                "source: {:?}",
                source
            );
        }
    }
}

#[test]
fn test_dedents_flushed_at_eof() {
    // Two open levels at end of input must both close.
    let tokens = tokenize("if a:\n    if b:\n        c");
    assert_eq!(count_kind(&tokens, TokenKind::Indent), 2);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 2);
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
}

// ============================================================================
// Indentation
// ============================================================================

#[test]
fn test_simple_block() {
    let kinds = scan_kinds("if x:\n    y\n");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,     // if
            TokenKind::Identifier,  // x
            TokenKind::Punctuation, // :
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Identifier, // y
            TokenKind::Newline,
            TokenKind::Dedent,
        ]
    );
}

#[test]
fn test_blank_lines_emit_no_indentation() {
    // A blank line inside a block neither opens nor closes anything.
    let with_blank = tokenize("if x:\n    a\n\n    b\n");
    assert_eq!(count_kind(&with_blank, TokenKind::Indent), 1);
    assert_eq!(count_kind(&with_blank, TokenKind::Dedent), 1);
}

#[test]
fn test_comment_only_line_emits_no_indentation() {
    let tokens = tokenize("if x:\n    a\n        # deep comment\n    b\n");
    assert_eq!(count_kind(&tokens, TokenKind::Indent), 1);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 1);
}

#[test]
fn test_tab_counts_as_four() {
    // One tab and four spaces land on the same width: no INDENT between them.
    let tokens = tokenize("if x:\n\ta\n    b\n");
    assert_eq!(count_kind(&tokens, TokenKind::Indent), 1);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 1);
}

#[test]
fn test_multi_level_dedent() {
    let tokens = tokenize("if a:\n    if b:\n        c\nd\n");
    // Dropping from width 8 to width 0 pops both levels at once.
    let dedent_lines: Vec<u32> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Dedent)
        .map(|t| t.line)
        .collect();
    assert_eq!(dedent_lines, vec![4, 4]);
}

#[test]
fn test_partial_dedent_without_matching_level() {
    // Width 2 between levels 0 and 4 pops the 4 but pushes nothing.
    let tokens = tokenize("if a:\n    b\n  c\n");
    assert_eq!(count_kind(&tokens, TokenKind::Indent), 1);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 1);
}

// ============================================================================
// Newlines and comments
// ============================================================================

#[test]
fn test_leading_blank_lines_produce_no_newline() {
    let tokens = tokenize("\n\n\nx");
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
}

#[test]
fn test_comment_to_end_of_line() {
    let tokens = scan_all("x = 1  # trailing note\ny");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["x", "=", "1", "\n", "y"]);
}

#[test]
fn test_comment_only_file() {
    let tokens = tokenize("# just a comment\n# another\n");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_literals() {
    let tokens = scan_all(r#""hello""#);
    assert_eq!(tokens, vec![(TokenKind::Str, "hello".to_string())]);

    let tokens = scan_all("'world'");
    assert_eq!(tokens, vec![(TokenKind::Str, "world".to_string())]);
}

#[test]
fn test_string_escapes() {
    let tokens = scan_all(r#""a\nb\tc\rd\\e\"f""#);
    assert_eq!(tokens[0].1, "a\nb\tc\rd\\e\"f");

    // Unknown escapes decode to the escaped character itself.
    let tokens = scan_all(r#""\q""#);
    assert_eq!(tokens[0].1, "q");
}

#[test]
fn test_triple_quoted_string() {
    let tokens = scan_all("\"\"\"line one\nline two\"\"\"");
    assert_eq!(tokens[0].0, TokenKind::Str);
    assert_eq!(tokens[0].1, "line one\nline two");
}

#[test]
fn test_triple_quoted_has_no_escape_processing() {
    let tokens = scan_all(r#"'''a\nb'''"#);
    assert_eq!(tokens[0].1, r"a\nb");
}

#[test]
fn test_fstring() {
    let tokens = scan_all(r#"f"Hi {name}""#);
    assert_eq!(tokens, vec![(TokenKind::FString, "Hi {name}".to_string())]);

    let tokens = scan_all(r#"F'{x}'"#);
    assert_eq!(tokens[0].0, TokenKind::FString);
}

#[test]
fn test_f_identifier_is_not_fstring() {
    let tokens = scan_all("f + fx");
    assert_eq!(tokens[0], (TokenKind::Identifier, "f".to_string()));
    assert_eq!(tokens[2], (TokenKind::Identifier, "fx".to_string()));
}

#[test]
fn test_template_literal() {
    let tokens = scan_all("`a ${b}`");
    assert_eq!(tokens, vec![(TokenKind::Template, "a ${b}".to_string())]);
}

#[test]
fn test_unclosed_string_consumes_to_eof() {
    let tokens = scan_all("\"never closed\nmore text");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, TokenKind::Str);
    assert_eq!(tokens[0].1, "never closed\nmore text");
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(scan_all("42"), vec![(TokenKind::Number, "42".to_string())]);
    assert_eq!(scan_all("3.14"), vec![(TokenKind::Number, "3.14".to_string())]);
}

#[test]
fn test_underscore_separators_elided() {
    assert_eq!(scan_all("1_000_000"), vec![(TokenKind::Number, "1000000".to_string())]);
}

#[test]
fn test_exponents() {
    assert_eq!(scan_all("1e5"), vec![(TokenKind::Number, "1e5".to_string())]);
    assert_eq!(scan_all("2.5E-3"), vec![(TokenKind::Number, "2.5E-3".to_string())]);
    assert_eq!(scan_all("1e+2"), vec![(TokenKind::Number, "1e+2".to_string())]);
}

#[test]
fn test_exponent_requires_digits() {
    // `e` with no digit run stays an identifier after the number.
    let tokens = scan_all("1e");
    assert_eq!(tokens[0], (TokenKind::Number, "1".to_string()));
    assert_eq!(tokens[1], (TokenKind::Identifier, "e".to_string()));
}

#[test]
fn test_decimal_point_requires_digit() {
    // `1.` is a number then member access, not `1.0`.
    let tokens = scan_all("1.x");
    assert_eq!(tokens[0], (TokenKind::Number, "1".to_string()));
    assert_eq!(tokens[1], (TokenKind::Punctuation, ".".to_string()));
    assert_eq!(tokens[2], (TokenKind::Identifier, "x".to_string()));
}

// ============================================================================
// Identifiers and keywords
// ============================================================================

#[test]
fn test_identifiers() {
    let tokens = scan_all("foo _bar $baz a1");
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::Identifier);
    }
    assert_eq!(tokens[1].1, "_bar");
    assert_eq!(tokens[2].1, "$baz");
}

#[test]
fn test_keywords() {
    let tokens = scan_all("def class lambda None True False and or not is");
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::Keyword);
    }
}

#[test]
fn test_target_language_reserved_words_are_keywords() {
    let tokens = scan_all("typeof instanceof new this super");
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::Keyword);
    }
}

// ============================================================================
// Operators, brackets, punctuation
// ============================================================================

#[test]
fn test_operators_longest_match() {
    let tokens = scan_all("=== !== **= //= >>> <<= >>=");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["===", "!==", "**=", "//=", ">>>", "<<=", ">>="]);
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::Operator);
    }
}

#[test]
fn test_two_char_operators() {
    let tokens = scan_all("== != <= >= && || ** // => .. ?.");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["==", "!=", "<=", ">=", "&&", "||", "**", "//", "=>", "..", "?."]);
}

#[test]
fn test_single_char_operators() {
    let tokens = scan_all("+ - * / % = < > ! & | ^ ~");
    assert_eq!(tokens.len(), 13);
    for (kind, _) in &tokens {
        assert_eq!(*kind, TokenKind::Operator);
    }
}

#[test]
fn test_brackets_and_punctuation() {
    let kinds = scan_kinds("(){}[]");
    assert_eq!(kinds, vec![TokenKind::Bracket; 6]);

    let kinds = scan_kinds(". , ; : ? @");
    assert_eq!(kinds, vec![TokenKind::Punctuation; 6]);
}

#[test]
fn test_lone_dot_and_question_are_punctuation() {
    let tokens = scan_all("a.b");
    assert_eq!(tokens[1], (TokenKind::Punctuation, ".".to_string()));
}

#[test]
fn test_unknown_characters_are_skipped() {
    let tokens = scan_all("a \u{00bf} b");
    let values: Vec<&str> = tokens.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["a", "b"]);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_line_and_column_tracking() {
    let tokens = tokenize("ab cd\nef");
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // ab
    assert_eq!((tokens[1].line, tokens[1].column), (1, 4)); // cd
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!((tokens[3].line, tokens[3].column), (2, 1)); // ef
}

#[test]
fn test_position_after_multiline_string() {
    let tokens = tokenize("\"\"\"a\nb\"\"\" x");
    let x = tokens.iter().find(|t| t.value == "x").unwrap();
    assert_eq!(x.line, 2);
}

#[test]
fn test_fstring_position_starts_at_prefix() {
    let tokens = tokenize("  f\"hi\"");
    // Leading blank-width on line one opens an INDENT first.
    let fstring = tokens.iter().find(|t| t.kind == TokenKind::FString).unwrap();
    assert_eq!(fstring.column, 3);
}

// ============================================================================
// Larger shapes
// ============================================================================

#[test]
fn test_function_definition_stream() {
    let kinds = scan_kinds("def greet(name):\n    print(name)\n");
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,     // def
            TokenKind::Identifier,  // greet
            TokenKind::Bracket,     // (
            TokenKind::Identifier,  // name
            TokenKind::Bracket,     // )
            TokenKind::Punctuation, // :
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Keyword,     // print
            TokenKind::Bracket,     // (
            TokenKind::Identifier,  // name
            TokenKind::Bracket,     // )
            TokenKind::Newline,
            TokenKind::Dedent,
        ]
    );
}

#[test]
fn test_tokens_are_recorded_once() {
    let tokens = tokenize("x = 1\n");
    let again = tokenize("x = 1\n");
    assert_eq!(tokens, again);
}
