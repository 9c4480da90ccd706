//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers in every radix and floats)
//! - String literals with escape sequences
//! - Operators and punctuation
//! - Comments and line break tracking
//! - Error cases

use super::{
    lexer::{parse_int_literal, tokenize},
    tokens::TokenKind,
};

#[test]
fn test_tokenize_keywords() {
    let source = "type struct enum if else while func mut".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Type);
    assert_eq!(tokens[1].kind, TokenKind::Struct);
    assert_eq!(tokens[2].kind, TokenKind::Enum);
    assert_eq!(tokens[3].kind, TokenKind::If);
    assert_eq!(tokens[4].kind, TokenKind::Else);
    assert_eq!(tokens[5].kind, TokenKind::While);
    assert_eq!(tokens[6].kind, TokenKind::Func);
    assert_eq!(tokens[7].kind, TokenKind::Mut);
    assert_eq!(tokens[8].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo baz_123 _ _underscore i32 true".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    let values: Vec<&str> = tokens[..6].iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["foo", "baz_123", "_", "_underscore", "i32", "true"]);
    assert!(tokens[..6]
        .iter()
        .all(|t| t.kind == TokenKind::Identifier));
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 0x1F 0b101 0o17 1_000 2e10".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::EOF,
        ]
    );
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[3].value, "0x1F");
}

#[test]
fn test_parse_int_literal() {
    assert_eq!(parse_int_literal("42"), Some(42));
    assert_eq!(parse_int_literal("0x1F"), Some(31));
    assert_eq!(parse_int_literal("0b101"), Some(5));
    assert_eq!(parse_int_literal("0o17"), Some(15));
    assert_eq!(parse_int_literal("1_000"), Some(1000));
    assert_eq!(parse_int_literal("99999999999999999999"), None);
}

#[test]
fn test_tokenize_number_overflow() {
    let source = "x := 99999999999999999999".to_string();
    let error = tokenize(source, Some("test.lang".to_string())).unwrap_err();

    assert_eq!(error.get_error_name(), "NumberParseError");
    assert_eq!(error.get_position().0, 5);
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words" """#.to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].value, "");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_string_escapes() {
    let source = r#""hello\nworld" "tab\there" "backslash\\" "hex\x41" "quote\"test""#.to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].value, "hello\nworld");
    assert_eq!(tokens[1].value, "tab\there");
    assert_eq!(tokens[2].value, "backslash\\");
    assert_eq!(tokens[3].value, "hexA");
    assert_eq!(tokens[4].value, "quote\"test");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_string_span_covers_quotes() {
    let source = r#"x := "ab""#.to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[2].span.start.0, 5);
    assert_eq!(tokens[2].span.end.0, 9);
}

#[test]
fn test_tokenize_operators() {
    let source = "+ - * / % == != < > <= >= = << >> & | ^ ! .* ?".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::ShiftLeft,
            TokenKind::ShiftRight,
            TokenKind::Ampersand,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Not,
            TokenKind::DotStar,
            TokenKind::Question,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    let source = "( ) { } [ ] , ; : := @".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        [
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Walrus,
            TokenKind::At,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_unwrap_after_identifier() {
    let source = "p.* = 1".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::DotStar);
    assert_eq!(tokens[2].kind, TokenKind::Assignment);
    assert_eq!(tokens[3].kind, TokenKind::Int);
}

#[test]
fn test_tokenize_comments() {
    let source = "x := 5 // this is a comment\ny := 10".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].value, "x");
    assert_eq!(tokens[1].kind, TokenKind::Walrus);
    assert_eq!(tokens[2].value, "5");
    assert_eq!(tokens[3].value, "y");
    assert!(tokens[3].newline_before);
    assert_eq!(tokens[5].value, "10");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_newline_tracking() {
    let source = "a b\n  c\n\nd".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    let flags: Vec<bool> = tokens.iter().map(|t| t.newline_before).collect();
    assert_eq!(flags, [false, false, true, true, false]);
}

#[test]
fn test_tokenize_function_declaration() {
    let source = "add := (a: i32, b: i32) i32 { a + b }".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens.len(), 17);
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].kind, TokenKind::Walrus);
    assert_eq!(tokens[2].kind, TokenKind::OpenParen);
    assert_eq!(tokens[4].kind, TokenKind::Colon);
    assert_eq!(tokens[10].kind, TokenKind::CloseParen);
    assert_eq!(tokens[12].kind, TokenKind::OpenCurly);
}

#[test]
fn test_tokenize_builtin_call() {
    let source = "@size_of(i32)".to_string();
    let tokens = tokenize(source, Some("test.lang".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::At);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].value, "size_of");
    assert_eq!(tokens[2].kind, TokenKind::OpenParen);
}

#[test]
fn test_tokenize_unrecognized_token() {
    let source = "x := $".to_string();
    let error = tokenize(source, Some("test.lang".to_string())).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 5);
}

#[test]
fn test_tokenize_unterminated_string() {
    let source = "\"abc".to_string();
    assert!(tokenize(source, Some("test.lang".to_string())).is_err());
}

#[test]
fn test_tokenize_spans() {
    let source = "  foo := 42".to_string();
    let tokens = tokenize(source, None).unwrap();

    assert_eq!(tokens[0].span.start.0, 2);
    assert_eq!(tokens[0].span.end.0, 5);
    assert_eq!(*tokens[0].span.start.1, "shell");
    assert_eq!(tokens[2].span.start.0, 9);
    assert_eq!(tokens[3].span.start.0, 11);
}
