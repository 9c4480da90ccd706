use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(&format!("^(?:{})", regex)).expect("token pattern must compile"),
        handler,
    }
}

lazy_static! {
    /// Token patterns, tried in order. Longer operators come before their
    /// prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern(r"[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern(
            r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?",
            number_handler,
        ),
        pattern(r"\s+", whitespace_handler),
        pattern(r#""([^"\\\n]|\\.)*""#, string_handler),
        pattern(r"//[^\n]*", skip_handler),
        pattern(r"\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern(r"\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern(r"\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern(r"\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern(r"\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern(r"\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern(r":=", MK_DEFAULT_HANDLER!(TokenKind::Walrus, ":=")),
        pattern(r":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern(r"==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern(r"!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern(r"!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern(r"=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern(r"<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        pattern(r"<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern(r"<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(r">>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>")),
        pattern(r">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(r">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern(r"&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        pattern(r"\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        pattern(r"\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern(r"\.\*", MK_DEFAULT_HANDLER!(TokenKind::DotStar, ".*")),
        pattern(r";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(r"\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern(r",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(r"@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
        pattern(r"\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern(r"-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern(r"/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern(r"\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern(r"%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
    newline_pending: bool,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            pos: 0,
            tokens: vec![],
            source,
            file: file_name,
            newline_pending: false,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, mut token: Token) {
        token.newline_before = self.newline_pending;
        self.newline_pending = false;
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self) -> Position {
        Position(self.pos as u32, Rc::clone(&self.file))
    }

    /// Span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position(),
            end: Position((self.pos + len) as u32, Rc::clone(&self.file)),
        }
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}

/// Parses an integer literal, honouring `0x`, `0b` and `0o` prefixes and
/// `_` separators.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let (radix, body) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        _ => (10, digits.as_str()),
    };

    i64::from_str_radix(body, radix).ok()
}

pub fn parse_float_literal(text: &str) -> Option<f64> {
    text.replace('_', "").parse::<f64>().ok()
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let is_prefixed = matched.len() > 1
        && matched.starts_with('0')
        && matched[1..].starts_with(|c: char| "xXbBoO".contains(c));

    let kind = if !is_prefixed && matched.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        TokenKind::Float
    } else {
        TokenKind::Int
    };

    if kind == TokenKind::Int && parse_int_literal(&matched).is_none() {
        return Err(Error::new(
            ErrorImpl::NumberParseError { token: matched },
            lexer.position(),
        ));
    }

    let span = lexer.span_of(matched.len());
    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(kind, matched, span));
    Ok(())
}

fn whitespace_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    if matched.contains('\n') {
        lexer.newline_pending = true;
    }
    lexer.advance_n(matched.len());
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let string_literal = &matched[1..matched.len() - 1];

    let mut result = String::new();
    let mut chars = string_literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('x') => {
                let mut hex = String::new();

                while hex.len() < 2 {
                    match chars.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            hex.push(*ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(char::from(byte)),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
            }
            // Unknown escapes keep the backslash.
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    let span = lexer.span_of(matched.len());
    lexer.advance_n(matched.len());
    lexer.push(MK_TOKEN!(TokenKind::String, result, span));
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let kind = RESERVED_LOOKUP
        .get(value.as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    let span = lexer.span_of(value.len());
    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span));
    Ok(())
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let pattern = PATTERNS
            .iter()
            .find(|pattern| pattern.regex.is_match(lex.remainder()));

        match pattern {
            Some(pattern) => (pattern.handler)(&mut lex, &pattern.regex)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position(),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}
