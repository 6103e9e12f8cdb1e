//! Lexer for the Kata submission language
//!
//! Implemented with the logos library. Converts source text into a token
//! stream with 1-based line/column information, accumulating every lexical
//! error instead of stopping at the first.

use crate::token::{Span, Token};
use logos::Logos;

/// Logos-based token enum used internally for tokenization.
///
/// Converted to the public [`Token`] enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("function")]
    Function,

    #[token("let")]
    Let,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("while")]
    While,

    #[token("return")]
    Return,

    #[token("break")]
    Break,

    #[token("continue")]
    Continue,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Numbers
    #[regex(r"[0-9]+", parse_int)]
    IntLiteral(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    FloatLiteral(f64),

    // Strings
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_string)]
    StringLiteral(String),

    // Punctuation
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    // Operators (2-char before 1-char)
    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("=")]
    Equal,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("!")]
    Bang,
}

// Helper parsing functions

fn lex_block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> logos::Skip {
    // "/*" is already consumed, find the matching "*/"
    let remainder = lex.remainder();
    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        // Unterminated comment, consume to end of input
        lex.bump(remainder.len());
    }
    logos::Skip
}

fn parse_int(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<i64> {
    lex.slice().parse().ok()
}

fn parse_float(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1];
    Some(unescape_string(inner))
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some(c) => result.push(c),
                None => break,
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character that begins no token
    UnexpectedCharacter {
        /// The offending character
        char: char,
        /// Where it was found
        span: Span,
    },
    /// A string literal with no closing quote before end of line/input
    UnterminatedString {
        /// Where the string starts
        span: Span,
    },
    /// A numeric literal that does not fit its type
    InvalidNumber {
        /// The literal text
        text: String,
        /// Where it was found
        span: Span,
    },
}

impl LexError {
    /// The source location of this error
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedCharacter { char, span } => {
                write!(
                    f,
                    "Unexpected character '{}' at {}:{}",
                    char.escape_default(),
                    span.line,
                    span.column
                )
            }
            LexError::UnterminatedString { span } => {
                write!(f, "Unterminated string at {}:{}", span.line, span.column)
            }
            LexError::InvalidNumber { text, span } => {
                write!(
                    f,
                    "Invalid number '{}' at {}:{}",
                    text, span.line, span.column
                )
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over the given source text
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire input
    ///
    /// Returns the token stream (terminated by [`Token::Eof`]) or every
    /// lexical error found.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();

            // Advance line/column over skipped text
            for c in self.source[last_end..range.start].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }

            let span = Span::new(range.start, range.end, line, column);
            let slice = &self.source[range.start..range.end];

            match token_result {
                Ok(logos_token) => {
                    let token = convert_token(logos_token);
                    self.tokens.push((token, span));
                }
                Err(_) => {
                    self.errors.push(classify_error(slice, span));
                }
            }

            // Advance line/column over the token itself
            for c in slice.chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }

            last_end = range.end;
        }

        // Count lines in any trailing skipped text so EOF lands on the right line
        for c in self.source[last_end..].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }
}

/// Decide what kind of lexical error an unmatched slice represents
fn classify_error(slice: &str, span: Span) -> LexError {
    let first = slice.chars().next().unwrap_or('\0');
    if first == '"' {
        LexError::UnterminatedString { span }
    } else if first.is_ascii_digit() {
        LexError::InvalidNumber {
            text: slice.to_string(),
            span,
        }
    } else {
        LexError::UnexpectedCharacter { char: first, span }
    }
}

fn convert_token(logos_token: LogosToken) -> Token {
    match logos_token {
        LogosToken::Function => Token::Function,
        LogosToken::Let => Token::Let,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::While => Token::While,
        LogosToken::Return => Token::Return,
        LogosToken::Break => Token::Break,
        LogosToken::Continue => Token::Continue,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Identifier(name) => Token::Identifier(name),
        LogosToken::IntLiteral(v) => Token::IntLiteral(v),
        LogosToken::FloatLiteral(v) => Token::FloatLiteral(v),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::LParen => Token::LParen,
        LogosToken::RParen => Token::RParen,
        LogosToken::LBrace => Token::LBrace,
        LogosToken::RBrace => Token::RBrace,
        LogosToken::Comma => Token::Comma,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Equal => Token::Equal,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Bang => Token::Bang,
        // Skipped variants never reach conversion
        LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment => {
            unreachable!("skipped token reached conversion")
        }
    }
}
