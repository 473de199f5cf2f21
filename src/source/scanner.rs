//! Mini-scanner over Go source text.
//!
//! It only needs to tell keywords, literals and comments apart from
//! identifiers and punctuation, so string and comment bodies are consumed by
//! callbacks instead of being tokenized.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\u{FEFF}]+")]
#[rustfmt::skip]
pub enum Token {
    #[token("//", line_comment)]
    #[token("/*", block_comment)]
    Comment,

    #[token("\"", interpreted_string)]
    #[token("`", raw_string)]
    String,

    #[token("'", rune_literal)]
    Rune,

    #[regex(r"[0-9]|\.[0-9]", number)]
    Number,

    #[token("range")] Range,
    #[token("else")] Else,
    #[token("chan")] Chan,

    #[token("break")]
    #[token("case")]
    #[token("const")]
    #[token("continue")]
    #[token("default")]
    #[token("defer")]
    #[token("fallthrough")]
    #[token("for")]
    #[token("func")]
    #[token("go")]
    #[token("goto")]
    #[token("if")]
    #[token("import")]
    #[token("interface")]
    #[token("map")]
    #[token("package")]
    #[token("return")]
    #[token("select")]
    #[token("struct")]
    #[token("switch")]
    #[token("type")]
    #[token("var")]
    Keyword,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")]
    Ident,

    #[token("<-")] Arrow,

    #[token(")")] RParen,
    #[token("]")] RBrack,
    #[token("}")] RBrace,

    #[regex(r"[-+*/%&|^~!<>=:;,.(\[{]")]
    #[token("...")]
    #[token("<<")] #[token(">>")] #[token("&^")]
    #[token("&&")] #[token("||")] #[token("++")] #[token("--")]
    #[token("==")] #[token("!=")] #[token("<=")] #[token(">=")] #[token(":=")]
    #[token("+=")] #[token("-=")] #[token("*=")] #[token("/=")] #[token("%=")]
    #[token("&=")] #[token("|=")] #[token("^=")]
    #[token("<<=")] #[token(">>=")] #[token("&^=")]
    Operator,
}

impl Token {
    /// Tokens after which `<-` is a binary send rather than a receive.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            Token::Ident
                | Token::Number
                | Token::String
                | Token::Rune
                | Token::RParen
                | Token::RBrack
                | Token::RBrace
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, Token::Keyword | Token::Range | Token::Else | Token::Chan)
    }
}

fn line_comment(lex: &mut Lexer<'_, Token>) {
    let rest = lex.remainder();
    let end = rest.find('\n').unwrap_or(rest.len());
    lex.bump(end);
}

fn block_comment(lex: &mut Lexer<'_, Token>) {
    let rest = lex.remainder();
    let end = rest.find("*/").map_or(rest.len(), |at| at + 2);
    lex.bump(end);
}

/// Consume up to and including `quote`, honouring backslash escapes.
/// A newline ends an unterminated literal.
fn escaped_until(lex: &mut Lexer<'_, Token>, quote: u8) {
    let bytes = lex.remainder().as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            b'\n' => break,
            byte if byte == quote => {
                index += 1;
                break;
            }
            _ => index += 1,
        }
    }
    lex.bump(index.min(bytes.len()));
}

fn interpreted_string(lex: &mut Lexer<'_, Token>) {
    escaped_until(lex, b'"');
}

fn rune_literal(lex: &mut Lexer<'_, Token>) {
    escaped_until(lex, b'\'');
}

fn raw_string(lex: &mut Lexer<'_, Token>) {
    let rest = lex.remainder();
    let end = rest.find('`').map_or(rest.len(), |at| at + 1);
    lex.bump(end);
}

/// Numbers are consumed greedily: digits, letters (bases, exponents,
/// imaginary suffix), underscores, dots and exponent signs.
fn number(lex: &mut Lexer<'_, Token>) {
    let bytes = lex.remainder().as_bytes();
    let mut previous = lex.slice().as_bytes().last().copied().unwrap_or(b'0');
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        let accepted = byte.is_ascii_alphanumeric()
            || byte == b'_'
            || byte == b'.'
            || (matches!(byte, b'+' | b'-') && matches!(previous, b'e' | b'E' | b'p' | b'P'));
        if !accepted {
            break;
        }
        previous = byte;
        index += 1;
    }
    lex.bump(index);
}
