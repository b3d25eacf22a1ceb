// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

/// Span of the source text, kept alive for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    /// Zero-width-safe span just past the end of `src`.
    pub fn end_of(src: Arc<String>) -> Self {
        let start = src.len();
        Self::new(src, start, 1)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        let end = (self.start + self.len).min(self.src.len());
        self.src.get(self.start..end).unwrap_or_default()
    }

    fn grow(&mut self, by: usize) {
        self.len += by;
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,

    // unsupported tokens
    XGreater,
    XLess,
    XEqual,
    XPipe,
    XOpenSquareBracket,
    XCloseSquareBracket,
    XOpenCurly,
    XCloseCurly,
}

impl TokTyp {
    pub const fn is_unsupported(&self) -> bool {
        match self {
            Self::Ident
            | Self::Number
            | Self::Op(_)
            | Self::Comma
            | Self::OpenParen
            | Self::CloseParen => false,

            Self::XGreater
            | Self::XLess
            | Self::XEqual
            | Self::XPipe
            | Self::XOpenSquareBracket
            | Self::XCloseSquareBracket
            | Self::XOpenCurly
            | Self::XCloseCurly => true,
        }
    }

    /// Whether a `-` after this token starts an operand.
    const fn expects_operand(prev: Option<Self>) -> bool {
        match prev {
            None | Some(Self::Op(_) | Self::Comma | Self::OpenParen) => true,
            Some(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(TokTyp),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    cur: Peekable<CharIndices<'src>>,
    prev: Option<TokTyp>,
    has_errored: bool, // tells iter to yield None after error
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            cur: src.char_indices().peekable(),
            prev: None,
            has_errored: false,
        }
    }

    fn trim_whitespace(&mut self) {
        while self.cur.next_if(|(_, chr)| chr.is_ascii_whitespace()).is_some() {}
    }

    fn single(&self, chr: char) -> Option<TokTyp> {
        let typ = match chr {
            '-' if TokTyp::expects_operand(self.prev) => TokTyp::Op(OperatorTyp::Neg),
            '-' => TokTyp::Op(OperatorTyp::Sub),
            '+' => TokTyp::Op(OperatorTyp::Add),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,

            '>' => TokTyp::XGreater,
            '<' => TokTyp::XLess,
            '=' => TokTyp::XEqual,
            '|' => TokTyp::XPipe,
            '[' => TokTyp::XOpenSquareBracket,
            ']' => TokTyp::XCloseSquareBracket,
            '{' => TokTyp::XOpenCurly,
            '}' => TokTyp::XCloseCurly,
            _ => return None,
        };
        Some(typ)
    }

    fn scan<P>(&mut self, start: usize, typ: TokTyp, predicate: P) -> Tok
    where
        P: Fn(char) -> bool,
    {
        let mut loc = SubStr::new(Arc::clone(self.src), start, 0);
        // @unicode: predicates only accept ascii, so bytes == chars
        while self.cur.next_if(|&(_, chr)| predicate(chr)).is_some() {
            loc.grow(1);
        }
        Tok { typ, loc }
    }

    fn fail(&mut self, typ: LexErrTyp, start: usize, chr: char) -> LexErr {
        self.has_errored = true;
        LexErr {
            typ,
            loc: SubStr::new(Arc::clone(self.src), start, chr.len_utf8()),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.trim_whitespace();

        let (idx, chr) = self.cur.peek().copied()?;
        let tok = if let Some(typ) = self.single(chr) {
            self.cur.next();
            Tok {
                typ,
                loc: SubStr::new(Arc::clone(self.src), idx, 1),
            }
        } else if chr.is_ascii_alphabetic() {
            self.scan(idx, TokTyp::Ident, |chr| chr.is_ascii_alphabetic())
        } else if chr.is_ascii_digit() || chr == '.' {
            self.scan(idx, TokTyp::Number, |chr| chr.is_ascii_digit() || chr == '.')
        } else {
            return Some(Err(self.fail(LexErrTyp::InvalidChar, idx, chr)));
        };

        if tok.typ.is_unsupported() {
            return Some(Err(self.fail(LexErrTyp::Unsupported(tok.typ), idx, chr)));
        }

        self.prev = Some(tok.typ);
        Some(Ok(tok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(src: &str) -> Vec<TokTyp> {
        let src = Arc::new(String::from(src));
        Lexer::new(&src).map(|tok| tok.unwrap().typ).collect()
    }

    #[test]
    fn minus_is_negation_only_before_an_operand() {
        use OperatorTyp::{Mul, Neg, Sub};
        use TokTyp::{CloseParen, Ident, Number, Op, OpenParen};
        assert_eq!(types("x-1"), [Ident, Op(Sub), Number]);
        assert_eq!(types("x - 1"), [Ident, Op(Sub), Number]);
        assert_eq!(types("-x"), [Op(Neg), Ident]);
        assert_eq!(
            types("2*(-x)"),
            [Number, Op(Mul), OpenParen, Op(Neg), Ident, CloseParen]
        );
        assert_eq!(types("(x)-x"), [OpenParen, Ident, CloseParen, Op(Sub), Ident]);
    }

    #[test]
    fn token_spans_cover_source() {
        let src = Arc::new(String::from("  sin(12.5)"));
        let toks: Vec<Tok> = Lexer::new(&src).map(Result::unwrap).collect();
        let text: Vec<&str> = toks.iter().map(|tok| tok.loc.get()).collect();
        assert_eq!(text, ["sin", "(", "12.5", ")"]);
        assert_eq!(toks[0].loc.start(), 2);
    }

    #[test]
    fn unsupported_tokens_stop_lexing() {
        let src = Arc::new(String::from("x = 1"));
        let mut lex = Lexer::new(&src);
        assert!(lex.next().unwrap().is_ok());
        let err = lex.next().unwrap().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Unsupported(TokTyp::XEqual));
        assert_eq!(err.loc.start(), 2);
        assert!(lex.next().is_none());
    }

    #[test]
    fn invalid_character_is_located() {
        let src = Arc::new(String::from("x $ 2"));
        let err = Lexer::new(&src)
            .find_map(Result::err)
            .expect("lexing should fail");
        assert_eq!(err.typ, LexErrTyp::InvalidChar);
        assert_eq!(err.loc.get(), "$");
    }
}
