use std::iter::Peekable;
use std::str::CharIndices;

use ahash::AHashMap;
use once_cell::sync::Lazy;

use super::token::{Keyword, Symbol, Token};
use super::Result;
use crate::error::ParseError;
use crate::error::ParseErrorType::*;

pub(crate) type IndexedToken = (usize, Token);

static KEYWORDS: Lazy<AHashMap<&'static str, Keyword>> = Lazy::new(|| {
    [
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::In,
        Keyword::True,
        Keyword::False,
    ]
    .iter()
    .map(|&k| (k.as_str(), k))
    .collect()
});

pub(crate) struct TokenIterator<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> TokenIterator<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            chars: s.char_indices().peekable(),
        }
    }

    /// Reads all remaining tokens
    pub fn collect_tokens(mut self) -> Result<Vec<IndexedToken>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next(&mut self) -> Result<Option<IndexedToken>> {
        self.skip_space();
        let (idx, c) = match self.chars.peek() {
            Some(&next) => next,
            None => return Ok(None),
        };
        let token = if c.is_ascii_digit() {
            self.read_number(idx)?
        } else if c == '"' || c == '\'' {
            self.read_string(idx, c)?
        } else if c.is_alphabetic() || c == '_' {
            self.read_word()
        } else {
            self.read_symbol(idx, c)?
        };
        Ok(Some((idx, token)))
    }

    fn skip_space(&mut self) {
        while self.chars.peek().map_or(false, |&(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !predicate(c) {
                break;
            }
            s.push(c);
            self.chars.next();
        }
        s
    }

    fn read_number(&mut self, idx: usize) -> Result<Token> {
        let s = self.take_while(|c| c.is_ascii_digit());
        match s.parse() {
            Ok(n) => Ok(Token::Int(n)),
            Err(_) => Err(ParseError::new(InvalidNumber, s, idx)),
        }
    }

    fn read_word(&mut self) -> Token {
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
        match KEYWORDS.get(word.as_str()) {
            Some(&keyword) => Token::Keyword(keyword),
            None => Token::Ident(word),
        }
    }

    fn read_string(&mut self, idx: usize, quote: char) -> Result<Token> {
        self.chars.next();
        let mut s = String::new();
        loop {
            let c = match self.chars.next() {
                Some((_, c)) => c,
                None => return Err(ParseError::new(UnterminatedString, quote, idx)),
            };
            if c == quote {
                break;
            }
            if c == '\\' {
                let escaped = match self.chars.next() {
                    Some((_, 'n')) => '\n',
                    Some((_, 't')) => '\t',
                    Some((_, c)) => c,
                    None => return Err(ParseError::new(UnterminatedString, quote, idx)),
                };
                s.push(escaped);
            } else {
                s.push(c);
            }
        }
        Ok(Token::Str(s))
    }

    fn read_symbol(&mut self, idx: usize, c: char) -> Result<Token> {
        self.chars.next();
        let symbol = match c {
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Star,
            '/' => {
                // `//` is floor division, same as `/`
                if self.chars.peek().map_or(false, |&(_, c)| c == '/') {
                    self.chars.next();
                }
                Symbol::Slash
            }
            '%' => Symbol::Percent,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            '[' => Symbol::LBracket,
            ']' => Symbol::RBracket,
            ',' => Symbol::Comma,
            '.' => Symbol::Dot,
            '<' if next_if_eq(&mut self.chars) => Symbol::Le,
            '<' => Symbol::Lt,
            '>' if next_if_eq(&mut self.chars) => Symbol::Ge,
            '>' => Symbol::Gt,
            '=' if next_if_eq(&mut self.chars) => Symbol::EqEq,
            '!' if next_if_eq(&mut self.chars) => Symbol::NotEq,
            _ => return Err(ParseError::new(InvalidToken, c, idx)),
        };
        Ok(Token::Symbol(symbol))
    }
}

fn next_if_eq(chars: &mut Peekable<CharIndices<'_>>) -> bool {
    if chars.peek().map_or(false, |&(_, c)| c == '=') {
        chars.next();
        true
    } else {
        false
    }
}
