//! Parse constraint expressions from text

use crate::error::{ParseError, ParseErrorType::*, UNEXPECTED_END};
use crate::expr::{BinaryOp, Expr, UnaryOp, Value};

pub(crate) use self::token::{Keyword, Symbol, Token};
pub(crate) use self::token_iterator::{IndexedToken, TokenIterator};

mod token;
mod token_iterator;

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

const COUNT_METHOD: &str = "count";

/// parse an `Expr` from a string
pub fn parse_expr(s: &str) -> Result<Expr> {
    let tokens = TokenIterator::new(s).collect_tokens()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or()?;
    if let Some((i, t)) = parser.next() {
        return Err(ParseError::new(UnexpectedToken, t, i));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<IndexedToken>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<IndexedToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn next_if_symbol(&mut self, symbol: Symbol) -> bool {
        self.next_if(|t| t.symbol() == Some(symbol))
    }

    fn next_if_keyword(&mut self, keyword: Keyword) -> bool {
        self.next_if(|t| t.keyword() == Some(keyword))
    }

    fn next_if(&mut self, predicate: impl FnOnce(&Token) -> bool) -> bool {
        let matched = self.peek().map_or(false, predicate);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<()> {
        match self.next() {
            Some((_, Token::Symbol(s))) if s == symbol => Ok(()),
            Some((i, t)) => Err(ParseError::new(UnexpectedToken, t, i)),
            None => Err(UNEXPECTED_END),
        }
    }

    fn or(&mut self) -> Result<Expr> {
        let mut expr = self.and()?;
        while self.next_if_keyword(Keyword::Or) {
            expr = Expr::binary(BinaryOp::Or, expr, self.and()?);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut expr = self.not()?;
        while self.next_if_keyword(Keyword::And) {
            expr = Expr::binary(BinaryOp::And, expr, self.not()?);
        }
        Ok(expr)
    }

    fn not(&mut self) -> Result<Expr> {
        if self.next_if_keyword(Keyword::Not) {
            let operand = self.not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    /// `a < b < c` means `a < b and b < c`
    fn comparison(&mut self) -> Result<Expr> {
        let mut left = self.sum()?;
        let mut result: Option<Expr> = None;
        while let Some(op) = self.comparison_op() {
            let right = self.sum()?;
            let cmp = Expr::binary(op, left, right.clone());
            result = Some(match result {
                Some(prev) => Expr::binary(BinaryOp::And, prev, cmp),
                None => cmp,
            });
            left = right;
        }
        Ok(result.unwrap_or(left))
    }

    fn comparison_op(&mut self) -> Option<BinaryOp> {
        let op = match self.peek()? {
            Token::Symbol(Symbol::EqEq) => BinaryOp::Eq,
            Token::Symbol(Symbol::NotEq) => BinaryOp::Ne,
            Token::Symbol(Symbol::Lt) => BinaryOp::Lt,
            Token::Symbol(Symbol::Gt) => BinaryOp::Gt,
            Token::Symbol(Symbol::Le) => BinaryOp::Le,
            Token::Symbol(Symbol::Ge) => BinaryOp::Ge,
            Token::Keyword(Keyword::In) => BinaryOp::In,
            Token::Keyword(Keyword::Not)
                if self.peek_nth(1) == Some(&Token::Keyword(Keyword::In)) =>
            {
                BinaryOp::NotIn
            }
            _ => return None,
        };
        self.pos += if op == BinaryOp::NotIn { 2 } else { 1 };
        Some(op)
    }

    fn sum(&mut self) -> Result<Expr> {
        let mut expr = self.product()?;
        loop {
            let op = if self.next_if_symbol(Symbol::Plus) {
                BinaryOp::Add
            } else if self.next_if_symbol(Symbol::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            expr = Expr::binary(op, expr, self.product()?);
        }
        Ok(expr)
    }

    fn product(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;
        loop {
            let op = if self.next_if_symbol(Symbol::Star) {
                BinaryOp::Mul
            } else if self.next_if_symbol(Symbol::Slash) {
                BinaryOp::Div
            } else if self.next_if_symbol(Symbol::Percent) {
                BinaryOp::Rem
            } else {
                break;
            };
            expr = Expr::binary(op, expr, self.unary()?);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.next_if_symbol(Symbol::Minus) {
            let expr = match self.unary()? {
                Expr::Literal(Value::Int(n)) => Expr::int(-n),
                operand => Expr::Unary(UnaryOp::Neg, Box::new(operand)),
            };
            return Ok(expr);
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while self.next_if_symbol(Symbol::Dot) {
            match self.next() {
                Some((_, Token::Ident(ref name))) if name == COUNT_METHOD => {}
                Some((i, t)) => return Err(ParseError::new(UnexpectedToken, t, i)),
                None => return Err(UNEXPECTED_END),
            }
            self.expect_symbol(Symbol::LParen)?;
            let item = self.or()?;
            self.expect_symbol(Symbol::RParen)?;
            expr = Expr::Count(Box::new(expr), Box::new(item));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        let (i, token) = self.next().ok_or(UNEXPECTED_END)?;
        let expr = match token {
            Token::Int(n) => Expr::int(n),
            Token::Str(s) => Expr::Literal(Value::Str(s)),
            Token::Keyword(Keyword::True) => Expr::Literal(Value::Bool(true)),
            Token::Keyword(Keyword::False) => Expr::Literal(Value::Bool(false)),
            Token::Ident(name) => {
                if self.next_if_symbol(Symbol::LParen) {
                    Expr::Call(name, self.items(Symbol::RParen)?)
                } else {
                    Expr::Ident(name)
                }
            }
            Token::Symbol(Symbol::LBracket) => Expr::List(self.items(Symbol::RBracket)?),
            Token::Symbol(Symbol::LParen) => {
                let expr = self.or()?;
                self.expect_symbol(Symbol::RParen)?;
                expr
            }
            t => return Err(ParseError::new(UnexpectedToken, t, i)),
        };
        Ok(expr)
    }

    /// Comma-separated expressions up to `close`. A trailing comma is allowed.
    fn items(&mut self, close: Symbol) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        loop {
            if self.next_if_symbol(close) {
                return Ok(items);
            }
            items.push(self.or()?);
            if !self.next_if_symbol(Symbol::Comma) {
                self.expect_symbol(close)?;
                return Ok(items);
            }
        }
    }
}
