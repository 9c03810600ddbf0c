//! Constraint predicates: a small closed expression language
//!
//! Expressions are parsed once from text into an [`Expr`] tree and interpreted against the current
//! values of the variables they mention. Identifiers that name variables are rewritten into slot
//! references by [`Expr::bind`], so evaluation never looks names up.

use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::error::ParseError;

pub use self::value::Value;

mod eval;
pub(crate) mod parse;
mod value;

/// A predicate expression tree
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A constant
    Literal(Value),
    /// A free identifier that is not bound to a variable
    Ident(String),
    /// The value of the n-th bound variable
    Slot(usize, String),
    /// A list literal
    List(Vec<Expr>),
    /// A prefix operator
    Unary(UnaryOp, Box<Expr>),
    /// An infix operator
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A call to a builtin function
    Call(String, Vec<Expr>),
    /// `list.count(value)`
    Count(Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    NotIn,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 4
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::In
            | BinaryOp::NotIn => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
        }
    }
}

/// A node of the breadth-first identifier walk
enum Walk<'a> {
    Expr(&'a Expr),
    /// a function name
    Name(&'a str),
    /// the list of a `.count()` call, one level below the call
    Receiver(&'a Expr),
}

const NOT_PRECEDENCE: u8 = 3;
const NEG_PRECEDENCE: u8 = 7;
const ATOM_PRECEDENCE: u8 = 8;

impl Expr {
    /// Parse an expression from text
    pub fn parse(s: &str) -> Result<Expr, ParseError> {
        parse::parse_expr(s)
    }

    pub fn int(n: i64) -> Expr {
        Expr::Literal(Value::Int(n))
    }

    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call(function.into(), args)
    }

    /// All identifiers in the expression, including function names, breadth first.
    /// The operands of a chain of `and` (or `or`) are siblings, as are the operands of a chained
    /// comparison.
    pub fn free_identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(Walk::Expr(self));
        while let Some(node) = queue.pop_front() {
            match node {
                Walk::Expr(Expr::Ident(name)) | Walk::Expr(Expr::Slot(_, name)) => {
                    names.push(name.as_str())
                }
                Walk::Expr(e) => e.push_children(&mut queue),
                Walk::Name(name) => names.push(name),
                Walk::Receiver(e) => queue.push_back(Walk::Expr(e)),
            }
        }
        names.into_iter().unique().collect()
    }

    fn push_children<'a>(&'a self, queue: &mut VecDeque<Walk<'a>>) {
        match self {
            Expr::Literal(_) | Expr::Ident(_) | Expr::Slot(..) => {}
            Expr::List(items) => queue.extend(items.iter().map(Walk::Expr)),
            Expr::Unary(_, e) => queue.push_back(Walk::Expr(e)),
            Expr::Binary(op @ BinaryOp::And, ..) | Expr::Binary(op @ BinaryOp::Or, ..) => {
                let mut operands = Vec::new();
                self.logical_operands(*op, &mut operands);
                queue.extend(operands.into_iter().map(Walk::Expr));
            }
            Expr::Binary(_, l, r) => {
                queue.push_back(Walk::Expr(l));
                queue.push_back(Walk::Expr(r));
            }
            Expr::Call(name, args) => {
                queue.push_back(Walk::Name(name));
                queue.extend(args.iter().map(Walk::Expr));
            }
            Expr::Count(list, item) => {
                queue.push_back(Walk::Receiver(list));
                queue.push_back(Walk::Expr(item));
            }
        }
    }

    /// Flattens a left-nested chain of `op`
    fn logical_operands<'a>(&'a self, op: BinaryOp, operands: &mut Vec<&'a Expr>) {
        match self {
            Expr::Binary(o, l, r) if *o == op => {
                l.logical_operands(op, operands);
                operands.push(r);
            }
            _ => operands.push(self),
        }
    }

    /// Binds every identifier for which `resolve` returns a slot to that slot.
    /// Identifiers that no longer resolve are unbound. Function names are left alone.
    pub fn bind(&mut self, resolve: &mut impl FnMut(&str) -> Option<usize>) {
        match self {
            Expr::Ident(name) | Expr::Slot(_, name) => {
                let name = std::mem::take(name);
                *self = match resolve(&name) {
                    Some(slot) => Expr::Slot(slot, name),
                    None => Expr::Ident(name),
                };
            }
            Expr::Literal(_) => {}
            Expr::List(items) | Expr::Call(_, items) => {
                for e in items {
                    e.bind(resolve);
                }
            }
            Expr::Unary(_, e) => e.bind(resolve),
            Expr::Binary(_, l, r) | Expr::Count(l, r) => {
                l.bind(resolve);
                r.bind(resolve);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, ..) => op.precedence(),
            Expr::Unary(UnaryOp::Not, _) => NOT_PRECEDENCE,
            Expr::Unary(UnaryOp::Neg, _) => NEG_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Ident(name) | Expr::Slot(_, name) => write!(f, "{}", name),
            Expr::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Expr::Unary(UnaryOp::Neg, e) => {
                write!(f, "-")?;
                e.fmt_operand(f, NEG_PRECEDENCE)
            }
            Expr::Unary(UnaryOp::Not, e) => {
                write!(f, "not ")?;
                e.fmt_operand(f, NOT_PRECEDENCE)
            }
            Expr::Binary(op, l, r) => {
                let p = op.precedence();
                // comparisons chain when printed side by side
                let left = if op.is_comparison() { p + 1 } else { p };
                l.fmt_operand(f, left)?;
                write!(f, " {} ", op.symbol())?;
                r.fmt_operand(f, p + 1)
            }
            Expr::Call(name, args) => write!(f, "{}({})", name, args.iter().join(", ")),
            Expr::Count(list, item) => {
                list.fmt_operand(f, ATOM_PRECEDENCE)?;
                write!(f, ".count({})", item)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryOp, Expr};

    #[test]
    fn free_identifiers_are_unique_and_breadth_first() {
        let expr = Expr::parse("B + abs(A - B) == C").unwrap();
        assert_eq!(vec!["C", "B", "abs", "A"], expr.free_identifiers());
        let expr = Expr::parse("A + B == C").unwrap();
        assert_eq!(vec!["C", "A", "B"], expr.free_identifiers());
    }

    #[test]
    fn free_identifiers_flatten_logical_chains() {
        let expr = Expr::parse("A == 1 and B == 2 and C").unwrap();
        assert_eq!(vec!["C", "A", "B"], expr.free_identifiers());
        let expr = Expr::parse("[A, B].count(C) == D").unwrap();
        assert_eq!(vec!["D", "C", "A", "B"], expr.free_identifiers());
    }

    #[test]
    fn bind_again_follows_names() {
        let mut expr = Expr::parse("X < Y").unwrap();
        expr.bind(&mut |name| match name {
            "X" => Some(0),
            "Y" => Some(1),
            _ => None,
        });
        expr.bind(&mut |name| match name {
            "X" => Some(1),
            _ => None,
        });
        let expected = Expr::binary(BinaryOp::Lt, Expr::Slot(1, "X".into()), Expr::ident("Y"));
        assert_eq!(expected, expr);
    }

    #[test]
    fn bind_rewrites_known_names() {
        let mut expr = Expr::parse("X == Y + k").unwrap();
        expr.bind(&mut |name| match name {
            "X" => Some(0),
            "Y" => Some(1),
            _ => None,
        });
        let expected = Expr::binary(
            BinaryOp::Eq,
            Expr::Slot(0, "X".into()),
            Expr::binary(BinaryOp::Add, Expr::Slot(1, "Y".into()), Expr::ident("k")),
        );
        assert_eq!(expected, expr);
    }

    #[test]
    fn display_parenthesizes() {
        let expr = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, Expr::ident("A"), Expr::int(1)),
            Expr::ident("B"),
        );
        assert_eq!("(A + 1) * B", expr.to_string());
        let expr = Expr::binary(
            BinaryOp::Sub,
            Expr::ident("A"),
            Expr::binary(BinaryOp::Sub, Expr::ident("B"), Expr::ident("C")),
        );
        assert_eq!("A - (B - C)", expr.to_string());
    }

    #[test]
    fn display_parses_back() {
        let text = "not (A or B) and [A, B, C].count(\"x\") >= -C % 2";
        let expr = Expr::parse(text).unwrap();
        assert_eq!(expr, Expr::parse(&expr.to_string()).unwrap());
    }
}
