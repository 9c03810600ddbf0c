//! Error types

use std::fmt::{Display, Formatter};
use std::{fmt, io};

use thiserror::Error;

use crate::expr::Value;

pub(crate) const UNEXPECTED_END: ParseError = ParseError::from_type(ParseErrorType::UnexpectedEnd);

/// An error in the text of a constraint expression or a problem file
#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ParseError {
    error_type: ParseErrorType,
    token: Option<String>,
    index: Option<usize>,
}

impl ParseError {
    pub(crate) fn new(error_type: ParseErrorType, token: impl Display, index: usize) -> Self {
        Self {
            error_type,
            token: Some(token.to_string()),
            index: Some(index),
        }
    }

    pub(crate) const fn from_type(error_type: ParseErrorType) -> Self {
        Self {
            error_type,
            token: None,
            index: None,
        }
    }

    /// Shifts the index by `offset` bytes, for text embedded in a larger string
    pub(crate) fn offset(mut self, offset: usize) -> Self {
        self.index = self.index.map(|i| i + offset);
        self
    }

    /// The kind of error
    pub fn error_type(&self) -> ParseErrorType {
        self.error_type
    }

    /// Byte offset of the offending token, if known
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorType {
    InvalidDomain,
    InvalidNumber,
    InvalidToken,
    InvalidVariable,
    UnexpectedEnd,
    UnexpectedToken,
    UnknownDirective,
    UnterminatedString,
}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorType::InvalidDomain => "Invalid domain",
            ParseErrorType::InvalidNumber => "Invalid number",
            ParseErrorType::InvalidToken => "Invalid token",
            ParseErrorType::InvalidVariable => "Invalid variable declaration",
            ParseErrorType::UnexpectedEnd => "Unexpected end",
            ParseErrorType::UnexpectedToken => "Unexpected token",
            ParseErrorType::UnknownDirective => "Unknown directive",
            ParseErrorType::UnterminatedString => "Unterminated string",
        };
        write!(f, "{}", s)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_type)?;
        if let Some(token) = &self.token {
            write!(f, ": \"{}\"", token)?;
        }
        if let Some(index) = &self.index {
            write!(f, " at {}", index)?;
        }
        Ok(())
    }
}

/// An inconsistency found while linking variables and constraints
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("duplicate variable \"{0}\"")]
    DuplicateVariable(String),
    #[error("duplicate value {value} in the domain of \"{variable}\"")]
    DuplicateValue { variable: String, value: Value },
    #[error("invalid constraint")]
    Parse(#[from] ParseError),
}

/// An invalid solver configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown heuristic \"{0}\", possible values are: none, mrv, degree")]
    UnknownHeuristic(String),
}

/// A constraint expression could not be evaluated
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot apply `{op}` to {operand}")]
    InvalidOperand { op: &'static str, operand: String },
    #[error("expected a boolean result, found {0}")]
    NotBoolean(Value),
    #[error("integer overflow")]
    Overflow,
    #[error("variable \"{0}\" is not assigned")]
    UnassignedVariable(String),
    #[error("unknown function \"{0}\"")]
    UnknownFunction(String),
    #[error("unknown name \"{0}\"")]
    UnknownName(String),
    #[error("{function}() takes {expected} argument(s), found {found}")]
    WrongArgumentCount {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },
}

/// Solving was aborted because a constraint could not be evaluated
#[derive(Debug, Error)]
#[error("error evaluating constraint \"{constraint}\": {source}")]
pub struct SolveError {
    constraint: String,
    source: EvalError,
}

impl SolveError {
    pub(crate) fn new(constraint: String, source: EvalError) -> Self {
        Self { constraint, source }
    }

    /// The evaluation error
    pub fn eval_error(&self) -> &EvalError {
        &self.source
    }
}

/// An error in a problem file
#[derive(Debug, Error)]
pub enum ParseProblemError {
    #[error("line {line}: {source}")]
    Line { line: usize, source: ParseError },
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// An error reading a problem from a file
#[derive(Error, Debug)]
pub enum ProblemFromFileError {
    #[error("error reading problem file")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseProblemError),
}
