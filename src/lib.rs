//! Solve finite-domain constraint satisfaction problems

#![warn(rust_2018_idioms)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused_qualifications)]

#[macro_use]
extern crate log;

pub mod csp;
pub mod error;
pub mod expr;
pub mod problem;

mod collections;

pub use crate::csp::{Constraint, Csp, Heuristic, Solution, SolveResult, SolveStats, SolverConfig, Variable};
pub use crate::expr::{Expr, Value};
pub use crate::problem::Problem;
