//! Problem definitions: text files, common constraint families and random generation

use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::csp::{Constraint, Csp, Variable};
use crate::error::{ParseError, ParseProblemError, ProblemFromFileError, SetupError};
use crate::expr::{BinaryOp, Expr};

use self::parse::parse_problem;

pub mod generate;
mod parse;

/// Variables and constraints, before they are linked into a `Csp`
#[derive(Clone, Debug, Default)]
pub struct Problem {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a problem in the line format:
    ///
    /// ```text
    /// # comment
    /// var A: 0 1
    /// var Q0: 0..4
    /// var p: "wine" "poison"
    /// constraint A + Q0 < 3
    /// ```
    pub fn parse(s: &str) -> Result<Self, ParseProblemError> {
        parse_problem(s)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProblemFromFileError> {
        let buf = fs::read_to_string(path)?;
        let problem = Self::parse(&buf)?;
        Ok(problem)
    }

    /// The n-queens problem. Variable `Qi` is the row of the queen in column `i`.
    /// The row constraints come first, then the diagonals.
    pub fn queens(n: usize) -> Self {
        let names = (0..n).map(|i| format!("Q{}", i)).collect::<Vec<_>>();
        let mut problem = Self::new();
        for name in &names {
            problem.add_variable(Variable::new(name.as_str(), 0..n as i64));
        }
        problem.add_constraints(all_different(&names));
        for ((i, a), (j, b)) in names.iter().enumerate().tuple_combinations() {
            let distance = Expr::call(
                "abs",
                vec![Expr::binary(
                    BinaryOp::Sub,
                    Expr::ident(a.as_str()),
                    Expr::ident(b.as_str()),
                )],
            );
            problem.add_constraint_expr(Expr::binary(
                BinaryOp::Ne,
                Expr::int((j - i) as i64),
                distance,
            ));
        }
        problem
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Parses and adds a constraint
    pub fn add_constraint(&mut self, source: &str) -> Result<(), ParseError> {
        self.constraints.push(Constraint::new(source)?);
        Ok(())
    }

    pub fn add_constraint_expr(&mut self, expr: Expr) {
        self.constraints.push(Constraint::from_expr(expr));
    }

    pub fn add_constraints(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Links the variables and constraints
    pub fn into_csp(self) -> Result<Csp, SetupError> {
        Csp::new(self.variables, self.constraints)
    }
}

/// Pairwise inequality between the named variables
pub fn all_different<S: AsRef<str>>(names: &[S]) -> Vec<Constraint> {
    names
        .iter()
        .tuple_combinations()
        .map(|(a, b)| {
            Constraint::from_expr(Expr::binary(
                BinaryOp::Ne,
                Expr::ident(a.as_ref()),
                Expr::ident(b.as_ref()),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{all_different, Problem};
    use crate::csp::Variable;

    #[test]
    fn queens_constraints() {
        let problem = Problem::queens(4);
        assert_eq!(4, problem.variables().len());
        assert_eq!(12, problem.constraints().len());
        assert_eq!("Q0 != Q1", problem.constraints()[0].source());
        assert_eq!("Q2 != Q3", problem.constraints()[5].source());
        assert_eq!("1 != abs(Q0 - Q1)", problem.constraints()[6].source());
        assert_eq!("3 != abs(Q0 - Q3)", problem.constraints()[8].source());
    }

    #[test]
    fn all_different_pairs() {
        let mut problem = Problem::new();
        for name in &["A", "B", "C"] {
            problem.add_variable(Variable::new(*name, 0..3));
        }
        problem.add_constraints(all_different(&["A", "B", "C"]));
        let sources = problem
            .constraints()
            .iter()
            .map(|c| c.source())
            .collect::<Vec<_>>();
        assert_eq!(vec!["A != B", "A != C", "B != C"], sources);
        let result = problem.into_csp().unwrap().solve().unwrap();
        assert_eq!(6, result.solutions.len());
    }
}
