//! Random binary constraint problems

use itertools::Itertools;
use rand::Rng;

use crate::csp::Variable;
use crate::expr::{BinaryOp, Expr};
use crate::problem::Problem;

/// Parameters of a random binary problem
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerateOptions {
    pub variables: usize,
    pub domain_size: usize,
    /// probability that a pair of variables is constrained
    pub density: f64,
    /// probability that a pair of values is forbidden by a constraint
    pub tightness: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            variables: 8,
            domain_size: 4,
            density: 0.4,
            tightness: 0.3,
        }
    }
}

/// Generates a problem over variables `X0`, `X1`, ... with domains `0..domain_size`.
/// Every constraint has the form `[Xi, Xj] not in [[a, b], ...]`.
pub fn generate_problem(options: &GenerateOptions, rng: &mut impl Rng) -> Problem {
    let density = options.density.max(0.0).min(1.0);
    let tightness = options.tightness.max(0.0).min(1.0);
    let names = (0..options.variables)
        .map(|i| format!("X{}", i))
        .collect::<Vec<_>>();
    let mut problem = Problem::new();
    for name in &names {
        problem.add_variable(Variable::new(name.as_str(), 0..options.domain_size as i64));
    }
    for (a, b) in names.iter().tuple_combinations() {
        if !rng.gen_bool(density) {
            continue;
        }
        let forbidden = (0..options.domain_size as i64)
            .cartesian_product(0..options.domain_size as i64)
            .filter(|_| rng.gen_bool(tightness))
            .map(|(x, y)| Expr::List(vec![Expr::int(x), Expr::int(y)]))
            .collect::<Vec<_>>();
        if forbidden.is_empty() {
            continue;
        }
        problem.add_constraint_expr(Expr::binary(
            BinaryOp::NotIn,
            Expr::List(vec![Expr::ident(a.as_str()), Expr::ident(b.as_str())]),
            Expr::List(forbidden),
        ));
    }
    debug!(
        "generated {} variables and {} constraints",
        problem.variables().len(),
        problem.constraints().len()
    );
    problem
}
