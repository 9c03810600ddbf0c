#![warn(rust_2018_idioms)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused_qualifications)]

use anyhow::{Context, Result};
use cspsolve::problem::generate::generate_problem;
use cspsolve::{Problem, SolveStats};
use log::info;
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};

use crate::options::{Options, Source};

mod options;

fn main() -> Result<()> {
    env_logger::init();
    let options = Options::from_args()?;
    let problem = source_problem(&options)?;
    let stats = solve(problem, &options)?;
    println!("{}", stats);
    Ok(())
}

fn source_problem(options: &Options) -> Result<Problem> {
    let problem = match options.source() {
        Source::File(path) => {
            println!("Reading problem from \"{}\"", path.display());
            Problem::from_file(path)
                .with_context(|| format!("failed to read problem from \"{}\"", path.display()))?
        }
        &Source::Queens(n) => Problem::queens(n),
        Source::Generate(generate) => {
            let mut rng = match generate.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(thread_rng())?,
            };
            generate_problem(&generate.options, &mut rng)
        }
    };
    Ok(problem)
}

fn solve(problem: Problem, options: &Options) -> Result<SolveStats> {
    let mut csp = problem
        .into_csp()?
        .with_config(options.solver_config());
    info!(
        "solving {} variables and {} constraints",
        csp.variables().len(),
        csp.constraints().len()
    );
    let quiet = options.quiet();
    let stats = csp.solve_with(|solution| {
        if !quiet {
            println!("{}", solution);
        }
    })?;
    Ok(stats)
}
