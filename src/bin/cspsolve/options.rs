use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use cspsolve::problem::generate::GenerateOptions;
use cspsolve::{Heuristic, SolverConfig};

#[derive(Clone, Debug)]
pub(crate) struct Options {
    source: Source,
    solver_config: SolverConfig,
    quiet: bool,
}

impl Options {
    pub fn from_args() -> Result<Self> {
        Self::from_arg_matches(&clap_app().get_matches())
    }

    fn from_arg_matches(matches: &ArgMatches<'_>) -> Result<Self> {
        let source = if let Some(path) = matches.value_of("input") {
            Source::File(path.into())
        } else if let Some(n) = matches.value_of("queens") {
            Source::Queens(n.parse().context("invalid number of queens")?)
        } else {
            let defaults = GenerateOptions::default();
            Source::Generate(Generate {
                options: GenerateOptions {
                    variables: parse_or(matches, "variables", defaults.variables)?,
                    domain_size: parse_or(matches, "domain_size", defaults.domain_size)?,
                    density: parse_or(matches, "density", defaults.density)?,
                    tightness: parse_or(matches, "tightness", defaults.tightness)?,
                },
                seed: matches
                    .value_of("seed")
                    .map(|s| s.parse().context("invalid seed"))
                    .transpose()?,
            })
        };
        let heuristic = match matches.value_of("heuristic") {
            Some(name) => name.parse::<Heuristic>()?,
            None => Heuristic::default(),
        };
        let solver_config = SolverConfig {
            initial_node: matches.is_present("init_node"),
            initial_arc: matches.is_present("init_arc"),
            node_during_search: matches.is_present("node"),
            arc_during_search: matches.is_present("arc"),
            heuristic,
        };
        Ok(Self {
            source,
            solver_config,
            quiet: matches.is_present("quiet"),
        })
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn solver_config(&self) -> SolverConfig {
        self.solver_config
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

fn parse_or<T>(matches: &ArgMatches<'_>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match matches.value_of(name) {
        Some(s) => s.parse().with_context(|| format!("invalid value for {}: {}", name, s)),
        None => Ok(default),
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Source {
    File(PathBuf),
    Queens(usize),
    Generate(Generate),
}

#[derive(Clone, Debug)]
pub(crate) struct Generate {
    pub options: GenerateOptions,
    pub seed: Option<u64>,
}

fn clap_app() -> clap::App<'static, 'static> {
    use clap::{App, AppSettings, Arg, ArgGroup};

    App::new("cspsolve")
        .author("Cameron Steffen <cam.steffen94@gmail.com>")
        .about("Solve finite-domain constraint satisfaction problems")
        .setting(AppSettings::ArgRequiredElseHelp)
        .group(
            ArgGroup::with_name("source")
                .args(&["input", "queens", "generate"])
                .required(true),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("PATH")
                .help("read a problem from a file")
                .display_order(1),
        )
        .arg(
            Arg::with_name("queens")
                .short("q")
                .long("queens")
                .takes_value(true)
                .value_name("N")
                .help("solve the n-queens problem")
                .display_order(1),
        )
        .arg(
            Arg::with_name("generate")
                .short("g")
                .long("generate")
                .help("generate a random binary problem")
                .display_order(1),
        )
        .arg(
            Arg::with_name("init_node")
                .long("init-node")
                .help("make the problem node consistent before searching"),
        )
        .arg(
            Arg::with_name("init_arc")
                .long("init-arc")
                .help("make the problem arc consistent before searching"),
        )
        .arg(
            Arg::with_name("node")
                .long("node")
                .help("enforce node consistency after every assignment"),
        )
        .arg(
            Arg::with_name("arc")
                .long("arc")
                .help("enforce arc consistency after every assignment"),
        )
        .arg(
            Arg::with_name("heuristic")
                .long("heuristic")
                .takes_value(true)
                .value_name("NAME")
                .help("variable ordering heuristic: none, mrv or degree"),
        )
        .arg(
            Arg::with_name("quiet")
                .long("quiet")
                .help("only print statistics"),
        )
        .arg(
            Arg::with_name("variables")
                .short("n")
                .long("variables")
                .takes_value(true)
                .value_name("VARS")
                .requires("generate")
                .help("the number of variables to generate"),
        )
        .arg(
            Arg::with_name("domain_size")
                .short("d")
                .long("domain-size")
                .takes_value(true)
                .value_name("DOMAIN")
                .requires("generate")
                .help("the domain size of generated variables"),
        )
        .arg(
            Arg::with_name("density")
                .long("density")
                .takes_value(true)
                .value_name("P")
                .requires("generate")
                .help("the probability that two generated variables are constrained"),
        )
        .arg(
            Arg::with_name("tightness")
                .long("tightness")
                .takes_value(true)
                .value_name("P")
                .requires("generate")
                .help("the probability that a generated constraint forbids a pair of values"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .value_name("S")
                .requires("generate")
                .help("seed for the random generator"),
        )
}

#[cfg(test)]
mod tests {
    use super::{clap_app, Options, Source};
    use cspsolve::error::ConfigError;

    fn options(args: &[&str]) -> anyhow::Result<Options> {
        let matches = clap_app().get_matches_from_safe(args)?;
        Options::from_arg_matches(&matches)
    }

    #[test]
    fn queens() {
        let options = options(&["cspsolve", "-q", "8", "--arc", "--heuristic", "mrv"]).unwrap();
        assert!(matches!(options.source(), Source::Queens(8)));
        let config = options.solver_config();
        assert!(config.arc_during_search);
        assert!(!config.node_during_search);
        assert_eq!("mrv", config.heuristic.to_string());
    }

    #[test]
    fn unknown_heuristic() {
        let error = options(&["cspsolve", "-q", "4", "--heuristic", "deg"]).unwrap_err();
        assert_eq!(
            Some(&ConfigError::UnknownHeuristic("deg".into())),
            error.downcast_ref::<ConfigError>()
        );
    }
}
