use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use cspsolve::error::{ConfigError, EvalError, ProblemFromFileError};
use cspsolve::problem::generate::{generate_problem, GenerateOptions};
use cspsolve::{Csp, Heuristic, Problem, SolverConfig, Value, Variable};

#[test]
fn test_problems() -> Result<()> {
    let expected: &[(&str, &[&str])] = &[
        ("equations.csp", &["A = 2; B = 1; C = 4"]),
        (
            "constraint_graph.csp",
            &[
                "A = 3; B = 3; C = 4; D = 2; E = 1",
                "A = 4; B = 4; C = 2; D = 3; E = 1",
            ],
        ),
        (
            "harry_potter.csp",
            &["potion1 = \"poison\"; potion2 = \"wine\"; potion3 = \"onwards\"; \
               potion4 = \"poison\"; potion5 = \"poison\"; potion6 = \"wine\"; \
               potion7 = \"back\""],
        ),
        (
            "testing_problem.csp",
            &[
                "A = 4; B = 4; C = 1; D = 1; E = 0; F = 1",
                "A = 4; B = 4; C = 1; D = 1; E = 1; F = 0",
                "A = 4; B = 4; C = 1; D = 1; E = 1; F = 1",
                "A = 5; B = 5; C = 1; D = 1; E = 0; F = 1",
                "A = 5; B = 5; C = 1; D = 1; E = 1; F = 0",
                "A = 5; B = 5; C = 1; D = 1; E = 1; F = 1",
                "A = 5; B = 5; C = 2; D = 2; E = 0; F = 1",
                "A = 5; B = 5; C = 2; D = 2; E = 1; F = 0",
                "A = 5; B = 5; C = 2; D = 2; E = 1; F = 1",
            ],
        ),
    ];
    let mut files: Vec<_> = fs::read_dir(project_path("res/test/problems"))?
        .map(|f| f.map(|f| f.path()))
        .collect::<Result<_, _>>()?;
    files.sort_unstable();
    assert_eq!(expected.len(), files.len());
    for path in files {
        println!("Solving {}", path.display());
        let file_name = path.file_name().unwrap().to_str().unwrap();
        let &(_, solutions) = expected
            .iter()
            .find(|(name, _)| *name == file_name)
            .unwrap_or_else(|| panic!("no expected solutions for {}", file_name));
        let mut csp = Problem::from_file(&path)?.into_csp()?;
        for config in all_configs() {
            csp.set_config(config);
            assert_eq!(
                solutions,
                sorted_solutions(&mut csp)?.as_slice(),
                "{} with {:?}",
                path.display(),
                config
            );
        }
    }
    Ok(())
}

#[test]
fn three_variables_sum() -> Result<()> {
    let variables = vec![
        Variable::new("A", 0..2),
        Variable::new("B", 0..2),
        Variable::new("C", 0..2),
    ];
    let mut csp = Csp::from_sources(variables, &["A + B + C == 2"])?;
    let result = csp.solve()?;
    let rows: Vec<Vec<i64>> = result
        .solutions
        .iter()
        .map(|s| s.values().filter_map(Value::as_int).collect())
        .collect();
    assert_eq!(vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]], rows);
    assert_eq!(3, result.stats.solutions);
    assert!(result.stats.states > 3);
    Ok(())
}

#[test]
fn four_queens() -> Result<()> {
    let mut csp = Problem::queens(4).into_csp()?;
    assert_eq!(&["abs".to_string()], csp.unresolved_names());
    let result = csp.solve()?;
    let rows: Vec<Vec<i64>> = result
        .solutions
        .iter()
        .map(|s| s.values().filter_map(Value::as_int).collect())
        .collect();
    assert_eq!(vec![vec![1, 3, 0, 2], vec![2, 0, 3, 1]], rows);
    Ok(())
}

#[test]
fn eight_queens_every_config() -> Result<()> {
    let mut csp = Problem::queens(8).into_csp()?;
    let mut states = Vec::new();
    for config in all_configs() {
        csp.set_config(config);
        let result = csp.solve()?;
        assert_eq!(92, result.solutions.len(), "{:?}", config);
        states.push((config, result.stats.states));
    }
    let states_with = |node: bool, arc: bool| {
        states
            .iter()
            .find(|(c, _)| {
                c.heuristic == Heuristic::default()
                    && !c.initial_node
                    && !c.initial_arc
                    && c.node_during_search == node
                    && c.arc_during_search == arc
            })
            .map(|&(_, states)| states)
            .unwrap()
    };
    let plain = states_with(false, false);
    // after an assignment no queens constraint has two unassigned variables left
    assert_eq!(plain, states_with(false, true));
    assert!(states_with(true, true) < plain);
    Ok(())
}

#[test]
fn initial_arc_conflict() -> Result<()> {
    let variables = vec![Variable::new("X", vec![1]), Variable::new("Y", vec![2])];
    let mut csp = Csp::from_sources(variables, &["X == Y"])?.with_config(SolverConfig {
        initial_arc: true,
        ..SolverConfig::default()
    });
    let result = csp.solve()?;
    assert!(result.solutions.is_empty());
    assert_eq!(0, result.stats.states);
    Ok(())
}

#[test]
fn degree_ties_follow_constraint_order() -> Result<()> {
    let variables = vec![
        Variable::new("A", 0..3),
        Variable::new("B", 0..3),
        Variable::new("C", 0..3),
    ];
    let mut csp = Csp::from_sources(variables, &["A + B == C"])?.with_config(SolverConfig {
        heuristic: "degree".parse()?,
        ..SolverConfig::default()
    });
    let rows: Vec<Vec<i64>> = csp
        .solve()?
        .solutions
        .iter()
        .map(|s| s.values().filter_map(Value::as_int).collect())
        .collect();
    // C is chosen first
    assert_eq!(
        vec![
            vec![0, 0, 0],
            vec![0, 1, 1],
            vec![1, 0, 1],
            vec![0, 2, 2],
            vec![1, 1, 2],
            vec![2, 0, 2],
        ],
        rows
    );
    Ok(())
}

#[test]
fn constraints_move_between_csps() -> Result<()> {
    let variables = vec![Variable::new("A", 0..2), Variable::new("B", 0..3)];
    let csp = Csp::from_sources(variables, &["k + A == B"])?;
    assert_eq!(&["k".to_string()], csp.unresolved_names());
    let variables = vec![
        Variable::new("k", vec![1]),
        Variable::new("A", 0..2),
        Variable::new("B", 0..3),
    ];
    let mut moved = Csp::new(variables, csp.constraints().to_vec())?;
    assert!(moved.unresolved_names().is_empty());
    assert_eq!(
        vec!["k = 1; A = 0; B = 1", "k = 1; A = 1; B = 2"],
        sorted_solutions(&mut moved)?
    );

    let variables = vec![Variable::new("A", 0..2), Variable::new("B", 0..2)];
    let csp = Csp::from_sources(variables, &["A < B"])?;
    let mut moved = Csp::new(vec![Variable::new("A", 0..2)], csp.constraints().to_vec())?;
    assert_eq!(&["B".to_string()], moved.unresolved_names());
    let error = moved.solve().unwrap_err();
    assert_eq!(&EvalError::UnknownName("B".into()), error.eval_error());
    Ok(())
}

#[test]
fn unknown_heuristic() {
    let result = "deg".parse::<Heuristic>();
    assert_eq!(Err(ConfigError::UnknownHeuristic("deg".into())), result);
}

#[test]
fn generated_problems_agree() -> Result<()> {
    let options = GenerateOptions {
        variables: 7,
        domain_size: 3,
        density: 0.5,
        tightness: 0.25,
    };
    for seed in 0..10 {
        let problem = generate_problem(&options, &mut StdRng::seed_from_u64(seed));
        let mut csp = problem.into_csp()?;
        let before = domains(&csp);
        let expected = sorted_solutions(&mut csp)?;
        for config in all_configs() {
            csp.set_config(config);
            assert_eq!(
                expected,
                sorted_solutions(&mut csp)?,
                "seed {} with {:?}",
                seed,
                config
            );
            assert_eq!(before, domains(&csp), "seed {} with {:?}", seed, config);
            assert!(csp.variables().iter().all(|v| !v.is_assigned()));
        }
    }
    Ok(())
}

#[test]
fn problem_from_file() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "var A: 0..3")?;
    writeln!(file, "var B: 0..3")?;
    writeln!(file, "constraint A < B")?;
    file.flush()?;
    let mut csp = Problem::from_file(file.path())?.into_csp()?;
    assert_eq!(3, csp.solve()?.solutions.len());

    let dir = tempfile::tempdir()?;
    let result = Problem::from_file(dir.path().join("missing.csp"));
    assert!(matches!(result, Err(ProblemFromFileError::Io(_))));
    Ok(())
}

fn all_configs() -> Vec<SolverConfig> {
    let mut configs = Vec::new();
    for heuristic in &Heuristic::NAMES {
        let heuristic: Heuristic = heuristic.parse().unwrap();
        for flags in 0..16 {
            configs.push(SolverConfig {
                initial_node: flags & 1 != 0,
                initial_arc: flags & 2 != 0,
                node_during_search: flags & 4 != 0,
                arc_during_search: flags & 8 != 0,
                heuristic,
            });
        }
    }
    configs
}

fn sorted_solutions(csp: &mut Csp) -> Result<Vec<String>> {
    let mut solutions: Vec<String> = csp
        .solve()?
        .solutions
        .iter()
        .map(ToString::to_string)
        .collect();
    solutions.sort_unstable();
    Ok(solutions)
}

fn domains(csp: &Csp) -> Vec<Vec<Value>> {
    csp.variables().iter().map(|v| v.domain().to_vec()).collect()
}

fn project_path(path: impl AsRef<Path>) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
}
