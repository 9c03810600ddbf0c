use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::expr::Value;

/// A complete assignment that satisfies every constraint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    assignments: Vec<(String, Value)>,
}

impl Solution {
    pub(crate) fn new(assignments: Vec<(String, Value)>) -> Self {
        Self { assignments }
    }

    /// The value assigned to a variable
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Variable names and values in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.assignments.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.assignments.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = self
            .assignments
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .join("; ");
        f.write_str(&s)
    }
}

/// Counters collected during a solve
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub solutions: u64,
    /// search states visited, counting the root
    pub states: u64,
    /// constraint evaluations, including those made by propagation
    pub evaluations: u64,
}

impl Display for SolveStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number Solutions: {}; Number States visited {}; Number constraints evaluated {}",
            self.solutions, self.states, self.evaluations
        )
    }
}

#[derive(Clone, Debug)]
pub struct SolveResult {
    pub solutions: Vec<Solution>,
    pub stats: SolveStats,
}

#[cfg(test)]
mod tests {
    use super::{Solution, SolveStats};
    use crate::expr::Value;

    #[test]
    fn display() {
        let solution = Solution::new(vec![
            ("A".to_string(), Value::Int(1)),
            ("p".to_string(), Value::from("wine")),
        ]);
        assert_eq!("A = 1; p = \"wine\"", solution.to_string());
        assert_eq!(Some(&Value::from("wine")), solution.get("p"));
        let stats = SolveStats {
            solutions: 3,
            states: 8,
            evaluations: 12,
        };
        assert_eq!(
            "Number Solutions: 3; Number States visited 8; Number constraints evaluated 12",
            stats.to_string()
        );
    }
}
