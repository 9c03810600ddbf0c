use crate::csp::ConstraintId;
use crate::expr::Value;

/// Index of a variable in its `Csp`
pub type VariableId = usize;

/// A named variable with a finite, ordered domain
#[derive(Clone, Debug)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) domain: Vec<Value>,
    pub(crate) value: Option<Value>,
    pub(crate) constraints: Vec<ConstraintId>,
}

impl Variable {
    pub fn new<V: Into<Value>>(name: impl Into<String>, domain: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into_iter().map(Into::into).collect(),
            value: None,
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The values that are still possible, in order
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    /// The value currently assigned by the solver
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_assigned(&self) -> bool {
        self.value.is_some()
    }

    /// The constraints this variable is involved in
    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }
}
