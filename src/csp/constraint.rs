use crate::csp::VariableId;
use crate::error::ParseError;
use crate::expr::Expr;

/// Index of a constraint in its `Csp`
pub type ConstraintId = usize;

/// A predicate over a set of variables
#[derive(Clone, Debug)]
pub struct Constraint {
    source: String,
    pub(crate) expr: Expr,
    pub(crate) variables: Vec<VariableId>,
}

impl Constraint {
    /// Parses a constraint from its predicate text, such as `"A + B != C"`
    pub fn new(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let expr = Expr::parse(&source)?;
        Ok(Self {
            source,
            expr,
            variables: Vec::new(),
        })
    }

    /// Creates a constraint from an expression tree. The tree's printed form becomes the source text.
    pub fn from_expr(expr: Expr) -> Self {
        Self {
            source: expr.to_string(),
            expr,
            variables: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The variables in the predicate. Empty until the constraint is added to a `Csp`.
    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    pub fn arity(&self) -> usize {
        self.variables.len()
    }
}
