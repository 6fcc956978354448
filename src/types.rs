use indexmap::IndexMap;

/// Identifier-to-value mapping that keeps the model's declaration order.
pub type VariableMap = IndexMap<String, f64>;

/// State vector handed to the ODE solver: floating-species amounts.
pub type State = ode_solvers::DVector<f64>;
