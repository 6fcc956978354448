//! Kinetic-law compilation.
//!
//! Formulas are written in infix notation (e.g. `"vmax * S / (km + S)"`), parsed with
//! evalexpr and converted into `RateExpr` trees bound to the model's slot layout.

use std::collections::HashMap;

use evalexpr::{build_operator_tree, DefaultNumericTypes};

use crate::errors::KineticLawError;

pub mod convert;
pub mod expr;

pub use expr::RateExpr;

/// Compiles a kinetic-law formula against a name-to-slot map.
///
/// # Example
/// ```
/// # use std::collections::HashMap;
/// # use reactsim::kinetics::compile;
/// let slots = HashMap::from([("A".to_string(), 0), ("k1".to_string(), 1)]);
/// let rate = compile("k1 * A", &slots).unwrap();
/// assert_eq!(rate.eval(&[10.0, 0.5]), 5.0);
/// ```
pub fn compile(formula: &str, slots: &HashMap<String, usize>) -> Result<RateExpr, KineticLawError> {
    let node = build_operator_tree::<DefaultNumericTypes>(formula)?;
    convert::build_rate_expr(&node, slots)
}
