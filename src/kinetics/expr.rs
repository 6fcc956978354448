//! Rate expression trees.
//!
//! A `RateExpr` is the evaluable form of a kinetic-law formula. Leaves are constants or
//! references into the model's slot vector (species concentrations, parameter values and
//! compartment sizes, in that order). Evaluation is a plain recursive walk; the tree is
//! built once per load and evaluated at every right-hand-side call of the integrator.

/// Reference to a model slot inside a rate expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRef {
    pub name: String,
    pub index: usize,
}

/// An expression tree node of a kinetic law.
#[derive(Debug, Clone, PartialEq)]
pub enum RateExpr {
    /// A constant floating point value
    Const(f64),
    /// A reference to a model slot
    Var(SlotRef),
    /// Addition of two expressions
    Add(Box<RateExpr>, Box<RateExpr>),
    /// Multiplication of two expressions
    Mul(Box<RateExpr>, Box<RateExpr>),
    /// Subtraction of two expressions
    Sub(Box<RateExpr>, Box<RateExpr>),
    /// Division of two expressions
    Div(Box<RateExpr>, Box<RateExpr>),
    /// Absolute value of an expression
    Abs(Box<RateExpr>),
    /// Exponentiation by an integer constant
    Pow(Box<RateExpr>, i32),
    /// Exponentiation by a floating point constant
    PowFloat(Box<RateExpr>, f64),
    /// Exponentiation by another expression
    PowExpr(Box<RateExpr>, Box<RateExpr>),
    /// Exponential function of an expression
    Exp(Box<RateExpr>),
    /// Natural logarithm of an expression
    Ln(Box<RateExpr>),
    /// Square root of an expression
    Sqrt(Box<RateExpr>),
    /// Sine of an expression (argument in radians)
    Sin(Box<RateExpr>),
    /// Cosine of an expression (argument in radians)
    Cos(Box<RateExpr>),
    /// Negation of an expression
    Neg(Box<RateExpr>),
}

impl RateExpr {
    /// Evaluates the expression against a slot vector.
    ///
    /// # Panics
    /// Panics if a slot index is out of bounds. Indices are assigned from the model's
    /// registry when the tree is built, so a slot vector produced by the same model is
    /// always long enough.
    pub fn eval(&self, slots: &[f64]) -> f64 {
        match self {
            RateExpr::Const(value) => *value,
            RateExpr::Var(slot) => slots[slot.index],
            RateExpr::Add(left, right) => left.eval(slots) + right.eval(slots),
            RateExpr::Mul(left, right) => left.eval(slots) * right.eval(slots),
            RateExpr::Sub(left, right) => left.eval(slots) - right.eval(slots),
            RateExpr::Div(left, right) => left.eval(slots) / right.eval(slots),
            RateExpr::Abs(expr) => expr.eval(slots).abs(),
            RateExpr::Pow(base, exp) => base.eval(slots).powi(*exp),
            RateExpr::PowFloat(base, exp) => base.eval(slots).powf(*exp),
            RateExpr::PowExpr(base, exp) => base.eval(slots).powf(exp.eval(slots)),
            RateExpr::Exp(expr) => expr.eval(slots).exp(),
            RateExpr::Ln(expr) => expr.eval(slots).ln(),
            RateExpr::Sqrt(expr) => expr.eval(slots).sqrt(),
            RateExpr::Sin(expr) => expr.eval(slots).sin(),
            RateExpr::Cos(expr) => expr.eval(slots).cos(),
            RateExpr::Neg(expr) => -expr.eval(slots),
        }
    }

    /// Returns the names of all slots referenced by the expression, in visit order.
    pub fn slots(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_slots(&mut names);
        names
    }

    fn collect_slots<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            RateExpr::Const(_) => {}
            RateExpr::Var(slot) => names.push(&slot.name),
            RateExpr::Add(l, r)
            | RateExpr::Mul(l, r)
            | RateExpr::Sub(l, r)
            | RateExpr::Div(l, r)
            | RateExpr::PowExpr(l, r) => {
                l.collect_slots(names);
                r.collect_slots(names);
            }
            RateExpr::Abs(e)
            | RateExpr::Pow(e, _)
            | RateExpr::PowFloat(e, _)
            | RateExpr::Exp(e)
            | RateExpr::Ln(e)
            | RateExpr::Sqrt(e)
            | RateExpr::Sin(e)
            | RateExpr::Cos(e)
            | RateExpr::Neg(e) => e.collect_slots(names),
        }
    }
}

impl std::fmt::Display for RateExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateExpr::Const(val) => write!(f, "{val}"),
            RateExpr::Var(slot) => write!(f, "{0}", slot.name),
            RateExpr::Add(left, right) => write!(f, "({left} + {right})"),
            RateExpr::Mul(left, right) => write!(f, "({left} * {right})"),
            RateExpr::Sub(left, right) => write!(f, "({left} - {right})"),
            RateExpr::Div(left, right) => write!(f, "({left} / {right})"),
            RateExpr::Abs(expr) => write!(f, "|{expr}|"),
            RateExpr::Pow(base, exp) => write!(f, "({base}^{exp})"),
            RateExpr::PowFloat(base, exp) => write!(f, "({base}^{exp})"),
            RateExpr::PowExpr(base, exponent) => write!(f, "({base}^{exponent})"),
            RateExpr::Exp(expr) => write!(f, "exp({expr})"),
            RateExpr::Ln(expr) => write!(f, "ln({expr})"),
            RateExpr::Sqrt(expr) => write!(f, "sqrt({expr})"),
            RateExpr::Sin(expr) => write!(f, "sin({expr})"),
            RateExpr::Cos(expr) => write!(f, "cos({expr})"),
            RateExpr::Neg(expr) => write!(f, "-({expr})"),
        }
    }
}
