//! Conversion of evalexpr syntax trees into rate expressions.
//!
//! Kinetic-law formulas are parsed with evalexpr and then walked once to produce a
//! `RateExpr` whose variable leaves point into the model's slot vector. Identifiers are
//! resolved against a name-to-slot map at this point, so an unknown identifier is caught
//! when the model is loaded rather than in the middle of an integration.

use std::collections::HashMap;

use evalexpr::{DefaultNumericTypes, Node, Operator, Value};

use crate::errors::KineticLawError;
use crate::kinetics::expr::{RateExpr, SlotRef};

/// Converts an evalexpr AST node into a rate expression.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
/// * `slots` - Map from identifier to its index in the model's slot vector
///
/// # Supported operations
/// * Basic arithmetic: +, -, *, /
/// * Identifiers declared by the model and numeric constants
/// * Functions: abs, exp, ln (also spelled log), sqrt, sin, cos
/// * Exponentiation with integer, float or expression exponents
pub fn build_rate_expr(
    node: &Node<DefaultNumericTypes>,
    slots: &HashMap<String, usize>,
) -> Result<RateExpr, KineticLawError> {
    let children = node.children();
    match node.operator() {
        // Addition and multiplication may carry more than two operands
        Operator::Add => fold_children(children, slots, RateExpr::Add),
        Operator::Mul => fold_children(children, slots, RateExpr::Mul),
        Operator::Sub => Ok(RateExpr::Sub(
            Box::new(child(children, 0, slots)?),
            Box::new(child(children, 1, slots)?),
        )),
        Operator::Div => Ok(RateExpr::Div(
            Box::new(child(children, 0, slots)?),
            Box::new(child(children, 1, slots)?),
        )),
        Operator::Neg => Ok(RateExpr::Neg(Box::new(child(children, 0, slots)?))),
        Operator::Const { value } => match value {
            Value::Float(f) => Ok(RateExpr::Const(*f)),
            Value::Int(i) => Ok(RateExpr::Const(*i as f64)),
            _ => Err(KineticLawError::ConstOperator(format!("{value:?}"))),
        },
        Operator::VariableIdentifierRead { identifier } => {
            let index = slots
                .get(identifier.as_str())
                .ok_or_else(|| KineticLawError::UnknownIdentifier(identifier.to_string()))?;
            Ok(RateExpr::Var(SlotRef {
                name: identifier.to_string(),
                index: *index,
            }))
        }
        Operator::FunctionIdentifier { identifier } => {
            let arg = Box::new(child(children, 0, slots)?);
            match identifier.as_str() {
                "abs" => Ok(RateExpr::Abs(arg)),
                "ln" | "log" => Ok(RateExpr::Ln(arg)),
                "sqrt" => Ok(RateExpr::Sqrt(arg)),
                "exp" => Ok(RateExpr::Exp(arg)),
                "sin" => Ok(RateExpr::Sin(arg)),
                "cos" => Ok(RateExpr::Cos(arg)),
                _ => Err(KineticLawError::UnsupportedFunction(identifier.to_string())),
            }
        }
        // Root nodes wrap the whole formula and every bracketed group
        Operator::RootNode => {
            if children.len() == 1 {
                build_rate_expr(&children[0], slots)
            } else {
                Err(KineticLawError::RootNode(format!("{} children", children.len())))
            }
        }
        Operator::Exp => {
            let base = Box::new(child(children, 0, slots)?);
            let exponent = children
                .get(1)
                .ok_or_else(|| KineticLawError::UnsupportedOperator("^ without exponent".into()))?;
            match exponent.operator() {
                Operator::Const {
                    value: Value::Int(exp),
                } => match i32::try_from(*exp) {
                    Ok(exp) => Ok(RateExpr::Pow(base, exp)),
                    Err(_) => Ok(RateExpr::PowFloat(base, *exp as f64)),
                },
                Operator::Const {
                    value: Value::Float(exp),
                } => Ok(RateExpr::PowFloat(base, *exp)),
                _ => Ok(RateExpr::PowExpr(
                    base,
                    Box::new(build_rate_expr(exponent, slots)?),
                )),
            }
        }
        other => Err(KineticLawError::UnsupportedOperator(format!("{other:?}"))),
    }
}

fn child(
    children: &[Node<DefaultNumericTypes>],
    position: usize,
    slots: &HashMap<String, usize>,
) -> Result<RateExpr, KineticLawError> {
    let node = children.get(position).ok_or_else(|| {
        KineticLawError::UnsupportedOperator(format!("missing operand {position}"))
    })?;
    build_rate_expr(node, slots)
}

fn fold_children(
    children: &[Node<DefaultNumericTypes>],
    slots: &HashMap<String, usize>,
    combine: fn(Box<RateExpr>, Box<RateExpr>) -> RateExpr,
) -> Result<RateExpr, KineticLawError> {
    let first = child(children, 0, slots)?;
    children.iter().skip(1).try_fold(first, |acc, node| {
        Ok(combine(Box::new(acc), Box::new(build_rate_expr(node, slots)?)))
    })
}
